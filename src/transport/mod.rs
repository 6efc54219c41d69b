pub mod http;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::client::ClientError;

/// Message used when a failed response body is not JSON.
pub const UNPARSEABLE_ERROR_MESSAGE: &str = "An error occurred";
/// Message used when a failed JSON body carries no recognised message field.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

const MESSAGE_FIELDS: [&str; 3] = ["detail", "message", "error"];

/// Method, extra headers, body and query of one logical API call.
///
/// The encoded body is kept so a retried request is byte-identical.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(payload).map_err(ClientError::Encode)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self, ClientError> {
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Pull `detail`, `message` or `error` (first string found) out of a JSON
/// error body. `None` when the body is not JSON or has none of them.
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    MESSAGE_FIELDS.iter().find_map(|field| {
        value
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Caller-facing message for a non-2xx response body.
pub fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(_) => extract_error_message(body).unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string()),
        Err(_) => UNPARSEABLE_ERROR_MESSAGE.to_string(),
    }
}
