use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, trace};

use crate::client::ClientError;
use crate::transport::RequestOptions;

/// Merge default, caller and auth headers.
///
/// Caller headers override `Content-Type`; a held access token overrides any
/// caller-supplied `Authorization`. Without a token the caller's headers are
/// passed through untouched.
pub fn build_headers(extra: &HeaderMap, access_token: Option<&str>) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(extra.clone());

    if let Some(token) = access_token {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
    }

    Ok(headers)
}

/// Issue one HTTP call. Transport failures become a status-less request error.
pub async fn send(
    client: &Client,
    url: &str,
    options: &RequestOptions,
    headers: HeaderMap,
) -> Result<Response, ClientError> {
    trace!(
        url = %url,
        method = %options.method,
        has_body = options.body.is_some(),
        "sending request"
    );

    let mut builder = client.request(options.method.clone(), url).headers(headers);
    if !options.query.is_empty() {
        builder = builder.query(&options.query);
    }
    if let Some(body) = &options.body {
        builder = builder.body(body.clone());
    }

    let response = builder.send().await.map_err(transport_error)?;
    debug!(
        status_code = %response.status().as_u16(),
        url = %url,
        "received response"
    );
    Ok(response)
}

/// Drain the response body, keeping the status alongside it.
pub async fn read_body(response: Response) -> Result<(StatusCode, Vec<u8>), ClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;
    Ok((status, body.to_vec()))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("transport error: {}", err)
    };
    ClientError::Request {
        status: None,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use reqwest::header::ACCEPT;

    #[test]
    fn test_build_headers_defaults() {
        let headers = build_headers(&HeaderMap::new(), None).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_build_headers_token_overrides_caller_authorization() {
        let mut extra = HeaderMap::new();
        extra.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        extra.insert(ACCEPT, HeaderValue::from_static("text/plain"));

        let headers = build_headers(&extra, Some("A1")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer A1");
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/plain");
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_build_headers_caller_content_type_wins() {
        let mut extra = HeaderMap::new();
        extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/yaml"));

        let headers = build_headers(&extra, None).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/yaml");
    }

    #[test]
    fn test_build_headers_rejects_invalid_token() {
        let result = build_headers(&HeaderMap::new(), Some("bad\ntoken"));
        assert!(matches!(result, Err(ClientError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_send_connection_refused_has_no_status() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/users/me/", addr);
        let err = send(&Client::new(), &url, &RequestOptions::get(), HeaderMap::new())
            .await
            .unwrap_err();

        match err {
            ClientError::Request { status, .. } => assert!(status.is_none()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_passes_query_and_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/automation/playbooks/")
            .match_query(mockito::Matcher::UrlEncoded("dry".into(), "1".into()))
            .match_body(r#"{"name":"patch"}"#)
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let options = RequestOptions::post()
            .json(&serde_json::json!({"name": "patch"}))
            .unwrap()
            .query([("dry", "1")]);
        let url = format!("{}/automation/playbooks/", server.url());
        let response = send(&Client::new(), &url, &options, HeaderMap::new())
            .await
            .unwrap();

        let (status, body) = read_body(response).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, b"{}");
        mock.assert_async().await;
    }
}
