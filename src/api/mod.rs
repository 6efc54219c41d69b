//! Typed wrappers for the platform's REST resources.
//!
//! Every call goes through [`ApiClient::request`], so token attach, the
//! refresh-once path and error mapping apply uniformly.

pub mod audit;
pub mod automation;
pub mod dashboards;
pub mod kubernetes;
pub mod machines;
pub mod models;
pub mod terraform;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiClient, ClientError};
use crate::transport::RequestOptions;

impl ApiClient {
    /// GET a collection, accepting either a bare array or a page envelope.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, ClientError> {
        self.request::<models::ListResponse<T>>(endpoint, RequestOptions::get())
            .await
            .map(models::ListResponse::into_vec)
    }

    pub(crate) async fn get_one<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.request(endpoint, RequestOptions::get()).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &impl Serialize,
    ) -> Result<T, ClientError> {
        self.request(endpoint, RequestOptions::post().json(payload)?)
            .await
    }

    /// POST without a body, used by action endpoints (`sync/`, `plan/`, ...).
    pub(crate) async fn post_action<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.request(endpoint, RequestOptions::post()).await
    }

    pub(crate) async fn patch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &impl Serialize,
    ) -> Result<T, ClientError> {
        self.request(endpoint, RequestOptions::patch().json(payload)?)
            .await
    }

    pub(crate) async fn delete_resource(&self, endpoint: &str) -> Result<(), ClientError> {
        self.request::<serde_json::Value>(endpoint, RequestOptions::delete())
            .await
            .map(|_| ())
    }
}
