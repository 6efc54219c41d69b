use serde_json::Value;
use std::fmt::Display;

use crate::api::models::{Credential, NewCredential, PasswordChange, UserProfile};
use crate::client::{ApiClient, ClientError};

const CURRENT_USER: &str = "/users/me/";
const USERS: &str = "/users/users/";
const CREDENTIALS: &str = "/users/credentials/";

impl ApiClient {
    pub async fn get_current_user(&self) -> Result<UserProfile, ClientError> {
        self.get_one(CURRENT_USER).await
    }

    pub async fn get_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.get_list(USERS).await
    }

    /// Wrong old password or mismatched confirmation is a 400.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Value, ClientError> {
        self.post_json(&format!("{USERS}change_password/"), change)
            .await
    }

    pub async fn get_credentials(&self) -> Result<Vec<Credential>, ClientError> {
        self.get_list(CREDENTIALS).await
    }

    pub async fn create_credential(
        &self,
        credential: &NewCredential,
    ) -> Result<Credential, ClientError> {
        self.post_json(CREDENTIALS, credential).await
    }

    pub async fn delete_credential(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&format!("{CREDENTIALS}{id}/")).await
    }
}
