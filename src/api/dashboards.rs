use serde::Serialize;
use std::fmt::Display;

use crate::api::models::{Dashboard, Integration, LoginUrl};
use crate::client::{ApiClient, ClientError};

const DASHBOARDS: &str = "/dashboards/dashboards/";
const INTEGRATIONS: &str = "/dashboards/integrations/";

fn integration_path(id: impl Display) -> String {
    format!("{INTEGRATIONS}{id}/")
}

impl ApiClient {
    pub async fn get_dashboards(&self) -> Result<Vec<Dashboard>, ClientError> {
        self.get_list(DASHBOARDS).await
    }

    pub async fn get_integrations(&self) -> Result<Vec<Integration>, ClientError> {
        self.get_list(INTEGRATIONS).await
    }

    pub async fn create_integration(
        &self,
        data: &impl Serialize,
    ) -> Result<Integration, ClientError> {
        self.post_json(INTEGRATIONS, data).await
    }

    pub async fn delete_integration(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&integration_path(id)).await
    }

    pub async fn get_login_url(&self, id: impl Display) -> Result<LoginUrl, ClientError> {
        self.get_one(&format!("{}get_login_url/", integration_path(id)))
            .await
    }
}
