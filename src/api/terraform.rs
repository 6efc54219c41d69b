use serde::Serialize;
use std::fmt::Display;

use crate::api::models::{TerraformRun, Workspace};
use crate::client::{ApiClient, ClientError};

const WORKSPACES: &str = "/terraform/workspaces/";

fn workspace_path(id: impl Display) -> String {
    format!("{WORKSPACES}{id}/")
}

impl ApiClient {
    pub async fn get_workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        self.get_list(WORKSPACES).await
    }

    pub async fn create_workspace(&self, data: &impl Serialize) -> Result<Workspace, ClientError> {
        self.post_json(WORKSPACES, data).await
    }

    pub async fn update_workspace(
        &self,
        id: impl Display,
        data: &impl Serialize,
    ) -> Result<Workspace, ClientError> {
        self.patch_json(&workspace_path(id), data).await
    }

    pub async fn delete_workspace(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&workspace_path(id)).await
    }

    pub async fn plan_workspace(&self, id: impl Display) -> Result<TerraformRun, ClientError> {
        self.post_action(&format!("{}plan/", workspace_path(id)))
            .await
    }

    pub async fn apply_workspace(&self, id: impl Display) -> Result<TerraformRun, ClientError> {
        self.post_action(&format!("{}apply/", workspace_path(id)))
            .await
    }

    /// `terraform destroy` for the workspace's managed infrastructure. The
    /// workspace record itself is kept; see [`ApiClient::delete_workspace`].
    pub async fn destroy_workspace(&self, id: impl Display) -> Result<TerraformRun, ClientError> {
        self.post_action(&format!("{}destroy_infrastructure/", workspace_path(id)))
            .await
    }

    pub async fn get_runs(&self, workspace_id: impl Display) -> Result<Vec<TerraformRun>, ClientError> {
        self.get_list(&format!("{}runs/", workspace_path(workspace_id)))
            .await
    }
}
