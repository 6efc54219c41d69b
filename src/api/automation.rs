use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

use crate::api::models::{Execution, Playbook};
use crate::client::{ApiClient, ClientError};

const PLAYBOOKS: &str = "/automation/playbooks/";
const EXECUTIONS: &str = "/automation/executions/";

fn playbook_path(id: impl Display) -> String {
    format!("{PLAYBOOKS}{id}/")
}

fn execution_path(id: impl Display) -> String {
    format!("{EXECUTIONS}{id}/")
}

impl ApiClient {
    pub async fn get_playbooks(&self) -> Result<Vec<Playbook>, ClientError> {
        self.get_list(PLAYBOOKS).await
    }

    pub async fn create_playbook(&self, data: &impl Serialize) -> Result<Playbook, ClientError> {
        self.post_json(PLAYBOOKS, data).await
    }

    pub async fn update_playbook(
        &self,
        id: impl Display,
        data: &impl Serialize,
    ) -> Result<Playbook, ClientError> {
        self.patch_json(&playbook_path(id), data).await
    }

    pub async fn delete_playbook(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&playbook_path(id)).await
    }

    /// Queue a run; `data` usually carries `target_hosts` and `variables`.
    pub async fn run_playbook(
        &self,
        id: impl Display,
        data: &impl Serialize,
    ) -> Result<Execution, ClientError> {
        self.post_json(&format!("{}run/", playbook_path(id)), data)
            .await
    }

    pub async fn get_executions(&self) -> Result<Vec<Execution>, ClientError> {
        self.get_list(EXECUTIONS).await
    }

    pub async fn get_execution(&self, id: impl Display) -> Result<Execution, ClientError> {
        self.get_one(&execution_path(id)).await
    }

    /// Completed executions are rejected with a 400.
    pub async fn cancel_execution(&self, id: impl Display) -> Result<Value, ClientError> {
        self.post_action(&format!("{}cancel/", execution_path(id)))
            .await
    }
}
