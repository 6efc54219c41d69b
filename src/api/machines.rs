use serde::Serialize;
use std::fmt::Display;

use crate::api::models::{ConnectionTest, Machine};
use crate::client::{ApiClient, ClientError};

const MACHINES: &str = "/machines/machines/";

fn machine_path(id: impl Display) -> String {
    format!("{MACHINES}{id}/")
}

impl ApiClient {
    pub async fn get_machines(&self) -> Result<Vec<Machine>, ClientError> {
        self.get_list(MACHINES).await
    }

    pub async fn get_machine(&self, id: impl Display) -> Result<Machine, ClientError> {
        self.get_one(&machine_path(id)).await
    }

    pub async fn create_machine(&self, data: &impl Serialize) -> Result<Machine, ClientError> {
        self.post_json(MACHINES, data).await
    }

    pub async fn update_machine(
        &self,
        id: impl Display,
        data: &impl Serialize,
    ) -> Result<Machine, ClientError> {
        self.patch_json(&machine_path(id), data).await
    }

    pub async fn delete_machine(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&machine_path(id)).await
    }

    /// SSH reachability check. An unreachable host comes back as a 503
    /// `RequestError` carrying the backend's message.
    pub async fn test_connection(&self, id: impl Display) -> Result<ConnectionTest, ClientError> {
        self.post_action(&format!("{}test_connection/", machine_path(id)))
            .await
    }
}
