use serde::Serialize;
use std::fmt::Display;

use crate::api::models::{Cluster, Deployment, Node, Pod, SyncResult};
use crate::client::{ApiClient, ClientError};

const CLUSTERS: &str = "/kubernetes/clusters/";

fn cluster_path(id: impl Display) -> String {
    format!("{CLUSTERS}{id}/")
}

impl ApiClient {
    pub async fn get_clusters(&self) -> Result<Vec<Cluster>, ClientError> {
        self.get_list(CLUSTERS).await
    }

    pub async fn get_cluster(&self, id: impl Display) -> Result<Cluster, ClientError> {
        self.get_one(&cluster_path(id)).await
    }

    pub async fn create_cluster(&self, data: &impl Serialize) -> Result<Cluster, ClientError> {
        self.post_json(CLUSTERS, data).await
    }

    pub async fn update_cluster(
        &self,
        id: impl Display,
        data: &impl Serialize,
    ) -> Result<Cluster, ClientError> {
        self.patch_json(&cluster_path(id), data).await
    }

    pub async fn delete_cluster(&self, id: impl Display) -> Result<(), ClientError> {
        self.delete_resource(&cluster_path(id)).await
    }

    /// Ask the backend to pull fresh metrics from the cluster API server.
    pub async fn sync_cluster(&self, id: impl Display) -> Result<SyncResult, ClientError> {
        self.post_action(&format!("{}sync/", cluster_path(id))).await
    }

    pub async fn get_nodes(&self, cluster_id: impl Display) -> Result<Vec<Node>, ClientError> {
        self.get_list(&format!("{}nodes/", cluster_path(cluster_id)))
            .await
    }

    pub async fn get_pods(&self, cluster_id: impl Display) -> Result<Vec<Pod>, ClientError> {
        self.get_list(&format!("{}pods/", cluster_path(cluster_id)))
            .await
    }

    pub async fn get_deployments(
        &self,
        cluster_id: impl Display,
    ) -> Result<Vec<Deployment>, ClientError> {
        self.get_list(&format!("{}deployments/", cluster_path(cluster_id)))
            .await
    }
}
