//! Read models for platform resources.
//!
//! Only ids are required; everything else tolerates absent or null fields so
//! backend additions never break decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Resource primary key. The backend emits integers; older views use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{id}"),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

/// List payload: a bare array, or a page envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Page {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Page { results, .. } => results,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Operator,
    Viewer,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Operator)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: ResourceId,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    #[serde(default)]
    pub force_password_change: bool,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Stored secret metadata; the value itself is write-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: ResourceId,
    pub name: Option<String>,
    pub credential_type: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct NewCredential {
    pub name: String,
    /// `ssh_key`, `password` or `api_token`
    pub credential_type: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("name", &self.name)
            .field("credential_type", &self.credential_type)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

// Kubernetes

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub provider: Option<String>,
    pub region: Option<String>,
    pub api_server_url: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
    pub node_count: Option<i64>,
    pub pod_count: Option<i64>,
    pub namespace_count: Option<i64>,
    pub kubernetes_dashboard_url: Option<String>,
    pub kiali_dashboard_url: Option<String>,
    pub argocd_dashboard_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub last_synced: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub status: Option<String>,
    pub metrics: Option<Value>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
    pub status: Option<String>,
    pub role: Option<String>,
    pub version: Option<String>,
    pub os: Option<String>,
    pub cpu_capacity: Option<String>,
    pub memory_capacity: Option<String>,
    pub cpu_usage: Option<f64>,
    pub memory_usage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
    pub namespace: Option<String>,
    pub status: Option<String>,
    pub node: Option<String>,
    pub ip: Option<String>,
    pub cpu_usage: Option<String>,
    pub memory_usage: Option<String>,
    pub restarts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Option<ResourceId>,
    #[serde(default)]
    pub name: String,
    pub namespace: Option<String>,
    pub replicas: Option<i64>,
    pub ready_replicas: Option<i64>,
    pub available_replicas: Option<i64>,
    pub image: Option<String>,
}

// Machines

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub os_type: Option<String>,
    pub status: Option<String>,
    pub ssh_username: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub application_name: Option<String>,
    pub environment: Option<String>,
    pub last_checked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTest {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl ConnectionTest {
    pub fn succeeded(&self) -> bool {
        matches!(self.status.as_deref(), Some("success") | Some("connected"))
    }
}

// Dashboards

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub requires_token: bool,
    #[serde(default)]
    pub requires_username_password: bool,
    #[serde(default)]
    pub requires_api_key: bool,
    pub default_port: Option<u16>,
    pub default_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub id: ResourceId,
    pub dashboard: Option<Value>,
    pub cluster: Option<Value>,
    pub url: Option<String>,
    pub status: Option<String>,
    pub custom_config: Option<Value>,
    pub auto_login_enabled: Option<bool>,
    pub created_at: Option<String>,
    pub last_accessed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginUrl {
    #[serde(alias = "login_url")]
    pub url: Option<String>,
    pub token: Option<String>,
    pub expires_in: Option<u64>,
}

// Automation

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub playbook_content: Option<String>,
    pub inventory_content: Option<String>,
    pub variables: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timeout: Option<u64>,
    #[serde(rename = "become")]
    pub become_root: Option<bool>,
    pub check_mode: Option<bool>,
    pub last_executed: Option<String>,
    pub execution_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ResourceId,
    pub playbook: Option<Value>,
    pub status: Option<String>,
    #[serde(default)]
    pub target_hosts: Vec<String>,
    pub variables: Option<Value>,
    pub output: Option<String>,
    pub error_output: Option<String>,
    pub return_code: Option<i32>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub duration: Option<i64>,
}

/// `PENDING` / `RUNNING` are the only non-terminal run states.
fn is_terminal(status: Option<&str>) -> bool {
    matches!(status, Some("SUCCESS") | Some("FAILED") | Some("CANCELLED"))
}

impl Execution {
    pub fn is_finished(&self) -> bool {
        is_terminal(self.status.as_deref())
    }
}

// Terraform

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub environment: Option<String>,
    pub provider: Option<String>,
    pub terraform_version: Option<String>,
    pub working_directory: Option<String>,
    pub variables: Option<Value>,
    pub state_backend: Option<String>,
    pub last_plan_status: Option<String>,
    pub last_apply_status: Option<String>,
    pub resource_count: Option<i64>,
    pub last_run_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformRun {
    pub id: ResourceId,
    pub workspace: Option<Value>,
    pub run_type: Option<String>,
    pub status: Option<String>,
    pub output: Option<String>,
    pub error_output: Option<String>,
    pub plan_output: Option<String>,
    pub return_code: Option<i32>,
    pub resources_to_add: Option<i64>,
    pub resources_to_change: Option<i64>,
    pub resources_to_destroy: Option<i64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub duration: Option<i64>,
}

impl TerraformRun {
    pub fn is_finished(&self) -> bool {
        is_terminal(self.status.as_deref())
    }
}

// Audit

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: ResourceId,
    pub user: Option<Value>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub response_status: Option<u16>,
    pub timestamp: Option<String>,
}
