use devops_control::api::audit::AuditLogQuery;
use devops_control::api::models::{NewCredential, PasswordChange, ResourceId};
use devops_control::security::{MemoryTokenStore, StoredTokens};
use devops_control::{ApiClient, ClientConfig, ClientError};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

async fn signed_in(server: &ServerGuard) -> ApiClient {
    let store = Arc::new(MemoryTokenStore::with_tokens(StoredTokens {
        access: Some("A1".to_string()),
        refresh: Some("R1".to_string()),
    }));
    let client = ApiClient::new(&ClientConfig::new(server.url()), store).unwrap();
    client.restore_session().await;
    client
}

#[tokio::test]
async fn cluster_lifecycle_paths() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let create = server
        .mock("POST", "/kubernetes/clusters/")
        .match_header("authorization", "Bearer A1")
        .match_body(Matcher::Json(json!({"name": "prod-eks", "provider": "aws"})))
        .with_status(201)
        .with_body(r#"{"id": 9, "name": "prod-eks", "provider": "aws", "status": "offline"}"#)
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/kubernetes/clusters/9/")
        .match_body(Matcher::Json(json!({"region": "eu-west-1"})))
        .with_status(200)
        .with_body(r#"{"id": 9, "name": "prod-eks", "region": "eu-west-1"}"#)
        .create_async()
        .await;
    let sync = server
        .mock("POST", "/kubernetes/clusters/9/sync/")
        .with_status(200)
        .with_body(r#"{"status": "synced", "version": "v1.29.2", "metrics": {"nodes": 3}}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/kubernetes/clusters/9/")
        .with_status(204)
        .create_async()
        .await;

    let cluster = client
        .create_cluster(&json!({"name": "prod-eks", "provider": "aws"}))
        .await
        .unwrap();
    assert_eq!(cluster.id, ResourceId::Int(9));

    let updated = client
        .update_cluster(&cluster.id, &json!({"region": "eu-west-1"}))
        .await
        .unwrap();
    assert_eq!(updated.region.as_deref(), Some("eu-west-1"));

    let synced = client.sync_cluster(&cluster.id).await.unwrap();
    assert_eq!(synced.version.as_deref(), Some("v1.29.2"));

    client.delete_cluster(&cluster.id).await.unwrap();

    create.assert_async().await;
    update.assert_async().await;
    sync.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn cluster_children_accept_paginated_lists() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let nodes = server
        .mock("GET", "/kubernetes/clusters/c-1/nodes/")
        .with_status(200)
        .with_body(
            r#"{"count": 1, "next": null, "previous": null,
                "results": [{"name": "node-a", "status": "Ready", "cpu_usage": 41.5}]}"#,
        )
        .create_async()
        .await;
    let pods = server
        .mock("GET", "/kubernetes/clusters/c-1/pods/")
        .with_status(200)
        .with_body(r#"[{"name": "api-7d9", "namespace": "default", "restarts": 2}]"#)
        .create_async()
        .await;
    let deployments = server
        .mock("GET", "/kubernetes/clusters/c-1/deployments/")
        .with_status(200)
        .with_body(r#"[{"name": "api", "replicas": 3, "ready_replicas": 2}]"#)
        .create_async()
        .await;

    let node_list = client.get_nodes("c-1").await.unwrap();
    assert_eq!(node_list[0].cpu_usage, Some(41.5));
    assert_eq!(client.get_pods("c-1").await.unwrap()[0].restarts, Some(2));
    assert_eq!(
        client.get_deployments("c-1").await.unwrap()[0].ready_replicas,
        Some(2)
    );

    nodes.assert_async().await;
    pods.assert_async().await;
    deployments.assert_async().await;
}

#[tokio::test]
async fn machine_connection_failure_carries_backend_message() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;
    let _mock = server
        .mock("POST", "/machines/machines/4/test_connection/")
        .with_status(503)
        .with_body(r#"{"status": "failed", "message": "Cannot reach 10.0.0.4:22"}"#)
        .create_async()
        .await;

    let err = client.test_connection(4).await.unwrap_err();
    match err {
        ClientError::Request { status, message } => {
            assert_eq!(status, Some(503));
            assert_eq!(message, "Cannot reach 10.0.0.4:22");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn machine_crud_paths() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let get = server
        .mock("GET", "/machines/machines/4/")
        .with_status(200)
        .with_body(r#"{"id": 4, "name": "web-01", "port": 22, "tags": ["web"]}"#)
        .create_async()
        .await;
    let update = server
        .mock("PATCH", "/machines/machines/4/")
        .match_body(Matcher::Json(json!({"port": 2222})))
        .with_status(200)
        .with_body(r#"{"id": 4, "name": "web-01", "port": 2222}"#)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/machines/machines/4/")
        .with_status(204)
        .create_async()
        .await;

    let machine = client.get_machine(4).await.unwrap();
    assert_eq!(machine.tags, vec!["web".to_string()]);
    assert_eq!(
        client
            .update_machine(4, &json!({"port": 2222}))
            .await
            .unwrap()
            .port,
        Some(2222)
    );
    client.delete_machine(4).await.unwrap();

    get.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn integration_login_url() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;
    let mock = server
        .mock("GET", "/dashboards/integrations/12/get_login_url/")
        .with_status(200)
        .with_body(r#"{"login_url": "https://grafana.internal/login?token=abc"}"#)
        .create_async()
        .await;

    let login = client.get_login_url(12).await.unwrap();
    assert_eq!(
        login.url.as_deref(),
        Some("https://grafana.internal/login?token=abc")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn playbook_run_and_cancel() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let run = server
        .mock("POST", "/automation/playbooks/3/run/")
        .match_body(Matcher::Json(json!({"target_hosts": ["10.0.0.4", "10.0.0.5"]})))
        .with_status(200)
        .with_body(r#"{"id": 77, "status": "PENDING", "target_hosts": ["10.0.0.4", "10.0.0.5"]}"#)
        .create_async()
        .await;
    let cancel = server
        .mock("POST", "/automation/executions/77/cancel/")
        .with_status(200)
        .with_body(r#"{"status": "cancelled"}"#)
        .create_async()
        .await;

    let execution = client
        .run_playbook(3, &json!({"target_hosts": ["10.0.0.4", "10.0.0.5"]}))
        .await
        .unwrap();
    assert!(!execution.is_finished());
    assert_eq!(execution.target_hosts.len(), 2);

    let reply = client.cancel_execution(&execution.id).await.unwrap();
    assert_eq!(reply["status"], "cancelled");

    run.assert_async().await;
    cancel.assert_async().await;
}

#[tokio::test]
async fn workspace_plan_apply_destroy() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let mut mocks = Vec::new();
    for (action, run_type) in [
        ("plan", "PLAN"),
        ("apply", "APPLY"),
        ("destroy_infrastructure", "DESTROY"),
    ] {
        mocks.push(
            server
                .mock("POST", format!("/terraform/workspaces/5/{action}/").as_str())
                .with_status(200)
                .with_body(json!({"id": 1, "run_type": run_type, "status": "PENDING"}).to_string())
                .create_async()
                .await,
        );
    }
    let runs = server
        .mock("GET", "/terraform/workspaces/5/runs/")
        .with_status(200)
        .with_body(r#"[{"id": 1, "run_type": "PLAN", "status": "SUCCESS", "resources_to_add": 3}]"#)
        .create_async()
        .await;

    assert_eq!(client.plan_workspace(5).await.unwrap().run_type.as_deref(), Some("PLAN"));
    assert_eq!(client.apply_workspace(5).await.unwrap().run_type.as_deref(), Some("APPLY"));
    assert_eq!(
        client.destroy_workspace(5).await.unwrap().run_type.as_deref(),
        Some("DESTROY")
    );
    let history = client.get_runs(5).await.unwrap();
    assert!(history[0].is_finished());
    assert_eq!(history[0].resources_to_add, Some(3));

    for mock in mocks {
        mock.assert_async().await;
    }
    runs.assert_async().await;
}

#[tokio::test]
async fn audit_logs_with_and_without_filters() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let filtered = server
        .mock("GET", "/audit/logs/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("action".into(), "login".into()),
            Matcher::UrlEncoded("search".into(), "prod cluster".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"count": 1, "results": [{"id": 1, "action": "login", "response_status": 200}]}"#)
        .create_async()
        .await;

    let query = AuditLogQuery {
        action: Some("login".to_string()),
        search: Some("prod cluster".to_string()),
        ..AuditLogQuery::default()
    };
    let logs = client.get_audit_logs(Some(&query)).await.unwrap();
    assert_eq!(logs[0].response_status, Some(200));
    filtered.assert_async().await;

    let unfiltered = server
        .mock("GET", "/audit/logs/")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    assert!(client.get_audit_logs(None).await.unwrap().is_empty());
    unfiltered.assert_async().await;
}

#[tokio::test]
async fn credentials_and_password_change() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;

    let create = server
        .mock("POST", "/users/credentials/")
        .match_body(Matcher::Json(json!({
            "name": "deploy-key",
            "credential_type": "ssh_key",
            "value": "-----BEGIN KEY-----"
        })))
        .with_status(201)
        .with_body(r#"{"id": 2, "name": "deploy-key", "credential_type": "ssh_key"}"#)
        .create_async()
        .await;
    let change = server
        .mock("POST", "/users/users/change_password/")
        .with_status(400)
        .with_body(r#"{"old_password": "Wrong password."}"#)
        .create_async()
        .await;

    let credential = client
        .create_credential(&NewCredential {
            name: "deploy-key".to_string(),
            credential_type: "ssh_key".to_string(),
            value: "-----BEGIN KEY-----".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(credential.id, ResourceId::Int(2));

    let err = client
        .change_password(&PasswordChange {
            old_password: "nope".to_string(),
            new_password: "n3w-Passw0rd".to_string(),
            new_password_confirm: "n3w-Passw0rd".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "request failed with status 400: Request failed");

    create.assert_async().await;
    change.assert_async().await;
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let client = signed_in(&server).await;
    let _mock = server
        .mock("GET", "/terraform/workspaces/")
        .with_status(200)
        .with_body(r#"{"unexpected": "shape"}"#)
        .create_async()
        .await;

    let err = client.get_workspaces().await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { status: 200, .. }));
}
