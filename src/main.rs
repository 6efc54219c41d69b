use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use devops_control::api::audit::AuditLogQuery;
use devops_control::{utils, ApiClient, ClientConfig, Credentials};

#[derive(Parser)]
#[command(name = "devopsctl", version, about = "DevOps Control Platform client")]
struct AppCli {
    /// Config file path (JSON); environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the token pair
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "DEVOPS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List Kubernetes clusters
    Clusters,
    /// Refresh cluster metrics from its API server
    SyncCluster { id: String },
    /// List cluster nodes
    Nodes { cluster: String },
    /// List cluster pods
    Pods { cluster: String },
    /// List machines
    Machines,
    /// Check SSH connectivity to a machine
    TestConnection { id: String },
    /// List Ansible playbooks
    Playbooks,
    /// Run a playbook against hosts
    RunPlaybook {
        id: String,
        /// Comma separated target hosts
        #[arg(long, value_delimiter = ',')]
        hosts: Vec<String>,
    },
    /// List playbook executions
    Executions,
    /// List Terraform workspaces
    Workspaces,
    /// Start a Terraform plan
    Plan { id: String },
    /// Start a Terraform apply
    Apply { id: String },
    /// List runs of a workspace
    Runs { workspace: String },
    /// Query audit logs
    Audit {
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        resource_type: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
}

fn load_config(args: &AppCli) -> Result<ClientConfig> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(url) = &args.api_url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: &ApiClient, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let user = client
                .login(&Credentials::new(email, password))
                .await
                .context("login failed")?;
            info!("signed in as {}", user.display_name());
            print_json(&user)?;
        }
        Commands::Logout => {
            client.logout().await;
            info!("signed out");
        }
        Commands::Whoami => {
            if !client.session().state().await.is_authenticated() {
                bail!("not signed in; run `devopsctl login` first");
            }
            print_json(&client.get_current_user().await?)?;
        }
        Commands::Clusters => print_json(&client.get_clusters().await?)?,
        Commands::SyncCluster { id } => print_json(&client.sync_cluster(&id).await?)?,
        Commands::Nodes { cluster } => print_json(&client.get_nodes(&cluster).await?)?,
        Commands::Pods { cluster } => print_json(&client.get_pods(&cluster).await?)?,
        Commands::Machines => print_json(&client.get_machines().await?)?,
        Commands::TestConnection { id } => print_json(&client.test_connection(&id).await?)?,
        Commands::Playbooks => print_json(&client.get_playbooks().await?)?,
        Commands::RunPlaybook { id, hosts } => {
            let execution = client
                .run_playbook(&id, &json!({ "target_hosts": hosts }))
                .await?;
            print_json(&execution)?;
        }
        Commands::Executions => print_json(&client.get_executions().await?)?,
        Commands::Workspaces => print_json(&client.get_workspaces().await?)?,
        Commands::Plan { id } => print_json(&client.plan_workspace(&id).await?)?,
        Commands::Apply { id } => print_json(&client.apply_workspace(&id).await?)?,
        Commands::Runs { workspace } => print_json(&client.get_runs(&workspace).await?)?,
        Commands::Audit {
            action,
            resource_type,
            search,
            page,
        } => {
            let query = AuditLogQuery {
                action,
                resource_type,
                search,
                page,
                ..AuditLogQuery::default()
            };
            print_json(&client.get_audit_logs(Some(&query)).await?)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AppCli::parse();
    utils::logging::init(if args.verbose { "debug" } else { "info" });

    let config = load_config(&args)?;
    let client = ApiClient::from_config(&config).context("building API client")?;
    client.restore_session().await;

    run(&client, args.command).await
}
