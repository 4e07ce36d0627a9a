use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use esrole_client::{ClientConfig, ClusterClient};
use esrole_model::{ROLE_ATTRIBUTES, RoleConfig};
use esrole_provider::{DeletePolicy, ResourceData, RoleResource, TracingDiagnostics};

/// Manage an Elasticsearch security role from a declarative JSON file.
///
/// The cluster is configured through ELASTICSEARCH_URL, ELASTICSEARCH_USERNAME,
/// ELASTICSEARCH_PASSWORD, ELASTICSEARCH_VERSION, ELASTICSEARCH_TIMEOUT_SECS
/// and ELASTICSEARCH_MAX_RETRIES.
#[derive(Debug, Parser)]
#[command(name = "esrole", version)]
struct Cli {
    /// State file tracking the role's identity and last known fields.
    #[arg(long, global = true, env = "ESROLE_STATE", default_value = "esrole.state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh from the cluster and show what `apply` would change.
    Plan(ConfigArgs),
    /// Create, update or replace the role to match the configuration.
    Apply {
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        delete: DeleteArgs,
    },
    /// Refresh the state file from the cluster.
    Read,
    /// Delete the role.
    Destroy(DeleteArgs),
    /// Print the resource schema.
    Schema,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Role configuration (JSON).
    #[arg(long, short)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Fail instead of dropping the role from state when deletion fails.
    #[arg(long)]
    strict_delete: bool,
}

impl DeleteArgs {
    fn policy(&self) -> DeletePolicy {
        if self.strict_delete {
            DeletePolicy::Strict
        } else {
            DeletePolicy::BestEffort
        }
    }
}

fn main() -> Result<()> {
    esrole_observability::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Schema => print_json(&ROLE_ATTRIBUTES),
        Command::Plan(args) => {
            let proposed = load_config(&args.config)?;
            let mut state = load_state(&cli.state)?;
            let client = connect()?;
            let sink = TracingDiagnostics;
            let plan = RoleResource::new(&client, &sink)
                .plan(&mut state, &proposed)
                .context("plan failed")?;
            print_json(&plan)
        }
        Command::Apply { config, delete } => {
            let proposed = load_config(&config.config)?;
            let mut state = load_state(&cli.state)?;
            let client = connect()?;
            let sink = TracingDiagnostics;
            let resource = RoleResource::new(&client, &sink).with_delete_policy(delete.policy());

            let outcome = resource.apply(&mut state, proposed);
            save_state(&cli.state, &state)?;
            let plan = outcome.context("apply failed")?;
            tracing::info!(role = state.id(), "apply complete");
            print_json(&plan)
        }
        Command::Read => {
            let mut state = load_state(&cli.state)?;
            let client = connect()?;
            let sink = TracingDiagnostics;
            RoleResource::new(&client, &sink)
                .read(&mut state)
                .context("read failed")?;
            save_state(&cli.state, &state)?;
            print_json(&state)
        }
        Command::Destroy(delete) => {
            let mut state = load_state(&cli.state)?;
            let client = connect()?;
            let sink = TracingDiagnostics;
            let outcome = RoleResource::new(&client, &sink)
                .with_delete_policy(delete.policy())
                .delete(&mut state);
            save_state(&cli.state, &state)?;
            outcome.context("destroy failed")?;
            print_json(&state)
        }
    }
}

fn connect() -> Result<ClusterClient> {
    let config = ClientConfig::from_env().context("loading client configuration")?;
    let client = ClusterClient::connect(&config)
        .with_context(|| format!("connecting to {}", config.url))?;
    tracing::info!(url = %config.url, version = ?client.api_version(), "connected");
    Ok(client)
}

fn load_config(path: &Path) -> Result<RoleConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading role configuration {}", path.display()))?;
    let config: RoleConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing role configuration {}", path.display()))?;
    Ok(config.with_defaults())
}

/// A missing state file means the role has never been created.
fn load_state(path: &Path) -> Result<ResourceData> {
    if !path.exists() {
        return Ok(ResourceData::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading state {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing state {}", path.display()))
}

fn save_state(path: &Path, state: &ResourceData) -> Result<()> {
    let text = serde_json::to_string_pretty(state)?;
    fs::write(path, text).with_context(|| format!("writing state {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
