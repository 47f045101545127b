mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod event;
mod infra;
mod services;
mod telemetry;
mod workflow;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use tracing::Level;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::handle::{self, HandleCommandArgs};
use crate::config::PluginConfig;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::file_cache::RepoFileCacheClient;
use crate::infra::gitee::{DEFAULT_ENDPOINT, GiteeClient};

#[derive(Parser)]
#[command(
    name = "sig-welcome",
    author,
    version,
    about = "Welcomes issue and pull request authors on behalf of their SIG"
)]
struct Cli {
    /// Plugin configuration file.
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one webhook delivery.
    Handle(HandleArgs),
    /// Inspect the plugin configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct HandleArgs {
    /// Value of the `X-Gitee-Event` header.
    #[arg(long)]
    event_type: String,

    /// Payload file, or `-` for stdin.
    #[arg(long, default_value = "-")]
    payload: String,

    /// File holding the Gitee access token.
    #[arg(long)]
    gitee_token_path: Option<PathBuf>,

    #[arg(long, env = "GITEE_TOKEN", hide_env_values = true)]
    gitee_token: Option<String>,

    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    gitee_endpoint: String,

    /// Endpoint of the repo file cache.
    #[arg(long, env = "CACHE_ENDPOINT")]
    cache_endpoint: String,

    /// Retries of a failed file cache call.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json, Level::INFO);

    if let Err(error) = run(cli).await {
        tracing::error!(%error, "sig-welcome failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    match cli.command {
        Commands::Config(args) => config_cmd::run(&cli.config, args.command),
        Commands::Handle(args) => run_handle(&cli.config, args).await,
    }
}

async fn run_handle(config_path: &Path, args: HandleArgs) -> AppResult<()> {
    let config = PluginConfig::load(config_path)?;

    Url::parse(&args.cache_endpoint).map_err(|err| {
        AppError::Configuration(format!("invalid cache endpoint {}: {err}", args.cache_endpoint))
    })?;
    let token = read_token(args.gitee_token_path.as_deref(), args.gitee_token)?;
    let payload = read_payload(&args.payload)?;

    let forge = Arc::new(GiteeClient::new(args.gitee_endpoint, token));
    let file_cache = Arc::new(RepoFileCacheClient::new(
        args.cache_endpoint,
        args.max_retries,
    ));
    let context = AppContext::new(forge, file_cache);

    handle::run(
        &context,
        &config,
        HandleCommandArgs {
            event_type: args.event_type,
            payload,
        },
    )
    .await
}

fn read_token(path: Option<&Path>, inline: Option<String>) -> AppResult<String> {
    let token = match path {
        Some(path) => fs::read_to_string(path)?.trim().to_string(),
        None => inline.unwrap_or_default(),
    };
    if token.is_empty() {
        return Err(AppError::Configuration(
            "Gitee access token not configured".to_string(),
        ));
    }
    Ok(token)
}

fn read_payload(source: &str) -> AppResult<Vec<u8>> {
    if source == "-" {
        let mut payload = Vec::new();
        io::stdin().read_to_end(&mut payload)?;
        Ok(payload)
    } else {
        Ok(fs::read(source)?)
    }
}
