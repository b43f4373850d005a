use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use modkit::{HttpTransport, TracedClient};
use runtime::{AppConfig, CliArgs};
use share_links::client::ShareLinksApi;
use share_links::model::ShareLinkType;
use share_links::ShareLinkClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// share-links - create, resolve and list schedule share links
#[derive(Parser)]
#[command(name = "share-links")]
#[command(about = "share-links - create, resolve and list schedule share links")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, e.g. https://scheduler.example.com/api (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token for the API (overrides config)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new share link for a schedule
    Generate {
        /// Schedule to share
        schedule_id: String,
        /// Workflow the link is for: recommendation or approval
        #[arg(short = 't', long = "type")]
        link_type: ShareLinkType,
    },
    /// Resolve a share link token to its schedule
    Access {
        /// Token taken from the share URL
        #[arg(value_name = "TOKEN")]
        share_token: String,
    },
    /// List the share links of a schedule
    List {
        /// Schedule whose links to list
        schedule_id: String,
    },
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        base_url: cli.base_url.clone(),
        token: cli.token.clone(),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration: defaults → YAML → SHARE_LINKS__* env
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (base URL / token / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.clone().unwrap_or_default();
    let log_dir = log_base_dir(cli.config.as_deref());
    runtime::logging::init_logging_from_config(&logging_config, &log_dir);
    tracing::debug!(base_url = %config.api.base_url, "share-links starting");

    // Print config and exit if requested
    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Check) => check_config(&config),
        Some(command) => run_command(&config, command).await,
        None => bail!("No command given; run with --help to see the available commands"),
    }
}

/// Relative log file paths resolve against the config file's directory.
fn log_base_dir(config_path: Option<&Path>) -> PathBuf {
    config_path
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn build_client(config: &AppConfig) -> Result<Arc<dyn ShareLinksApi>> {
    let base_url = config.api_base_url()?;
    let traced = TracedClient::with_timeouts(config.api.timeout, config.api.connect_timeout)
        .context("Failed to build HTTP client")?;

    let mut transport = HttpTransport::new(traced, base_url)?;
    if let Some(token) = config.api.token.as_deref().filter(|t| !t.is_empty()) {
        transport = transport.with_bearer_token(token);
    }

    Ok(Arc::new(ShareLinkClient::new(Arc::new(transport))))
}

async fn run_command(config: &AppConfig, command: Commands) -> Result<()> {
    let client = build_client(config)?;

    let output = match command {
        Commands::Generate {
            schedule_id,
            link_type,
        } => {
            let created = client
                .generate_share_link(&schedule_id, link_type)
                .await
                .with_context(|| {
                    format!("Failed to generate {link_type} link for schedule '{schedule_id}'")
                })?;
            serde_json::to_value(created)?
        }
        Commands::Access { share_token } => {
            let resolved = client
                .access_share_link(&share_token)
                .await
                .context("Failed to resolve share link")?;
            serde_json::to_value(resolved)?
        }
        Commands::List { schedule_id } => {
            let links = client
                .get_share_links(&schedule_id)
                .await
                .with_context(|| {
                    format!("Failed to list share links for schedule '{schedule_id}'")
                })?;
            serde_json::to_value(links)?
        }
        Commands::Check => return check_config(config),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let base_url = config.api_base_url()?;
    tracing::info!(%base_url, "Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
