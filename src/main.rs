use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wafagent::config::{load_or_default, resolve_config_path};

#[derive(Parser)]
#[command(name = "wafagent")]
#[command(about = "Web application firewall host agent", version, long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the query API (default)
    Run,
    /// Harvest new audit log lines once and print them
    Collect {
        #[arg(long)]
        json: bool,
    },
    /// Manage the custom rules file
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    List,
    /// Append rule text from a file, or stdin
    Add {
        file: Option<PathBuf>,
    },
    Remove {
        id: String,
    },
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config.as_deref());

    // Config commands run before logging is set up and without loading the config.
    let command = match cli.command {
        Some(Commands::Config { action }) => {
            return match action {
                ConfigAction::Init { stdout } => wafagent::cli::config::init(stdout),
                ConfigAction::Validate => wafagent::cli::config::validate(config_path),
            };
        }
        command => command,
    };

    let config = load_or_default(config_path.as_deref())?;

    let default_filter = if config.debug { "wafagent=debug" } else { "wafagent=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &config_path {
        Some(path) if path.exists() => {
            tracing::info!(path = %path.display(), "Loaded configuration")
        }
        Some(path) => {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults")
        }
        None => tracing::info!("No config file found, using defaults"),
    }
    tracing::debug!("Debug logging enabled");

    match command {
        Some(Commands::Run) | None => wafagent::cli::run::run(config).await?,
        Some(Commands::Collect { json }) => wafagent::cli::collect::collect(&config, json)?,
        Some(Commands::Rules { action }) => match action {
            RulesAction::List => wafagent::cli::rules::list(&config)?,
            RulesAction::Add { file } => wafagent::cli::rules::add(&config, file.as_deref())?,
            RulesAction::Remove { id } => wafagent::cli::rules::remove(&config, &id)?,
            RulesAction::Clear => wafagent::cli::rules::clear(&config)?,
        },
        Some(Commands::Config { .. }) => {}
    }

    Ok(())
}
