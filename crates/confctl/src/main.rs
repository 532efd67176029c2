//! confctl - inspect, split and convert configuration sources

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ConfigLoader, LoggingConfig};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "confctl")]
#[command(about = "Inspect, interpolate and convert configuration sources")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the tool settings (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base path or URL that relative sources are resolved against
    #[arg(short, long, global = true)]
    base: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the values of a key
    Get {
        /// `env`, a YAML file or a properties file/URL
        source: String,
        key: String,
    },

    /// Print every key of a source
    List {
        /// `env`, a YAML file or a properties file/URL
        source: String,
    },

    /// Split a delimited value into its elements
    Split {
        value: String,
        /// List delimiter (defaults to the configured one)
        #[arg(short, long)]
        delimiter: Option<char>,
        /// Keep whitespace around elements
        #[arg(long)]
        no_trim: bool,
    },

    /// Escape a value so it is kept whole by the splitter
    Escape {
        value: String,
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Resolve `${...}` placeholders against one or more sources
    Interpolate {
        template: String,
        /// Sources consulted in order; the first defining a key wins
        #[arg(short, long = "source", default_value = "env")]
        sources: Vec<String>,
    },

    /// Write a source to a properties file or URL
    Copy { source: String, target: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cli = Cli::parse();

    let settings = ConfigLoader::load_tool_config(cli.config.as_deref())
        .context("Failed to load confctl settings")?;

    init_logging(&settings.logging)?;

    if dotenv_loaded {
        info!("Loaded environment variables from .env file");
    }
    debug!(command = ?cli.command, "Running command");

    commands::run(cli.command, &settings, cli.base.as_deref()).await
}

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!(level = %logging.level, format = %logging.format, "Logging initialized");
    Ok(())
}
