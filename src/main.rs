use std::path::PathBuf;

use anyhow::{Context, Result};
use campus_gate::AppContext;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{cmd_check, cmd_routes, cmd_serve, cmd_settings, CheckArgs, OutputFormat, ServeArgs};

/// Campus Gate - role-based route gate and action guards
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file path (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo application behind the route gate
    Serve(ServeArgs),

    /// Evaluate the route gate for one path without serving
    Check(CheckArgs),

    /// Print the effective route table
    Routes,

    /// Print the effective settings and where each value came from
    Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_json)?;

    let settings = campus_gate_settings::load_settings(cli.config.as_deref())
        .context("failed to load settings")?;
    let ctx = AppContext::build(settings).context("failed to build application context")?;

    let result = match cli.command {
        Commands::Serve(args) => {
            info!("Starting campus-gate v{}", env!("CARGO_PKG_VERSION"));
            cmd_serve(args, &ctx).await
        }
        Commands::Check(args) => cmd_check(args, &ctx, cli.output).await,
        Commands::Routes => cmd_routes(&ctx, cli.output).await,
        Commands::Settings => cmd_settings(&ctx, cli.output).await,
    };

    if let Err(err) = result {
        error!("Command failed: {:#}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
