//! idebox - IDE container manager CLI

mod commands;

use clap::{Parser, Subcommand};
use idebox_config::{GlobalConfig, RuntimeConfig, DEFAULT_WEB_PORT};
use idebox_core::{IdeManager, ROOT_SNAPSHOT};
use idebox_provider::{create_default_provider, create_provider, ProviderType};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "idebox")]
#[command(author, version, about = "IDE container manager", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override default provider (docker or podman)
    #[arg(long, global = true, value_parser = ["docker", "podman"])]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the base image for an IDE type
    Build {
        /// IDE type name
        ide: String,
    },

    /// Start an IDE container on a snapshot
    Start {
        /// IDE type name
        ide: String,
        /// Snapshot to start on
        #[arg(default_value = ROOT_SNAPSHOT)]
        snapshot: String,
        /// Host port for the web (noVNC) endpoint
        #[arg(long, default_value_t = DEFAULT_WEB_PORT)]
        web_port: u16,
        /// Host port for the raw VNC endpoint
        #[arg(long)]
        vnc_port: Option<u16>,
        /// Password for the web endpoint
        #[arg(long)]
        web_password: Option<String>,
        /// Password for the VNC endpoint
        #[arg(long)]
        vnc_password: Option<String>,
        /// Extra bind mounts, comma-separated host:container[:mode]
        #[arg(long)]
        mount: Option<String>,
    },

    /// Stop an IDE container
    Stop {
        /// IDE type name
        ide: String,
    },

    /// Freeze the running container into a named snapshot
    Snapshot {
        /// IDE type name
        ide: String,
        /// Snapshot name
        name: String,
    },

    /// Remove a snapshot
    Rm {
        /// IDE type name
        ide: String,
        /// Snapshot name
        name: String,
    },

    /// List snapshots of an IDE type
    Ls {
        /// IDE type name
        ide: String,
    },

    /// Show which snapshot an IDE type is running
    Status {
        /// IDE type name
        ide: String,
    },

    /// List configured IDE types
    Types,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Types needs no provider
    if matches!(cli.command, Commands::Types) {
        return commands::types();
    }

    let config = GlobalConfig::load().unwrap_or_default();

    let provider = match cli.provider.as_deref() {
        Some("docker") => create_provider(ProviderType::Docker).await?,
        Some("podman") => create_provider(ProviderType::Podman).await?,
        _ => create_default_provider(&config).await?,
    };
    let manager = IdeManager::new(provider, config);

    match cli.command {
        Commands::Build { ide } => commands::build(&manager, &ide).await?,
        Commands::Start {
            ide,
            snapshot,
            web_port,
            vnc_port,
            web_password,
            vnc_password,
            mount,
        } => {
            let runtime = RuntimeConfig {
                web_port,
                vnc_port,
                web_password,
                vnc_password,
                mount,
            };
            commands::start(&manager, &ide, &snapshot, &runtime).await?;
        }
        Commands::Stop { ide } => commands::stop(&manager, &ide).await?,
        Commands::Snapshot { ide, name } => commands::snapshot(&manager, &ide, &name).await?,
        Commands::Rm { ide, name } => commands::remove(&manager, &ide, &name).await?,
        Commands::Ls { ide } => commands::list(&manager, &ide).await?,
        Commands::Status { ide } => commands::status(&manager, &ide).await?,
        Commands::Types => unreachable!("handled above"),
    }

    Ok(())
}
