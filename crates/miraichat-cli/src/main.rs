//! miraichat CLI - 命令行工具

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod inspect_cmd;
mod message_cmd;

#[derive(Parser)]
#[command(name = "miraichat")]
#[command(about = "miraichat - mirai-api-http message chain toolkit", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.miraichat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a chat message or message chain JSON file and describe it
    Inspect {
        /// JSON file to inspect
        file: PathBuf,
    },
    /// Send messages through the gateway
    Message {
        #[command(subcommand)]
        command: message_cmd::MessageCommand,
    },
    /// Show version info
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miraichat=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => {
            inspect_cmd::run(&file)?;
        }
        Commands::Message { command } => {
            let config_path = cli
                .config
                .unwrap_or_else(miraichat_core::GatewayConfig::default_path);
            command.execute(&config_path).await?;
        }
        Commands::Version => {
            println!("miraichat {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
