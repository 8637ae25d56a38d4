//! CLI entry point for chatlite

mod render;
mod repl;

use anyhow::{bail, Context, Result};
use chatlite_core::config::{Config, ConfigLoader};
use chatlite_core::logging::init_logging;
use chatlite_core::utils::expand_tilde;
use chatlite_engine::{ChatEngine, SendOutcome};
use chatlite_remote::{ChatService, HttpChatService};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chatlite")]
#[command(about = "A small terminal client for a remote chat service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Session to open on start
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Send one message and print the reply
    Send {
        /// Message to send
        message: String,
        /// Session to continue; a new one is started otherwise
        #[arg(short, long)]
        session: Option<String>,
    },
    /// List sessions
    Sessions,
    /// Print the messages of a session
    History {
        /// Session id
        session: String,
    },
    /// Show the effective configuration and whether the service answers
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = match cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let mut config = config_loader
        .load()
        .with_context(|| format!("failed to load {}", config_loader.config_path().display()))?;

    let log_dir = expand_tilde(&config.logging.dir);
    let log_dir = if log_dir.is_relative() {
        config_loader.config_dir().join(log_dir)
    } else {
        log_dir
    };
    config.logging.dir = log_dir.to_string_lossy().into_owned();
    let _log_guard = init_logging(&config.logging);

    match cli.command {
        Commands::Chat { session } => {
            info!("Starting interactive chat");
            let engine = build_engine(&config)?;
            if let Err(e) = engine.refresh_sessions().await {
                warn!("Could not load sessions: {}", e);
            }
            if let Some(session) = session {
                engine.switch_session(&session).await?;
            }
            repl::run(engine).await?;
        }
        Commands::Send { message, session } => {
            run_send(&config, &message, session).await?;
        }
        Commands::Sessions => {
            let engine = build_engine(&config)?;
            engine.refresh_sessions().await?;
            render::print_sessions(&engine.view().chat.sessions);
        }
        Commands::History { session } => {
            let engine = build_engine(&config)?;
            engine.switch_session(&session).await?;
            render::print_messages(&engine.view().chat.messages);
        }
        Commands::Status => {
            run_status(&config_loader, &config).await?;
        }
    }

    Ok(())
}

fn build_engine(config: &Config) -> Result<Arc<ChatEngine>> {
    let service = HttpChatService::from_config(&config.remote)?;
    Ok(Arc::new(ChatEngine::new(
        Arc::new(service),
        config.engine.clone(),
    )))
}

async fn run_send(config: &Config, message: &str, session: Option<String>) -> Result<()> {
    let engine = build_engine(config)?;
    if let Some(session) = session {
        engine.switch_session(&session).await?;
    }

    match engine.send_message(message).await {
        SendOutcome::Delivered {
            session_id,
            assistant,
            ..
        } => {
            println!("{}", assistant.text);
            println!("{}", style(format!("session: {session_id}")).dim());
            Ok(())
        }
        SendOutcome::Failed { error, .. } => bail!("Failed to send message: {}", error),
        SendOutcome::Ignored => bail!("Nothing to send, the message is empty"),
        SendOutcome::Discarded { session_id } => {
            warn!("Reply for session {} was discarded", session_id);
            Ok(())
        }
    }
}

async fn run_status(loader: &ConfigLoader, config: &Config) -> Result<()> {
    println!("{}", style("chatlite status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    let file_state = if loader.config_path().exists() {
        style("present").green()
    } else {
        style("not found, using defaults").dim()
    };
    println!("  Config file: {}", file_state);
    println!("  Log directory: {}", config.logging.dir);
    println!();

    println!("{}", style("Remote:").bold());
    println!("  Base URL: {}", config.remote.base_url);
    println!("  Timeout: {}s", config.remote.timeout_secs);
    let service = HttpChatService::from_config(&config.remote)?;
    match service.list_sessions().await {
        Ok(sessions) => println!(
            "  Service: {} ({} sessions)",
            style("reachable").green(),
            sessions.len()
        ),
        Err(e) => println!("  Service: {} ({})", style("unreachable").red(), e),
    }
    println!();

    println!("{}", style("Engine:").bold());
    println!("  Label length: {}", config.engine.label_max_chars);
    println!(
        "  Sync sessions on create: {}",
        config.engine.sync_sessions_on_create
    );
    println!(
        "  Show provisional sessions: {}",
        config.engine.show_provisional_sessions
    );
    println!("  Stale responses: {:?}", config.engine.stale_responses);

    Ok(())
}
