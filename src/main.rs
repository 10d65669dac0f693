//! convsync - Entry Point

use chrono::Utc;
use clap::Parser;
use convsync::model::ConversationId;
use convsync::source::{seed, ConversationSession, Driver, MemoryBackend};
use convsync::view::{ColorConfig, ViewSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Messages generated for the demo conversation when no seed file is given.
const DEMO_HISTORY_LEN: usize = 60;

/// Live chat panel over a simulated messaging backend
#[derive(Parser, Debug)]
#[command(name = "convsync")]
#[command(version)]
#[command(about = "Terminal chat panel that keeps a conversation thread in sync")]
pub struct Args {
    /// Conversation to open
    #[arg(short, long, default_value = "lead-1")]
    pub conversation: String,

    /// JSONL file with the conversation's history, oldest first
    #[arg(short, long)]
    pub seed: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Simulated network latency in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Have the simulated contact reply to every message
    #[arg(long)]
    pub auto_reply: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let conversation = ConversationId::new(args.conversation.clone())?;

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = convsync::config::load_config_with_precedence(args.config.clone())?;
        let merged = convsync::config::merge_config(config_file);
        let with_env = convsync::config::apply_env_overrides(merged);
        let auto_reply_override = if args.auto_reply { Some(true) } else { None };
        convsync::config::apply_cli_overrides(with_env, args.latency_ms, auto_reply_override)
    };

    convsync::logging::init(&config.log_file_path)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let history = match &args.seed {
        Some(path) => {
            let loaded = seed::load_seed(path)?;
            if !loaded.errors.is_empty() {
                warn!(path = %path.display(), skipped = loaded.errors.len(), "Seed file had malformed lines");
            }
            loaded.messages
        }
        None => seed::demo_history(DEMO_HISTORY_LEN, Utc::now()),
    };
    info!(%conversation, messages = history.len(), "Seeding simulated backend");

    let backend = Arc::new(
        MemoryBackend::new()
            .with_page_size(config.page_size)
            .with_latency(Duration::from_millis(config.latency_ms))
            .with_auto_reply(config.auto_reply),
    );
    backend.seed(&conversation, history);

    let driver = Driver::new(
        backend.clone(),
        backend.clone(),
        Duration::from_millis(config.request_timeout_ms),
    );
    let (session, opened) =
        ConversationSession::open(conversation, driver, backend, config.failed_sends);

    let settings = ViewSettings {
        top_threshold: config.top_threshold,
        colors: ColorConfig::from_env_and_args(args.no_color),
    };
    convsync::view::run_with_session(session, opened, settings)?;

    Ok(())
}
