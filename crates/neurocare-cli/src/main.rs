//! NeuroCare CLI — talk to your mental wellness companion from the terminal.
//!
//! Run `neurocare chat` to start a session, or `neurocare serve` to host
//! the intent chatbot service the session falls back to.

mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::*;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use neurocare_core::bus::SessionEvent;
use neurocare_core::config::NeuroCareConfig;
use neurocare_core::mood;
use neurocare_core::session::ChatSession;
use neurocare_hub::{ChatbotService, PrimaryService};

use crate::ui::TerminalSurface;

// ─── CLI Definition ────────────────────────────────────────

/// NeuroCare — a mental wellness companion 🧠
#[derive(Parser)]
#[command(name = "neurocare", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true, env = "NEUROCARE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 💬 Start an interactive chat session
    Chat(SessionArgs),

    /// ❓ Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// 🌐 Run the intent chatbot service
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },

    /// ⚙️  Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for the config file, per invocation.
#[derive(Args, Default)]
struct SessionArgs {
    /// Primary chat service base URL
    #[arg(long, env = "NEUROCARE_PRIMARY_URL")]
    primary_url: Option<String>,

    /// Chatbot service base URL
    #[arg(long, env = "NEUROCARE_CHATBOT_URL")]
    chatbot_url: Option<String>,

    /// Username
    #[arg(short, long)]
    user: Option<String>,

    /// Current mood label (e.g. "Stressed")
    #[arg(short, long)]
    mood: Option<String>,

    /// Mood log identifier from the questionnaire
    #[arg(long)]
    mood_log_id: Option<String>,

    /// Per-service timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the config file location
    Path,
    /// Write a default config file
    Init,
    /// Store the username
    SetUser { username: String },
    /// Store the current mood and, optionally, its mood log ID
    SetMood {
        mood: String,
        #[arg(long)]
        mood_log_id: Option<String>,
    },
}

// ─── Helpers ───────────────────────────────────────────────

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neurocare")
}

fn init_file_logging() -> tracing_appender::non_blocking::WorkerGuard {
    // Logs go to a file so the chat transcript stays clean.
    let log_dir = data_dir().join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "neurocare.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(io::stderr)
        .init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,neurocare_core=debug,neurocare_hub=debug"))
}

fn build_session(config: NeuroCareConfig, args: SessionArgs) -> ChatSession {
    let profile = config
        .profile
        .merged(args.user, args.mood, args.mood_log_id);
    let primary_url = args.primary_url.unwrap_or(config.primary.base_url);
    let chatbot_url = args.chatbot_url.unwrap_or(config.secondary.base_url);
    let timeout = args.timeout.unwrap_or(config.session.tier_timeout_secs);

    let primary = PrimaryService::new(&primary_url);
    let chatbot = ChatbotService::new(&chatbot_url);
    tracing::info!(
        "Session tiers: primary={} chatbot={} timeout={}s",
        primary.api_url(),
        chatbot.api_url(),
        timeout
    );

    ChatSession::new(Arc::new(profile), Arc::new(primary), Arc::new(chatbot))
        .with_tier_timeout(Duration::from_secs(timeout))
}

/// Render everything already published without waiting.
fn drain_events(rx: &mut broadcast::Receiver<SessionEvent>, surface: &mut TerminalSurface) {
    loop {
        match rx.try_recv() {
            Ok(event) => surface.handle(&event),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                tracing::warn!("Surface lagged, {} events dropped", n);
            }
            Err(_) => break,
        }
    }
}

// ─── Entry Point ───────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = match &cli.command {
        Some(Commands::Serve { .. }) => {
            init_stderr_logging();
            None
        }
        _ => Some(init_file_logging()),
    };

    let config_path = cli.config.unwrap_or_else(NeuroCareConfig::default_path);
    let config = NeuroCareConfig::load(&config_path)?;

    match cli.command {
        None => run_chat(config, SessionArgs::default()).await,
        Some(Commands::Chat(args)) => run_chat(config, args).await,
        Some(Commands::Ask { message, session }) => run_ask(config, session, &message).await,
        Some(Commands::Serve { host, port }) => {
            neurocare_hub::api::start_server(&host, port).await
        }
        Some(Commands::Config { action }) => run_config(config, &config_path, action),
    }
}

// ─── Command Handlers ──────────────────────────────────────

async fn run_chat(config: NeuroCareConfig, args: SessionArgs) -> anyhow::Result<()> {
    let bot_name = config.session.bot_name.clone();
    let session = build_session(config, args);
    let mut rx = session.subscribe();
    let mut surface = TerminalSurface::new(&bot_name);

    ui::print_banner();
    ui::print_session_info(session.username(), session.current_mood());

    session.start();
    drain_events(&mut rx, &mut surface);

    loop {
        if !surface.input_locked() {
            ui::print_prompt();
        }

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" | "/q" => {
                println!("{}", "👋 Take care. Come back any time.".cyan());
                break;
            }
            "/history" => {
                ui::print_history(&bot_name, &session.transcript());
                continue;
            }
            "/mood" => {
                println!(
                    "  {} {}\n",
                    "Mood:".dimmed(),
                    session.current_mood().cyan()
                );
                continue;
            }
            "/help" => {
                ui::print_help();
                continue;
            }
            _ => {}
        }

        // Pump events while the reply resolves so the typing
        // indicator is live.
        let send = session.send(input);
        tokio::pin!(send);
        loop {
            tokio::select! {
                _ = &mut send => {
                    drain_events(&mut rx, &mut surface);
                    break;
                }
                event = rx.recv() => match event {
                    Ok(event) => surface.handle(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Surface lagged, {} events dropped", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {}
                },
            }
        }
    }

    Ok(())
}

async fn run_ask(config: NeuroCareConfig, args: SessionArgs, message: &str) -> anyhow::Result<()> {
    let session = build_session(config, args);

    match session.send(message).await {
        Some(reply) => println!("{}", reply),
        None => eprintln!("{} message is empty", "Error:".red()),
    }
    Ok(())
}

fn run_config(
    mut config: NeuroCareConfig,
    path: &std::path::Path,
    action: ConfigAction,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            if path.exists() {
                println!("{} {}", "Config already exists:".yellow(), path.display());
            } else {
                NeuroCareConfig::default().save(path)?;
                println!("{} {}", "✅ Wrote".green(), path.display());
            }
        }
        ConfigAction::SetUser { username } => {
            config.profile.username = Some(username);
            config.save(path)?;
            println!("{}", "✅ Username saved.".green());
        }
        ConfigAction::SetMood { mood, mood_log_id } => {
            if !mood::known_moods().any(|m| m == mood) {
                println!(
                    "{} {} (known: {})",
                    "⚠️  Unrecognized mood, the generic greeting will be used:".yellow(),
                    mood,
                    mood::known_moods().collect::<Vec<_>>().join(", ")
                );
            }
            config.profile.mood = Some(mood);
            if mood_log_id.is_some() {
                config.profile.mood_log_id = mood_log_id;
            }
            config.save(path)?;
            println!("{}", "✅ Mood saved.".green());
        }
    }
    Ok(())
}
