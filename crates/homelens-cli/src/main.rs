//! homelens - real-estate type analysis chat

mod config;
mod credentials;
mod line;
mod navigator;
mod session;
mod ui;

use clap::Parser;
use homelens_api::HttpChatBackend;
use homelens_chat::ChatEngine;
use homelens_tui::Theme;
use session::SessionLayer;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// homelens - chat with the real-estate analysis bot
#[derive(Parser, Debug)]
#[command(name = "homelens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Analysis backend base URL (default: http://127.0.0.1:8001)
    #[arg(long)]
    api_url: Option<String>,

    /// User name sent with every message
    #[arg(short, long)]
    user: Option<String>,

    /// Bearer token for the backend
    #[arg(short, long)]
    token: Option<String>,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Store a login (user name) together with --token
    #[arg(long, value_name = "NAME", requires = "token")]
    login: Option<String>,

    /// Forget the stored login
    #[arg(long)]
    logout: bool,
}

/// Log to stderr, or to a file while the TUI owns the screen
fn init_tracing(verbose: bool, use_tui: bool) -> anyhow::Result<()> {
    if !verbose {
        return Ok(());
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homelens=debug"));

    if use_tui {
        let dir = config::Config::config_dir();
        std::fs::create_dir_all(&dir)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("homelens.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize config and exit
    if args.init_config {
        let path = config::Config::config_path();
        match config::Config::init_at(&path) {
            Ok(()) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let credentials_path = credentials::credentials_file();

    if let Some(user_name) = args.login {
        let token = args.token.unwrap_or_default();
        if token.trim().is_empty() {
            anyhow::bail!("--login needs a non-empty --token");
        }
        credentials::save(
            &credentials_path,
            &credentials::StoredCredentials::new(user_name.trim(), token.trim()),
        )?;
        println!("Logged in as {}", user_name.trim());
        return Ok(());
    }

    if args.logout {
        if credentials::remove(&credentials_path)? {
            println!("Logged out");
        } else {
            println!("Not logged in");
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true) && std::io::stdout().is_terminal();
    init_tracing(args.verbose, use_tui)?;

    // Merge session sources (CLI takes precedence)
    let stored = credentials::load(&credentials_path)
        .map(|c| SessionLayer::new(Some(c.user_name), Some(c.auth_token)))
        .unwrap_or_default();
    let session = session::resolve(&[
        SessionLayer::new(args.user, args.token),
        SessionLayer::from_env(),
        SessionLayer::new(cfg.user_name.clone(), cfg.auth_token.clone()),
        stored,
    ]);
    if !session.is_authenticated() {
        eprintln!("Warning: no auth token found; messages will not be sent.");
        eprintln!("  Log in with: homelens --login NAME --token TOKEN");
        eprintln!("  or set HOMELENS_AUTH_TOKEN");
    }

    let api_url = args.api_url.unwrap_or_else(|| cfg.api_url().to_string());
    let backend = Arc::new(HttpChatBackend::with_timeout(api_url, cfg.request_timeout())?);
    let (navigator, reports) = navigator::ChannelNavigator::new();
    let engine = Arc::new(ChatEngine::new(
        cfg.engine_config(),
        backend,
        session,
        Arc::new(navigator),
    )?);
    tracing::info!(user = engine.session().user_name(), "starting chat session");

    let theme = cfg
        .theme
        .as_deref()
        .and_then(Theme::by_name)
        .unwrap_or_default();

    let report = if use_tui {
        ui::run_tui(engine, reports, theme).await?
    } else {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        line::run_line(engine, reports, stdin, &mut std::io::stdout()).await?
    };

    if let Some(payload) = report {
        navigator::write_report(&payload, args.report_out.as_deref())?;
    }

    Ok(())
}
