//! Memory Game - Unified CLI

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use memory_game::{
    ApiClient, PlayOptions, format_session_log, format_stats, resolve_server_url, run_tui,
};
use memory_server::ServerConfig;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Server {
            host,
            port,
            db_path,
            config,
        } => run_server(host, port, db_path, config).await,
        Command::Play {
            email,
            password,
            server_url,
            register,
            pairs,
        } => {
            run_tui(PlayOptions {
                server_url: server_url_or_env(server_url),
                email,
                password,
                register,
                pairs,
            })
            .await
        }
        Command::Stats {
            server_url,
            session,
        } => run_stats(server_url_or_env(server_url), session).await,
        Command::Register {
            email,
            password,
            server_url,
        } => run_register(server_url_or_env(server_url), email, password).await,
    }
}

fn server_url_or_env(flag: Option<String>) -> String {
    resolve_server_url(flag, |key| std::env::var(key).ok())
}

fn init_stdout_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

/// Run the analytics HTTP server
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    db_path: Option<String>,
    config: Option<std::path::PathBuf>,
) -> Result<()> {
    let mut config = ServerConfig::load(config.as_deref())?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(db_path) = db_path {
        config = config.with_db_path(db_path);
    }

    init_stdout_tracing(config.log_filter());
    info!(addr = %config.bind_address(), db_path = %config.db_path(), "Starting memory game server");

    memory_server::serve(config).await
}

/// Print the analytics report, or one session's action log
#[instrument]
async fn run_stats(server_url: String, session: Option<String>) -> Result<()> {
    init_stdout_tracing("warn");
    let client = ApiClient::new(server_url);
    match session {
        Some(session_id) => {
            let actions = client.session_log(&session_id).await?;
            print!("{}", format_session_log(&session_id, &actions));
        }
        None => {
            let view = client.analytics().await?;
            print!("{}", format_stats(&view));
        }
    }
    Ok(())
}

/// Create an account
#[instrument(skip(password))]
async fn run_register(server_url: String, email: String, password: String) -> Result<()> {
    init_stdout_tracing("warn");
    let message = ApiClient::new(server_url)
        .register(&email, &password)
        .await?;
    println!("{}", message);
    Ok(())
}
