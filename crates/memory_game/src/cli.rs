//! Command-line interface for memory_game.

use clap::{Parser, Subcommand};

/// Memory Game - tile matching with session analytics
#[derive(Parser, Debug)]
#[command(name = "memory_game")]
#[command(about = "Memory matching game and its analytics server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the analytics HTTP server
    Server {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file (created if it doesn't exist)
        #[arg(long)]
        db_path: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },

    /// Play in the terminal
    Play {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Server URL (defaults to $MEMORY_SERVER_URL, then http://127.0.0.1:5001)
        #[arg(long)]
        server_url: Option<String>,

        /// Register the account before logging in
        #[arg(long)]
        register: bool,

        /// Number of pairs on the board
        #[arg(long, default_value = "8")]
        pairs: usize,
    },

    /// Print the analytics summary and event log
    Stats {
        /// Server URL (defaults to $MEMORY_SERVER_URL, then http://127.0.0.1:5001)
        #[arg(long)]
        server_url: Option<String>,

        /// Print only this session's actions, oldest first
        #[arg(long)]
        session: Option<String>,
    },

    /// Create an account
    Register {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Server URL (defaults to $MEMORY_SERVER_URL, then http://127.0.0.1:5001)
        #[arg(long)]
        server_url: Option<String>,
    },
}
