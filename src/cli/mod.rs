// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatx", about = "Multi-session chat client for Groq and Gemini", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API for browser clients
    Serve {
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Interactive chat session (default when no subcommand given)
    Chat {
        /// Model selector to start with (groq, gemini)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Show storage and configuration status
    Status {
        /// Show directory paths
        #[arg(long)]
        verbose: bool,
    },
}
