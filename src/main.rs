// src/main.rs — chatx entry point

use clap::Parser;

use chatx::api::{self, ApiState};
use chatx::cli::{Cli, Commands};
use chatx::core::controller::ChatController;
use chatx::core::limiter::CooldownGate;
use chatx::core::persist::SharedStore;
use chatx::infra::config::Config;
use chatx::infra::logger;
use chatx::infra::paths;
use chatx::provider::gateway::CompletionGateway;
use chatx::provider::gemini::GeminiProvider;
use chatx::provider::groq::GroqProvider;
use chatx::provider::CompletionProvider;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG / CHATX_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Default command: interactive chat
    let command = cli.command.unwrap_or(Commands::Chat { model: None });

    match command {
        Commands::Status { verbose } => chatx::cli::status::show_status(&config, verbose),

        Commands::Serve { port } => {
            let gateway = Arc::new(build_gateway(&config)?);
            let mut server = config.server.clone();
            if let Some(port) = port {
                server.port = port;
            }
            let state = ApiState::new(
                gateway,
                CooldownGate::from_millis(config.chat.cooldown_ms),
            );
            api::start_server(&server, state).await
        }

        Commands::Chat { model } => {
            let gateway = Arc::new(build_gateway(&config)?);
            let store = SharedStore::open(paths::storage_file_path());
            let controller = ChatController::new(
                store,
                gateway,
                CooldownGate::from_millis(config.chat.cooldown_ms),
            );
            chatx::cli::chat::run_chat(controller, model).await
        }
    }
}

/// Construct the provider registry from the environment.
///
/// The primary provider's credential is required; the process refuses to
/// start without it. Gemini is optional, its selector simply isn't
/// registered when the key is absent.
fn build_gateway(config: &Config) -> anyhow::Result<CompletionGateway> {
    let groq = GroqProvider::from_env()?;
    let mut providers: Vec<Arc<dyn CompletionProvider>> = vec![Arc::new(groq)];

    match GeminiProvider::from_env() {
        Ok(gemini) => providers.push(Arc::new(gemini)),
        Err(_) => tracing::debug!("GEMINI_API_KEY not set, 'gemini' selector disabled"),
    }

    Ok(CompletionGateway::new(providers, &config.chat))
}
