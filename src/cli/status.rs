// src/cli/status.rs — Storage and configuration status display

use crate::core::persist;
use crate::infra::config::Config;
use crate::infra::paths;

/// Display storage, credential, and configuration status.
pub fn show_status(config: &Config, verbose: bool) -> anyhow::Result<()> {
    let storage_path = paths::storage_file_path();
    let storage_exists = storage_path.exists();

    let config_path = paths::config_file_path();
    let config_exists = config_path.exists();

    println!("chatx v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Config
    if config_exists {
        println!("  Config:    {} (loaded)", config_path.display());
    } else {
        println!("  Config:    (using defaults)");
    }

    // Storage
    if storage_exists {
        let size = std::fs::metadata(&storage_path)
            .map(|m| m.len())
            .unwrap_or(0);
        println!(
            "  Storage:   {} ({})",
            storage_path.display(),
            format_bytes(size),
        );
    } else {
        println!("  Storage:   (not created yet)");
    }

    // Credentials: presence only, never values
    println!("  Groq:      {}", credential_status("GROQ_API_KEY"));
    println!("  Gemini:    {}", credential_status("GEMINI_API_KEY"));

    // Read real session data if the storage file parses
    if let Some(snapshot) = persist::load_snapshot(&storage_path) {
        let messages: usize = snapshot.sessions.iter().map(|s| s.messages.len()).sum();
        println!();
        println!("  Sessions:  {}", snapshot.sessions.len());
        println!("  Messages:  {}", messages);
        if let Some(current) = snapshot.current_session_id.as_deref() {
            if let Some(s) = snapshot.sessions.iter().find(|s| s.id == current) {
                println!("  Current:   {} ({} message(s))", s.name, s.messages.len());
            }
        }
    }

    println!();
    println!("  Cooldown:  {}ms between requests", config.chat.cooldown_ms);
    println!(
        "  History:   last {} message(s) sent upstream",
        config.chat.history_window,
    );
    println!("  Primary:   {}", config.chat.default_model);

    if verbose {
        println!();
        println!("  Data dir:   {}", paths::data_dir().display());
        println!("  Config dir: {}", paths::config_dir().display());
    }

    Ok(())
}

fn credential_status(var: &str) -> &'static str {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => "configured",
        _ => "(not set)",
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}
