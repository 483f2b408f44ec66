// src/infra/paths.rs — Path management
//
// All paths respect the CHATX_HOME environment variable for isolation.
// When CHATX_HOME is set, config and data both live under that directory.
// When unset, config uses ~/.chatx/ and data uses the platform data dir.

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static PROJECT_DIRS: OnceLock<ProjectDirs> = OnceLock::new();

fn project_dirs() -> &'static ProjectDirs {
    PROJECT_DIRS.get_or_init(|| {
        ProjectDirs::from("", "", "chatx").expect("Could not determine home directory")
    })
}

/// Returns the CHATX_HOME override, if set.
fn chatx_home() -> Option<PathBuf> {
    std::env::var_os("CHATX_HOME").map(PathBuf::from)
}

/// Configuration directory: $CHATX_HOME/ or ~/.chatx/
pub fn config_dir() -> PathBuf {
    if let Some(home) = chatx_home() {
        return home;
    }
    dirs_home().join(".chatx")
}

/// Data directory: $CHATX_HOME/data/ or the platform-local data dir.
pub fn data_dir() -> PathBuf {
    if let Some(home) = chatx_home() {
        return home.join("data");
    }
    project_dirs().data_local_dir().to_path_buf()
}

/// Home directory
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .expect("Could not determine home directory")
        .home_dir()
        .to_path_buf()
}

/// Durable chat state: one JSON record holding all sessions.
pub fn storage_file_path() -> PathBuf {
    data_dir().join("chat-storage.json")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
