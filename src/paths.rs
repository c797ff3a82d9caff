// ABOUTME: XDG Base Directory paths for the relay's configuration file
// ABOUTME: Resolves ~/.config/n8n-relay/config.toml with a working-directory fallback

use directories::ProjectDirs;
use std::path::PathBuf;

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "n8n-relay";
const APPLICATION: &str = "n8n-relay";

/// File name looked up in the current directory before the XDG location
pub const LOCAL_CONFIG_FILE: &str = "n8n-relay.toml";

/// Env var that points at an explicit config file
pub const CONFIG_PATH_ENV: &str = "N8N_RELAY_CONFIG";

/// Get XDG-compliant directories for the application
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory path (e.g., ~/.config/n8n-relay/)
/// Falls back to current directory if XDG directories unavailable
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default config file path
/// e.g., ~/.config/n8n-relay/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
