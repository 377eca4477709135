use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Version reported when the host bundle carries no version metadata.
pub const DEV_VERSION: &str = "dev";

/// Application configuration stored in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub update: UpdateConfig,
    /// Run an update check once the host has finished launching
    #[serde(default = "default_true")]
    pub check_on_launch: bool,
    /// Raise the update prompt when an automatic check finds a new release
    #[serde(default = "default_true")]
    pub announce_updates: bool,
}

/// Where and how to ask for the latest release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    /// Product name sent in the User-Agent
    pub app_name: String,
    /// Platform label sent in the User-Agent
    pub platform: String,
    pub accept: String,
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            owner: "Ryderwe".into(),
            repo: "DefaultOpener".into(),
            app_name: "DefaultOpener".into(),
            platform: "macOS".into(),
            accept: "application/vnd.github+json".into(),
            timeout_secs: 15,
        }
    }
}

impl UpdateConfig {
    /// `GET` target for the latest published release.
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }

    /// `DefaultOpener/1.2.0 (macOS)`
    pub fn user_agent(&self, current_version: &str) -> String {
        format!("{}/{} ({})", self.app_name, current_version, self.platform)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            update: UpdateConfig::default(),
            check_on_launch: true,
            announce_updates: true,
        }
    }
}

/// `<config_dir>/DefaultOpener`
pub fn app_dir() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("DefaultOpener")
}

pub fn config_path() -> PathBuf {
    app_dir().join("config.json")
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

/// Missing or unreadable files fall back to defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to read config: {}", e);
            return AppConfig::default();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "Invalid config, using defaults: {}", e);
        AppConfig::default()
    })
}

pub fn save_config(config: &AppConfig) {
    save_config_to(config, &config_path());
}

pub fn save_config_to(config: &AppConfig, path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let data = match serde_json::to_string_pretty(config) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to encode config: {}", e);
            return;
        }
    };
    match fs::write(path, data) {
        Ok(()) => tracing::info!(path = %path.display(), "Configuration saved"),
        Err(e) => tracing::error!(path = %path.display(), "Failed to write config: {}", e),
    }
}

/// The running version, or [`DEV_VERSION`] when the bundle has none.
pub fn resolve_current_version(bundle_version: Option<String>) -> String {
    bundle_version
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEV_VERSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "check_on_launch": false, "update": { "repo": "Fork" } }"#).unwrap();

        let cfg = load_config_from(&path);
        assert!(!cfg.check_on_launch);
        assert!(cfg.announce_updates);
        assert_eq!(cfg.update.repo, "Fork");
        assert_eq!(cfg.update.owner, "Ryderwe");
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");

        let mut cfg = AppConfig::default();
        cfg.update.timeout_secs = 3;
        save_config_to(&cfg, &path);

        assert_eq!(load_config_from(&path), cfg);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn request_shape() {
        let cfg = UpdateConfig {
            api_base: "https://api.github.com/".into(),
            ..UpdateConfig::default()
        };
        assert_eq!(
            cfg.latest_release_url(),
            "https://api.github.com/repos/Ryderwe/DefaultOpener/releases/latest"
        );
        assert_eq!(cfg.user_agent("1.0.0"), "DefaultOpener/1.0.0 (macOS)");
    }

    #[test]
    fn missing_bundle_version_is_dev() {
        assert_eq!(resolve_current_version(None), "dev");
        assert_eq!(resolve_current_version(Some("  ".into())), "dev");
        assert_eq!(resolve_current_version(Some("1.4".into())), "1.4");
    }
}
