// pagekeep/src/config.rs
use crate::domain::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

pub const ENV_DOWNLOAD_DIR: &str = "PAGEKEEP_DOWNLOAD_DIR";
pub const ENV_SUBDIRECTORY: &str = "PAGEKEEP_SUBDIRECTORY";
pub const ENV_DATA_DIR: &str = "PAGEKEEP_DATA_DIR";

const STORAGE_FILE: &str = "storage.json";
const DOWNLOAD_HISTORY_FILE: &str = "downloads.json";
const CLONE_DIR: &str = "clones";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Root directory that downloads are written below
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Folder inside `download_dir` that receives saved pages
    #[serde(default = "default_subdirectory")]
    pub subdirectory: String,

    /// Holds the catalog, the download history and cloned tabs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Open cloned tabs in the system browser
    #[serde(default = "default_open_clones")]
    pub open_clones: bool,
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"))
}

fn default_subdirectory() -> String {
    "offline_pages".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/pagekeep")
}

fn default_user_agent() -> String {
    format!("pagekeep/{}", env!("CARGO_PKG_VERSION"))
}

fn default_open_clones() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            subdirectory: default_subdirectory(),
            data_dir: default_data_dir(),
            user_agent: default_user_agent(),
            open_clones: default_open_clones(),
        }
    }
}

impl Settings {
    /// Key/value storage file holding the catalog
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE)
    }

    pub fn download_history_path(&self) -> PathBuf {
        self.data_dir.join(DOWNLOAD_HISTORY_FILE)
    }

    pub fn clone_dir(&self) -> PathBuf {
        self.data_dir.join(CLONE_DIR)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config/pagekeep/config.toml"))
}

fn read_config_file(path: &Path) -> DomainResult<Settings> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| DomainError::Io(e).context(format!("Cannot read {}", path.display())))?;
    toml::from_str::<Settings>(&text).map_err(|e| {
        DomainError::DeserializationError(format!("Invalid config {}: {}", path.display(), e))
    })
}

/// Load settings from `config_path` (or the default config file when it
/// exists), then apply environment overrides.
///
/// An explicitly given file must exist and parse; a broken default file is
/// skipped.
#[instrument(level = "debug")]
pub fn load_settings(config_path: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    let mut settings = match config_path {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path).unwrap_or_else(|e| {
                debug!("Ignoring default config: {}", e);
                Settings::default()
            }),
            _ => Settings::default(),
        },
    };

    if let Ok(dir) = std::env::var(ENV_DOWNLOAD_DIR) {
        trace!("Using {} from environment: {}", ENV_DOWNLOAD_DIR, dir);
        settings.download_dir = PathBuf::from(dir);
    }
    if let Ok(subdirectory) = std::env::var(ENV_SUBDIRECTORY) {
        trace!("Using {} from environment: {}", ENV_SUBDIRECTORY, subdirectory);
        settings.subdirectory = subdirectory;
    }
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        trace!("Using {} from environment: {}", ENV_DATA_DIR, dir);
        settings.data_dir = PathBuf::from(dir);
    }

    trace!("Settings loaded: {:?}", settings);
    Ok(settings)
}

pub fn generate_default_config() -> String {
    toml::to_string_pretty(&Settings::default())
        .unwrap_or_else(|_| "# Error generating default configuration".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::EnvGuard;
    use serial_test::serial;
    use std::env;
    use std::fs;

    fn clear_env() {
        env::remove_var(ENV_DOWNLOAD_DIR);
        env::remove_var(ENV_SUBDIRECTORY);
        env::remove_var(ENV_DATA_DIR);
    }

    #[test]
    #[serial]
    fn given_no_overrides_when_loading_then_uses_defaults() {
        let _guard = EnvGuard::new();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.subdirectory, "offline_pages");
        assert!(settings.open_clones);
        assert!(settings.user_agent.starts_with("pagekeep/"));
    }

    #[test]
    #[serial]
    fn given_config_file_when_loading_then_file_values_apply() {
        let _guard = EnvGuard::new();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "download_dir = \"/tmp/dl\"\nsubdirectory = \"pages\"\nopen_clones = false\n",
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.download_dir, PathBuf::from("/tmp/dl"));
        assert_eq!(settings.subdirectory, "pages");
        assert!(!settings.open_clones);
        assert_eq!(settings.data_dir, default_data_dir());
    }

    #[test]
    #[serial]
    fn given_environment_when_loading_then_overrides_file() {
        let _guard = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "subdirectory = \"pages\"\n").unwrap();
        env::set_var(ENV_SUBDIRECTORY, "archive");
        env::set_var(ENV_DATA_DIR, "/tmp/pagekeep-data");
        env::remove_var(ENV_DOWNLOAD_DIR);

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.subdirectory, "archive");
        assert_eq!(settings.storage_path(), PathBuf::from("/tmp/pagekeep-data/storage.json"));
        assert_eq!(
            settings.download_history_path(),
            PathBuf::from("/tmp/pagekeep-data/downloads.json")
        );
    }

    #[test]
    #[serial]
    fn given_missing_explicit_config_when_loading_then_fails() {
        let _guard = EnvGuard::new();
        let dir = tempfile::tempdir().unwrap();

        assert!(load_settings(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn given_invalid_toml_when_reading_then_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "open_clones = \"maybe\"").unwrap();

        let err = read_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn given_defaults_when_generating_config_then_round_trips() {
        let text = generate_default_config();
        assert!(text.contains("subdirectory = \"offline_pages\""));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
