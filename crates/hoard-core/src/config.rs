use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HoardError, HoardResult};

/// Top-level configuration (loaded from hoard.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoardConfig {
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl HoardConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &Path) -> HoardResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| HoardError::Config(format!("parsing {}: {e}", path.display())))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding store files (default: ~/.local/share/hoard)
    pub dir: PathBuf,
    /// Store file extension, without the dot
    pub extension: String,
    /// Store opened when no name is given
    pub default_name: String,
    /// Create an empty store when opening one that does not exist
    pub create_missing: bool,
    /// Unix permission bits for newly written store files
    pub file_mode: u32,
}

impl StoreConfig {
    /// `<dir>/<name>.<extension>`, with a leading `~/` expanded.
    pub fn path_for(&self, name: &str) -> PathBuf {
        expand_tilde(&self.dir).join(format!("{name}.{}", self.extension))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.local/share/hoard"),
            extension: "kwl".into(),
            default_name: "kdewallet".into(),
            create_missing: true,
            file_mode: 0o600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix("~/")) {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(home).join(rest)
        }
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[store]
dir = "/var/lib/hoard"
extension = "vault"
default_name = "personal"
create_missing = false
file_mode = 0o640

[log]
level = "debug"
format = "json"
"#;
        let config: HoardConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.store.dir, PathBuf::from("/var/lib/hoard"));
        assert_eq!(config.store.extension, "vault");
        assert_eq!(config.store.default_name, "personal");
        assert!(!config.store.create_missing);
        assert_eq!(config.store.file_mode, 0o640);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_defaults() {
        let config: HoardConfig = toml::from_str("").unwrap();

        assert_eq!(config.store.dir, PathBuf::from("~/.local/share/hoard"));
        assert_eq!(config.store.extension, "kwl");
        assert_eq!(config.store.default_name, "kdewallet");
        assert!(config.store.create_missing);
        assert_eq!(config.store.file_mode, 0o600);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[store]
dir = "/tmp/wallets"
"#;
        let config: HoardConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.store.dir, PathBuf::from("/tmp/wallets"));
        // Defaults
        assert_eq!(config.store.extension, "kwl");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = HoardConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: HoardConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.store.dir, parsed.store.dir);
        assert_eq!(config.store.file_mode, parsed.store.file_mode);
        assert_eq!(config.log.format, parsed.log.format);
    }

    #[test]
    fn test_path_for() {
        let store = StoreConfig {
            dir: PathBuf::from("/data/hoard"),
            ..StoreConfig::default()
        };
        assert_eq!(
            store.path_for("kdewallet"),
            PathBuf::from("/data/hoard/kdewallet.kwl")
        );
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(
            expand_tilde(Path::new("/etc/hoard")),
            PathBuf::from("/etc/hoard")
        );
        assert!(!expand_tilde(Path::new("~/x")).starts_with("~"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = HoardConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.store.extension, "kwl");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hoard.toml");
        std::fs::write(&path, "[store\ndir = 3").unwrap();
        assert!(matches!(
            HoardConfig::load(&path),
            Err(HoardError::Config(_))
        ));
    }
}
