use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application name used for data and config directories
pub const APP_NAME: &str = "modfetch";

/// Default log filter when neither RUST_LOG nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Module proxy mirror root (contains `cache/download`)
    pub mirror_dir: Option<PathBuf>,
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// tracing filter directive, e.g. "modfetch=debug"
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Also write logs to [`log_path`]
    pub file: bool,
}

impl Config {
    /// Loads a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config at `path`, or the default config file if it exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match config_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Returns the configured mirror directory or the environment default.
    pub fn mirror_dir(&self) -> PathBuf {
        self.mirror_dir.clone().unwrap_or_else(default_mirror_dir)
    }
}

/// Returns the default module proxy mirror directory.
/// Uses $GOMODCACHE if set, otherwise $GOPATH/pkg/mod (first GOPATH entry),
/// then ~/go/pkg/mod, or ./go/pkg/mod if no home directory is known.
pub fn default_mirror_dir() -> PathBuf {
    mirror_dir_with_env(
        std::env::var("GOMODCACHE").ok(),
        std::env::var("GOPATH").ok(),
        dirs::home_dir(),
    )
}

/// Returns the path to the data directory for modfetch.
/// Uses $XDG_DATA_HOME/modfetch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/modfetch,
/// or ./modfetch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("modfetch.log")
}

/// Returns the path to the default config file, if a config directory is known.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.json"))
}

fn mirror_dir_with_env(
    gomodcache: Option<String>,
    gopath: Option<String>,
    home_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = gomodcache.filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }

    let gopath = gopath
        .filter(|s| !s.is_empty())
        .and_then(|s| std::env::split_paths(&s).next())
        .or_else(|| home_dir.map(|home| home.join("go")))
        .unwrap_or_else(|| PathBuf::from("go"));

    gopath.join("pkg").join("mod")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join(APP_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "mirrorDir": "/var/cache/mods"
        }))
        .unwrap();

        assert_eq!(result.mirror_dir, Some(PathBuf::from("/var/cache/mods")));
        assert_eq!(result.log, LogConfig::default());
    }

    #[test]
    fn config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<Config>(json!({
            "mirrorDir": "/var/cache/mods",
            "log": {
                "filter": "modfetch=debug",
                "json": true,
                "file": true
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            Config {
                mirror_dir: Some(PathBuf::from("/var/cache/mods")),
                log: LogConfig {
                    filter: Some("modfetch=debug".to_string()),
                    json: true,
                    file: true,
                },
            }
        );
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.json"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn mirror_dir_with_env_prefers_gomodcache() {
        let path = mirror_dir_with_env(
            Some("/cache/mod".to_string()),
            Some("/gopath".to_string()),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(path, PathBuf::from("/cache/mod"));
    }

    #[test]
    #[cfg(unix)]
    fn mirror_dir_with_env_uses_first_gopath_entry() {
        let path = mirror_dir_with_env(
            None,
            Some("/first:/second".to_string()),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(path, PathBuf::from("/first/pkg/mod"));
    }

    #[test]
    fn mirror_dir_with_env_falls_back_to_home_go() {
        let path = mirror_dir_with_env(Some(String::new()), None, Some(PathBuf::from("/home/user")));
        assert_eq!(path, PathBuf::from("/home/user/go/pkg/mod"));
    }

    #[test]
    fn mirror_dir_with_env_falls_back_to_relative_go() {
        let path = mirror_dir_with_env(None, None, None);
        assert_eq!(path, PathBuf::from("go/pkg/mod"));
    }

    #[test]
    #[serial]
    fn config_mirror_dir_reads_gomodcache_from_environment() {
        // SAFETY: serialized with other environment-mutating tests.
        unsafe { std::env::set_var("GOMODCACHE", "/env/modcache") };
        let dir = Config::default().mirror_dir();
        unsafe { std::env::remove_var("GOMODCACHE") };

        assert_eq!(dir, PathBuf::from("/env/modcache"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/modfetch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/modfetch"));
    }
}
