use std::{
    env, fs, io,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_PATH_VAR: &str = "TASKMASTER_SETTINGS";
const DEFAULT_LOG_FILTER: &str = "taskmaster_server=info,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Persistent redb file at `database_path`.
    Redb,
    /// Process-local map, lost on exit.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub store: StoreMode,
    pub database_path: String,
    pub default_list_limit: usize,
    pub max_list_limit: usize,
    pub request_timeout_secs: u64,
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tcp_socket_binding: "0.0.0.0".to_string(),
            tcp_socket_port: 8001,
            store: StoreMode::Redb,
            database_path: "taskmaster.redb".to_string(),
            default_list_limit: 100,
            max_list_limit: 1000,
            request_timeout_secs: 30,
            log_filter: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse settings file {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("invalid value {value:?} for {name}")]
    InvalidOverride { name: &'static str, value: String },
    #[error("invalid bind address {0:?}")]
    InvalidAddress(String),
}

impl Settings {
    /// Load the settings file, then apply `TASKMASTER_*` environment
    /// overrides. See `settings_path` for where the file is looked up.
    pub fn load() -> Result<Settings, SettingsError> {
        let explicit = env::var_os(SETTINGS_PATH_VAR).map(PathBuf::from);
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let path = settings_path(explicit, exe_dir.as_deref());
        let mut settings = Self::load_from(&path)?;
        settings.apply_overrides(|name| env::var(name).ok())?;
        Ok(settings)
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Settings, SettingsError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(binding) = lookup("TASKMASTER_BIND") {
            self.tcp_socket_binding = binding;
        }
        if let Some(port) = lookup("TASKMASTER_PORT") {
            self.tcp_socket_port = port.parse().map_err(|_| SettingsError::InvalidOverride {
                name: "TASKMASTER_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(store) = lookup("TASKMASTER_STORE") {
            self.store = match store.as_str() {
                "redb" => StoreMode::Redb,
                "memory" => StoreMode::Memory,
                _ => {
                    return Err(SettingsError::InvalidOverride {
                        name: "TASKMASTER_STORE",
                        value: store,
                    })
                }
            };
        }
        if let Some(path) = lookup("TASKMASTER_DB_PATH") {
            self.database_path = path;
        }
        Ok(())
    }

    pub fn socket_address(&self) -> Result<SocketAddr, SettingsError> {
        let ip: IpAddr = self
            .tcp_socket_binding
            .parse()
            .map_err(|_| SettingsError::InvalidAddress(self.tcp_socket_binding.clone()))?;
        Ok(SocketAddr::new(ip, self.tcp_socket_port))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// `TASKMASTER_SETTINGS` if set, else the `settings.json` that build.rs
/// places beside the binary, else `settings.json` in the working directory.
fn settings_path(explicit: Option<PathBuf>, exe_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    exe_dir
        .map(|dir| dir.join(SETTINGS_FILENAME))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILENAME))
}
