use crate::error::ConfigError;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidEnvValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive, e.g. `info` or `vigil_monitor=debug`.
    pub log_level: String,
    pub log_json: bool,
}

impl LogSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: env_or("LOG_LEVEL", "info".to_string())?,
            log_json: env_or("LOG_JSON", false)?,
        })
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VigilServerConfig {
    pub server_port: u16,
    pub config_path: PathBuf,
    pub log_settings: LogSettings,
}

impl VigilServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_port: env_or("VIGIL_SERVER_PORT", 8085)?,
            config_path: env_or("VIGIL_CONFIG_PATH", PathBuf::from("config.yaml"))?,
            log_settings: LogSettings::from_env()?,
        })
    }
}

impl Default for VigilServerConfig {
    fn default() -> Self {
        Self {
            server_port: 8085,
            config_path: PathBuf::from("config.yaml"),
            log_settings: LogSettings::default(),
        }
    }
}
