use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Deserializer};

/// Complete server configuration, loadable from a YAML file. Every
/// section and field is optional; whatever is missing takes the default
/// listed on the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to. Port 0 lets the system pick one.
    pub listen: String,
    /// Seconds to wait for in-flight connections when stopping (default 5).
    #[serde(deserialize_with = "de_secs")]
    pub close_wait: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            close_wait: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Socket read and write chunk size in bytes (default 4096).
    pub buffer_bytes: usize,
    /// Seconds a single read may block before the request times out
    /// (default 20, 0 disables the limit).
    #[serde(deserialize_with = "de_secs")]
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: 4 * 1024,
            idle_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Turns cookie sessions on or off (default on).
    pub enabled: bool,
    /// Name of the session cookie (default "SocketD").
    pub cookie: String,
    /// Seconds of inactivity before a session expires (default 600).
    #[serde(deserialize_with = "de_secs")]
    pub timeout: Duration,
    /// Seconds between sweep passes over the session table (default 60).
    #[serde(deserialize_with = "de_secs")]
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie: "SocketD".to_string(),
            timeout: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory the bundled file handler serves from (default "site").
    pub root: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("site"),
        }
    }
}

impl Settings {
    /// Reads settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let settings = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(settings)
    }

    /// Reads settings from the file named by `SOCKETD_CONFIG`, falling
    /// back to defaults when the variable is unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("SOCKETD_CONFIG") {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

fn de_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    // from_secs_f64 would panic on out-of-range input.
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
