use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use shelf_backend::{AuthSettings, BackendConfig};
use shelf_types::AuthProvider;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
    pub max_failed_attempts: u32,
    pub lockout_secs: i64,
    pub secure_cookies: bool,
    pub providers: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24 * 7,
            max_failed_attempts: 5,
            lockout_secs: 15 * 60,
            secure_cookies: false,
            providers: vec!["google".into(), "github".into()],
        }
    }
}

/// Longest accepted session lifetime, one year.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
/// Longest accepted lockout window, one day.
const MAX_LOCKOUT_SECS: i64 = 24 * 60 * 60;

/// `value` when it lies in `1..=max`, otherwise `default` with a warning.
fn bounded(name: &str, value: i64, max: i64, default: i64) -> i64 {
    if (1..=max).contains(&value) {
        value
    } else {
        tracing::warn!("auth.{name} = {value} is outside 1..={max}, using {default}");
        default
    }
}

impl AuthConfig {
    fn settings(&self) -> AuthSettings {
        let enabledProviders = self
            .providers
            .iter()
            .filter_map(|name| {
                let provider = AuthProvider::parse(name).filter(AuthProvider::is_federated);
                if provider.is_none() {
                    tracing::warn!("ignoring {name:?}: not a social sign-in provider");
                }
                provider
            })
            .collect();

        let defaults = AuthConfig::default();
        let ttlHours = bounded(
            "session_ttl_hours",
            self.session_ttl_hours,
            MAX_SESSION_TTL_HOURS,
            defaults.session_ttl_hours,
        );
        let lockoutSecs = bounded(
            "lockout_secs",
            self.lockout_secs,
            MAX_LOCKOUT_SECS,
            defaults.lockout_secs,
        );

        AuthSettings {
            session_ttl: chrono::Duration::hours(ttlHours),
            max_failed_attempts: self.max_failed_attempts,
            lockout: chrono::Duration::seconds(lockoutSecs),
            enabled_providers: enabledProviders,
        }
    }
}

impl Config {
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            data_dir: self.storage.data_dir.clone(),
            auth: self.auth.settings(),
        }
    }

    /// `None` when `bind` is not an IP address; the Leptos site address is used instead.
    pub fn site_addr(&self) -> Option<SocketAddr> {
        let ip = self.server.bind.parse().ok()?;
        Some(SocketAddr::new(ip, self.server.port))
    }
}

pub fn load(path: &str) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to parse config {path}: {e}, using defaults");
                Config::default()
            }
        },
        Err(e) => {
            tracing::warn!("failed to read config {path}: {e}, using defaults");
            Config::default()
        }
    }
}
