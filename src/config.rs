use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_SESSION_TTL_HOURS, SESSION_REAPER_INTERVAL};

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub session_ttl_hours: u64,
    /// Empty disables the admin routes.
    pub admin_api_key: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    /// JSON file overriding the built-in starter content.
    pub starter_content_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub session_reaper_enabled: bool,
    pub session_reaper_interval_secs: u64,
}

impl WorkerConfig {
    pub fn session_reaper_interval(&self) -> Duration {
        Duration::from_secs(self.session_reaper_interval_secs)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            session_reaper_enabled: true,
            session_reaper_interval_secs: SESSION_REAPER_INTERVAL.as_secs(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("enable_file_logs", &self.enable_file_logs)
            .field("log_dir", &self.log_dir)
            .field("sled_path", &self.sled_path)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("admin_api_key", &"***REDACTED***")
            .field("cors_origin", &self.cors_origin)
            .field("worker", &self.worker)
            .field("starter_content_path", &self.starter_content_path)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source. Unset, unparsable and
    /// (for optional paths) blank values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let vars = Vars(&lookup);
        Self {
            host: vars.parse_or("HOST", IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: vars.parse_or("PORT", 3000),
            log_level: vars.string_or("RUST_LOG", "info"),
            enable_file_logs: vars.flag_or("ENABLE_FILE_LOGS", false),
            log_dir: vars.string_or("LOG_DIR", "./logs"),
            sled_path: vars.string_or("SLED_PATH", "./data/cards.sled"),
            session_ttl_hours: vars.parse_or("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS),
            admin_api_key: vars.string_or("ADMIN_API_KEY", ""),
            cors_origin: vars.string_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                session_reaper_enabled: vars.flag_or("SESSION_REAPER_ENABLED", true),
                session_reaper_interval_secs: vars.parse_or(
                    "SESSION_REAPER_INTERVAL_SECS",
                    SESSION_REAPER_INTERVAL.as_secs(),
                ),
            },
            starter_content_path: vars
                .get("STARTER_CONTENT_PATH")
                .filter(|p| !p.trim().is_empty()),
        }
    }
}

struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.get(key) else {
            return default;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparsable setting, using default");
            default
        })
    }

    fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("1" | "true" | "yes" | "on") => true,
            Some("0" | "false" | "no" | "off") => false,
            Some(other) => {
                tracing::warn!(key, value = other, "Unrecognized flag, using default");
                default
            }
            None => default,
        }
    }
}
