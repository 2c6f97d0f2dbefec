use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

/// Prefix of the rotated log files under `log_dir`.
const LOG_FILE_PREFIX: &str = "card-backend";

/// Days of rotated files kept on disk.
const MAX_LOG_FILES: usize = 30;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

fn daily_appender(log_dir: &str) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .unwrap_or_else(|e| panic!("Cannot write logs under '{log_dir}': {e}"))
}

/// Install the global subscriber: env-filtered stdout, plus daily JSON files
/// when enabled. `RUST_LOG` wins over `log_level`. A second call (tests) is
/// ignored.
pub fn init_tracing(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let file_layer = config.enable_file_logs.then(|| {
        fmt::layer()
            .with_writer(daily_appender(&config.log_dir))
            .with_ansi(false)
            .json()
    });

    let installed = Registry::default()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init();

    if let Err(e) = installed {
        if !e.to_string().contains("already been set") {
            panic!("Failed to initialize tracing: {e}");
        }
    }
}
