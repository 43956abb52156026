use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::Config;

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

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot create log file appender: {0}")]
    Appender(#[from] InitError),
    #[error("cannot install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// Installs the global subscriber: env-filtered stdout, plus a daily rolling
/// JSON file when file logs are enabled. An already installed subscriber is
/// left in place.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let installed = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("devops-trends")
            .filename_suffix("log")
            .max_log_files(30)
            .build(&config.log_dir)?;
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    match installed {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        init_tracing(&cfg).unwrap();
        init_tracing(&cfg).unwrap();
    }

    #[test]
    fn file_logs_go_to_the_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            enable_file_logs: true,
            log_dir: dir.path().join("logs").to_string_lossy().into_owned(),
            ..LogConfig::default()
        };
        assert!(init_tracing(&cfg).is_ok());
    }

    #[test]
    fn derives_from_app_config() {
        let app = Config {
            log_level: "debug".to_string(),
            enable_file_logs: true,
            log_dir: "/tmp/trend-logs".to_string(),
            sled_path: "./unused".to_string(),
            report: Default::default(),
        };
        let cfg = LogConfig::from(&app);
        assert_eq!(cfg.log_level, "debug");
        assert!(cfg.enable_file_logs);
        assert_eq!(cfg.log_dir, "/tmp/trend-logs");
    }
}
