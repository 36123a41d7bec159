//! CLI configuration: flags with environment fallbacks.

use clap::Args;
use crm_core::{default_log_level, init_logging, LoggingError};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "crm.sqlite3";

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite database file
    #[arg(long = "db", env = "CRM_DB_PATH", default_value = DEFAULT_DB_FILE_NAME, global = true)]
    pub db_path: PathBuf,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    #[arg(long, env = "CRM_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "CRM_LOG_DIR", global = true)]
    pub log_dir: Option<String>,
}

impl Config {
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Starts file logging when a log directory is configured.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match self.log_dir.as_deref() {
            Some(dir) => {
                init_logging(self.effective_log_level(), dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::path::PathBuf;

    fn config(log_level: Option<&str>, log_dir: Option<&str>) -> Config {
        Config {
            db_path: PathBuf::from("crm.sqlite3"),
            log_level: log_level.map(str::to_string),
            log_dir: log_dir.map(str::to_string),
        }
    }

    #[test]
    fn log_level_falls_back_to_build_default() {
        assert_eq!(
            config(None, None).effective_log_level(),
            crm_core::default_log_level()
        );
        assert_eq!(config(Some("warn"), None).effective_log_level(), "warn");
    }

    #[test]
    fn log_level_borrows_from_local_config() {
        let local = config(Some(" debug "), None);
        let level = local.effective_log_level();
        assert_eq!(level, " debug ");
    }

    #[test]
    fn logging_stays_off_without_dir() {
        assert!(!config(None, None).init_logging().unwrap());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        assert!(config(Some("info"), Some("logs")).init_logging().is_err());
    }
}
