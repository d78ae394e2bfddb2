use std::env;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_FILE: &str = "server.log";

fn env_bool<T: AsRef<str>>(s: T) -> bool {
    let s = s.as_ref().trim();
    !(s.is_empty() || s == "0" || s.to_ascii_lowercase() == "false")
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub debug: bool,
    pub port: u16,
    pub database_url: Option<String>,
    /// `LOG_FILE`, set to an empty value to log to stdout only.
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Config, AppError> {
        Config::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Config, AppError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let debug = var("DEBUG").map(env_bool).unwrap_or(false);
        let port = match var("PORT") {
            Some(port) => port.trim().parse().map_err(|_| AppError::InvalidConfig("PORT"))?,
            None => DEFAULT_PORT,
        };
        let database_url = var("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let log_file = match var("LOG_FILE") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        };
        Ok(Config {
            debug,
            port,
            database_url,
            log_file,
        })
    }
}

#[test]
fn config_from_vars() {
    let config = Config::from_vars(|key| match key {
        "DEBUG" => Some("true".to_string()),
        "PORT" => Some("8080".to_string()),
        "DATABASE_URL" => Some("postgres://localhost/interviews".to_string()),
        "LOG_FILE" => Some("".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(config.debug);
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/interviews"));
    assert!(config.log_file.is_none());

    let config = Config::from_vars(|key| match key {
        "DEBUG" => Some("0".to_string()),
        "DATABASE_URL" => Some("".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(!config.debug);
    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.database_url.is_none());
    assert_eq!(config.log_file, Some(PathBuf::from("server.log")));

    let error = Config::from_vars(|key| (key == "PORT").then(|| "eighty".to_string())).unwrap_err();
    assert_eq!(error.to_string(), "Invalid configuration value of PORT");
}
