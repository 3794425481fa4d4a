//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DATA_DIR_VAR: &str = "EXPENSE_TRACKER_DATA_DIR";
pub const BIND_VAR: &str = "EXPENSE_TRACKER_BIND";
pub const USER_VAR: &str = "EXPENSE_TRACKER_USER";
pub const RECHECK_SECS_VAR: &str = "EXPENSE_TRACKER_RECHECK_SECS";
pub const CORS_ORIGIN_VAR: &str = "EXPENSE_TRACKER_CORS_ORIGIN";

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_USER: &str = "local";
const DEFAULT_RECHECK_SECS: u64 = 3600;
/// One week
pub const MAX_RECHECK_SECS: u64 = 7 * 24 * 60 * 60;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBindAddress { var: &'static str, value: String },
    #[error("{var} must be a whole number of seconds no larger than {max}: {value}")]
    InvalidRecheckInterval {
        var: &'static str,
        value: String,
        max: u64,
    },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
    #[error("Could not determine home directory; set {0}")]
    NoHomeDirectory(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Root of the CSV/YAML data files
    pub data_directory: PathBuf,
    pub bind_address: SocketAddr,
    /// User processed by the background re-check and assumed when a request has no user header
    pub default_user_id: String,
    /// `None` disables the periodic re-check
    pub recheck_interval: Option<Duration>,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_directory = match lookup(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(non_empty(DATA_DIR_VAR, dir)?),
            None => {
                let home = lookup("HOME")
                    .or_else(|| lookup("USERPROFILE"))
                    .ok_or(ConfigError::NoHomeDirectory(DATA_DIR_VAR))?;
                PathBuf::from(home).join("Documents").join("Recurring Expenses")
            }
        };

        let bind = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_address = bind
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddress {
                var: BIND_VAR,
                value: bind.clone(),
            })?;

        let default_user_id = match lookup(USER_VAR) {
            Some(user) => non_empty(USER_VAR, user)?,
            None => DEFAULT_USER.to_string(),
        };

        let recheck_secs = match lookup(RECHECK_SECS_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs <= MAX_RECHECK_SECS => secs,
                _ => {
                    return Err(ConfigError::InvalidRecheckInterval {
                        var: RECHECK_SECS_VAR,
                        value,
                        max: MAX_RECHECK_SECS,
                    })
                }
            },
            None => DEFAULT_RECHECK_SECS,
        };
        let recheck_interval = (recheck_secs > 0).then(|| Duration::from_secs(recheck_secs));

        let cors_origin = match lookup(CORS_ORIGIN_VAR) {
            Some(origin) => non_empty(CORS_ORIGIN_VAR, origin)?,
            None => DEFAULT_CORS_ORIGIN.to_string(),
        };

        Ok(Self {
            data_directory,
            bind_address,
            default_user_id,
            recheck_interval,
            cors_origin,
        })
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ConfigError::Empty { var })
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("HOME", "/home/sam")]).unwrap();
        assert_eq!(
            config.data_directory,
            PathBuf::from("/home/sam/Documents/Recurring Expenses")
        );
        assert_eq!(config.bind_address, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.default_user_id, "local");
        assert_eq!(config.recheck_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.cors_origin, "http://localhost:8080");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            (DATA_DIR_VAR, "/srv/expenses"),
            (BIND_VAR, "0.0.0.0:8000"),
            (USER_VAR, " sam "),
            (RECHECK_SECS_VAR, "0"),
            (CORS_ORIGIN_VAR, "https://app.example.com"),
        ])
        .unwrap();
        assert_eq!(config.data_directory, PathBuf::from("/srv/expenses"));
        assert_eq!(config.bind_address.port(), 8000);
        assert_eq!(config.default_user_id, "sam");
        assert_eq!(config.recheck_interval, None);
        assert_eq!(config.cors_origin, "https://app.example.com");
    }

    #[test]
    fn test_recheck_interval_cap() {
        let week = MAX_RECHECK_SECS.to_string();
        let config = config(&[(DATA_DIR_VAR, "/tmp"), (RECHECK_SECS_VAR, week.as_str())]).unwrap();
        assert_eq!(config.recheck_interval, Some(Duration::from_secs(MAX_RECHECK_SECS)));

        let too_long = (MAX_RECHECK_SECS + 1).to_string();
        assert_eq!(
            AppConfig::from_lookup(|name| match name {
                DATA_DIR_VAR => Some("/tmp".to_string()),
                RECHECK_SECS_VAR => Some(too_long.clone()),
                _ => None,
            }),
            Err(ConfigError::InvalidRecheckInterval {
                var: RECHECK_SECS_VAR,
                value: too_long.clone(),
                max: MAX_RECHECK_SECS,
            })
        );
    }

    #[test]
    fn test_userprofile_fallback() {
        let config = config(&[("USERPROFILE", "C:\\Users\\sam")]).unwrap();
        assert!(config.data_directory.ends_with("Recurring Expenses"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(matches!(
            config(&[(DATA_DIR_VAR, "/tmp"), (BIND_VAR, "localhost")]),
            Err(ConfigError::InvalidBindAddress { .. })
        ));
        assert!(matches!(
            config(&[(DATA_DIR_VAR, "/tmp"), (RECHECK_SECS_VAR, "-5")]),
            Err(ConfigError::InvalidRecheckInterval { .. })
        ));
        let overflowing = u64::MAX.to_string();
        assert!(matches!(
            config(&[(DATA_DIR_VAR, "/tmp"), (RECHECK_SECS_VAR, overflowing.as_str())]),
            Err(ConfigError::InvalidRecheckInterval { .. })
        ));
        assert_eq!(
            config(&[(DATA_DIR_VAR, "/tmp"), (USER_VAR, "  ")]),
            Err(ConfigError::Empty { var: USER_VAR })
        );
        assert_eq!(config(&[]), Err(ConfigError::NoHomeDirectory(DATA_DIR_VAR)));
    }
}
