//! Runtime configuration read from `BACKOFFICE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{BackofficeError, Result};

const PREFIX: &str = "BACKOFFICE_";

/// Longest accepted token lifetime, ten years.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub main_db: PathBuf,
    pub invoice_db: PathBuf,
    pub tnc_db: PathBuf,
    pub storage_dir: PathBuf,
    pub app_url: String,
    pub debug: bool,
    pub token_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for an admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| BackofficeError::config(format!("invalid BIND_ADDR: {e}")))?;

        let data_dir = match var("DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let db_path = |name: &str, file: &str| {
            var(name)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(file))
        };

        let token_ttl_days = match var("TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
                .ok_or_else(|| {
                    BackofficeError::config(format!(
                        "invalid TOKEN_TTL_DAYS: {raw} (expected 1 to {MAX_TOKEN_TTL_DAYS})"
                    ))
                })?,
            None => 7,
        };

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => {
                return Err(BackofficeError::config(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together",
                ))
            }
        };

        Ok(Self {
            bind_addr,
            main_db: db_path("MAIN_DB", "main.db"),
            invoice_db: db_path("INVOICE_DB", "invoice.db"),
            tnc_db: db_path("TNC_DB", "tnc.db"),
            storage_dir: var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("storage")),
            app_url: var("APP_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            debug: var("DEBUG").map(|v| parse_bool(&v)).unwrap_or(false),
            token_ttl_days,
            cors_origins: var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            bootstrap_admin,
        })
    }

    /// Human form of the token lifetime, as reported by the login endpoint.
    pub fn token_ttl_label(&self) -> String {
        if self.token_ttl_days == 1 {
            "1 day".to_string()
        } else {
            format!("{} days", self.token_ttl_days)
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw, "1" | "true" | "TRUE" | "yes" | "YES")
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "vantripper", "backoffice")
        .ok_or_else(|| BackofficeError::config("Failed to determine project directories"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (format!("{PREFIX}{k}"), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_under_data_dir() {
        let config = config_from(&[("DATA_DIR", "/tmp/bo")]).expect("config");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.main_db, PathBuf::from("/tmp/bo/main.db"));
        assert_eq!(config.tnc_db, PathBuf::from("/tmp/bo/tnc.db"));
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/bo/storage"));
        assert_eq!(config.token_ttl_days, 7);
        assert_eq!(config.token_ttl_label(), "7 days");
        assert!(!config.debug);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATA_DIR", "/tmp/bo"),
            ("INVOICE_DB", "/srv/invoice.sqlite"),
            ("APP_URL", "https://example.com/"),
            ("DEBUG", "true"),
            ("CORS_ORIGINS", "https://a.test, https://b.test"),
        ])
        .expect("config");
        assert_eq!(config.invoice_db, PathBuf::from("/srv/invoice.sqlite"));
        assert_eq!(config.app_url, "https://example.com");
        assert!(config.debug);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("DATA_DIR", "/tmp"), ("BIND_ADDR", "nope")]).is_err());
        assert!(config_from(&[("DATA_DIR", "/tmp"), ("TOKEN_TTL_DAYS", "0")]).is_err());
        assert!(config_from(&[("DATA_DIR", "/tmp"), ("BOOTSTRAP_ADMIN_EMAIL", "a@b.c")]).is_err());
    }

    #[test]
    fn test_token_ttl_upper_bound() {
        let ttl = |raw: &str| config_from(&[("DATA_DIR", "/tmp"), ("TOKEN_TTL_DAYS", raw)]);

        let config = ttl("3650").expect("ten years is accepted");
        assert_eq!(config.token_ttl_days, MAX_TOKEN_TTL_DAYS);
        assert_eq!(ttl("1").expect("config").token_ttl_label(), "1 day");

        for raw in ["3651", "9223372036854775807", "-5"] {
            match ttl(raw) {
                Err(BackofficeError::Config(message)) => assert!(message.contains(raw)),
                other => panic!("expected config error for {raw}, got {other:?}"),
            }
        }
    }
}
