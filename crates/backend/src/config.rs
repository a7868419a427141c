use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: usize,
    pub static_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            db_pool_size: lookup("DB_POOL_SIZE")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("DB_POOL_SIZE must be a valid number")?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))),
            log_dir: lookup("LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|value| parse_flag(&value))
                .transpose()
                .context("RUN_MIGRATIONS must be true or false")?
                .unwrap_or(false),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/fyyur")]))
                .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.db_pool_size, 10);
        assert!(config.static_dir.ends_with("static"));
        assert!(config.log_dir.is_none());
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/fyyur"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DB_POOL_SIZE", "3"),
            ("LOG_DIR", "/var/log/fyyur"),
            ("RUN_MIGRATIONS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.db_pool_size, 3);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/fyyur")));
        assert!(config.run_migrations);
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_bad_numbers_and_flags() {
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/fyyur"),
            ("PORT", "eighty"),
        ]))
        .is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/fyyur"),
            ("RUN_MIGRATIONS", "sometimes"),
        ]))
        .is_err());
    }
}
