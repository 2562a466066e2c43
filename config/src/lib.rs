use std::fs::File;

use anyhow::{Context, Result};
use api::ApiConfig;
use db::DbConfig;
use log::LogConfig;
use serde::Deserialize;

pub mod api;
pub mod db;
pub mod log;

#[derive(Deserialize)]
pub struct Config {
    log: LogConfig,
    #[serde(default)]
    db: DbConfig,
    api: ApiConfig,
}

impl Config {
    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn db(&self) -> &DbConfig {
        &self.db
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }
}

/// Reads the YAML file at `path`, then lets the `POSTGRES_*` environment
/// variables override the database section.
pub fn from_path(path: &str) -> Result<Config> {
    let file = File::open(path).with_context(|| format!("Failed to open config file {path}"))?;
    let mut config: Config = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to parse config file {path}"))?;
    config.db.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

pub fn from_str_with_env<F: Fn(&str) -> Option<String>>(yaml: &str, lookup: F) -> Result<Config> {
    let mut config: Config = serde_yaml::from_str(yaml)?;
    config.db.apply_env(lookup);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::*;
    use crate::db::postgres::{ENV_DB, ENV_HOST, ENV_PASSWORD, ENV_USER};

    const BASE: &str = r#"
log:
  display_level: true
  level_filter: info
db:
  postgres:
    user: goodsy
    password: secret
    host: localhost
    port: "5432"
    db_name: goodsy
    max_connections: 4
api:
  rest:
    host: 0.0.0.0
    port: 80
    timeout: 30s
"#;

    const WITHOUT_DB: &str = r#"
log:
  display_level: false
  level_filter: warn
api:
  rest:
    host: 127.0.0.1
    port: 8080
    workers: 2
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_full_file() {
        let config = from_str_with_env(BASE, no_env).unwrap();
        assert!(*config.log().display_level());
        assert_eq!(config.log().level_filter(), "info");
        assert_eq!(config.api().rest().host(), "0.0.0.0");
        assert_eq!(*config.api().rest().port(), 80);
        assert_eq!(*config.api().rest().timeout(), Duration::from_secs(30));
        assert!(config.api().rest().allowed_origin().is_none());
        let postgres = config.db().postgres().as_ref().unwrap();
        assert_eq!(postgres.user(), "goodsy");
        assert_eq!(*postgres.max_connections(), 4);
        assert!(config.db().sqlite().is_none());
    }

    #[test]
    fn env_overrides_file_values() {
        let env = HashMap::from([(ENV_HOST, "dbpostgres"), (ENV_PASSWORD, "from-env")]);
        let config =
            from_str_with_env(BASE, |key| env.get(key).map(|v| (*v).to_owned())).unwrap();
        let postgres = config.db().postgres().as_ref().unwrap();
        assert_eq!(postgres.host(), "dbpostgres");
        assert_eq!(postgres.password(), "from-env");
        assert_eq!(postgres.user(), "goodsy");
        assert_eq!(postgres.port(), "5432");
    }

    #[test]
    fn env_alone_builds_postgres_section() {
        let env = HashMap::from([
            (ENV_USER, "u"),
            (ENV_PASSWORD, "p"),
            (ENV_DB, "d"),
            (ENV_HOST, "h"),
        ]);
        let config =
            from_str_with_env(WITHOUT_DB, |key| env.get(key).map(|v| (*v).to_owned())).unwrap();
        let postgres = config.db().postgres().as_ref().unwrap();
        assert_eq!(postgres.db_name(), "d");
        assert_eq!(postgres.port(), "5432");
        assert_eq!(*config.api().rest().workers(), Some(2));
        assert_eq!(*config.api().rest().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_env_does_not_build_postgres_section() {
        let env = HashMap::from([(ENV_USER, "u"), (ENV_HOST, "h")]);
        let config =
            from_str_with_env(WITHOUT_DB, |key| env.get(key).map(|v| (*v).to_owned())).unwrap();
        assert!(config.db().postgres().is_none());
    }
}
