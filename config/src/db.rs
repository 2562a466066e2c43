use serde::Deserialize;

use self::{postgres::DbPostgresConfig, sqlite::DbSqliteConfig};

pub mod postgres;
pub mod sqlite;

#[derive(Deserialize, Default)]
pub struct DbConfig {
    postgres: Option<DbPostgresConfig>,
    sqlite: Option<DbSqliteConfig>,
}

impl DbConfig {
    pub fn postgres(&self) -> &Option<DbPostgresConfig> {
        &self.postgres
    }

    pub fn sqlite(&self) -> &Option<DbSqliteConfig> {
        &self.sqlite
    }

    pub(crate) fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        match &mut self.postgres {
            Some(postgres) => postgres.apply_env(&lookup),
            None => self.postgres = DbPostgresConfig::from_env(&lookup),
        }
    }
}
