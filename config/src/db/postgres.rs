use serde::Deserialize;

pub const ENV_USER: &str = "POSTGRES_USER";
pub const ENV_PASSWORD: &str = "POSTGRES_PASSWORD";
pub const ENV_DB: &str = "POSTGRES_DB";
pub const ENV_HOST: &str = "POSTGRES_HOST";
pub const ENV_PORT: &str = "POSTGRES_PORT";

const DEFAULT_PORT: &str = "5432";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Deserialize)]
pub struct DbPostgresConfig {
    user: String,
    password: String,
    host: String,
    #[serde(default = "default_port")]
    port: String,
    db_name: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

fn default_port() -> String {
    DEFAULT_PORT.to_owned()
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl DbPostgresConfig {
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn max_connections(&self) -> &u32 {
        &self.max_connections
    }

    pub(crate) fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if let Some(user) = lookup(ENV_USER) {
            self.user = user;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(db_name) = lookup(ENV_DB) {
            self.db_name = db_name;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port;
        }
    }

    /// Builds a section purely from the environment. All of user, password,
    /// database and host have to be present.
    pub(crate) fn from_env<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<Self> {
        Some(Self {
            user: lookup(ENV_USER)?,
            password: lookup(ENV_PASSWORD)?,
            host: lookup(ENV_HOST)?,
            port: lookup(ENV_PORT).unwrap_or_else(default_port),
            db_name: lookup(ENV_DB)?,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }
}
