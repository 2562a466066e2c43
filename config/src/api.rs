use std::time::Duration;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct ApiConfig {
    rest: ApiRestConfig,
}

impl ApiConfig {
    pub fn rest(&self) -> &ApiRestConfig {
        &self.rest
    }
}

#[derive(Deserialize)]
pub struct ApiRestConfig {
    host: String,
    port: u16,
    allowed_origin: Option<String>,
    workers: Option<usize>,
    #[serde(default = "default_timeout", deserialize_with = "duration_str::deserialize_duration")]
    timeout: Duration,
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

impl ApiRestConfig {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &u16 {
        &self.port
    }

    pub fn allowed_origin(&self) -> &Option<String> {
        &self.allowed_origin
    }

    pub fn workers(&self) -> &Option<usize> {
        &self.workers
    }

    pub fn timeout(&self) -> &Duration {
        &self.timeout
    }
}
