use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::util::iso8601;

#[derive(Deserialize)]
pub struct SalesReqQuery {
    #[serde(deserialize_with = "iso8601::deserialize")]
    date: DateTime<Utc>,
}

impl SalesReqQuery {
    pub fn date(&self) -> &DateTime<Utc> {
        &self.date
    }
}
