use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::util::iso8601;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticReqQuery {
    #[serde(default, deserialize_with = "iso8601::deserialize_option")]
    date_start: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "iso8601::deserialize_option")]
    date_end: Option<DateTime<Utc>>,
}

impl StatisticReqQuery {
    pub fn date_start(&self) -> &Option<DateTime<Utc>> {
        &self.date_start
    }

    pub fn date_end(&self) -> &Option<DateTime<Utc>> {
        &self.date_end
    }
}
