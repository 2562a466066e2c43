//! ISO 8601 date handling for request and response bodies.
//!
//! Outgoing dates are always UTC with millisecond precision, e.g.
//! `2022-02-05T15:00:00.000Z`. Incoming dates may carry any offset and may omit
//! the seconds; a date without an offset is read as UTC and a bare date is
//! midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const OFFSET_NO_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(value, OFFSET_NO_SECONDS_FORMAT) {
        return Ok(date.with_timezone(&Utc));
    }

    let naive = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);
    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(Utc.from_utc_datetime(&date));
        }
    }

    // A bare date is midnight UTC.
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|date| Utc.from_utc_datetime(&date))
            .ok_or_else(|| format!("Invalid ISO 8601 date {value:?}")),
        Err(err) => Err(format!("Invalid ISO 8601 date {value:?}: {err}")),
    }
}

pub fn format(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse(&value).map_err(de::Error::custom)
}

pub fn deserialize_option<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse(&value).map(Some).map_err(de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets_and_naive_dates() {
        let expected = Utc.with_ymd_and_hms(2022, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(parse("2022-02-01T12:00:00.000Z").unwrap(), expected);
        assert_eq!(parse("2022-02-01T15:00:00+03:00").unwrap(), expected);
        assert_eq!(parse("2022-02-01T12:00:00").unwrap(), expected);
    }

    #[test]
    fn parses_dates_without_seconds_or_time() {
        let noon = Utc.with_ymd_and_hms(2022, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(parse("2022-02-01T12:00Z").unwrap(), noon);
        assert_eq!(parse("2022-02-01T12:00").unwrap(), noon);
        assert_eq!(parse("2022-02-01T15:00+03:00").unwrap(), noon);

        let midnight = Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(parse("2022-02-01").unwrap(), midnight);

        assert!(parse("2022-02-99").is_err());
        assert!(parse("2022-02-01T25:00Z").is_err());
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse("2022-02-99T12:00:00.000Z").is_err());
        assert!(parse("2022-02-30T12:00:00").is_err());
        assert!(parse("yesterday").is_err());
    }

    #[test]
    fn formats_with_millis_and_zulu() {
        let date = Utc.with_ymd_and_hms(2022, 2, 5, 15, 0, 0).unwrap();
        assert_eq!(format(&date), "2022-02-05T15:00:00.000Z");
    }
}
