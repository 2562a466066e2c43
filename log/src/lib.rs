use std::{fmt::Display, str::FromStr};

use backtrace::Backtrace;
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};

/// Installs the global `tracing` subscriber.
///
/// `level_filter` takes the usual `tracing` names (`trace`, `debug`, `info`,
/// `warn`, `error`, `off`). A second call is ignored so tests may share a
/// process with the binary setup.
pub fn init(display_level: &bool, level_filter: &str) {
    let level_filter = match parse_level_filter(level_filter) {
        Ok(level) => level,
        Err(err) => panic(None, format!("[Log] Invalid level_filter: {err}")),
    };

    let _ = tracing_subscriber::fmt()
        .with_level(*display_level)
        .with_max_level(level_filter)
        .with_target(false)
        .try_init();
}

fn parse_level_filter(level_filter: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(level_filter.trim()).map_err(|err| format!("{level_filter}: {err}"))
}

pub fn trace<T: Display>(prefix: Option<&str>, msg: T) {
    match prefix {
        Some(prefix) => trace!("{prefix} {msg}"),
        None => trace!("🐾 {msg}"),
    }
}

pub fn debug<T: Display>(prefix: Option<&str>, msg: T) {
    match prefix {
        Some(prefix) => debug!("{prefix} {msg}"),
        None => debug!("🐞 {msg}"),
    };
}

pub fn info<T: Display>(prefix: Option<&str>, msg: T) {
    match prefix {
        Some(prefix) => info!("{prefix} {msg}"),
        None => info!("📢 {msg}"),
    };
}

pub fn warn<T: Display>(prefix: Option<&str>, msg: T) {
    match prefix {
        Some(prefix) => warn!("{prefix} {msg}"),
        None => warn!("⚠️ {msg}"),
    };
}

pub fn error<T: Display>(prefix: Option<&str>, msg: T) {
    let prefix = prefix.unwrap_or("🚨");
    if backtrace_enabled() {
        error!("{prefix} {msg}\n{:?}", Backtrace::new());
    } else {
        error!("{prefix} {msg}");
    }
}

pub fn panic<T: Display>(prefix: Option<&str>, msg: T) -> ! {
    match prefix {
        Some(prefix) => panic!("{prefix} {msg}"),
        None => panic!("☠️ {msg}"),
    };
}

fn backtrace_enabled() -> bool {
    std::env::var("RUST_BACKTRACE").is_ok_and(|var| var == "1" || var == "full")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_level_names() {
        assert_eq!(parse_level_filter("info"), Ok(LevelFilter::INFO));
        assert_eq!(parse_level_filter(" debug "), Ok(LevelFilter::DEBUG));
        assert_eq!(parse_level_filter("off"), Ok(LevelFilter::OFF));
    }

    #[test]
    fn rejects_unknown_level_names() {
        assert!(parse_level_filter("loud").is_err());
    }

    #[test]
    #[should_panic(expected = "config missing")]
    fn panic_keeps_message() {
        panic(Some("☠️"), "config missing");
    }
}
