//! Utility functions and helpers

pub mod units;

use anyhow::{anyhow, Result};
use std::time::Duration;

/// Nanoseconds per millisecond
pub const NS_PER_MS: f64 = 1_000_000.0;

/// Convert a nanosecond quantity to milliseconds
pub fn ns_to_ms(ns: f64) -> f64 {
    ns / NS_PER_MS
}

/// Parse a duration string (e.g., "500ms", "30s", "5m", "1h")
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if let Some(num_str) = s.strip_suffix("ms") {
        let millis: u64 = num_str.parse()?;
        Ok(Duration::from_millis(millis))
    } else if let Some(num_str) = s.strip_suffix('s') {
        let secs: u64 = num_str.parse()?;
        Ok(Duration::from_secs(secs))
    } else if let Some(num_str) = s.strip_suffix('m') {
        let mins: u64 = num_str.parse()?;
        Ok(Duration::from_secs(checked_secs(mins, 60)?))
    } else if let Some(num_str) = s.strip_suffix('h') {
        let hours: u64 = num_str.parse()?;
        Ok(Duration::from_secs(checked_secs(hours, 3600)?))
    } else {
        // Default to seconds if no suffix
        let secs: u64 = s.parse()?;
        Ok(Duration::from_secs(secs))
    }
}

fn checked_secs(count: u64, secs_per_unit: u64) -> Result<u64> {
    count
        .checked_mul(secs_per_unit)
        .ok_or_else(|| anyhow!("Duration too large: {} x {}s", count, secs_per_unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s").unwrap().as_secs(), 30);
        assert_eq!(parse_duration("5m").unwrap().as_secs(), 300);
        assert_eq!(parse_duration("1h").unwrap().as_secs(), 3600);
        assert_eq!(parse_duration("60").unwrap().as_secs(), 60);
        assert_eq!(parse_duration("250ms").unwrap().as_millis(), 250);
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
        assert!(parse_duration(&format!("{}h", u64::MAX / 1000)).is_err());
        assert_eq!(
            parse_duration(&format!("{}h", u64::MAX / 3600)).unwrap().as_secs(),
            (u64::MAX / 3600) * 3600
        );
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn test_ns_to_ms() {
        assert_eq!(ns_to_ms(20_000_000.0), 20.0);
        assert_eq!(ns_to_ms(0.0), 0.0);
    }
}
