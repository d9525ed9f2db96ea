//! Time parsing and formatting utilities

use chrono::{NaiveTime, Timelike};

use crate::error::{SegmentError, SegmentResult};

/// Fixed input format for segment boundaries
const TIME_FORMAT: &str = "%H:%M:%S%.f";

/// Time parser for `HH:MM:SS.mmm` segment boundaries
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeParser {
    /// Replace the first decimal comma with a dot
    pub fn normalize(&self, time_str: &str) -> String {
        time_str.trim().replacen(',', ".", 1)
    }

    /// Parse a normalized time string to seconds
    pub fn parse_time(&self, time_str: &str) -> SegmentResult<f64> {
        let time = NaiveTime::parse_from_str(time_str, TIME_FORMAT).map_err(|_| {
            SegmentError::InvalidTime {
                time: time_str.to_string(),
            }
        })?;

        Ok(time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1_000_000_000.0)
    }
}

/// Format seconds as `HH:MM:SS,mmm` for log output
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_and_dot_parse_identically() {
        let parser = TimeParser::new();
        let dot = parser.parse_time(&parser.normalize("00:01:02.500")).unwrap();
        let comma = parser.parse_time(&parser.normalize("00:01:02,500")).unwrap();
        assert_eq!(dot, 62.5);
        assert_eq!(comma, 62.5);
    }

    #[test]
    fn test_parse_without_fraction() {
        let parser = TimeParser::new();
        assert_eq!(parser.parse_time("01:00:00").unwrap(), 3600.0);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        let parser = TimeParser::new();
        assert!(parser.parse_time("62.5").is_err());
        assert!(parser.parse_time("01:02").is_err());
        assert!(parser.parse_time("aa:bb:cc.ddd").is_err());
        assert!(parser.parse_time("").is_err());
    }

    #[test]
    fn test_normalize_only_touches_first_comma() {
        let parser = TimeParser::new();
        assert_eq!(parser.normalize(" 00:00:01,250 "), "00:00:01.250");
        assert_eq!(parser.normalize("1,2,3"), "1.2,3");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(62.5), "00:01:02,500");
        assert_eq!(format_timestamp(3723.004), "01:02:03,004");
        assert_eq!(format_timestamp(-1.0), "00:00:00,000");
    }
}
