// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::error::{SegmentError, SegmentResult};

/// Build the filter; `RUST_LOG` wins over the configured level
pub fn env_filter(level: &str) -> SegmentResult<EnvFilter> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(level),
    }
    .map_err(|e| SegmentError::config(format!("Invalid log filter: {}", e)))
}

/// Install the global subscriber on stderr
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(level: &str, json: bool) -> SegmentResult<()> {
    let filter = env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    // A second init fails only because a subscriber already exists
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_accepts_levels_and_directives() {
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("zimu_segmenter=debug,media_tool=trace").is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        assert!(init("info", false).is_ok());
        assert!(init("debug", true).is_ok());
    }
}
