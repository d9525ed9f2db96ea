//! Common utilities and helpers

pub mod time;

pub use time::{format_timestamp, TimeParser};
