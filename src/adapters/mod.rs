// Adapters - External system implementations

pub mod bili_http;
pub mod process_tokio;
pub mod push_http;
pub mod toml_config;
pub mod tracing_log;
pub mod zimu_http;

// Re-export adapters
pub use bili_http::BiliResolver;
pub use process_tokio::TokioProcessAdapter;
pub use push_http::{HttpPush, LogPush};
pub use toml_config::Settings;
pub use zimu_http::ZimuClipLookup;
