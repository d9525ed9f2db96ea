// TOML config adapter - Typed settings loaded from TOML files and the environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SegmentError, SegmentResult};

/// Browser user agent the upstream CDN accepts
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/111.0.0.0 Safari/537.36";

/// Files probed in order when no `--config` is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["segmenter.toml", "config/segmenter.toml"];

/// Environment variables and the settings they override
pub const ENV_MAPPINGS: [(&str, &str); 12] = [
    ("SEGMENTER_OUTPUT_DIR", "segment.output_dir"),
    ("SEGMENTER_SERIALIZE_DUPLICATES", "segment.serialize_duplicates"),
    ("SEGMENTER_LOCAL_ROOT", "media.local_root"),
    ("SEGMENTER_FFMPEG", "media.ffmpeg"),
    ("SEGMENTER_FFPROBE", "media.ffprobe"),
    ("SEGMENTER_BILI_API_URL", "upstream.api_url"),
    ("SEGMENTER_BILI_COOKIE", "upstream.cookie"),
    ("SEGMENTER_ZIMU_API_URL", "zimu.api_url"),
    ("SEGMENTER_PUSH_URL", "push.url"),
    ("SEGMENTER_PUSH_TIMEOUT_SECS", "push.timeout_secs"),
    ("SEGMENTER_LOG_LEVEL", "log.level"),
    ("SEGMENTER_LOG_JSON", "log.json"),
];

/// Segment output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSettings {
    /// Directory for final segments and job intermediates
    pub output_dir: PathBuf,
    /// Take a per-filename lock before the cache check
    pub serialize_duplicates: bool,
}

impl Default for SegmentSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("segments"),
            serialize_duplicates: false,
        }
    }
}

/// Local media and tool locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Replaces the first path segment of local clips' play URLs
    pub local_root: String,
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            local_root: "records".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

/// Remote platform API and CDN settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub api_url: String,
    /// Login cookie sent to the web API
    pub cookie: String,
    pub user_agent: String,
    pub referer: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.bilibili.com".to_string(),
            cookie: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: "https://www.bilibili.com".to_string(),
            timeout_secs: 15,
        }
    }
}

/// CRUD backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZimuSettings {
    pub api_url: String,
}

impl Default for ZimuSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:4000".to_string(),
        }
    }
}

/// Push notification endpoint; log-only when unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushSettings {
    pub url: Option<String>,
    /// Bounds how long a finished job waits on the endpoint
    pub timeout_secs: u64,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 5,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// All settings of the segmenter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub segment: SegmentSettings,
    pub media: MediaSettings,
    pub upstream: UpstreamSettings,
    pub zimu: ZimuSettings,
    pub push: PushSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Parse settings from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> SegmentResult<Self> {
        toml::from_str(content)
            .map_err(|e| SegmentError::config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load settings from a TOML file
    pub fn load_file(path: &Path) -> SegmentResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SegmentError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(settings)
    }

    /// First existing default config file, if any
    pub fn discover() -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Apply one `section.key` override
    pub fn set(&mut self, key: &str, value: &str) -> SegmentResult<()> {
        let parse_bool = |value: &str| {
            value.parse::<bool>().map_err(|e| {
                SegmentError::config(format!("Invalid boolean value for {}: {}", key, e))
            })
        };

        match key {
            "segment.output_dir" => self.segment.output_dir = PathBuf::from(value),
            "segment.serialize_duplicates" => self.segment.serialize_duplicates = parse_bool(value)?,
            "media.local_root" => self.media.local_root = value.to_string(),
            "media.ffmpeg" => self.media.ffmpeg = value.to_string(),
            "media.ffprobe" => self.media.ffprobe = value.to_string(),
            "upstream.api_url" => self.upstream.api_url = value.to_string(),
            "upstream.cookie" => self.upstream.cookie = value.to_string(),
            "zimu.api_url" => self.zimu.api_url = value.to_string(),
            "push.url" => {
                self.push.url = Some(value.to_string()).filter(|url| !url.is_empty())
            }
            "push.timeout_secs" => {
                self.push.timeout_secs = value.parse().map_err(|e| {
                    SegmentError::config(format!("Invalid number for {}: {}", key, e))
                })?
            }
            "log.level" => self.log.level = value.to_string(),
            "log.json" => self.log.json = parse_bool(value)?,
            other => {
                return Err(SegmentError::config(format!(
                    "Unknown configuration key: {}",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Apply overrides from a variable lookup; returns how many were applied
    pub fn apply_env<F>(&mut self, lookup: F) -> SegmentResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for (env_var, key) in ENV_MAPPINGS {
            if let Some(value) = lookup(env_var) {
                self.set(key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Validate configuration
    pub fn validate(&self) -> SegmentResult<()> {
        if self.segment.output_dir.as_os_str().is_empty() {
            return Err(SegmentError::config("segment.output_dir must not be empty"));
        }
        if self.media.ffmpeg.is_empty() || self.media.ffprobe.is_empty() {
            return Err(SegmentError::config("media.ffmpeg and media.ffprobe must not be empty"));
        }
        if self.push.timeout_secs == 0 {
            return Err(SegmentError::config("push.timeout_secs must be at least 1"));
        }
        match self.log.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(SegmentError::config(format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    other
                )))
            }
        }
        Ok(())
    }
}
