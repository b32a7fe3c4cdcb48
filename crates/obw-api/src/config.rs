//! # Server Configuration
//!
//! Read once at startup from the environment. Unparseable values fall back
//! to their defaults with a warning rather than aborting startup.
//!
//! | Variable             | Default  |
//! |----------------------|----------|
//! | `OBW_API_PORT`       | `8080`   |
//! | `OBW_LOG_FORMAT`     | `pretty` |
//! | `OBW_SEED_DEMO`      | `false`  |
//! | `OBW_MAX_BODY_BYTES` | 2 MiB    |

use std::str::FromStr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub log_format: LogFormat,
    /// Load reference master data and a demo policy at startup.
    pub seed_demo: bool,
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_format: LogFormat::Pretty,
            seed_demo: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or_default(&lookup, "OBW_API_PORT", defaults.port),
            log_format: parse_or_default(&lookup, "OBW_LOG_FORMAT", defaults.log_format),
            seed_demo: lookup("OBW_SEED_DEMO")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.seed_demo),
            max_body_bytes: parse_or_default(
                &lookup,
                "OBW_MAX_BODY_BYTES",
                defaults.max_body_bytes,
            ),
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, fallback = ?default, "ignoring invalid setting");
                default
            }
        },
    }
}
