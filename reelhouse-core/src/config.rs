//! Runtime configuration loaded from the environment (and an optional `.env`).

use std::{env, fmt, time::Duration};

use zeroize::Zeroizing;

use crate::error::{CoreError, Result};
use crate::upload::UploadPolicy;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_CONTINUE_WATCHING_LIMIT: usize = 10;

/// Bearer token for a media host API. Zeroed on drop, never printed.
#[derive(Clone)]
pub struct ApiToken(Zeroizing<String>);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub stream: StreamHostConfig,
    pub images: ImageHostConfig,
    pub upload: UploadPolicy,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Video host (Cloudflare Stream style API).
#[derive(Debug, Clone)]
pub struct StreamHostConfig {
    pub api_base: String,
    pub account_id: Option<String>,
    pub api_token: Option<ApiToken>,
    /// Playback host, e.g. `customer-xyz.cloudflarestream.com`.
    pub customer_subdomain: Option<String>,
    pub timeout: Duration,
}

/// Image host (Cloudflare Images style API).
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub api_base: String,
    pub account_id: Option<String>,
    pub api_token: Option<ApiToken>,
    /// Delivery base, e.g. `https://imagedelivery.net/<account-hash>`.
    pub delivery_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct WatchConfig {
    pub checkpoint_interval: Duration,
    pub continue_watching_limit: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            continue_watching_limit: DEFAULT_CONTINUE_WATCHING_LIMIT,
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_timeout = parse_duration(
            "UPLOAD_HTTP_TIMEOUT",
            get("UPLOAD_HTTP_TIMEOUT"),
            Duration::from_secs(600),
        )?;

        let database = DatabaseConfig {
            url: get("DATABASE_URL"),
            max_connections: parse_number("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
        };

        let stream = StreamHostConfig {
            api_base: get("STREAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            account_id: get("STREAM_ACCOUNT_ID"),
            api_token: get("STREAM_API_TOKEN").map(ApiToken::new),
            customer_subdomain: get("STREAM_CUSTOMER_SUBDOMAIN"),
            timeout: http_timeout,
        };

        let images = ImageHostConfig {
            api_base: get("IMAGES_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            account_id: get("IMAGES_ACCOUNT_ID"),
            api_token: get("IMAGES_API_TOKEN").map(ApiToken::new),
            delivery_url: get("IMAGES_DELIVERY_URL"),
            timeout: http_timeout,
        };

        let defaults = UploadPolicy::default();
        let upload = UploadPolicy {
            max_video_bytes: parse_number(
                "UPLOAD_MAX_VIDEO_BYTES",
                get("UPLOAD_MAX_VIDEO_BYTES"),
                DEFAULT_MAX_VIDEO_BYTES,
            )?,
            progress_interval: parse_duration(
                "UPLOAD_PROGRESS_INTERVAL",
                get("UPLOAD_PROGRESS_INTERVAL"),
                defaults.progress_interval,
            )?,
            progress_step: parse_number(
                "UPLOAD_PROGRESS_STEP",
                get("UPLOAD_PROGRESS_STEP"),
                defaults.progress_step,
            )?,
            progress_cap: defaults.progress_cap,
        };

        let watch = WatchConfig {
            checkpoint_interval: parse_duration(
                "WATCH_CHECKPOINT_INTERVAL",
                get("WATCH_CHECKPOINT_INTERVAL"),
                DEFAULT_CHECKPOINT_INTERVAL,
            )?,
            continue_watching_limit: parse_number(
                "WATCH_CONTINUE_LIMIT",
                get("WATCH_CONTINUE_LIMIT"),
                DEFAULT_CONTINUE_WATCHING_LIMIT,
            )?,
        };

        let config = Self {
            database,
            stream,
            images,
            upload,
            watch,
        };
        config.check_ranges()?;
        Ok(config)
    }

    /// Problems that do not prevent loading but will make some operations
    /// fail, e.g. missing upload credentials.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.database.url.is_none() {
            problems.push("DATABASE_URL is not set".to_string());
        }
        if self.stream.account_id.is_none() || self.stream.api_token.is_none() {
            problems.push(
                "STREAM_ACCOUNT_ID and STREAM_API_TOKEN are required for video uploads"
                    .to_string(),
            );
        }
        if self.images.account_id.is_none() || self.images.api_token.is_none() {
            problems.push(
                "IMAGES_ACCOUNT_ID and IMAGES_API_TOKEN are required for image uploads"
                    .to_string(),
            );
        }
        if self.images.delivery_url.is_none() {
            problems.push(
                "IMAGES_DELIVERY_URL is required to build image URLs".to_string(),
            );
        }
        problems
    }

    fn check_ranges(&self) -> Result<()> {
        if self.upload.progress_step == 0 {
            return Err(CoreError::Config(
                "UPLOAD_PROGRESS_STEP must be at least 1".to_string(),
            ));
        }
        if self.upload.progress_interval.is_zero() {
            return Err(CoreError::Config(
                "UPLOAD_PROGRESS_INTERVAL must be non-zero".to_string(),
            ));
        }
        if self.watch.checkpoint_interval.is_zero() {
            return Err(CoreError::Config(
                "WATCH_CHECKPOINT_INTERVAL must be non-zero".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(CoreError::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_duration(
    key: &str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration> {
    match raw {
        None => Ok(default),
        Some(raw) => humantime::parse_duration(&raw).map_err(|e| {
            CoreError::Config(format!("{key}: invalid duration '{raw}': {e}"))
        }),
    }
}

fn parse_number<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| {
            CoreError::Config(format!("{key}: invalid value '{raw}': {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.upload.max_video_bytes, 100 * 1024 * 1024);
        assert_eq!(config.upload.progress_interval, Duration::from_millis(200));
        assert_eq!(config.upload.progress_step, 5);
        assert_eq!(config.upload.progress_cap, 95);
        assert_eq!(config.watch.checkpoint_interval, Duration::from_secs(30));
        assert_eq!(config.watch.continue_watching_limit, 10);
        assert_eq!(config.stream.api_base, DEFAULT_API_BASE);
        assert_eq!(config.validate().len(), 4);
    }

    #[test]
    fn humantime_and_numbers_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("WATCH_CHECKPOINT_INTERVAL", "45s"),
            ("UPLOAD_PROGRESS_INTERVAL", "500ms"),
            ("UPLOAD_PROGRESS_STEP", "3"),
            ("UPLOAD_MAX_VIDEO_BYTES", "1024"),
            ("DATABASE_URL", "postgres://localhost/reelhouse"),
            ("STREAM_ACCOUNT_ID", "acct"),
            ("STREAM_API_TOKEN", "secret-token"),
            ("IMAGES_ACCOUNT_ID", "acct"),
            ("IMAGES_API_TOKEN", "secret-token"),
            ("IMAGES_DELIVERY_URL", "https://imagedelivery.net/hash"),
        ]))
        .unwrap();
        assert_eq!(config.watch.checkpoint_interval, Duration::from_secs(45));
        assert_eq!(config.upload.progress_interval, Duration::from_millis(500));
        assert_eq!(config.upload.progress_step, 3);
        assert_eq!(config.upload.max_video_bytes, 1024);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn tokens_are_redacted_in_debug_output() {
        let config = Config::from_lookup(lookup(&[(
            "STREAM_API_TOKEN",
            "super-secret",
        )]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let err = Config::from_lookup(lookup(&[(
            "WATCH_CHECKPOINT_INTERVAL",
            "soon",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("WATCH_CHECKPOINT_INTERVAL"));

        let err =
            Config::from_lookup(lookup(&[("UPLOAD_PROGRESS_STEP", "0")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
