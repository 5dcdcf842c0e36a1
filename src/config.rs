use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::common::i18n::Language;

/// Accepted session lifetimes, one minute up to a year
pub const SESSION_TTL_RANGE: RangeInclusive<i64> = 1..=525_600;
const BACKEND_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=3_600;

/// Runtime configuration for the site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin of the backend REST API, without trailing slash
    pub backend_url: String,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Canonical public URL, used in the sitemap and structured data
    pub site_base_url: String,
    /// Language used when the visitor has not chosen one
    pub default_language: Language,
    /// Root directory served under `/static`
    pub static_dir: PathBuf,
    /// JSON file with the static marketing copy
    pub content_path: PathBuf,
    /// Timeout for each backend request in seconds
    pub backend_timeout_secs: u64,
    /// Lifetime of a dashboard session in minutes
    pub session_ttl_minutes: i64,
    /// WhatsApp number receiving contact form messages
    pub whatsapp_number: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://afkar.runasp.net".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
            site_base_url: "https://afkarsolar.com".to_string(),
            default_language: Language::En,
            static_dir: PathBuf::from("./static"),
            content_path: PathBuf::from("./content/static-content.json"),
            backend_timeout_secs: 30,
            session_ttl_minutes: 720,
            whatsapp_number: "966568729639".to_string(),
        }
    }
}

impl SiteConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let default_language = match get("DEFAULT_LANGUAGE") {
            Some(code) => Language::from_code(&code).unwrap_or_else(|| {
                warn!("Unsupported DEFAULT_LANGUAGE '{}', using en", code);
                Language::En
            }),
            None => defaults.default_language,
        };

        Self {
            backend_url: get("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            site_base_url: get("SITE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_base_url),
            default_language,
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            content_path: get("CONTENT_PATH").map(PathBuf::from).unwrap_or(defaults.content_path),
            backend_timeout_secs: parse_within(
                "BACKEND_TIMEOUT_SECS",
                get("BACKEND_TIMEOUT_SECS"),
                defaults.backend_timeout_secs,
                BACKEND_TIMEOUT_RANGE,
            ),
            session_ttl_minutes: parse_within(
                "SESSION_TTL_MINUTES",
                get("SESSION_TTL_MINUTES"),
                defaults.session_ttl_minutes,
                SESSION_TTL_RANGE,
            ),
            whatsapp_number: get("WHATSAPP_NUMBER").unwrap_or(defaults.whatsapp_number),
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Join the backend origin and an endpoint with exactly one slash
    pub fn backend_url(&self, endpoint: &str) -> String {
        join_url(&self.backend_url, endpoint)
    }
}

/// Join an origin and a path with exactly one slash
pub fn join_url(origin: &str, path: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_within<T>(key: &str, raw: Option<String>, default: T, range: RangeInclusive<T>) -> T
where
    T: std::str::FromStr + Copy + PartialOrd + std::fmt::Display,
{
    let value = match raw {
        Some(value) => value,
        None => return default,
    };
    match value.parse::<T>() {
        Ok(parsed) if range.contains(&parsed) => parsed,
        _ => {
            warn!("Invalid value '{}' for {}, using {}", value, key, default);
            default
        }
    }
}
