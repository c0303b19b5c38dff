use std::{env, net::SocketAddr};

use thiserror::Error;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_CANONICAL_ORIGIN: &str = "https://headshotmakerpro.com";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_POLAR_API_BASE: &str = "https://sandbox-api.polar.sh";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp-image-generation";
pub const DEFAULT_RATE_LIMIT_MS: u64 = 200;
pub const DEFAULT_RATE_LIMIT_BURST: u32 = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Credentials for the hosted auth + database provider. Every field is
/// optional so a missing value surfaces as a per-request configuration error.
#[derive(Debug, Clone, Default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PolarSettings {
    pub access_token: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: String,
    pub enforce_signature: bool,
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
}

/// Per-client token bucket: one request replenished every `per_millisecond`
/// ms, up to `burst` queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub per_millisecond: u64,
    pub burst: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub site_url: String,
    pub canonical_origin: String,
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    pub supabase: SupabaseSettings,
    pub polar: PolarSettings,
    pub gemini: GeminiSettings,
    pub rate_limit: RateLimitSettings,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    optional_var(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
        }),
    }
}

fn parse_positive<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match optional_var(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<T>() {
            Ok(value) if value > T::default() => Ok(value),
            _ => Err(ConfigError::Invalid { key, value: raw }),
        },
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = optional_var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_raw = var_or("BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        Ok(Config {
            database_url,
            site_url: var_or("SITE_URL", DEFAULT_SITE_URL)
                .trim_end_matches('/')
                .to_string(),
            canonical_origin: var_or("CANONICAL_ORIGIN", DEFAULT_CANONICAL_ORIGIN)
                .trim_end_matches('/')
                .to_string(),
            environment: Environment::parse(optional_var("APP_ENV").as_deref()),
            bind_addr,
            supabase: SupabaseSettings {
                url: optional_var("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
                anon_key: optional_var("SUPABASE_ANON_KEY"),
                jwt_secret: optional_var("SUPABASE_JWT_SECRET"),
            },
            polar: PolarSettings {
                access_token: optional_var("POLAR_ACCESS_TOKEN"),
                webhook_secret: optional_var("POLAR_WEBHOOK_SECRET"),
                api_base: var_or("POLAR_API_BASE", DEFAULT_POLAR_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                enforce_signature: parse_bool(
                    "POLAR_ENFORCE_SIGNATURE",
                    optional_var("POLAR_ENFORCE_SIGNATURE"),
                )?,
            },
            gemini: GeminiSettings {
                api_key: optional_var("GEMINI_API_KEY"),
                api_base: var_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE)
                    .trim_end_matches('/')
                    .to_string(),
                model: var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            },
            rate_limit: RateLimitSettings {
                per_millisecond: parse_positive("RATE_LIMITER_MILLISECONDS", DEFAULT_RATE_LIMIT_MS)?,
                burst: parse_positive("RATE_LIMITER_BURST", DEFAULT_RATE_LIMIT_BURST)?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Cookies are only marked `Secure` outside local development.
    pub fn secure_cookies(&self) -> bool {
        self.is_production()
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: String::new(),
            site_url: DEFAULT_SITE_URL.into(),
            canonical_origin: DEFAULT_CANONICAL_ORIGIN.into(),
            environment: Environment::Development,
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("default bind addr parses"),
            supabase: SupabaseSettings {
                url: Some("https://project.supabase.test".into()),
                anon_key: Some("anon-key".into()),
                jwt_secret: Some("0123456789abcdef0123456789abcdef".into()),
            },
            polar: PolarSettings {
                access_token: Some("polar_test_token".into()),
                webhook_secret: None,
                api_base: DEFAULT_POLAR_API_BASE.into(),
                enforce_signature: false,
            },
            gemini: GeminiSettings {
                api_key: Some("gemini-test-key".into()),
                api_base: DEFAULT_GEMINI_API_BASE.into(),
                model: DEFAULT_GEMINI_MODEL.into(),
            },
            rate_limit: RateLimitSettings {
                per_millisecond: DEFAULT_RATE_LIMIT_MS,
                burst: DEFAULT_RATE_LIMIT_BURST,
            },
        }
    }
}
