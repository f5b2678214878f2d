use std::time::Duration;

use anyhow::{Context, Result};

/// Importance floor applied to inferred job requirements when the
/// environment does not override it.
pub const DEFAULT_INFERRED_MIN_IMPORTANCE: f64 = 0.7;

/// Application configuration loaded from environment variables.
/// Everything has a development-friendly default; only values that must be
/// well-formed (numbers) can fail.
#[derive(Debug, Clone)]
pub struct Config {
    /// Public REST base, e.g. `https://api.example.com/api/v1`. Also the
    /// input for deriving the realtime endpoint.
    pub api_base_url: String,
    /// Server-side REST base. Preferred over `api_base_url` for REST calls
    /// when set (private networking).
    pub internal_api_url: Option<String>,
    /// Base used to build checkout redirect URLs.
    pub app_base_url: String,
    /// Absolute checkout-session endpoint. Checkout is disabled when unset.
    pub checkout_url: Option<String>,
    /// Log every raw realtime frame at debug level.
    pub realtime_debug: bool,
    /// Inferred requirements below this importance are dropped.
    pub inferred_min_importance: f64,
    /// Interval between status polls while an entity is still processing.
    pub poll_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:4000/api/v1".to_string()),
            internal_api_url: std::env::var("LAYER1_API_URL").ok(),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            checkout_url: std::env::var("CHECKOUT_URL").ok(),
            realtime_debug: parse_flag(std::env::var("REALTIME_DEBUG").ok(), true),
            inferred_min_importance: parse_importance_floor(
                std::env::var("JOB_INFERRED_MIN_IMPORTANCE").ok(),
            ),
            poll_interval: Duration::from_secs(
                std::env::var("POLL_INTERVAL_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse::<u64>()
                    .context("POLL_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// REST base for actual requests: the internal URL when configured,
    /// otherwise the public one.
    pub fn rest_base(&self) -> &str {
        self.internal_api_url.as_deref().unwrap_or(&self.api_base_url)
    }

    /// Minimal config pointed at one base URL. Used by tests and tools.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Config {
            api_base_url: base_url.into(),
            internal_api_url: None,
            app_base_url: "http://localhost:3000".to_string(),
            checkout_url: None,
            realtime_debug: false,
            inferred_min_importance: DEFAULT_INFERRED_MIN_IMPORTANCE,
            poll_interval: Duration::from_secs(5),
            rust_log: "info".to_string(),
        }
    }
}

/// Importance values are fractions in [0, 1], but deployments have shipped
/// percentages (e.g. `70`). Anything above 1 is read as a percentage, and
/// unparseable input falls back to the default rather than failing startup.
fn parse_importance_floor(raw: Option<String>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_INFERRED_MIN_IMPORTANCE;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if value > 1.0 {
                value / 100.0
            } else {
                value
            }
        }
        _ => DEFAULT_INFERRED_MIN_IMPORTANCE,
    }
}

/// "false"/"0"/"no"/"off" disable, anything else keeps the default-on
/// behavior (mirror of how the flag was historically read).
fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        ),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_floor_defaults_without_input() {
        assert_eq!(parse_importance_floor(None), DEFAULT_INFERRED_MIN_IMPORTANCE);
    }

    #[test]
    fn importance_floor_accepts_fractions() {
        assert_eq!(parse_importance_floor(Some("0.45".to_string())), 0.45);
    }

    #[test]
    fn importance_floor_reads_percentages() {
        assert_eq!(parse_importance_floor(Some("70".to_string())), 0.7);
    }

    #[test]
    fn importance_floor_ignores_garbage() {
        assert_eq!(
            parse_importance_floor(Some("threshold".to_string())),
            DEFAULT_INFERRED_MIN_IMPORTANCE
        );
        assert_eq!(
            parse_importance_floor(Some("NaN".to_string())),
            DEFAULT_INFERRED_MIN_IMPORTANCE
        );
    }

    #[test]
    fn realtime_debug_flag_is_on_unless_disabled() {
        assert!(parse_flag(None, true));
        assert!(parse_flag(Some("true".to_string()), true));
        assert!(!parse_flag(Some("false".to_string()), true));
        assert!(!parse_flag(Some("0".to_string()), true));
    }

    #[test]
    fn rest_base_prefers_the_internal_url() {
        let mut config = Config::for_base_url("http://public:4000/api/v1");
        assert_eq!(config.rest_base(), "http://public:4000/api/v1");
        config.internal_api_url = Some("http://private:4000/api/v1".to_string());
        assert_eq!(config.rest_base(), "http://private:4000/api/v1");
    }
}
