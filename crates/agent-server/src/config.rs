//! Server Configuration
//!
//! Read from the environment (a `.env` file is loaded first). Both API keys
//! are required; everything else has a default.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Printed when startup fails on configuration
pub const REMEDIATION: &str = "Set the missing values in the environment or in a `.env` file \
next to the server, for example:\n\n    GEMINI_API_KEY=...\n    EXA_API_KEY=...\n\n\
Gemini keys come from Google AI Studio, Exa keys from the Exa dashboard.";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("API key not found: {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the advisor needs to start
#[derive(Clone)]
pub struct AdvisorSettings {
    pub gemini_api_key: String,
    pub exa_api_key: String,
    pub gemini_base_url: Option<String>,
    pub exa_base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,
    pub turn_timeout: Duration,
    /// Sessions idle this long are dropped
    pub session_ttl: Duration,
    /// Serve built-in demo prices instead of calling Yahoo Finance
    pub offline_market: bool,
    pub bind_addr: String,
}

impl std::fmt::Debug for AdvisorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorSettings")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .field("turn_timeout", &self.turn_timeout)
            .field("session_ttl", &self.session_ttl)
            .field("offline_market", &self.offline_market)
            .field("bind_addr", &self.bind_addr)
            .finish_non_exhaustive()
    }
}

impl AdvisorSettings {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini_api_key = value("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let exa_api_key = value("EXA_API_KEY").ok_or(ConfigError::Missing("EXA_API_KEY"))?;

        let temperature: f32 = parse_or(value("ADVISOR_TEMPERATURE"), "ADVISOR_TEMPERATURE", 0.4)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                key: "ADVISOR_TEMPERATURE",
                value: temperature.to_string(),
            });
        }

        let max_iterations: usize =
            parse_or(value("ADVISOR_MAX_ITERATIONS"), "ADVISOR_MAX_ITERATIONS", 10)?;
        if max_iterations == 0 {
            return Err(ConfigError::Invalid {
                key: "ADVISOR_MAX_ITERATIONS",
                value: "0".into(),
            });
        }

        let timeout_secs: u64 =
            parse_or(value("ADVISOR_TURN_TIMEOUT_SECS"), "ADVISOR_TURN_TIMEOUT_SECS", 120)?;

        let ttl_secs: u64 =
            parse_or(value("ADVISOR_SESSION_TTL_SECS"), "ADVISOR_SESSION_TTL_SECS", 3600)?;
        if ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "ADVISOR_SESSION_TTL_SECS",
                value: "0".into(),
            });
        }

        let offline_market = value("ADVISOR_OFFLINE_MARKET")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            gemini_api_key,
            exa_api_key,
            gemini_base_url: value("GEMINI_BASE_URL"),
            exa_base_url: value("EXA_BASE_URL"),
            model: value("ADVISOR_MODEL").unwrap_or_else(|| "gemini-2.5-flash".into()),
            temperature,
            max_iterations,
            turn_timeout: Duration::from_secs(timeout_secs),
            session_ttl: Duration::from_secs(ttl_secs),
            offline_market,
            bind_addr: value("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
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
    fn test_defaults() {
        let settings = AdvisorSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g-key"),
            ("EXA_API_KEY", "e-key"),
        ]))
        .unwrap();

        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.temperature, 0.4);
        assert_eq!(settings.max_iterations, 10);
        assert_eq!(settings.turn_timeout, Duration::from_secs(120));
        assert_eq!(settings.session_ttl, Duration::from_secs(3600));
        assert!(!settings.offline_market);
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert!(!format!("{:?}", settings).contains("g-key"));
    }

    #[test]
    fn test_missing_keys() {
        assert_eq!(
            AdvisorSettings::from_lookup(lookup(&[("EXA_API_KEY", "e")])).unwrap_err(),
            ConfigError::Missing("GEMINI_API_KEY")
        );
        assert_eq!(
            AdvisorSettings::from_lookup(lookup(&[("GEMINI_API_KEY", "g"), ("EXA_API_KEY", "  ")]))
                .unwrap_err(),
            ConfigError::Missing("EXA_API_KEY")
        );
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let settings = AdvisorSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("EXA_API_KEY", "e"),
            ("ADVISOR_MODEL", "gemini-2.5-pro"),
            ("ADVISOR_OFFLINE_MARKET", "TRUE"),
            ("ADVISOR_TURN_TIMEOUT_SECS", "30"),
            ("ADVISOR_SESSION_TTL_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert!(settings.offline_market);
        assert_eq!(settings.turn_timeout, Duration::from_secs(30));
        assert_eq!(settings.session_ttl, Duration::from_secs(600));

        let err = AdvisorSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("EXA_API_KEY", "e"),
            ("ADVISOR_MAX_ITERATIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ADVISOR_MAX_ITERATIONS", .. }));

        let err = AdvisorSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("EXA_API_KEY", "e"),
            ("ADVISOR_SESSION_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ADVISOR_SESSION_TTL_SECS", .. }));
    }
}
