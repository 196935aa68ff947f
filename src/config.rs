use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Result};
use log::{info, LevelFilter};
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: &str = "10";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub timeout: Duration,
    pub log_level: LevelFilter,
    /// Keys that were not set, with the default applied to each.
    pub defaulted: Vec<(String, String)>,
}

impl Config {
    /// Reads the configuration from the process environment (call `dotenv()` first to pick up a `.env` file).
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut defaulted = Vec::new();

        let api_url: Url = try_load(&lookup, &mut defaulted, "GRADES_API_URL", DEFAULT_API_URL)?;
        if api_url.cannot_be_a_base() {
            return Err(anyhow!("GRADES_API_URL must be an absolute http(s) url, got {api_url}"));
        }
        let timeout_secs: u64 = try_load(
            &lookup,
            &mut defaulted,
            "GRADES_HTTP_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        let log_level = try_load(&lookup, &mut defaulted, "GRADEVIEW_LOG", DEFAULT_LOG_LEVEL)?;

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            log_level,
            defaulted,
        })
    }

    // Call once the logger is up; loading happens before it exists.
    pub fn log_defaults(&self) {
        for (key, default) in &self.defaulted {
            info!("{key} not set, using default: {default}");
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            timeout: Duration::from_secs(10),
            log_level: LevelFilter::Info,
            defaulted: Vec::new(),
        }
    }
}

fn try_load<F, T>(
    lookup: &F,
    defaulted: &mut Vec<(String, String)>,
    key: &str,
    default: &str,
) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        defaulted.push((key.to_string(), default.to_string()));
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value `{raw}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/api");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(
            config.defaulted,
            vec![
                ("GRADES_API_URL".to_string(), DEFAULT_API_URL.to_string()),
                ("GRADES_HTTP_TIMEOUT_SECS".to_string(), DEFAULT_TIMEOUT_SECS.to_string()),
                ("GRADEVIEW_LOG".to_string(), DEFAULT_LOG_LEVEL.to_string()),
            ]
        );
    }

    #[test]
    fn values_override_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("GRADES_API_URL", "https://voti.example.org/api/"),
            ("GRADES_HTTP_TIMEOUT_SECS", "3"),
            ("GRADEVIEW_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("voti.example.org"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.defaulted.is_empty());
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(Config::from_lookup(lookup_from(&[("GRADES_HTTP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("GRADES_API_URL", "not a url")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("GRADES_API_URL", "mailto:x@y.z")])).is_err());
    }
}
