use std::env;
use std::time::Duration;

use crate::timezone::INSTITUTION_TIMEZONE;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Address of the portal's academic planner feed.
    pub calendar_url: String,
    /// Zone whose civil date decides what "today" is.
    pub timezone: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(calendar_url: impl Into<String>) -> Self {
        Config {
            calendar_url: calendar_url.into(),
            timezone: INSTITUTION_TIMEZONE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `ACADEMIA_CALENDAR_URL`, `ACADEMIA_TIMEZONE` and
    /// `ACADEMIA_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let calendar_url = lookup("ACADEMIA_CALENDAR_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("ACADEMIA_CALENDAR_URL"))?;

        let mut config = Config::new(calendar_url.trim());

        if let Some(timezone) = lookup("ACADEMIA_TIMEZONE").filter(|tz| !tz.trim().is_empty()) {
            config.timezone = timezone.trim().to_string();
        }

        if let Some(secs) = lookup("ACADEMIA_TIMEOUT_SECS") {
            let parsed = secs.trim().parse::<u64>().ok().filter(|s| *s > 0);
            config.timeout = match parsed {
                Some(s) => Duration::from_secs(s),
                None => {
                    return Err(ConfigError::Invalid {
                        name: "ACADEMIA_TIMEOUT_SECS",
                        value: secs,
                    })
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[(
            "ACADEMIA_CALENDAR_URL",
            "https://portal.example/planner.ics",
        )]))
        .unwrap();

        assert_eq!(config.calendar_url, "https://portal.example/planner.ics");
        assert_eq!(config.timezone, "Asia/Kolkata");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ACADEMIA_CALENDAR_URL", " https://portal.example/planner.ics "),
            ("ACADEMIA_TIMEZONE", "UTC"),
            ("ACADEMIA_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.calendar_url, "https://portal.example/planner.ics");
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_timezone_keeps_default() {
        let config = Config::from_lookup(lookup(&[
            ("ACADEMIA_CALENDAR_URL", "https://portal.example/planner.ics"),
            ("ACADEMIA_TIMEZONE", "  "),
        ]))
        .unwrap();

        assert_eq!(config.timezone, INSTITUTION_TIMEZONE);
    }

    #[test]
    fn missing_url() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("ACADEMIA_CALENDAR_URL"))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("ACADEMIA_CALENDAR_URL", "   ")])),
            Err(ConfigError::Missing("ACADEMIA_CALENDAR_URL"))
        );
    }

    #[test]
    fn invalid_timeout() {
        for value in ["abc", "0", "-3"].iter() {
            let result = Config::from_lookup(lookup(&[
                ("ACADEMIA_CALENDAR_URL", "https://portal.example/planner.ics"),
                ("ACADEMIA_TIMEOUT_SECS", *value),
            ]));

            assert_eq!(
                result,
                Err(ConfigError::Invalid {
                    name: "ACADEMIA_TIMEOUT_SECS",
                    value: value.to_string(),
                })
            );
        }
    }
}
