use chrono::{Month, Weekday};
use chrono_tz::Tz;
use date_decider_libs::{
    error::PollError,
    message::{Locale, UnknownLocale},
    poll::CandidateSpec,
    time::resolve_zone,
};
use std::env;
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
const DEFAULT_ZONE: &str = "UTC";
const DEFAULT_WEEKDAYS: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find {0} in environment")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error(transparent)]
    Locale(#[from] UnknownLocale),
}

/// Settings of one invocation, read from the Lambda's environment
pub struct Config {
    pub token: String,
    pub api_base: String,
    pub zone: Tz,
    pub locale: Locale,
    pub weekdays: Vec<Weekday>,
    pub extra_days: Vec<u32>,
    pub excluded_days: Vec<u32>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("zone", &self.zone)
            .field("locale", &self.locale)
            .field("weekdays", &self.weekdays)
            .field("extra_days", &self.extra_days)
            .field("excluded_days", &self.excluded_days)
            .finish()
    }
}

fn parse_list<T, L>(key: &'static str, lookup: &L) -> Result<Option<Vec<T>>, ConfigError>
where
    T: FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse().map_err(|_| ConfigError::Invalid {
                    key,
                    value: item.to_string(),
                })
            })
            .collect::<Result<Vec<T>, _>>()
            .map(Some),
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let zone = lookup("TIME_ZONE")
            .unwrap_or_else(|| DEFAULT_ZONE.to_string());
        let zone = resolve_zone(&zone)?;

        let locale = match lookup("LOCALE") {
            Some(locale) => locale.parse()?,
            None => Locale::default(),
        };

        let api_base = lookup("DISCORD_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let weekdays = parse_list("POLL_WEEKDAYS", &lookup)?
            .unwrap_or_else(|| DEFAULT_WEEKDAYS.to_vec());
        let extra_days = parse_list("POLL_EXTRA_DAYS", &lookup)?.unwrap_or_default();
        let excluded_days = parse_list("POLL_EXCLUDED_DAYS", &lookup)?
            .unwrap_or_default();

        Ok(Config {
            token,
            api_base,
            zone,
            locale,
            weekdays,
            extra_days,
            excluded_days,
        })
    }

    /// Which days of `month` the poll offers
    pub fn candidate_spec(&self, year: i32, month: Month) -> CandidateSpec {
        CandidateSpec::new(year, month)
            .with_weekdays(self.weekdays.iter().copied())
            .with_include_days(self.extra_days.iter().copied())
            .with_exclude_days(self.excluded_days.iter().copied())
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
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "secret")])).unwrap();

        assert_eq!(config.token, "secret");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.zone, chrono_tz::UTC);
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.weekdays, vec![Weekday::Fri, Weekday::Sat]);
        assert!(config.extra_days.is_empty());
        assert!(config.excluded_days.is_empty());
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn reads_everything() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "secret"),
            ("TIME_ZONE", "Europe/Berlin"),
            ("LOCALE", "de"),
            ("POLL_WEEKDAYS", "Thursday, fri"),
            ("POLL_EXTRA_DAYS", "26,27"),
            ("POLL_EXCLUDED_DAYS", " 24, 25 ,31 "),
        ]))
        .unwrap();

        assert_eq!(config.zone, chrono_tz::Europe::Berlin);
        assert_eq!(config.locale, Locale::German);
        assert_eq!(config.weekdays, vec![Weekday::Thu, Weekday::Fri]);
        assert_eq!(config.extra_days, vec![26, 27]);
        assert_eq!(config.excluded_days, vec![24, 25, 31]);

        let spec = config.candidate_spec(2025, Month::December);
        assert!(spec.exclude_days.contains(&31));
        assert!(spec.weekdays.contains(&Weekday::Thu));
    }

    #[test]
    fn empty_weekdays_select_none() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "secret"),
            ("POLL_WEEKDAYS", ""),
        ]))
        .unwrap();

        assert!(config.weekdays.is_empty());
    }

    fn with_token(key: &str, value: &str) -> Result<Config, ConfigError> {
        Config::from_lookup(lookup(&[("DISCORD_TOKEN", "secret"), (key, value)]))
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
        assert!(matches!(
            with_token("TIME_ZONE", "Nowhere"),
            Err(ConfigError::Poll(PollError::InvalidZone { .. }))
        ));
        assert!(matches!(
            with_token("LOCALE", "fr"),
            Err(ConfigError::Locale(_))
        ));
        assert!(matches!(
            with_token("POLL_EXTRA_DAYS", "1,x"),
            Err(ConfigError::Invalid {
                key: "POLL_EXTRA_DAYS",
                ..
            })
        ));
        assert!(matches!(
            with_token("POLL_WEEKDAYS", "Funday"),
            Err(ConfigError::Invalid {
                key: "POLL_WEEKDAYS",
                ..
            })
        ));
    }
}
