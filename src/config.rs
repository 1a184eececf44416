use std::path::PathBuf;

use thiserror::Error;

use crate::intelligence::DEFAULT_MISSED_DOSE_THRESHOLD;

/// Application-level constants
pub const APP_NAME: &str = "Diacare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_MISSED_DOSE_THRESHOLD: &str = "DIACARE_MISSED_DOSE_THRESHOLD";
pub const ENV_TWILIO_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_TWILIO_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_TWILIO_WHATSAPP_FROM: &str = "TWILIO_WHATSAPP_FROM";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Incomplete Twilio settings: {0} is missing")]
    IncompleteTwilio(&'static str),
}

/// Application data directory, ~/Diacare/ on all platforms.
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    Ok(home.join(APP_NAME))
}

pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    Ok(app_data_dir()?.join("diacare.db"))
}

/// Log filter used when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "diacare=debug,warn"
    } else {
        "diacare=info,warn"
    }
}

/// Twilio credentials for WhatsApp delivery.
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, with or without the `whatsapp:` prefix.
    pub whatsapp_from: String,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("whatsapp_from", &self.whatsapp_from)
            .finish()
    }
}

/// Runtime settings for the care service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareConfig {
    /// Missed doses per medication at which the family is alerted.
    pub missed_dose_threshold: u32,
    /// None means notifications are only logged.
    pub twilio: Option<TwilioConfig>,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            missed_dose_threshold: DEFAULT_MISSED_DOSE_THRESHOLD,
            twilio: None,
        }
    }
}

impl CareConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missed_dose_threshold = match get(ENV_MISSED_DOSE_THRESHOLD) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MISSED_DOSE_THRESHOLD,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_MISSED_DOSE_THRESHOLD,
        };

        let sid = get(ENV_TWILIO_ACCOUNT_SID);
        let token = get(ENV_TWILIO_AUTH_TOKEN);
        let from = get(ENV_TWILIO_WHATSAPP_FROM);
        let twilio = match (sid, token, from) {
            (None, None, None) => None,
            (Some(account_sid), Some(auth_token), Some(whatsapp_from)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                whatsapp_from,
            }),
            (None, _, _) => return Err(ConfigError::IncompleteTwilio(ENV_TWILIO_ACCOUNT_SID)),
            (_, None, _) => return Err(ConfigError::IncompleteTwilio(ENV_TWILIO_AUTH_TOKEN)),
            (_, _, None) => return Err(ConfigError::IncompleteTwilio(ENV_TWILIO_WHATSAPP_FROM)),
        };

        Ok(Self {
            missed_dose_threshold,
            twilio,
        })
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_under_home() {
        match dirs::home_dir() {
            Some(home) => {
                let dir = app_data_dir().unwrap();
                assert_eq!(dir, home.join("Diacare"));
                assert_eq!(default_db_path().unwrap(), dir.join("diacare.db"));
            }
            None => {
                assert_eq!(app_data_dir(), Err(ConfigError::NoHomeDir));
                assert_eq!(default_db_path(), Err(ConfigError::NoHomeDir));
            }
        }
    }

    #[test]
    fn app_version_is_semver() {
        let parts: Vec<&str> = APP_VERSION.split('.').collect();
        assert_eq!(parts.len(), 3, "unexpected version {APP_VERSION}");
        assert!(parts.iter().all(|p| p.parse::<u32>().is_ok()));
    }

    #[test]
    fn defaults_without_environment() {
        let config = CareConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CareConfig::default());
        assert_eq!(config.missed_dose_threshold, 3);
        assert!(config.twilio.is_none());
    }

    #[test]
    fn threshold_override() {
        let config =
            CareConfig::from_lookup(lookup(&[(ENV_MISSED_DOSE_THRESHOLD, " 5 ")])).unwrap();
        assert_eq!(config.missed_dose_threshold, 5);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        for bad in ["0", "-1", "three"] {
            let err = CareConfig::from_lookup(lookup(&[(ENV_MISSED_DOSE_THRESHOLD, bad)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        }
    }

    #[test]
    fn complete_twilio_settings() {
        let config = CareConfig::from_lookup(lookup(&[
            (ENV_TWILIO_ACCOUNT_SID, "AC1"),
            (ENV_TWILIO_AUTH_TOKEN, "s3cr3t"),
            (ENV_TWILIO_WHATSAPP_FROM, "whatsapp:+14155238886"),
        ]))
        .unwrap();
        let twilio = config.twilio.unwrap();
        assert_eq!(twilio.account_sid, "AC1");
        assert!(!format!("{twilio:?}").contains("s3cr3t"));
    }

    #[test]
    fn partial_twilio_settings_are_an_error() {
        let err = CareConfig::from_lookup(lookup(&[(ENV_TWILIO_ACCOUNT_SID, "AC1")])).unwrap_err();
        assert_eq!(err, ConfigError::IncompleteTwilio(ENV_TWILIO_AUTH_TOKEN));
    }
}
