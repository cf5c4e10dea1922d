use anyhow::{Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Embed the default settings at compile time
const DEFAULT_SETTINGS: &str = include_str!("../../default-config.toml");

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "digitsweep.toml";

/// Prefix for environment overrides, e.g. `DIGITSWEEP_FINGERPRINT_WIDTH=12`.
pub const ENV_PREFIX: &str = "DIGITSWEEP_";

/// How the final result is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The bare scalar result.
    #[default]
    Text,
    /// A JSON summary of the run.
    Json,
}

/// Ambient run settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Zero-padding width applied to numbers before fingerprinting.
    pub fingerprint_width: usize,
    /// Default tracing filter when neither `-v` nor `RUST_LOG` is given.
    pub log_level: String,
    pub format: OutputFormat,
}

impl Settings {
    /// Merge embedded defaults, then the settings file, then environment.
    ///
    /// With `custom_file` set, that file replaces the working-directory
    /// lookup and must exist.
    pub fn load(custom_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_SETTINGS));

        figment = match custom_file {
            Some(path) => {
                if !path.is_file() {
                    bail!("Settings file not found: {}", path.display());
                }
                figment.merge(Toml::file(path))
            }
            None => figment.merge(Toml::file(SETTINGS_FILE)),
        };

        // Environment variables always have highest priority
        let settings: Settings = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;

        if settings.fingerprint_width == 0 {
            bail!("fingerprint_width must be at least 1");
        }
        tracing::trace!(?settings, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::DEFAULT_FINGERPRINT_WIDTH;
    use figment::Jail;

    #[test]
    fn test_defaults_load() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load(None).map_err(|e| e.to_string())?;
            assert_eq!(settings.fingerprint_width, DEFAULT_FINGERPRINT_WIDTH);
            assert_eq!(settings.log_level, "warn");
            assert_eq!(settings.format, OutputFormat::Text);
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(SETTINGS_FILE, "fingerprint_width = 12\nformat = \"json\"")?;
            let settings = Settings::load(None).map_err(|e| e.to_string())?;
            assert_eq!(settings.fingerprint_width, 12);
            assert_eq!(settings.format, OutputFormat::Json);
            assert_eq!(settings.log_level, "warn");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(SETTINGS_FILE, "fingerprint_width = 12")?;
            jail.set_env("DIGITSWEEP_FINGERPRINT_WIDTH", 7);
            jail.set_env("DIGITSWEEP_LOG_LEVEL", "debug");
            let settings = Settings::load(None).map_err(|e| e.to_string())?;
            assert_eq!(settings.fingerprint_width, 7);
            assert_eq!(settings.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_custom_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "fingerprint_width = 10")?;
            let settings =
                Settings::load(Some(Path::new("custom.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(settings.fingerprint_width, 10);

            assert!(Settings::load(Some(Path::new("missing.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_zero_width_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("DIGITSWEEP_FINGERPRINT_WIDTH", 0);
            assert!(Settings::load(None).is_err());
            Ok(())
        });
    }
}
