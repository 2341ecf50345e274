use std::path::Path;

use serde_derive::Deserialize;

/// Device identity configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Single device identifier.
    #[serde(default)]
    pub device_imei: Option<String>,
    /// Comma separated list of device identifiers.
    #[serde(default)]
    pub device_imei_list: Option<String>,
    /// Synthesize an identifier when none is configured.
    #[serde(default)]
    pub allow_generate_imei: bool,
}

/// Telemetry generation configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Tick interval in milliseconds.
    #[serde(default = "TelemetryConfig::default_interval")]
    pub interval_ms: u64,
}

impl TelemetryConfig {
    fn default_interval() -> u64 {
        crate::consts::TICK_INTERVAL.as_millis() as u64
    }

    /// Tick interval.
    #[inline]
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: Self::default_interval(),
        }
    }
}

/// Read a TOML configuration file.
pub fn from_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> crate::Result<T> {
    let contents = std::fs::read_to_string(path.as_ref())?;

    toml::from_str(&contents).map_err(|e| {
        crate::Error::Configuration(format!("{}: {}", path.as_ref().display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Config {
        #[serde(default)]
        identity: IdentityConfig,
        #[serde(default)]
        telemetry: TelemetryConfig,
    }

    #[test]
    fn test_config_parse() {
        let config: Config = toml::from_str(
            r#"
            [identity]
            device_imei = "352099001761481"
            allow_generate_imei = true

            [telemetry]
            interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(
            config.identity.device_imei.as_deref(),
            Some("352099001761481")
        );
        assert!(config.identity.device_imei_list.is_none());
        assert!(config.identity.allow_generate_imei);
        assert_eq!(config.telemetry.interval_ms, 250);
    }

    #[test]
    fn test_config_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.identity, IdentityConfig::default());
        assert_eq!(config.telemetry.interval(), crate::consts::TICK_INTERVAL);
    }

    #[test]
    fn test_from_file_missing() {
        let result = from_file::<IdentityConfig>("/nonexistent/telemetria.toml");

        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
