use telemetria::{IdentityConfig, TelemetryConfig};

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Network address to listen on.
    #[serde(default = "ServerConfig::default_listen")]
    pub listen: String,
    /// Maximum number of connections.
    #[serde(default = "ServerConfig::default_max_connections")]
    pub max_connections: usize,
}

impl ServerConfig {
    fn default_listen() -> String {
        telemetria::consts::DEFAULT_LISTEN.to_owned()
    }

    fn default_max_connections() -> usize {
        telemetria::consts::NETWORK_MAX_CLIENTS
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: Self::default_listen(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Clone, Debug, Default, serde_derive::Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Device identity configuration.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_partial() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "127.0.0.1:9000"

            [identity]
            device_imei_list = "352099001761481,352099001761482"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(
            config.server.max_connections,
            telemetria::consts::NETWORK_MAX_CLIENTS
        );
        assert!(!config.identity.allow_generate_imei);
        assert_eq!(config.telemetry, TelemetryConfig::default());
    }
}
