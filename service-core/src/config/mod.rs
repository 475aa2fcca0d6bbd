use crate::error::AppError;
use config::{Config as Cfg, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

/// Listener settings shared by every service.
///
/// Read from an optional `configuration` file, then `APP__HOST` / `APP__PORT`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        Self::from_builder(
            Cfg::builder()
                .add_source(File::with_name("configuration").required(false))
                .add_source(Environment::with_prefix("APP").separator("__")),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.socket_addr()?;
        Ok(config)
    }

    /// Address the HTTP listener binds to. Port 0 asks the OS for a free port.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!(
                "host must be an IP address, got {:?}",
                self.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = Config::from_builder(Cfg::builder()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(
            config.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn overrides_are_applied() {
        let builder = Cfg::builder()
            .set_override("host", "127.0.0.1")
            .unwrap()
            .set_override("port", 9000)
            .unwrap();

        let config = Config::from_builder(builder).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn ipv6_host_is_accepted() {
        let config = Config {
            host: "::1".to_string(),
            port: 0,
        };

        assert_eq!(
            config.socket_addr().unwrap(),
            "[::1]:0".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn hostname_is_rejected() {
        let builder = Cfg::builder().set_override("host", "localhost").unwrap();

        let err = Config::from_builder(builder).unwrap_err();

        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("localhost"));
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let builder = Cfg::builder().set_override("port", "not-a-port").unwrap();

        assert!(matches!(
            Config::from_builder(builder),
            Err(AppError::ConfigError(_))
        ));
    }
}
