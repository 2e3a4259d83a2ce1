//! Server configuration read from the environment.

use std::net::SocketAddr;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Starting or ending a draft holds one connection for its transaction and
/// borrows a second to update the season.
const MIN_MAX_CONNECTIONS: u32 = 2;
const DEFAULT_SERVICE_NAME: &str = "draftboard-api";

/// Settings the server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `DATABASE_URL`, required.
    pub database_url: String,
    /// `HOST`, defaults to `0.0.0.0`.
    pub host: String,
    /// `PORT`, defaults to `3000`.
    pub port: u16,
    /// `DATABASE_MAX_CONNECTIONS`, defaults to `10`, at least `2`.
    pub database_max_connections: u32,
    /// `OTEL_EXPORTER_OTLP_ENDPOINT`; span export is off when unset.
    pub otlp_endpoint: Option<String>,
    /// `OTEL_SERVICE_NAME`, defaults to `draftboard-api`.
    pub service_name: String,
}

impl Config {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing, a numeric
    /// setting does not parse, or `DATABASE_MAX_CONNECTIONS` is below 2.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                AppError::Config("DATABASE_URL environment variable must be set".to_owned())
            })?;
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if database_max_connections < MIN_MAX_CONNECTIONS {
            return Err(AppError::Config(format!(
                "DATABASE_MAX_CONNECTIONS must be at least {MIN_MAX_CONNECTIONS}"
            )));
        }

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            database_max_connections,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.is_empty()),
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned()),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/draft")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.otlp_endpoint, None);
        assert_eq!(config.service_name, "draftboard-api");
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        match config_from(&[("PORT", "8080")]) {
            Err(AppError::Config(msg)) => assert!(msg.contains("DATABASE_URL")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let result = config_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "99999")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_single_connection_pool_is_config_error() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("DATABASE_MAX_CONNECTIONS", "1"),
        ]);

        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains("at least 2")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_otlp_endpoint_enables_export() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
            ("OTEL_SERVICE_NAME", "draftboard-staging"),
        ])
        .unwrap();

        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://collector:4317"));
        assert_eq!(config.service_name, "draftboard-staging");
    }
}
