//! Adapter options and validation.
//!
//! Options arrive from the CLI layer as strings; numeric fields are parsed
//! and validated here, at adapter construction time, before any network
//! activity.

use std::path::PathBuf;
use std::time::Duration;

use sequin_driver::{ConnectionConfig, TlsOptions};

use crate::error::AdapterError;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// CLI-shaped adapter options.
///
/// All numeric fields are kept as strings and parsed by
/// [`AdapterOptions::into_connection_config`]; a non-integer port or timeout
/// is a configuration error, not a connection error.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// The host name or IP address of the MySQL server.
    pub host: Option<String>,
    /// The TCP/IP port of the MySQL server. Must be an integer.
    pub port: Option<String>,
    /// The location of the Unix socket file.
    pub unix_socket: Option<String>,
    /// The database name to use when connecting.
    pub database: Option<String>,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Second password, for multi-factor authentication.
    pub password2: Option<String>,
    /// Third password, for multi-factor authentication.
    pub password3: Option<String>,
    /// Timeout (seconds) for the TCP or Unix socket connection. Must be an
    /// integer.
    pub connection_timeout: Option<String>,
    /// File containing the TLS certificate authority.
    pub ssl_ca: Option<PathBuf>,
    /// File containing the TLS certificate.
    pub ssl_cert: Option<PathBuf>,
    /// File containing the TLS key.
    pub ssl_key: Option<PathBuf>,
    /// Disable TLS entirely.
    pub ssl_disabled: bool,
    /// Number of pooled connections (default 5).
    pub pool_size: Option<usize>,
}

impl AdapterOptions {
    /// Validate the options and build a driver connection configuration
    /// plus the pool capacity.
    pub fn into_connection_config(self) -> Result<(ConnectionConfig, usize), AdapterError> {
        let port = match self.port.as_deref() {
            None => 3306,
            Some(s) => s
                .parse::<u16>()
                .map_err(|_| AdapterError::Config(format!("cannot convert {s} to an int")))?,
        };
        let connect_timeout = match self.connection_timeout.as_deref() {
            None => None,
            Some(s) => Some(Duration::from_secs(s.parse::<u64>().map_err(|_| {
                AdapterError::Config(format!("cannot convert {s} to an int"))
            })?)),
        };

        let config = ConnectionConfig {
            host: self.host.unwrap_or_else(|| "localhost".to_string()),
            port,
            unix_socket: self.unix_socket.map(PathBuf::from),
            database: self.database,
            user: self.user,
            password: self.password,
            password2: self.password2,
            password3: self.password3,
            connect_timeout,
            tls: TlsOptions {
                ca: self.ssl_ca,
                cert: self.ssl_cert,
                key: self.ssl_key,
                disabled: self.ssl_disabled,
            },
        };
        Ok((config, self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let (config, pool_size) = AdapterOptions::default()
            .into_connection_config()
            .expect("valid");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, None);
        assert_eq!(pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn parses_port_and_timeout() {
        let options = AdapterOptions {
            port: Some("3307".into()),
            connection_timeout: Some("10".into()),
            ..Default::default()
        };
        let (config, _) = options.into_connection_config().expect("valid");
        assert_eq!(config.port, 3307);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn rejects_non_integer_port() {
        let options = AdapterOptions {
            port: Some("foo".into()),
            ..Default::default()
        };
        let err = options.into_connection_config().expect_err("bad port");
        assert!(matches!(err, AdapterError::Config(_)));
        assert!(err.to_string().contains("foo"));
    }

    #[test]
    fn rejects_non_integer_timeout() {
        let options = AdapterOptions {
            connection_timeout: Some("soon".into()),
            ..Default::default()
        };
        assert!(matches!(
            options.into_connection_config(),
            Err(AdapterError::Config(_))
        ));
    }
}
