//! Connection configuration.

use std::path::PathBuf;
use std::time::Duration;

/// TLS options for a MySQL connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// File containing the certificate authority.
    pub ca: Option<PathBuf>,
    /// File containing the client certificate.
    pub cert: Option<PathBuf>,
    /// File containing the client key.
    pub key: Option<PathBuf>,
    /// Disable TLS entirely.
    pub disabled: bool,
}

/// Configuration for opening a physical MySQL connection.
///
/// This doubles as the pool's *default* configuration: the pool applies the
/// current `database` to connections at checkout, so mutating the default
/// affects only connections acquired after the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server hostname or IP address.
    pub host: String,

    /// Server port (default: 3306).
    pub port: u16,

    /// Unix socket path; takes precedence over host/port when set.
    pub unix_socket: Option<PathBuf>,

    /// Active database for the session.
    pub database: Option<String>,

    /// User name.
    pub user: Option<String>,

    /// Password.
    pub password: Option<String>,

    /// Second password, for multi-factor authentication.
    pub password2: Option<String>,

    /// Third password, for multi-factor authentication.
    pub password3: Option<String>,

    /// Timeout for the TCP or Unix socket connection.
    pub connect_timeout: Option<Duration>,

    /// TLS options.
    pub tls: TlsOptions,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            unix_socket: None,
            database: None,
            user: None,
            password: None,
            password2: None,
            password3: None,
            connect_timeout: None,
            tls: TlsOptions::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active database.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the server host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the server port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the user name.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}
