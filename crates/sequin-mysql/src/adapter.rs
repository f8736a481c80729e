//! Adapter entry point: validated options plus a driver factory.

use std::sync::Arc;

use sequin_driver::{ConnectionConfig, ConnectionFactory};
use sequin_pool::Pool;

use crate::config::AdapterOptions;
use crate::connection::MysqlConnection;
use crate::error::AdapterError;

/// The MySQL adapter.
///
/// Construction validates the options; [`MysqlAdapter::connect`] establishes
/// the pool and returns the live connection object.
pub struct MysqlAdapter {
    config: ConnectionConfig,
    pool_size: usize,
    factory: Arc<dyn ConnectionFactory>,
}

impl MysqlAdapter {
    /// Validate `options` and bind the adapter to a driver factory.
    pub fn new(
        options: AdapterOptions,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self, AdapterError> {
        let (config, pool_size) = options.into_connection_config()?;
        Ok(Self {
            config,
            pool_size,
            factory,
        })
    }

    /// A stable identifier for this adapter configuration, used by the tool
    /// to tell sessions apart: `host-or-socket:port/database`.
    #[must_use]
    pub fn connection_id(&self) -> String {
        let endpoint = match &self.config.unix_socket {
            Some(socket) => socket.display().to_string(),
            None => self.config.host.clone(),
        };
        format!(
            "{endpoint}:{}/{}",
            self.config.port,
            self.config.database.as_deref().unwrap_or_default()
        )
    }

    /// Open the connection pool.
    ///
    /// Bad credentials, an unreachable host, or bad TLS material surface
    /// here as [`AdapterError::Connection`]; the adapter can be retried with
    /// fixed options.
    pub fn connect(&self) -> Result<MysqlConnection, AdapterError> {
        let pool = Pool::connect(
            Arc::clone(&self.factory),
            self.config.clone(),
            self.pool_size,
        )
        .map_err(|e| AdapterError::Connection(e.to_string()))?;
        Ok(MysqlConnection::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(options: AdapterOptions) -> MysqlAdapter {
        let server = sequin_testing::MockServer::new();
        MysqlAdapter::new(options, server.factory()).expect("valid options")
    }

    #[test]
    fn connection_id_formats() {
        assert_eq!(adapter(AdapterOptions::default()).connection_id(), "localhost:3306/");
        assert_eq!(
            adapter(AdapterOptions {
                host: Some("foo.bar".into()),
                port: Some("3305".into()),
                ..Default::default()
            })
            .connection_id(),
            "foo.bar:3305/"
        );
        assert_eq!(
            adapter(AdapterOptions {
                unix_socket: Some("/foo/bar".into()),
                database: Some("baz".into()),
                ..Default::default()
            })
            .connection_id(),
            "/foo/bar:3306/baz"
        );
    }
}
