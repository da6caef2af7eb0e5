use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use crate::{Error, Result};
use crate::protocol::DEFAULT_PORT;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind; must be a literal IP
    pub host: String,

    /// Port to bind, 0 for an ephemeral one
    pub port: u16,

    /// Listen backlog
    pub backlog: u32,

    /// How long a new connection may stay silent before it is dropped
    pub ready_timeout: Duration,

    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            backlog: 10,
            ready_timeout: Duration::from_secs(5),
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.backlog == 0 {
            return Err(Error::config("Invalid backlog: 0"));
        }

        if self.ready_timeout.is_zero() {
            return Err(Error::config("Ready timeout must be positive"));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| Error::config(format!("Invalid host {}: {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Builder for ServerConfig
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        ServerConfigBuilder {
            config: ServerConfig::default(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config.backlog = backlog;
        self
    }

    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.config.ready_timeout = timeout;
        self
    }

    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.config.tcp_nodelay = nodelay;
        self
    }

    pub fn build(self) -> Result<ServerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
