use tokio::net::{TcpListener, TcpSocket};
use crate::{Error, Result};

mod config;
mod console;
mod context;
mod server;
mod state;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use console::{ConsoleExit, ControlConsole};
pub use context::ServerContext;
pub use server::RtmpServer;
pub use state::ServerState;

/// Listen on the configured address with SO_REUSEADDR set.
pub fn bind_server(config: &ServerConfig) -> Result<TcpListener> {
    let addr = config.socket_addr()?;

    let bind = || -> std::io::Result<TcpListener> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        socket.listen(config.backlog)
    };

    bind().map_err(|e| Error::connection(format!("Failed to listen on {}: {}", addr, e)))
}
