use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use log::{error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use crate::{Error, Result};
use crate::connection::{Connection, RtmpTransport};
use crate::message::PacketDispatcher;
use crate::server::bind_server;
use crate::server::config::ServerConfig;
use crate::server::context::ServerContext;
use crate::server::state::ServerState;

/// Accepts connections and serves them one at a time.
pub struct RtmpServer {
    config: ServerConfig,
    context: Arc<ServerContext>,
    dispatcher: Arc<PacketDispatcher>,

    /// Taken by the accept loop, or by `stop` if the loop never ran
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
}

impl RtmpServer {
    /// Validate the config and start listening.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let listener = bind_server(&config)?;
        let local_addr = listener.local_addr()?;

        Ok(RtmpServer {
            config,
            context: Arc::new(ServerContext::new()),
            dispatcher: Arc::new(PacketDispatcher::new()),
            listener: Mutex::new(Some(listener)),
            local_addr,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn context(&self) -> Arc<ServerContext> {
        self.context.clone()
    }

    pub fn state(&self) -> ServerState {
        self.context.state()
    }

    pub async fn wait_stopped(&self) {
        self.context.wait_stopped().await
    }

    fn take_listener(&self) -> Option<TcpListener> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Accept loop. Returns once a stop has been requested and the current
    /// connection, if any, has finished.
    pub async fn run(&self) -> Result<()> {
        let Some(listener) = self.take_listener() else {
            if self.state().is_shutting_down() {
                return Ok(());
            }
            return Err(Error::invalid_state("accept loop is already running"));
        };

        let mut state_rx = self.context.subscribe();
        info!("Accepting connections on {}", self.local_addr);

        while self.state() == ServerState::Accepting {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = state_rx.wait_for(|state| *state != ServerState::Accepting) => break,
            };

            match accepted {
                Ok((stream, peer)) => self.serve(stream, peer).await,
                Err(e) => error!("Accept failed: {}", e),
            }
        }

        drop(listener);
        self.context.mark_stopped();
        info!("Server stopped");
        Ok(())
    }

    async fn serve(&self, stream: TcpStream, peer: SocketAddr) {
        if self.config.tcp_nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }
        }

        let id = self.context.generate_connection_id();
        info!("Connection {} from {}", id, peer);

        let connection = Connection::new(
            id,
            RtmpTransport::new(stream),
            self.context.clone(),
            self.dispatcher.clone(),
            self.config.ready_timeout,
        );
        connection.process().await;
    }

    /// Stop accepting and wait until the accept loop has shut down.
    pub async fn stop(&self) {
        if self.state() == ServerState::Stopped {
            return;
        }

        let previous = self.context.request_stop();
        info!("Stopping server ({})", previous);

        if let Some(listener) = self.take_listener() {
            drop(listener);
            self.context.mark_stopped();
            info!("Server stopped");
            return;
        }

        self.context.wait_stopped().await;
    }
}
