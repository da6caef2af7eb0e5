mod utils;
mod amf;
mod protocol;
mod handshake;
mod chunk;
mod message;
mod connection;
mod server;
mod handlers;

// Re-export commonly used types at crate root
pub use utils::*;
pub use amf::*;
pub use protocol::*;
pub use message::*;
pub use connection::*;
pub use chunk::*;
pub use handshake::*;
pub use handlers::*;

// Server exports
pub use server::{
    bind_server, ConsoleExit, ControlConsole, RtmpServer, ServerConfig, ServerConfigBuilder,
    ServerContext, ServerState,
};
