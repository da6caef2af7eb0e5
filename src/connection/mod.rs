mod connection;
mod context;
mod session;
pub(crate) mod transport;

pub use connection::*;
pub use context::*;
pub use session::*;
pub use transport::{RtmpTransport, Transport};
