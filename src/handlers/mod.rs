mod connect;
mod create_stream;
mod play;
mod response;

use std::collections::HashMap;
use std::sync::Arc;
use log::{debug, error, warn};
use crate::Result;
use crate::amf::markers;
use crate::connection::SessionContext;
use crate::protocol::InvocationRequest;

pub use connect::ConnectHandler;
pub use create_stream::CreateStreamHandler;
pub use play::PlayHandler;
pub use response::*;

/// Whether the session keeps going after an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Continue,
    Close,
}

/// Invocation methods with dedicated handling
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Connect,
    CreateStream,
    Play,
    Other(String),
}

impl Method {
    pub fn from_name(name: &str) -> Self {
        match name {
            "connect" => Method::Connect,
            "createStream" => Method::CreateStream,
            "play" => Method::Play,
            other => Method::Other(other.to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    fn method(&self) -> Method;

    async fn handle(
        &self,
        request: &InvocationRequest,
        ctx: &mut SessionContext<'_>,
    ) -> Result<InvokeOutcome>;
}

/// Decodes invoke bodies and routes them by method name.
pub struct InvocationHandler {
    handlers: HashMap<Method, Arc<dyn CommandHandler>>,
}

impl Default for InvocationHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationHandler {
    pub fn new() -> Self {
        let mut handler = InvocationHandler {
            handlers: HashMap::new(),
        };

        handler.register(Arc::new(ConnectHandler));
        handler.register(Arc::new(CreateStreamHandler));
        handler.register(Arc::new(PlayHandler));

        handler
    }

    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(handler.method(), handler);
    }

    /// Serve one invoke body.
    ///
    /// Malformed bodies are logged and skipped. Only a failed reply send is
    /// returned as an error.
    pub async fn serve(&self, body: &[u8], ctx: &mut SessionContext<'_>) -> Result<InvokeOutcome> {
        if body.first() != Some(&markers::STRING) {
            warn!("Sanity failed: no string method in invoke packet");
            return Ok(InvokeOutcome::Continue);
        }

        let request = match InvocationRequest::decode(body) {
            Ok(request) => request,
            Err(e) => {
                error!("Error decoding invoke packet: {}", e);
                return Ok(InvokeOutcome::Continue);
            }
        };

        let method = request.method();
        debug!("Session {}: invoking <{}>", ctx.session.id, method);

        match self.handlers.get(&Method::from_name(method)) {
            Some(handler) => handler.handle(&request, ctx).await,
            None => {
                debug!("Session {}: no handling for <{}>, ignoring", ctx.session.id, method);
                Ok(InvokeOutcome::Continue)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::protocol::{RtmpCommand, RtmpHeader, RtmpPacket};

    pub(crate) fn raw_packet(message_type: u8, payload: Vec<u8>) -> RtmpPacket {
        let header = RtmpHeader::new(0, payload.len() as u32, message_type, 0, 3);
        RtmpPacket::new(header, payload)
    }

    pub(crate) fn invoke_packet(command: &RtmpCommand) -> RtmpPacket {
        raw_packet(crate::MSG_TYPE_COMMAND_AMF0, command.encode().unwrap())
    }
}
