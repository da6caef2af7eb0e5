use log::{debug, trace};
use crate::Result;
use crate::connection::SessionContext;
use crate::handlers::{InvocationHandler, InvokeOutcome};
use crate::message::types::MessageType;
use crate::protocol::RtmpPacket;

/// What the session loop does after a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    Close,
}

/// Routes each complete packet by its message type.
///
/// Only invocations have behaviour; every other kind is logged and dropped.
pub struct PacketDispatcher {
    invocations: InvocationHandler,
}

impl Default for PacketDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDispatcher {
    pub fn new() -> Self {
        PacketDispatcher {
            invocations: InvocationHandler::new(),
        }
    }

    /// Dispatch one packet. Errors only come from a failed reply send.
    pub async fn dispatch(
        &self,
        packet: RtmpPacket,
        ctx: &mut SessionContext<'_>,
    ) -> Result<DispatchOutcome> {
        let kind = MessageType::from_id(packet.message_type());

        match kind {
            MessageType::FlexMessage => {
                debug!(
                    "Session {}: flex message, {} bytes",
                    ctx.session.id,
                    packet.body_size()
                );
                let body = packet.payload.get(1..).unwrap_or_default();
                // A play inside a flex message does not end the session.
                self.invocations.serve(body, ctx).await?;
                Ok(DispatchOutcome::Continue)
            }
            MessageType::Invoke => {
                debug!(
                    "Session {}: invoke, {} bytes",
                    ctx.session.id,
                    packet.body_size()
                );
                match self.invocations.serve(&packet.payload, ctx).await? {
                    InvokeOutcome::Continue => Ok(DispatchOutcome::Continue),
                    InvokeOutcome::Close => {
                        ctx.transport.close().await;
                        Ok(DispatchOutcome::Close)
                    }
                }
            }
            MessageType::Unknown(tag) => {
                debug!(
                    "Session {}: unknown packet type 0x{:02x}, {} bytes",
                    ctx.session.id,
                    tag,
                    packet.body_size()
                );
                Ok(DispatchOutcome::Continue)
            }
            other => {
                trace!(
                    "Session {}: {:?} packet, {} bytes, ignored",
                    ctx.session.id,
                    other,
                    packet.body_size()
                );
                Ok(DispatchOutcome::Continue)
            }
        }
    }
}
