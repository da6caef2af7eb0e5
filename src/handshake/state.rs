use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HandshakeState {
    /// Waiting for C0+C1 from client
    #[default]
    Uninitialized,

    /// Sent S0+S1+S2, waiting for C2
    SentS0S1S2,

    /// Received C2, handshake complete
    Done,

    Failed,
}

impl HandshakeState {
    pub fn is_done(&self) -> bool {
        *self == HandshakeState::Done
    }

    pub fn transition(&mut self, event: HandshakeEvent) -> Result<()> {
        match (*self, event) {
            (HandshakeState::Uninitialized, HandshakeEvent::ReceivedC0C1) => {
                *self = HandshakeState::SentS0S1S2;
                Ok(())
            }
            (HandshakeState::SentS0S1S2, HandshakeEvent::ReceivedC2) => {
                *self = HandshakeState::Done;
                Ok(())
            }
            (_, HandshakeEvent::Error) => {
                *self = HandshakeState::Failed;
                Ok(())
            }
            _ => Err(Error::handshake(format!(
                "invalid transition from {:?} on {:?}",
                self, event
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum HandshakeEvent {
    ReceivedC0C1,
    ReceivedC2,
    Error,
}

/// Handshake flavour chosen by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeFormat {
    /// Plain handshake, S2 echoes C1
    Simple,

    /// Digest handshake, digest located via bytes 8..12
    Format1,

    /// Digest handshake, digest located via bytes 772..776
    Format2,
}

impl HandshakeFormat {
    pub fn is_digest(self) -> bool {
        self != HandshakeFormat::Simple
    }
}
