mod state;
mod c0c1;
mod s0s1s2;

pub use state::*;
pub use c0c1::*;
pub use s0s1s2::*;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use crate::Result;

/// Build the S0+S1+S2 answer matching the client's handshake flavour.
pub fn generate_s0s1s2(c0c1: &C0C1) -> Result<S0S1S2> {
    let format = c0c1.detect_format();
    if format.is_digest() {
        S0S1S2::generate_complex(c0c1, format)
    } else {
        S0S1S2::generate(c0c1)
    }
}

/// Run the server side of the handshake.
///
/// A C2 that fails validation is logged and tolerated; some players sign
/// it incorrectly.
pub async fn serve_handshake<R, W>(reader: &mut R, writer: &mut W) -> Result<HandshakeFormat>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut state = HandshakeState::default();

    let mut c0c1_buf = vec![0u8; 1 + HANDSHAKE_SIZE];
    reader.read_exact(&mut c0c1_buf).await?;
    let c0c1 = C0C1::parse(&c0c1_buf)?;
    let s0s1s2 = generate_s0s1s2(&c0c1)?;
    debug!("Client handshake: {:?}", s0s1s2.format);

    writer.write_all(&s0s1s2.encode()).await?;
    writer.flush().await?;
    state.transition(HandshakeEvent::ReceivedC0C1)?;

    let mut c2_buf = vec![0u8; HANDSHAKE_SIZE];
    reader.read_exact(&mut c2_buf).await?;
    if let Err(e) = C2::parse(&c2_buf).and_then(|c2| c2.validate(&s0s1s2)) {
        warn!("{}, continuing anyway", e);
    }
    state.transition(HandshakeEvent::ReceivedC2)?;

    Ok(s0s1s2.format)
}

/// Run the client side of a plain handshake.
pub async fn client_handshake<R, W>(reader: &mut R, writer: &mut W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(&C0C1::create_client().encode()).await?;
    writer.flush().await?;

    let mut s0s1s2_buf = vec![0u8; 1 + HANDSHAKE_SIZE * 2];
    reader.read_exact(&mut s0s1s2_buf).await?;
    let s0s1s2 = S0S1S2::parse(&s0s1s2_buf)?;

    writer.write_all(&C2::create_from_s1(&s0s1s2).encode()).await?;
    writer.flush().await?;
    Ok(())
}
