use std::time::Duration;
use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use crate::{Result, MSG_TYPE_SET_CHUNK_SIZE};
use crate::chunk::{ChunkReader, ChunkWriter};
use crate::handshake::{serve_handshake, HandshakeFormat};
use crate::protocol::RtmpPacket;

/// Packet-level view of one peer connection.
#[async_trait]
pub trait Transport: Send {
    /// Wait up to `timeout` for the first inbound bytes.
    ///
    /// `Ok(false)` means nothing arrived (timeout or end of stream).
    async fn wait_ready(&mut self, timeout: Duration) -> Result<bool>;

    async fn handshake(&mut self) -> Result<HandshakeFormat>;

    fn is_connected(&self) -> bool;

    /// Next complete packet, or `None` after a chunk of an unfinished message.
    async fn read_packet(&mut self) -> Result<Option<RtmpPacket>>;

    async fn send_packet(&mut self, packet: &RtmpPacket) -> Result<()>;

    async fn close(&mut self);
}

/// RTMP chunk stream over any byte stream.
pub struct RtmpTransport<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    chunk_reader: ChunkReader,
    chunk_writer: ChunkWriter,
    connected: bool,
}

impl<S: AsyncRead + AsyncWrite> RtmpTransport<S> {
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        RtmpTransport {
            reader: BufReader::new(read_half),
            writer: write_half,
            chunk_reader: ChunkReader::new(),
            chunk_writer: ChunkWriter::new(),
            connected: true,
        }
    }

    /// Set Chunk Size changes how the rest of the peer's stream is framed.
    fn apply_control(&mut self, packet: &RtmpPacket) {
        if packet.message_type() != MSG_TYPE_SET_CHUNK_SIZE {
            return;
        }
        let Some(bytes) = packet.payload.get(..4) else {
            warn!("Short chunk size message ({} bytes)", packet.body_size());
            return;
        };
        let size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) & 0x7FFF_FFFF;
        match self.chunk_reader.set_chunk_size(size) {
            Ok(()) => debug!("Peer chunk size now {}", size),
            Err(e) => warn!("Ignoring chunk size change: {}", e),
        }
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Send + 'static> Transport for RtmpTransport<S> {
    async fn wait_ready(&mut self, timeout: Duration) -> Result<bool> {
        match tokio::time::timeout(timeout, self.reader.fill_buf()).await {
            Ok(Ok(buf)) => Ok(!buf.is_empty()),
            Ok(Err(e)) => {
                self.connected = false;
                Err(e.into())
            }
            Err(_) => Ok(false),
        }
    }

    async fn handshake(&mut self) -> Result<HandshakeFormat> {
        let result = serve_handshake(&mut self.reader, &mut self.writer).await;
        if result.is_err() {
            self.connected = false;
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn read_packet(&mut self) -> Result<Option<RtmpPacket>> {
        match self.chunk_reader.read_chunk(&mut self.reader).await {
            Ok(Some(packet)) => {
                self.apply_control(&packet);
                Ok(Some(packet))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.connected = false;
                Err(e)
            }
        }
    }

    async fn send_packet(&mut self, packet: &RtmpPacket) -> Result<()> {
        let result = self.chunk_writer.write_packet(packet, &mut self.writer).await;
        if result.is_err() {
            self.connected = false;
        }
        result
    }

    async fn close(&mut self) {
        if self.connected {
            if let Err(e) = self.writer.shutdown().await {
                debug!("Shutdown after close failed: {}", e);
            }
        }
        self.connected = false;
    }
}
