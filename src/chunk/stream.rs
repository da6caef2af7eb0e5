use crate::protocol::{RtmpHeader, RtmpPacket};

/// Per-channel reassembly state on the receiving side.
#[derive(Debug, Clone, Default)]
pub struct ChunkStreamContext {
    /// Last header seen on this channel, the base for compressed headers
    pub prev_header: Option<RtmpHeader>,

    /// Partial message being assembled
    pub message_buffer: Vec<u8>,

    /// Bytes remaining for current message
    pub bytes_remaining: usize,

    /// Header of the message being assembled
    pub current_header: Option<RtmpHeader>,

    /// Whether the last header on this channel carried an extended timestamp
    pub extended_timestamp: bool,
}

impl ChunkStreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assembling(&self) -> bool {
        self.current_header.is_some()
    }

    pub fn start_message(&mut self, header: RtmpHeader) {
        self.bytes_remaining = header.message_length as usize;
        self.message_buffer.clear();
        self.message_buffer.reserve(self.bytes_remaining);
        self.prev_header = Some(header);
        self.current_header = Some(header);
    }

    /// Append one chunk of body; yields the packet once the body is complete.
    pub fn add_chunk_data(&mut self, data: &[u8]) -> Option<RtmpPacket> {
        self.message_buffer.extend_from_slice(data);
        self.bytes_remaining = self.bytes_remaining.saturating_sub(data.len());

        if self.bytes_remaining > 0 {
            return None;
        }
        let header = self.current_header.take()?;
        Some(RtmpPacket::new(header, std::mem::take(&mut self.message_buffer)))
    }
}
