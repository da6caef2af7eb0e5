use crate::{Error, Result, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::protocol::{HeaderClass, RtmpHeader, RtmpPacket};
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Basic header: fmt bits plus a 1, 2 or 3 byte channel id
pub fn encode_basic_header(fmt: u8, cs_id: u32, out: &mut Vec<u8>) {
    match cs_id {
        0..=63 => out.push((fmt << 6) | cs_id as u8),
        64..=319 => out.extend_from_slice(&[fmt << 6, (cs_id - 64) as u8]),
        _ => {
            let id = (cs_id - 64) as u16;
            out.push((fmt << 6) | 1);
            out.extend_from_slice(&id.to_le_bytes());
        }
    }
}

fn push_u24(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes()[1..]);
}

pub struct ChunkWriter {
    /// Previous headers for each chunk stream
    prev_headers: HashMap<u32, RtmpHeader>,

    /// Current chunk size for writing
    chunk_size_out: usize,
}

impl Default for ChunkWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkWriter {
    pub fn new() -> Self {
        ChunkWriter {
            prev_headers: HashMap::new(),
            chunk_size_out: DEFAULT_CHUNK_SIZE as usize,
        }
    }

    pub fn set_chunk_size(&mut self, size: u32) -> Result<()> {
        if size == 0 || size > MAX_CHUNK_SIZE {
            return Err(Error::chunk(format!("invalid chunk size {}", size)));
        }
        self.chunk_size_out = size as usize;
        Ok(())
    }

    /// Write packet as chunks and flush
    pub async fn write_packet<W: AsyncWrite + Unpin>(
        &mut self,
        packet: &RtmpPacket,
        writer: &mut W,
    ) -> Result<()> {
        let chunks = self.create_chunks(packet)?;
        writer.write_all(&chunks).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Most compact header the channel history allows for this packet.
    ///
    /// The first packet on a channel, or one for a different message stream,
    /// always gets a full header.
    fn allowed_header_class(&self, header: &RtmpHeader) -> HeaderClass {
        let Some(prev) = self.prev_headers.get(&header.chunk_stream_id) else {
            return HeaderClass::Large;
        };
        if prev.message_stream_id != header.message_stream_id {
            return HeaderClass::Large;
        }
        if prev.message_type != header.message_type || prev.message_length != header.message_length {
            return HeaderClass::Medium;
        }
        if prev.timestamp != header.timestamp {
            return HeaderClass::Small;
        }
        HeaderClass::Minimal
    }

    /// Split a packet into chunks and record its header for the channel.
    pub fn create_chunks(&mut self, packet: &RtmpPacket) -> Result<Vec<u8>> {
        let mut header = packet.header;
        header.message_length = u32::try_from(packet.payload.len())
            .ok()
            .filter(|len| *len <= 0x00FF_FFFF)
            .ok_or_else(|| Error::chunk(format!("message of {} bytes too large", packet.payload.len())))?;

        let class = header.header_class.min(self.allowed_header_class(&header));
        let ts_value = match (class, self.prev_headers.get(&header.chunk_stream_id)) {
            (HeaderClass::Large, _) | (_, None) => header.timestamp,
            (_, Some(prev)) => header.timestamp.wrapping_sub(prev.timestamp),
        };
        let extended = class != HeaderClass::Minimal && ts_value >= 0xFFFFFF;

        let cs_id = header.chunk_stream_id;
        let payload_len = packet.payload.len();
        let mut result = Vec::with_capacity(payload_len + 18 + payload_len / self.chunk_size_out * 4);

        encode_basic_header(class.fmt(), cs_id, &mut result);
        if class != HeaderClass::Minimal {
            push_u24(&mut result, if extended { 0xFFFFFF } else { ts_value });
        }
        if class <= HeaderClass::Medium {
            push_u24(&mut result, header.message_length);
            result.push(header.message_type);
        }
        if class == HeaderClass::Large {
            result.extend_from_slice(&header.message_stream_id.to_le_bytes());
        }
        if extended {
            result.extend_from_slice(&ts_value.to_be_bytes());
        }

        let mut chunks = packet.payload.chunks(self.chunk_size_out);
        if let Some(first) = chunks.next() {
            result.extend_from_slice(first);
        }
        for chunk in chunks {
            encode_basic_header(HeaderClass::Minimal.fmt(), cs_id, &mut result);
            if extended {
                result.extend_from_slice(&ts_value.to_be_bytes());
            }
            result.extend_from_slice(chunk);
        }

        self.prev_headers.insert(cs_id, header);
        Ok(result)
    }
}
