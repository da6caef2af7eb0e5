use crate::{Error, Result, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::protocol::{HeaderClass, RtmpHeader, RtmpPacket};
use crate::chunk::stream::ChunkStreamContext;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};

pub struct ChunkReader {
    /// Chunk streams by ID
    chunk_streams: HashMap<u32, ChunkStreamContext>,

    /// Current chunk size for reading
    chunk_size_in: usize,
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_u24<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 3];
    reader.read_exact(&mut bytes).await?;
    Ok(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
}

impl ChunkReader {
    pub fn new() -> Self {
        ChunkReader {
            chunk_streams: HashMap::new(),
            chunk_size_in: DEFAULT_CHUNK_SIZE as usize,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size_in
    }

    /// Apply a peer's Set Chunk Size
    pub fn set_chunk_size(&mut self, size: u32) -> Result<()> {
        if size == 0 || size > MAX_CHUNK_SIZE {
            return Err(Error::chunk(format!("invalid chunk size {}", size)));
        }
        self.chunk_size_in = size as usize;
        Ok(())
    }

    /// Read one chunk.
    ///
    /// Returns `None` while the message it belongs to is still incomplete.
    pub async fn read_chunk<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut R,
    ) -> Result<Option<RtmpPacket>> {
        let first_byte = reader.read_u8().await?;
        let fmt = (first_byte >> 6) & 0x03;
        let cs_id = match first_byte & 0x3F {
            0 => reader.read_u8().await? as u32 + 64,
            1 => {
                let mut id_bytes = [0u8; 2];
                reader.read_exact(&mut id_bytes).await?;
                u16::from_le_bytes(id_bytes) as u32 + 64
            }
            n => n as u32,
        };

        let context = self.chunk_streams.entry(cs_id).or_default();
        let header_class = HeaderClass::from_fmt(fmt);

        if header_class == HeaderClass::Minimal {
            if context.extended_timestamp {
                let _ = reader.read_u32().await?;
            }
            if !context.is_assembling() {
                let prev = context.prev_header.ok_or_else(|| {
                    Error::chunk(format!("fmt 3 chunk on channel {} without a previous header", cs_id))
                })?;
                context.start_message(RtmpHeader { header_class, has_abs_timestamp: false, ..prev });
            }
        } else {
            let (header, extended) = Self::read_message_header(header_class, cs_id, context.prev_header, reader).await?;
            context.extended_timestamp = extended;
            // A fresh header mid-message restarts assembly on this channel.
            context.start_message(header);
        }

        let chunk_data_size = context.bytes_remaining.min(self.chunk_size_in);
        let mut chunk_data = vec![0u8; chunk_data_size];
        reader.read_exact(&mut chunk_data).await?;

        Ok(context.add_chunk_data(&chunk_data))
    }

    async fn read_message_header<R: AsyncRead + Unpin>(
        header_class: HeaderClass,
        cs_id: u32,
        prev_header: Option<RtmpHeader>,
        reader: &mut R,
    ) -> Result<(RtmpHeader, bool)> {
        let ts_field = read_u24(reader).await?;

        let (message_length, message_type, stream_id) = match header_class {
            HeaderClass::Large => {
                let length = read_u24(reader).await?;
                let message_type = reader.read_u8().await?;
                let stream_id = reader.read_u32_le().await?;
                (length, message_type, Some(stream_id))
            }
            HeaderClass::Medium => {
                let length = read_u24(reader).await?;
                let message_type = reader.read_u8().await?;
                (length, message_type, None)
            }
            _ => {
                let prev = prev_header.ok_or_else(|| {
                    Error::chunk(format!("fmt 2 chunk on channel {} without a previous header", cs_id))
                })?;
                (prev.message_length, prev.message_type, None)
            }
        };

        let extended = ts_field == 0xFFFFFF;
        let ts_value = if extended {
            reader.read_u32().await?
        } else {
            ts_field
        };

        let header = match stream_id {
            Some(stream_id) => RtmpHeader::new(ts_value, message_length, message_type, stream_id, cs_id),
            None => {
                let prev = prev_header.ok_or_else(|| {
                    Error::chunk(format!("fmt {} chunk on channel {} without a previous header", header_class.fmt(), cs_id))
                })?;
                RtmpHeader {
                    timestamp: prev.timestamp.wrapping_add(ts_value),
                    message_length,
                    message_type,
                    ..prev
                }
            }
        };

        Ok((header.with_header_class(header_class), extended))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkWriter;
    use crate::{MSG_TYPE_AUDIO, MSG_TYPE_COMMAND_AMF0};

    async fn read_all(bytes: &[u8], chunk_size: u32) -> Vec<RtmpPacket> {
        let mut reader = ChunkReader::new();
        reader.set_chunk_size(chunk_size).unwrap();
        let mut input = bytes;
        let mut packets = Vec::new();
        while !input.is_empty() {
            if let Some(packet) = reader.read_chunk(&mut input).await.unwrap() {
                packets.push(packet);
            }
        }
        packets
    }

    #[tokio::test]
    async fn test_single_chunk_message() {
        let mut bytes = vec![0x03, 0x00, 0x00, 0x10, 0x00, 0x00, 0x02, MSG_TYPE_COMMAND_AMF0, 0x01, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&[0xAA, 0xBB]);

        let packets = read_all(&bytes, 128).await;
        assert_eq!(packets.len(), 1);
        let header = packets[0].header;
        assert_eq!(header.timestamp, 0x10);
        assert_eq!(header.message_stream_id, 1);
        assert_eq!(header.header_class, HeaderClass::Large);
        assert!(header.has_abs_timestamp);
        assert_eq!(packets[0].payload, vec![0xAA, 0xBB]);
    }

    #[tokio::test]
    async fn test_fragmented_message_yields_none_first() {
        let payload: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        let packet = RtmpPacket::new(RtmpHeader::new(0, 300, MSG_TYPE_AUDIO, 1, 4), payload.clone());
        let bytes = ChunkWriter::new().create_chunks(&packet).unwrap();

        let mut reader = ChunkReader::new();
        let mut input = &bytes[..];
        assert!(reader.read_chunk(&mut input).await.unwrap().is_none());
        assert!(reader.read_chunk(&mut input).await.unwrap().is_none());
        let complete = reader.read_chunk(&mut input).await.unwrap().unwrap();
        assert_eq!(complete.payload, payload);
        assert!(input.is_empty());
    }

    #[tokio::test]
    async fn test_medium_header_applies_delta() {
        let mut writer = ChunkWriter::new();
        let first = RtmpPacket::new(RtmpHeader::new(1000, 1, MSG_TYPE_AUDIO, 1, 4), vec![1]);
        let second = RtmpPacket::new(
            RtmpHeader::new(1040, 2, MSG_TYPE_AUDIO, 1, 4).with_header_class(HeaderClass::Medium),
            vec![2, 3],
        );
        let mut bytes = writer.create_chunks(&first).unwrap();
        bytes.extend(writer.create_chunks(&second).unwrap());

        let packets = read_all(&bytes, 128).await;
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].header.timestamp, 1040);
        assert_eq!(packets[1].header.header_class, HeaderClass::Medium);
        assert!(!packets[1].header.has_abs_timestamp);
    }

    #[tokio::test]
    async fn test_extended_timestamp_across_chunks() {
        let payload = vec![7u8; 200];
        let packet = RtmpPacket::new(RtmpHeader::new(0x0123_4567, 200, MSG_TYPE_AUDIO, 1, 4), payload.clone());
        let bytes = ChunkWriter::new().create_chunks(&packet).unwrap();

        let packets = read_all(&bytes, 128).await;
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].header.timestamp, 0x0123_4567);
        assert_eq!(packets[0].payload, payload);
    }

    #[tokio::test]
    async fn test_compressed_header_without_base_fails() {
        let bytes = [0x43u8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, MSG_TYPE_AUDIO, 0x00];
        let mut reader = ChunkReader::new();
        let mut input = &bytes[..];
        assert!(matches!(reader.read_chunk(&mut input).await, Err(Error::Chunk(_))));
    }

    #[test]
    fn test_invalid_chunk_size_rejected() {
        let mut reader = ChunkReader::new();
        assert!(reader.set_chunk_size(0).is_err());
        reader.set_chunk_size(4096).unwrap();
        assert_eq!(reader.chunk_size(), 4096);
    }
}
