use crate::protocol::constants::*;

/// Chunk header size class, by chunk `fmt` value.
///
/// Larger classes carry more of the message header on the wire; smaller ones
/// inherit the missing fields from the previous chunk on the same channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeaderClass {
    /// fmt 0: timestamp, length, type and stream id (11 bytes)
    Large = 0,
    /// fmt 1: timestamp delta, length and type (7 bytes)
    Medium = 1,
    /// fmt 2: timestamp delta only (3 bytes)
    Small = 2,
    /// fmt 3: no message header
    Minimal = 3,
}

impl HeaderClass {
    pub fn from_fmt(fmt: u8) -> Self {
        match fmt & 0x03 {
            0 => HeaderClass::Large,
            1 => HeaderClass::Medium,
            2 => HeaderClass::Small,
            _ => HeaderClass::Minimal,
        }
    }

    pub fn fmt(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone)]
pub struct RtmpPacket {
    pub header: RtmpHeader,
    pub payload: Vec<u8>,
}

impl RtmpPacket {
    pub fn new(header: RtmpHeader, payload: Vec<u8>) -> Self {
        RtmpPacket { header, payload }
    }

    pub fn message_type(&self) -> u8 {
        self.header.message_type
    }

    pub fn body_size(&self) -> usize {
        self.payload.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtmpHeader {
    pub timestamp: u32,
    pub message_length: u32,
    pub message_type: u8,
    pub message_stream_id: u32,
    pub chunk_stream_id: u32,
    /// Most compact header the sender may use for this message
    pub header_class: HeaderClass,
    /// Timestamp is absolute rather than a delta from the previous message
    pub has_abs_timestamp: bool,
}

impl RtmpHeader {
    pub fn new(
        timestamp: u32,
        message_length: u32,
        message_type: u8,
        message_stream_id: u32,
        chunk_stream_id: u32,
    ) -> Self {
        RtmpHeader {
            timestamp,
            message_length,
            message_type,
            message_stream_id,
            chunk_stream_id,
            header_class: HeaderClass::Large,
            has_abs_timestamp: true,
        }
    }

    /// AMF0 invoke on the command channel
    pub fn command(timestamp: u32, length: u32, stream_id: u32) -> Self {
        RtmpHeader::new(timestamp, length, MSG_TYPE_COMMAND_AMF0, stream_id, CHUNK_STREAM_COMMAND)
    }

    pub fn with_header_class(mut self, header_class: HeaderClass) -> Self {
        self.header_class = header_class;
        self.has_abs_timestamp = header_class == HeaderClass::Large;
        self
    }

    /// Check if timestamp is extended (>= 0xFFFFFF)
    pub fn has_extended_timestamp(&self) -> bool {
        self.timestamp >= 0xFFFFFF
    }

    /// Get timestamp for wire format
    pub fn wire_timestamp(&self) -> u32 {
        if self.has_extended_timestamp() {
            0xFFFFFF
        } else {
            self.timestamp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_class_from_fmt() {
        assert_eq!(HeaderClass::from_fmt(0), HeaderClass::Large);
        assert_eq!(HeaderClass::from_fmt(1), HeaderClass::Medium);
        assert_eq!(HeaderClass::from_fmt(3), HeaderClass::Minimal);
        assert_eq!(HeaderClass::Small.fmt(), 2);
        assert!(HeaderClass::Large < HeaderClass::Medium);
    }

    #[test]
    fn test_command_header() {
        let header = RtmpHeader::command(0, 29, 0).with_header_class(HeaderClass::Medium);

        assert_eq!(header.chunk_stream_id, CHUNK_STREAM_COMMAND);
        assert_eq!(header.message_type, MSG_TYPE_COMMAND_AMF0);
        assert_eq!(header.header_class, HeaderClass::Medium);
        assert!(!header.has_abs_timestamp);

        let packet = RtmpPacket::new(header, vec![0; 29]);
        assert_eq!(packet.message_type(), MSG_TYPE_COMMAND_AMF0);
        assert_eq!(packet.body_size(), 29);
    }

    #[test]
    fn test_extended_timestamp_marker() {
        let header = RtmpHeader::new(0x0100_0000, 0, MSG_TYPE_AUDIO, 1, 4);
        assert!(header.has_extended_timestamp());
        assert_eq!(header.wire_timestamp(), 0xFFFFFF);
    }
}
