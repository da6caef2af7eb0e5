use crate::protocol::constants::*;

/// Packet kinds by message type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    ChunkSize,
    BytesRead,
    UserControl,
    ServerBandwidth,
    ClientBandwidth,
    Audio,
    Video,
    FlexStreamSend,
    FlexSharedObject,
    /// AMF3 invoke, one format byte ahead of an AMF0 body
    FlexMessage,
    Metadata,
    SharedObject,
    /// AMF0 invoke
    Invoke,
    /// Aggregate of FLV tags
    Flv,

    /// Anything else, including abort (0x02)
    Unknown(u8),
}

impl MessageType {
    pub fn from_id(id: u8) -> Self {
        match id {
            MSG_TYPE_SET_CHUNK_SIZE => MessageType::ChunkSize,
            MSG_TYPE_ACK => MessageType::BytesRead,
            MSG_TYPE_USER_CONTROL => MessageType::UserControl,
            MSG_TYPE_WINDOW_ACK => MessageType::ServerBandwidth,
            MSG_TYPE_SET_PEER_BW => MessageType::ClientBandwidth,
            MSG_TYPE_AUDIO => MessageType::Audio,
            MSG_TYPE_VIDEO => MessageType::Video,
            MSG_TYPE_DATA_AMF3 => MessageType::FlexStreamSend,
            MSG_TYPE_SHARED_OBJECT_AMF3 => MessageType::FlexSharedObject,
            MSG_TYPE_COMMAND_AMF3 => MessageType::FlexMessage,
            MSG_TYPE_DATA_AMF0 => MessageType::Metadata,
            MSG_TYPE_SHARED_OBJECT_AMF0 => MessageType::SharedObject,
            MSG_TYPE_COMMAND_AMF0 => MessageType::Invoke,
            MSG_TYPE_AGGREGATE => MessageType::Flv,
            _ => MessageType::Unknown(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(MessageType::from_id(0x01), MessageType::ChunkSize);
        assert_eq!(MessageType::from_id(0x03), MessageType::BytesRead);
        assert_eq!(MessageType::from_id(0x11), MessageType::FlexMessage);
        assert_eq!(MessageType::from_id(0x14), MessageType::Invoke);
        assert_eq!(MessageType::from_id(0x16), MessageType::Flv);
    }

    #[test]
    fn test_unlisted_tags_are_unknown() {
        assert_eq!(MessageType::from_id(0x02), MessageType::Unknown(0x02));
        assert_eq!(MessageType::from_id(0x07), MessageType::Unknown(0x07));
        assert_eq!(MessageType::from_id(0xFF), MessageType::Unknown(0xFF));
    }
}
