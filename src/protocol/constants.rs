// Message types
pub const MSG_TYPE_SET_CHUNK_SIZE: u8 = 1;
pub const MSG_TYPE_ACK: u8 = 3;                  // Bytes read report
pub const MSG_TYPE_USER_CONTROL: u8 = 4;         // Ping / stream control
pub const MSG_TYPE_WINDOW_ACK: u8 = 5;           // Server bandwidth
pub const MSG_TYPE_SET_PEER_BW: u8 = 6;          // Client bandwidth
pub const MSG_TYPE_AUDIO: u8 = 8;
pub const MSG_TYPE_VIDEO: u8 = 9;
pub const MSG_TYPE_DATA_AMF3: u8 = 15;           // Flex stream send
pub const MSG_TYPE_SHARED_OBJECT_AMF3: u8 = 16;  // Flex shared object
pub const MSG_TYPE_COMMAND_AMF3: u8 = 17;        // Flex message
pub const MSG_TYPE_DATA_AMF0: u8 = 18;           // Metadata / notify
pub const MSG_TYPE_SHARED_OBJECT_AMF0: u8 = 19;
pub const MSG_TYPE_COMMAND_AMF0: u8 = 20;        // Invoke
pub const MSG_TYPE_AGGREGATE: u8 = 22;           // FLV tags

// Chunk stream IDs
pub const CHUNK_STREAM_COMMAND: u32 = 3;

// Default values
pub const DEFAULT_PORT: u16 = 1935;
pub const DEFAULT_CHUNK_SIZE: u32 = 128;
pub const MAX_CHUNK_SIZE: u32 = 0x7FFF_FFFF;

/// Largest possible chunk header (3 byte basic + 11 byte message + 4 byte extended timestamp)
pub const RTMP_MAX_HEADER_SIZE: usize = 18;
