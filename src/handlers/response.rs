use crate::Result;
use crate::amf::{markers, Amf0Encoder};
use crate::protocol::{HeaderClass, RtmpHeader, RtmpPacket, RTMP_MAX_HEADER_SIZE};

pub const FMS_VERSION: &str = "FMS/3,5,1,525";
pub const SERVER_DATA_VERSION: &str = "3,5,1,525";

/// Body bounds: the reply buffer less room for the largest chunk header.
pub const CONNECT_RESULT_LIMIT: usize = 384 - RTMP_MAX_HEADER_SIZE;
pub const CREATE_STREAM_RESULT_LIMIT: usize = 256 - RTMP_MAX_HEADER_SIZE;

/// Builds the fixed-layout invoke replies.
pub struct ResponseEncoder;

impl ResponseEncoder {
    /// `_result` for `connect`: server properties, then the status info.
    pub fn encode_connect_result(transaction_id: f64, object_encoding: f64) -> Result<Vec<u8>> {
        let mut enc = Amf0Encoder::with_limit(CONNECT_RESULT_LIMIT);
        enc.write_string("_result")?;
        enc.write_number(transaction_id)?;

        enc.write_marker(markers::OBJECT)?;
        enc.write_named_string("fmsVer", FMS_VERSION)?;
        enc.write_named_number("capabilities", 31.0)?;
        enc.write_named_number("mode", 1.0)?;
        enc.write_object_end()?;

        enc.write_marker(markers::OBJECT)?;
        enc.write_named_string("level", "status")?;
        enc.write_named_string("code", "NetConnection.Connect.Success")?;
        enc.write_named_string("description", "Connection succeeded.")?;
        enc.write_named_number("objectEncoding", object_encoding)?;
        enc.write_name("data")?;
        enc.write_marker(markers::OBJECT)?;
        enc.write_named_string("version", SERVER_DATA_VERSION)?;
        enc.write_object_end()?;
        enc.write_object_end()?;

        Ok(enc.into_bytes())
    }

    /// `_result` for `createStream`: null command object, then the stream id.
    pub fn encode_create_stream_result(transaction_id: f64, stream_id: u32) -> Result<Vec<u8>> {
        let mut enc = Amf0Encoder::with_limit(CREATE_STREAM_RESULT_LIMIT);
        enc.write_string("_result")?;
        enc.write_number(transaction_id)?;
        enc.write_null()?;
        enc.write_number(stream_id as f64)?;
        Ok(enc.into_bytes())
    }

    /// Reply packet on the command channel.
    ///
    /// Medium is the most compact header class the writer may use. The
    /// first packet on a channel still goes out with a full header, where
    /// librtmp would send the Medium header as is.
    pub fn reply_packet(body: Vec<u8>) -> RtmpPacket {
        let header = RtmpHeader::command(0, body.len() as u32, 0).with_header_class(HeaderClass::Medium);
        RtmpPacket::new(header, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf::Amf0Value;
    use crate::protocol::{InvocationRequest, CHUNK_STREAM_COMMAND, MSG_TYPE_COMMAND_AMF0};

    #[test]
    fn test_create_stream_result_bytes() {
        let body = ResponseEncoder::encode_create_stream_result(2.0, 1).unwrap();

        let mut expected = vec![0x02, 0x00, 0x07];
        expected.extend_from_slice(b"_result");
        expected.push(0x00);
        expected.extend_from_slice(&2.0f64.to_be_bytes());
        expected.push(0x05);
        expected.push(0x00);
        expected.extend_from_slice(&1.0f64.to_be_bytes());

        assert_eq!(body, expected);
        assert_eq!(body.len(), 29);
    }

    #[test]
    fn test_connect_result_layout() {
        let body = ResponseEncoder::encode_connect_result(1.0, 0.0).unwrap();
        assert_eq!(body.len(), 236);
        assert!(body.len() <= CONNECT_RESULT_LIMIT);

        // Properties come out in a fixed order.
        let mut prefix = vec![0x02, 0x00, 0x07];
        prefix.extend_from_slice(b"_result");
        prefix.push(0x00);
        prefix.extend_from_slice(&1.0f64.to_be_bytes());
        prefix.extend_from_slice(&[0x03, 0x00, 0x06]);
        prefix.extend_from_slice(b"fmsVer");
        assert!(body.starts_with(&prefix));
        assert!(body.ends_with(&[0x00, 0x00, 0x09, 0x00, 0x00, 0x09]));
    }

    #[test]
    fn test_connect_result_decodes() {
        let body = ResponseEncoder::encode_connect_result(1.0, 3.0).unwrap();
        let reply = InvocationRequest::decode(&body).unwrap();

        assert_eq!(reply.method(), "_result");
        assert_eq!(reply.transaction_id(), 1.0);
        assert_eq!(reply.len(), 4);

        let props = reply.get(2).unwrap();
        assert_eq!(props.get_property("fmsVer").and_then(Amf0Value::as_string), Some(FMS_VERSION));
        assert_eq!(props.get_property("capabilities").and_then(Amf0Value::as_number), Some(31.0));
        assert_eq!(props.get_property("mode").and_then(Amf0Value::as_number), Some(1.0));

        let info = reply.get(3).unwrap();
        assert_eq!(info.get_property("level").and_then(Amf0Value::as_string), Some("status"));
        assert_eq!(
            info.get_property("code").and_then(Amf0Value::as_string),
            Some("NetConnection.Connect.Success")
        );
        assert_eq!(info.get_property("objectEncoding").and_then(Amf0Value::as_number), Some(3.0));
        let data = info.get_property("data").unwrap();
        assert_eq!(data.get_property("version").and_then(Amf0Value::as_string), Some(SERVER_DATA_VERSION));
    }

    #[test]
    fn test_reply_header_class_is_a_ceiling() {
        let mut writer = crate::chunk::ChunkWriter::new();
        let first = writer.create_chunks(&ResponseEncoder::reply_packet(vec![0; 29])).unwrap();
        let second = writer.create_chunks(&ResponseEncoder::reply_packet(vec![0; 29])).unwrap();

        // fmt 0 on a fresh channel, then the requested fmt 1
        assert_eq!(first[0], 0x03);
        assert_eq!(first.len(), 1 + 11 + 29);
        assert_eq!(second[0], 0x43);
        assert_eq!(second.len(), 1 + 7 + 29);
    }

    #[test]
    fn test_reply_packet_header() {
        let packet = ResponseEncoder::reply_packet(vec![0; 29]);
        assert_eq!(packet.header.chunk_stream_id, CHUNK_STREAM_COMMAND);
        assert_eq!(packet.header.message_type, MSG_TYPE_COMMAND_AMF0);
        assert_eq!(packet.header.header_class, HeaderClass::Medium);
        assert_eq!(packet.header.message_stream_id, 0);
        assert_eq!(packet.header.timestamp, 0);
        assert_eq!(packet.header.message_length, 29);
    }
}
