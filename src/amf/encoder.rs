use std::collections::HashMap;
use crate::amf::amf0::{markers, Amf0Value};
use crate::{ByteBuffer, Error, Result};

/// AMF0 writer, optionally bounded to a fixed number of bytes.
///
/// Exceeding the bound is a programming error: it trips a debug assertion,
/// and in release builds surfaces as `Error::AmfEncode`.
pub struct Amf0Encoder {
    buffer: ByteBuffer,
    limit: Option<usize>,
}

impl Default for Amf0Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Amf0Encoder {
    pub fn new() -> Self {
        Amf0Encoder {
            buffer: ByteBuffer::with_capacity(256),
            limit: None,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Amf0Encoder {
            buffer: ByteBuffer::with_capacity(limit),
            limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn ensure_capacity(&self, additional: usize) -> Result<()> {
        if let Some(limit) = self.limit {
            let needed = self.buffer.len() + additional;
            debug_assert!(
                needed <= limit,
                "AMF0 output of {} bytes exceeds its {} byte bound",
                needed,
                limit
            );
            if needed > limit {
                return Err(Error::amf_encode(format!(
                    "output of {} bytes exceeds its {} byte bound",
                    needed, limit
                )));
            }
        }
        Ok(())
    }

    fn short_len(value: &str) -> Result<u16> {
        u16::try_from(value.len())
            .map_err(|_| Error::amf_encode(format!("string of {} bytes too long", value.len())))
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_capacity(bytes.len())?;
        self.buffer.write_bytes(bytes)?;
        Ok(())
    }

    fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    fn put_long_text(&mut self, marker: u8, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| Error::amf_encode("long string exceeds 4 GiB"))?;
        self.write_marker(marker)?;
        self.put_u32(len)?;
        self.put(value.as_bytes())
    }

    fn put_properties(&mut self, obj: &HashMap<String, Amf0Value>) -> Result<()> {
        for (key, value) in obj {
            self.write_name(key)?;
            self.encode(value)?;
        }
        self.write_object_end()
    }

    pub fn write_marker(&mut self, marker: u8) -> Result<()> {
        self.put(&[marker])
    }

    /// Property name: u16 length and bytes, no type marker
    pub fn write_name(&mut self, name: &str) -> Result<()> {
        let len = Self::short_len(name)?;
        self.put_u16(len)?;
        self.put(name.as_bytes())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let len = Self::short_len(value)?;
        self.ensure_capacity(3 + value.len())?;
        self.write_marker(markers::STRING)?;
        self.put_u16(len)?;
        self.put(value.as_bytes())
    }

    pub fn write_number(&mut self, value: f64) -> Result<()> {
        self.ensure_capacity(9)?;
        self.write_marker(markers::NUMBER)?;
        self.put(&value.to_be_bytes())
    }

    pub fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.put(&[markers::BOOLEAN, value as u8])
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.write_marker(markers::NULL)
    }

    pub fn write_named_string(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_name(name)?;
        self.write_string(value)
    }

    pub fn write_named_number(&mut self, name: &str, value: f64) -> Result<()> {
        self.write_name(name)?;
        self.write_number(value)
    }

    /// Empty name followed by the object end marker
    pub fn write_object_end(&mut self) -> Result<()> {
        self.put(&[0x00, 0x00, markers::OBJECT_END])
    }

    pub fn encode(&mut self, value: &Amf0Value) -> Result<()> {
        match value {
            Amf0Value::Number(n) => self.write_number(*n),
            Amf0Value::Boolean(b) => self.write_boolean(*b),
            Amf0Value::String(s) => self.write_string(s),
            Amf0Value::Object(obj) => {
                self.write_marker(markers::OBJECT)?;
                self.put_properties(obj)
            }
            Amf0Value::Null => self.write_null(),
            Amf0Value::Undefined => self.write_marker(markers::UNDEFINED),
            Amf0Value::EcmaArray(obj) => {
                self.write_marker(markers::ECMA_ARRAY)?;
                self.put_u32(obj.len() as u32)?;
                self.put_properties(obj)
            }
            Amf0Value::Array(items) => {
                self.write_marker(markers::STRICT_ARRAY)?;
                self.put_u32(items.len() as u32)?;
                for item in items {
                    self.encode(item)?;
                }
                Ok(())
            }
            Amf0Value::Date(timestamp, timezone) => {
                self.write_marker(markers::DATE)?;
                self.put(&timestamp.to_be_bytes())?;
                self.put(&timezone.to_be_bytes())
            }
            Amf0Value::LongString(s) => self.put_long_text(markers::LONG_STRING, s),
            Amf0Value::Unsupported => self.write_marker(markers::UNSUPPORTED),
            Amf0Value::XmlDocument(xml) => self.put_long_text(markers::XML_DOCUMENT, xml),
            Amf0Value::TypedObject(class_name, obj) => {
                self.write_marker(markers::TYPED_OBJECT)?;
                self.write_name(class_name)?;
                self.put_properties(obj)
            }
        }
    }

    pub fn get_bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amf0Decoder;

    #[test]
    fn test_named_entries_layout() {
        let mut encoder = Amf0Encoder::new();
        encoder.write_marker(markers::OBJECT).unwrap();
        encoder.write_named_number("mode", 1.0).unwrap();
        encoder.write_object_end().unwrap();

        let mut expected = vec![0x03, 0x00, 0x04];
        expected.extend_from_slice(b"mode");
        expected.push(0x00);
        expected.extend_from_slice(&1.0f64.to_be_bytes());
        expected.extend_from_slice(&[0x00, 0x00, 0x09]);
        assert_eq!(encoder.get_bytes(), expected.as_slice());
    }

    #[test]
    fn test_encoded_values_decode_back() {
        let mut obj = HashMap::new();
        obj.insert("tcUrl".to_string(), Amf0Value::String("rtmp://localhost/live".into()));
        obj.insert("fpad".to_string(), Amf0Value::Boolean(false));
        let value = Amf0Value::Object(obj);

        let mut encoder = Amf0Encoder::new();
        encoder.encode(&value).unwrap();

        let mut buffer = ByteBuffer::new(encoder.into_bytes());
        let decoded = Amf0Decoder::new(&mut buffer).decode_all().unwrap();
        assert_eq!(decoded, vec![value]);
    }

    #[test]
    fn test_exact_fit_within_limit() {
        let mut encoder = Amf0Encoder::with_limit(9);
        encoder.write_number(2.0).unwrap();
        assert_eq!(encoder.len(), 9);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds its 8 byte bound")]
    fn test_overflow_asserts_in_debug() {
        let mut encoder = Amf0Encoder::with_limit(8);
        let _ = encoder.write_number(2.0);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_overflow_errors_in_release() {
        let mut encoder = Amf0Encoder::with_limit(8);
        assert!(matches!(encoder.write_number(2.0), Err(Error::AmfEncode(_))));
        assert!(encoder.is_empty());
    }
}
