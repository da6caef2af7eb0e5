use std::collections::HashMap;
use crate::amf::amf0::{markers, Amf0Value};
use crate::{ByteBuffer, Error, Result};

/// Deepest container nesting accepted before a body is rejected
pub const AMF0_MAX_DEPTH: usize = 64;

pub struct Amf0Decoder<'a> {
    buffer: &'a mut ByteBuffer,
    depth: usize,
}

impl<'a> Amf0Decoder<'a> {
    pub fn new(buffer: &'a mut ByteBuffer) -> Self {
        Amf0Decoder { buffer, depth: 0 }
    }

    pub fn has_remaining(&self) -> bool {
        self.buffer.remaining() > 0
    }

    /// Decode values until the buffer is exhausted.
    ///
    /// Fails on the first malformed value; nothing decoded so far is returned.
    pub fn decode_all(&mut self) -> Result<Vec<Amf0Value>> {
        let mut values = Vec::new();
        while self.has_remaining() {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    pub fn decode(&mut self) -> Result<Amf0Value> {
        if self.depth >= AMF0_MAX_DEPTH {
            return Err(Error::amf_decode("nesting too deep"));
        }
        self.depth += 1;
        let value = self.decode_value();
        self.depth -= 1;
        value
    }

    fn decode_value(&mut self) -> Result<Amf0Value> {
        let marker = self.buffer.read_u8()?;
        match marker {
            markers::NUMBER => Ok(Amf0Value::Number(self.buffer.read_f64_be()?)),
            markers::BOOLEAN => Ok(Amf0Value::Boolean(self.buffer.read_u8()? != 0)),
            markers::STRING => {
                let len = self.buffer.read_u16_be()? as usize;
                Ok(Amf0Value::String(self.read_utf8(len, "string")?))
            }
            markers::OBJECT => Ok(Amf0Value::Object(self.decode_properties()?)),
            markers::NULL => Ok(Amf0Value::Null),
            markers::UNDEFINED => Ok(Amf0Value::Undefined),
            markers::ECMA_ARRAY => {
                // The count is advisory; the terminator ends the array.
                let _count = self.buffer.read_u32_be()?;
                Ok(Amf0Value::EcmaArray(self.decode_properties()?))
            }
            markers::STRICT_ARRAY => self.decode_strict_array(),
            markers::DATE => {
                let timestamp = self.buffer.read_f64_be()?;
                let timezone = self.buffer.read_i16_be()?;
                Ok(Amf0Value::Date(timestamp, timezone))
            }
            markers::LONG_STRING => {
                let len = self.buffer.read_u32_be()? as usize;
                Ok(Amf0Value::LongString(self.read_utf8(len, "long string")?))
            }
            markers::UNSUPPORTED => Ok(Amf0Value::Unsupported),
            markers::XML_DOCUMENT => {
                let len = self.buffer.read_u32_be()? as usize;
                Ok(Amf0Value::XmlDocument(self.read_utf8(len, "XML document")?))
            }
            markers::TYPED_OBJECT => {
                let len = self.buffer.read_u16_be()? as usize;
                let class_name = self.read_utf8(len, "class name")?;
                Ok(Amf0Value::TypedObject(class_name, self.decode_properties()?))
            }
            _ => Err(Error::amf_decode(format!("unknown AMF0 marker 0x{:02x}", marker))),
        }
    }

    fn read_utf8(&mut self, len: usize, what: &str) -> Result<String> {
        if !self.buffer.has_remaining(len) {
            return Err(Error::amf_decode(format!(
                "{} of {} bytes truncated at {}",
                what,
                len,
                self.buffer.remaining()
            )));
        }
        let bytes = self.buffer.read_bytes(len)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::amf_decode(format!("invalid UTF-8 in {}: {}", what, e)))
    }

    /// Name/value pairs up to the empty-name terminator
    fn decode_properties(&mut self) -> Result<HashMap<String, Amf0Value>> {
        let mut object = HashMap::new();
        loop {
            let name_len = self.buffer.read_u16_be()? as usize;
            if name_len == 0 {
                let end = self.buffer.read_u8()?;
                if end != markers::OBJECT_END {
                    return Err(Error::amf_decode(format!(
                        "expected object end marker, found 0x{:02x}",
                        end
                    )));
                }
                break;
            }
            let name = self.read_utf8(name_len, "property name")?;
            let value = self.decode()?;
            object.insert(name, value);
        }
        Ok(object)
    }

    fn decode_strict_array(&mut self) -> Result<Amf0Value> {
        let count = self.buffer.read_u32_be()? as usize;
        // Every element needs at least its marker byte.
        if !self.buffer.has_remaining(count) {
            return Err(Error::amf_decode(format!("strict array of {} elements truncated", count)));
        }
        let mut array = Vec::with_capacity(count);
        for _ in 0..count {
            array.push(self.decode()?);
        }
        Ok(Amf0Value::Array(array))
    }
}
