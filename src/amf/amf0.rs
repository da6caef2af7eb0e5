use std::collections::HashMap;

/// AMF0 data types
#[derive(Debug, Clone, PartialEq)]
pub enum Amf0Value {
    Number(f64),                                     // 0x00
    Boolean(bool),                                   // 0x01
    String(String),                                  // 0x02
    Object(HashMap<String, Amf0Value>),              // 0x03
    Null,                                            // 0x05
    Undefined,                                       // 0x06
    EcmaArray(HashMap<String, Amf0Value>),           // 0x08
    Array(Vec<Amf0Value>),                           // 0x0A (strict array)
    Date(f64, i16),                                  // 0x0B
    LongString(String),                              // 0x0C
    Unsupported,                                     // 0x0D
    XmlDocument(String),                             // 0x0F
    TypedObject(String, HashMap<String, Amf0Value>), // 0x10
}

// AMF0 type markers
pub mod markers {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
    pub const UNSUPPORTED: u8 = 0x0D;
    pub const XML_DOCUMENT: u8 = 0x0F;
    pub const TYPED_OBJECT: u8 = 0x10;
}

impl Amf0Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Short and long strings both read as `&str`
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) | Amf0Value::LongString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Amf0Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Property map of an object, ECMA array or typed object
    pub fn as_object(&self) -> Option<&HashMap<String, Amf0Value>> {
        match self {
            Amf0Value::Object(obj) | Amf0Value::EcmaArray(obj) => Some(obj),
            Amf0Value::TypedObject(_, obj) => Some(obj),
            _ => None,
        }
    }

    pub fn get_property(&self, key: &str) -> Option<&Amf0Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Amf0Value::Null | Amf0Value::Undefined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_reject_other_types() {
        let number = Amf0Value::Number(3.0);
        assert_eq!(number.as_number(), Some(3.0));
        assert_eq!(number.as_string(), None);
        assert!(number.as_object().is_none());

        let long = Amf0Value::LongString("clip".into());
        assert_eq!(long.as_string(), Some("clip"));
    }

    #[test]
    fn test_property_lookup() {
        let mut props = HashMap::new();
        props.insert("app".to_string(), Amf0Value::String("live".into()));
        let ecma = Amf0Value::EcmaArray(props);

        assert_eq!(ecma.get_property("app").and_then(|v| v.as_string()), Some("live"));
        assert!(ecma.get_property("tcUrl").is_none());
        assert!(Amf0Value::Undefined.is_null());
    }
}
