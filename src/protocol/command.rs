use crate::{ByteBuffer, Result};
use crate::amf::{Amf0Decoder, Amf0Encoder, Amf0Value};
use std::collections::HashMap;

/// A decoded invoke body: an ordered list of AMF0 values.
///
/// Index 0 holds the method name and index 1 the transaction id; method
/// arguments follow at fixed positions.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    values: Vec<Amf0Value>,
}

impl InvocationRequest {
    pub fn decode(body: &[u8]) -> Result<Self> {
        let mut buffer = ByteBuffer::new(body.to_vec());
        let values = Amf0Decoder::new(&mut buffer).decode_all()?;
        Ok(InvocationRequest { values })
    }

    pub fn from_values(values: Vec<Amf0Value>) -> Self {
        InvocationRequest { values }
    }

    /// Method name, or "" when index 0 is not a string
    pub fn method(&self) -> &str {
        self.string_at(0).unwrap_or("")
    }

    /// Transaction id, or 0 when index 1 is not a number
    pub fn transaction_id(&self) -> f64 {
        self.number_at(1).unwrap_or(0.0)
    }

    pub fn get(&self, index: usize) -> Option<&Amf0Value> {
        self.values.get(index)
    }

    pub fn string_at(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Amf0Value::as_string)
    }

    pub fn number_at(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(Amf0Value::as_number)
    }

    pub fn object_at(&self, index: usize) -> Option<&HashMap<String, Amf0Value>> {
        self.get(index).and_then(Amf0Value::as_object)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Client-side builder for invoke bodies.
#[derive(Debug, Clone)]
pub struct RtmpCommand {
    pub name: String,
    pub transaction_id: f64,
    pub command_object: Option<Amf0Value>,
    pub arguments: Vec<Amf0Value>,
}

impl RtmpCommand {
    pub fn new(name: impl Into<String>, transaction_id: f64) -> Self {
        RtmpCommand {
            name: name.into(),
            transaction_id,
            command_object: None,
            arguments: Vec::new(),
        }
    }

    pub fn connect(app: &str, tc_url: &str) -> Self {
        let mut obj = HashMap::new();
        obj.insert("app".to_string(), Amf0Value::String(app.to_string()));
        obj.insert("flashVer".to_string(), Amf0Value::String("LNX 10,0,32,18".to_string()));
        obj.insert("tcUrl".to_string(), Amf0Value::String(tc_url.to_string()));
        obj.insert("fpad".to_string(), Amf0Value::Boolean(false));
        obj.insert("audioCodecs".to_string(), Amf0Value::Number(3575.0));
        obj.insert("videoCodecs".to_string(), Amf0Value::Number(252.0));
        obj.insert("objectEncoding".to_string(), Amf0Value::Number(0.0));

        let mut cmd = RtmpCommand::new("connect", 1.0);
        cmd.command_object = Some(Amf0Value::Object(obj));
        cmd
    }

    pub fn create_stream(transaction_id: f64) -> Self {
        let mut cmd = RtmpCommand::new("createStream", transaction_id);
        cmd.command_object = Some(Amf0Value::Null);
        cmd
    }

    pub fn play(stream_name: &str, start: f64) -> Self {
        RtmpCommand::new("play", 0.0)
            .with_object(Amf0Value::Null)
            .with_argument(Amf0Value::String(stream_name.to_string()))
            .with_argument(Amf0Value::Number(start))
    }

    pub fn with_object(mut self, object: Amf0Value) -> Self {
        self.command_object = Some(object);
        self
    }

    pub fn with_argument(mut self, argument: Amf0Value) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut encoder = Amf0Encoder::new();
        encoder.write_string(&self.name)?;
        encoder.write_number(self.transaction_id)?;

        match &self.command_object {
            Some(obj) => encoder.encode(obj)?,
            None => encoder.write_null()?,
        }
        for arg in &self.arguments {
            encoder.encode(arg)?;
        }

        Ok(encoder.into_bytes())
    }
}
