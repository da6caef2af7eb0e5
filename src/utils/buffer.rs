use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Growable byte buffer with a read cursor.
///
/// Reads consume from the cursor, writes always append at the end.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    buffer: Vec<u8>,
    cursor: usize,
}

fn short_read(wanted: usize, left: usize) -> IoError {
    IoError::new(
        ErrorKind::UnexpectedEof,
        format!("wanted {} bytes, {} left", wanted, left),
    )
}

impl ByteBuffer {
    pub fn new(data: Vec<u8>) -> Self {
        ByteBuffer {
            buffer: data,
            cursor: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            buffer: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn set_position(&mut self, pos: usize) -> IoResult<()> {
        if pos > self.buffer.len() {
            return Err(IoError::new(ErrorKind::InvalidInput, "position out of bounds"));
        }
        self.cursor = pos;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor)
    }

    pub fn has_remaining(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    /// Unread part of the buffer
    fn unread(&self) -> &[u8] {
        &self.buffer[self.cursor.min(self.buffer.len())..]
    }

    /// Run a byteorder read against the unread slice and advance by `width`.
    fn take<T>(&mut self, width: usize, read: impl FnOnce(&mut &[u8]) -> IoResult<T>) -> IoResult<T> {
        if !self.has_remaining(width) {
            return Err(short_read(width, self.remaining()));
        }
        let mut slice = self.unread();
        let value = read(&mut slice)?;
        self.cursor += width;
        Ok(value)
    }

    pub fn read_bytes(&mut self, len: usize) -> IoResult<Vec<u8>> {
        if !self.has_remaining(len) {
            return Err(short_read(len, self.remaining()));
        }
        let bytes = self.unread()[..len].to_vec();
        self.cursor += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> IoResult<u8> {
        self.take(1, |s| s.read_u8())
    }

    pub fn read_u16_be(&mut self) -> IoResult<u16> {
        self.take(2, |s| s.read_u16::<BigEndian>())
    }

    pub fn read_i16_be(&mut self) -> IoResult<i16> {
        self.take(2, |s| s.read_i16::<BigEndian>())
    }

    /// Read the 24-bit big-endian integers used by chunk headers
    pub fn read_u24_be(&mut self) -> IoResult<u32> {
        self.take(3, |s| s.read_u24::<BigEndian>())
    }

    pub fn read_u32_be(&mut self) -> IoResult<u32> {
        self.take(4, |s| s.read_u32::<BigEndian>())
    }

    /// Message stream ids are the one little-endian field in RTMP.
    pub fn read_u32_le(&mut self) -> IoResult<u32> {
        self.take(4, |s| s.read_u32::<LittleEndian>())
    }

    pub fn read_f64_be(&mut self) -> IoResult<f64> {
        self.take(8, |s| s.read_f64::<BigEndian>())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> IoResult<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> IoResult<()> {
        self.buffer.write_u8(value)
    }

    pub fn write_u16_be(&mut self, value: u16) -> IoResult<()> {
        self.buffer.write_u16::<BigEndian>(value)
    }

    pub fn write_i16_be(&mut self, value: i16) -> IoResult<()> {
        self.buffer.write_i16::<BigEndian>(value)
    }

    pub fn write_u24_be(&mut self, value: u32) -> IoResult<()> {
        self.buffer.write_u24::<BigEndian>(value & 0x00FF_FFFF)
    }

    pub fn write_u32_be(&mut self, value: u32) -> IoResult<()> {
        self.buffer.write_u32::<BigEndian>(value)
    }

    pub fn write_u32_le(&mut self, value: u32) -> IoResult<()> {
        self.buffer.write_u32::<LittleEndian>(value)
    }

    pub fn write_f64_be(&mut self, value: f64) -> IoResult<()> {
        self.buffer.write_f64::<BigEndian>(value)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
