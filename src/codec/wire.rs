use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::error::{FormatError, Location};

/// Bounds-checked little-endian reader over a byte slice
pub(crate) struct WireReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WireReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    pub fn u8(&mut self, location: &Location, what: &'static str) -> Result<u8, FormatError> {
        self.cursor.read_u8().map_err(|_| truncated(location, what))
    }

    pub fn u16(&mut self, location: &Location, what: &'static str) -> Result<u16, FormatError> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| truncated(location, what))
    }

    pub fn u32(&mut self, location: &Location, what: &'static str) -> Result<u32, FormatError> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| truncated(location, what))
    }

    pub fn i32(&mut self, location: &Location, what: &'static str) -> Result<i32, FormatError> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| truncated(location, what))
    }

    /// Read exactly `len` bytes without allocating more than the buffer holds
    pub fn bytes(
        &mut self,
        len: usize,
        location: &Location,
        what: &'static str,
    ) -> Result<&'a [u8], FormatError> {
        if len > self.remaining() {
            return Err(truncated(location, what));
        }
        let start = self.cursor.position() as usize;
        let slice = &self.cursor.get_ref()[start..start + len];
        self.cursor.set_position((start + len) as u64);
        Ok(slice)
    }

    /// Length-prefixed UTF-8 string
    pub fn string(&mut self, location: &Location, what: &'static str) -> Result<String, FormatError> {
        let len = self.u32(location, what)? as usize;
        let raw = self.bytes(len, location, what)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|_| FormatError::InvalidUtf8 {
                location: location.clone(),
            })
    }
}

fn truncated(location: &Location, what: &'static str) -> FormatError {
    FormatError::Truncated {
        location: location.clone(),
        what,
    }
}

/// Little-endian writer into a growable buffer
#[derive(Default)]
pub(crate) struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        // Writes into a Vec never fail
        let _ = self.buf.write_u16::<LittleEndian>(v);
    }

    pub fn u32(&mut self, v: u32) {
        let _ = self.buf.write_u32::<LittleEndian>(v);
    }

    pub fn i32(&mut self, v: i32) {
        let _ = self.buf.write_i32::<LittleEndian>(v);
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a u32 length, failing if it does not fit
    pub fn length(&mut self, len: usize, location: &Location, what: &'static str) -> Result<(), FormatError> {
        let v = u32::try_from(len).map_err(|_| FormatError::TooLarge {
            location: location.clone(),
            what,
            len,
        })?;
        self.u32(v);
        Ok(())
    }

    pub fn string(&mut self, s: &str, location: &Location, what: &'static str) -> Result<(), FormatError> {
        self.length(s.len(), location, what)?;
        self.raw(s.as_bytes());
        Ok(())
    }
}
