//! A positioned read cursor over raw BSON bytes.

use crate::{
    error::{Error, Result},
    oid::ObjectId,
};

/// A little-endian read cursor over a borrowed byte buffer.
///
/// Every read checks the remaining length first and reports an end-of-stream
/// error instead of panicking, so a truncated document fails cleanly at
/// whatever primitive runs out of bytes.
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> ByteReader<'a> {
        ByteReader { data, pos: 0 }
    }

    /// The current cursor position, in bytes from the start of the buffer.
    pub(crate) fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        if self.data.len() - self.pos < n {
            Err(Error::end_of_stream())
        } else {
            Ok(())
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read exactly `n` bytes, borrowing them from the input buffer.
    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read bytes up to (but not including) the next NUL, consume the NUL,
    /// and UTF-8 decode.
    pub(crate) fn read_cstr(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(Error::end_of_stream)?;
        let s = try_to_str(&rest[..len], start)?;
        self.pos += len + 1;
        Ok(s)
    }

    /// Read a length-prefixed string: an `i32` size, `size - 1` bytes of
    /// UTF-8, then a NUL terminator.
    pub(crate) fn read_str(&mut self) -> Result<&'a str> {
        let length_offset = self.pos;
        let len = self.read_i32()?;
        if len < 1 {
            return Err(Error::malformed_bytes(
                length_offset,
                format!("invalid string length {}", len),
            ));
        }

        let start = self.pos;
        let bytes = self.read_bytes(len as usize - 1)?;

        let terminator_offset = self.pos;
        if self.read_u8()? != 0 {
            return Err(Error::malformed_bytes(
                terminator_offset,
                "string missing NUL terminator",
            ));
        }

        try_to_str(bytes, start)
    }

    /// Read the 12 raw bytes of an ObjectId.
    pub(crate) fn read_object_id(&mut self) -> Result<ObjectId> {
        Ok(ObjectId::from_bytes(self.read_array()?))
    }
}

fn try_to_str(data: &[u8], offset: usize) -> Result<&str> {
    simdutf8::basic::from_utf8(data).map_err(|_| Error::utf8_encoding(offset))
}
