//! Bounds-aware cursor over an in-memory byte buffer.
//!
//! [`ByteStream`] wraps a [`Cursor`] and adds the checks the decoders rely on:
//! every read first verifies that enough bytes remain, so a read past the end
//! fails with [`ErrorKind::UnexpectedEof`] and leaves the position untouched.
//! The stream is cheap to clone; sub-decoders work on a clone so the caller's
//! position is never disturbed.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, ErrorKind};

/// Byte order of a UTF-16 string when no byte-order mark overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf16Order {
    Little,
    Big,
}

/// Decode a sync-safe integer: 7 significant bits per byte, big-endian.
///
/// The top bit of each byte is ignored, so `[0x00, 0x00, 0x02, 0x01]` is 257.
pub fn syncsafe(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, b| (acc << 7) | (b & 0x7F) as u32)
}

/// Seekable read-only cursor over a fixed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// The whole underlying buffer, independent of the current position.
    pub fn data(&self) -> &'a [u8] {
        *self.cursor.get_ref()
    }

    pub fn len(&self) -> u64 {
        self.data().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> u64 {
        self.len() - self.position()
    }

    pub fn eof(&self) -> bool {
        self.remaining() == 0
    }

    /// A clone of this stream positioned at `offset`.
    pub fn at(&self, offset: u64) -> io::Result<Self> {
        let mut forked = self.clone();
        forked.seek_to(offset)?;
        Ok(forked)
    }

    fn ensure(&self, count: u64) -> io::Result<()> {
        if count > self.remaining() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "need {} bytes at offset {}, only {} left",
                    count,
                    self.position(),
                    self.remaining()
                ),
            ));
        }
        Ok(())
    }

    /// Move to an absolute offset in `[0, len]`.
    pub fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        if offset > self.len() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("seek to {} past end of {}-byte stream", offset, self.len()),
            ));
        }
        self.cursor.set_position(offset);
        Ok(())
    }

    /// Advance by `count` bytes without reading them.
    pub fn skip(&mut self, count: u64) -> io::Result<()> {
        self.ensure(count)?;
        self.cursor.set_position(self.position() + count);
        Ok(())
    }

    /// Step back by `count` bytes.
    pub fn rewind(&mut self, count: u64) -> io::Result<()> {
        if count > self.position() {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("rewind by {} from offset {}", count, self.position()),
            ));
        }
        self.cursor.set_position(self.position() - count);
        Ok(())
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.ensure(1)?;
        self.cursor.read_u8()
    }

    pub fn read_u16_le(&mut self) -> io::Result<u16> {
        self.ensure(2)?;
        self.cursor.read_u16::<LittleEndian>()
    }

    pub fn read_u16_be(&mut self) -> io::Result<u16> {
        self.ensure(2)?;
        self.cursor.read_u16::<BigEndian>()
    }

    pub fn read_u24_be(&mut self) -> io::Result<u32> {
        self.ensure(3)?;
        self.cursor.read_u24::<BigEndian>()
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        self.ensure(4)?;
        self.cursor.read_u32::<LittleEndian>()
    }

    pub fn read_u32_be(&mut self) -> io::Result<u32> {
        self.ensure(4)?;
        self.cursor.read_u32::<BigEndian>()
    }

    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        self.ensure(8)?;
        self.cursor.read_u64::<LittleEndian>()
    }

    /// Read a `width`-byte sync-safe integer (see [`syncsafe`]).
    pub fn read_syncsafe(&mut self, width: u64) -> io::Result<u32> {
        Ok(syncsafe(self.read_bytes(width)?))
    }

    /// Borrow the next `count` bytes and advance past them.
    pub fn read_bytes(&mut self, count: u64) -> io::Result<&'a [u8]> {
        self.ensure(count)?;
        let start = self.position() as usize;
        let bytes = &self.data()[start..start + count as usize];
        self.cursor.set_position(self.position() + count);
        Ok(bytes)
    }

    /// Read `count` bytes as single-byte (ISO-8859-1) text.
    pub fn read_latin1(&mut self, count: u64) -> io::Result<String> {
        Ok(self.read_bytes(count)?.iter().map(|&b| b as char).collect())
    }

    /// Read `count` bytes as UTF-8, replacing invalid sequences.
    pub fn read_utf8(&mut self, count: u64) -> io::Result<String> {
        Ok(String::from_utf8_lossy(self.read_bytes(count)?).into_owned())
    }

    /// Read `count` bytes as UTF-16.
    ///
    /// A leading byte-order mark selects the byte order and is dropped;
    /// without one, `order` applies. A trailing odd byte is consumed but
    /// not decoded.
    pub fn read_utf16(&mut self, count: u64, order: Utf16Order) -> io::Result<String> {
        let (order, bytes) = match self.read_bytes(count)? {
            [0xFF, 0xFE, rest @ ..] => (Utf16Order::Little, rest),
            [0xFE, 0xFF, rest @ ..] => (Utf16Order::Big, rest),
            bytes => (order, bytes),
        };
        let units = bytes.chunks_exact(2).map(|pair| match order {
            Utf16Order::Little => u16::from_le_bytes([pair[0], pair[1]]),
            Utf16Order::Big => u16::from_be_bytes([pair[0], pair[1]]),
        });
        Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    }

    /// Read single-byte text up to a NUL terminator, scanning at most `cap`
    /// bytes. The terminator is consumed; when the cap is hit it is not.
    pub fn read_cstring(&mut self, cap: usize) -> io::Result<String> {
        let mut text = String::new();
        for _ in 0..cap {
            match self.read_u8()? {
                0 => break,
                b => text.push(b as char),
            }
        }
        Ok(text)
    }

    /// Look at `count` bytes at an absolute offset without moving.
    pub fn peek_at(&self, offset: u64, count: u64) -> Option<&'a [u8]> {
        let end = offset.checked_add(count)?;
        if end > self.len() {
            return None;
        }
        Some(&self.data()[offset as usize..end as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syncsafe_packs_seven_bits_per_byte() {
        assert_eq!(syncsafe(&[0x00, 0x00, 0x02, 0x01]), 257);
        assert_eq!(syncsafe(&[0x7F, 0x7F, 0x7F, 0x7F]), 0x0FFF_FFFF);
        // top bits are ignored
        assert_eq!(syncsafe(&[0x80, 0x80, 0x81, 0x81]), 129);
    }

    #[test]
    fn integer_reads_advance_cursor() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut stream = ByteStream::new(&data);
        assert_eq!(stream.read_u16_le().unwrap(), 0x0201);
        assert_eq!(stream.read_u16_be().unwrap(), 0x0304);
        assert_eq!(stream.read_u24_be().unwrap(), 0x050607);
        assert!(stream.eof());
    }

    #[test]
    fn read_past_end_fails_without_moving() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut stream = ByteStream::new(&data);
        stream.skip(1).unwrap();
        let err = stream.read_u32_le().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(stream.position(), 1);
        assert!(stream.skip(3).is_err());
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.read_u16_be().unwrap(), 0xBBCC);
    }

    #[test]
    fn seek_and_rewind_stay_in_bounds() {
        let data = [0u8; 4];
        let mut stream = ByteStream::new(&data);
        stream.seek_to(4).unwrap();
        assert!(stream.eof());
        assert!(stream.seek_to(5).is_err());
        stream.rewind(2).unwrap();
        assert_eq!(stream.position(), 2);
        assert!(stream.rewind(3).is_err());
    }

    #[test]
    fn utf16_honours_byte_order_mark() {
        let le = [0xFF, 0xFE, b'h', 0, b'i', 0];
        let mut stream = ByteStream::new(&le);
        assert_eq!(stream.read_utf16(6, Utf16Order::Big).unwrap(), "hi");

        let be = [0xFE, 0xFF, 0, b'o', 0, b'k', 0x00];
        let mut stream = ByteStream::new(&be);
        assert_eq!(stream.read_utf16(7, Utf16Order::Little).unwrap(), "ok");
        assert!(stream.eof());

        let bare = [0, b'a'];
        let mut stream = ByteStream::new(&bare);
        assert_eq!(stream.read_utf16(2, Utf16Order::Big).unwrap(), "a");
    }

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        let data = [b'c', 0xE9];
        let mut stream = ByteStream::new(&data);
        assert_eq!(stream.read_latin1(2).unwrap(), "c\u{e9}");
    }

    #[test]
    fn cstring_stops_at_terminator_or_cap() {
        let data = b"image/png\0rest";
        let mut stream = ByteStream::new(data);
        assert_eq!(stream.read_cstring(10_000).unwrap(), "image/png");
        assert_eq!(stream.position(), 10);

        let mut stream = ByteStream::new(data);
        assert_eq!(stream.read_cstring(5).unwrap(), "image");
        assert_eq!(stream.position(), 5);
    }

    #[test]
    fn fork_does_not_move_parent() {
        let data = [1, 2, 3, 4];
        let stream = ByteStream::new(&data);
        let mut forked = stream.at(2).unwrap();
        assert_eq!(forked.read_u8().unwrap(), 3);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.peek_at(3, 1), Some(&[4u8][..]));
        assert_eq!(stream.peek_at(3, 2), None);
    }
}
