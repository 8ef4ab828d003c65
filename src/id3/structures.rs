use crate::stream::{ByteStream, Utf16Order};
use std::io;

/// Tag signature at the very start of the stream.
pub const ID3_SIGNATURE: &[u8] = b"ID3";

/// Size charged per frame header when totalling frames against the tag size.
pub const FRAME_HEADER_SIZE: u64 = 10;

/// Extended headers declaring more than this are treated as corrupt.
pub const MAX_EXTENDED_HEADER: u64 = 10_000_000;

/// Text frames at or above this size are skipped, not decoded.
pub const MAX_TEXT_FRAME: u32 = 4096;

/// Scan cap for NUL-terminated strings inside a picture frame.
pub const MAX_CSTRING: usize = 10_000;

/// Frame identifiers decoded as text (ID3v2.3/2.4 four-letter and v2.2
/// three-letter forms).
pub const TEXT_FRAMES: &[&str] = &[
    "TIT1", "TIT2", "TPE1", "TPE2", "TALB", "TCON", "TPOS", "WXXX", "TYER", "COMM", "TENC",
    "TXXX", "TCMP", "TSSE", "TLEN", "TLAN", "TPUB", "TDAT", "TT2", "TP1", "TP2", "TT1", "TCM",
    "TAL", "TRK", "TPA", "TYE", "TCO", "COM", "TEN",
];

/// Text frames whose value is passed through the text linker (album and
/// artist style fields).
pub const LINKABLE_FRAMES: &[&str] = &["TALB", "TPE1", "TPE2", "TP1", "TP2", "TAL"];

/// ID3v2 tag header - 10 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub version: u8,
    pub revision: u8,
    pub flags: u8,
    /// Tag size excluding this header, sync-safe on disk.
    pub size: u32,
}

impl TagHeader {
    pub const FLAG_EXTENDED_HEADER: u8 = 0x40;

    pub fn has_extended_header(&self) -> bool {
        self.flags & Self::FLAG_EXTENDED_HEADER != 0
    }

    /// Frame identifiers are 3 characters before v2.3, 4 from then on.
    pub fn frame_id_len(&self) -> u64 {
        if self.version < 3 { 3 } else { 4 }
    }
}

/// How a frame body is interpreted, keyed by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Picture,
    Text { linkable: bool },
    Opaque,
}

impl FrameKind {
    pub fn of(id: &str) -> Self {
        match id {
            "APIC" | "PIC" => FrameKind::Picture,
            _ if TEXT_FRAMES.contains(&id) => FrameKind::Text {
                linkable: LINKABLE_FRAMES.contains(&id),
            },
            _ => FrameKind::Opaque,
        }
    }
}

/// Encoding marker at the start of a text frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1,
    Utf16,
    Utf16Be,
    Utf8,
}

impl TextEncoding {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TextEncoding::Latin1),
            1 => Some(TextEncoding::Utf16),
            2 => Some(TextEncoding::Utf16Be),
            3 => Some(TextEncoding::Utf8),
            _ => None,
        }
    }
}

/// Decode a `length`-byte text frame body.
///
/// The first byte selects the encoding. When it is not a known marker the
/// body carries no marker at all, so all `length` bytes are read as
/// single-byte text. NUL characters are stripped from the result.
pub fn read_text(stream: &mut ByteStream<'_>, length: u32) -> io::Result<String> {
    let length = length as u64;
    let marker = stream.read_u8()?;
    let rest = length.saturating_sub(1);
    let text = match TextEncoding::from_u8(marker) {
        Some(TextEncoding::Latin1) => stream.read_latin1(rest)?,
        Some(TextEncoding::Utf16) => stream.read_utf16(rest, Utf16Order::Little)?,
        Some(TextEncoding::Utf16Be) => stream.read_utf16(rest, Utf16Order::Big)?,
        Some(TextEncoding::Utf8) => stream.read_utf8(rest)?,
        None => {
            stream.rewind(1)?;
            stream.read_latin1(length)?
        }
    };
    Ok(text.replace('\0', ""))
}

/// Attached picture metadata; the image bytes stay in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub encoding: u8,
    pub mime_type: String,
    pub picture_type: Option<u8>,
    pub description: String,
    /// Absolute offset of the image payload.
    pub offset: u64,
    /// Payload length in bytes.
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameBody {
    Text(String),
    Picture(Picture),
    Skipped,
}

/// One frame of an ID3v2 tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3Frame {
    pub id: String,
    pub size: u32,
    /// Present from v2.3 on.
    pub flags: Option<u16>,
    /// Absolute offset of the frame body.
    pub offset: u64,
    pub body: FrameBody,
}

impl Id3Frame {
    pub fn kind(&self) -> FrameKind {
        FrameKind::of(&self.id)
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            FrameBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Header and frames collected from a tag, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3Tag {
    /// `None` when the stream does not start with an ID3 signature.
    pub header: Option<TagHeader>,
    pub frames: Vec<Id3Frame>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("APIC", FrameKind::Picture)]
    #[case("PIC", FrameKind::Picture)]
    #[case("TIT2", FrameKind::Text { linkable: false })]
    #[case("TALB", FrameKind::Text { linkable: true })]
    #[case("TP1", FrameKind::Text { linkable: true })]
    #[case("POPM", FrameKind::Opaque)]
    #[case("PRIV", FrameKind::Opaque)]
    fn frame_kind_by_identifier(#[case] id: &str, #[case] kind: FrameKind) {
        assert_eq!(FrameKind::of(id), kind);
    }

    #[rstest]
    #[case(&[0, b'H', b'i', 0][..], "Hi")]
    #[case(&[1, 0xFF, 0xFE, b'H', 0, b'i', 0][..], "Hi")]
    #[case(&[2, 0, b'H', 0, b'i'][..], "Hi")]
    #[case(&[3, 0xC3, 0xA9, b'!'][..], "\u{e9}!")]
    #[case(&[b'4', b'2', 0][..], "42")]
    fn text_encodings(#[case] body: &[u8], #[case] expected: &str) {
        let mut stream = ByteStream::new(body);
        assert_eq!(read_text(&mut stream, body.len() as u32).unwrap(), expected);
        assert!(stream.eof());
    }

    #[test]
    fn header_flags() {
        let header = TagHeader {
            version: 4,
            revision: 0,
            flags: 0x40,
            size: 0,
        };
        assert!(header.has_extended_header());
        assert_eq!(header.frame_id_len(), 4);
        let old = TagHeader {
            version: 2,
            flags: 0,
            ..header
        };
        assert!(!old.has_extended_header());
        assert_eq!(old.frame_id_len(), 3);
    }
}
