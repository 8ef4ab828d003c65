//! Format detection and the top-level inspection entry point.

use crate::decoder::{Collaborators, Decoded};
use crate::id3::Id3Decoder;
use crate::stream::ByteStream;
use crate::zip::ZipDecoder;

/// Container formats with a structure decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// MP3 audio with an optional ID3v2 tag
    Mp3,
    /// ZIP archive or a ZIP-based document format
    Zip,
}

impl Format {
    /// Guess the format from the leading bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [b'I', b'D', b'3', ..] => Some(Format::Mp3),
            // MPEG audio frame sync: 11 set bits
            [0xFF, b, ..] if b & 0xE0 == 0xE0 => Some(Format::Mp3),
            [b'P', b'K', 0x03, 0x04, ..]
            | [b'P', b'K', 0x05, 0x06, ..]
            | [b'P', b'K', 0x07, 0x08, ..] => Some(Format::Zip),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Mp3 => "MP3",
            Format::Zip => "ZIP",
        }
    }
}

/// Decode `data` as `format`.
///
/// Each call gets its own stream, so concurrent inspections share nothing.
pub fn inspect(data: &[u8], format: Format, collab: &Collaborators) -> Decoded {
    let mut stream = ByteStream::new(data);
    log::debug!("inspecting {} bytes as {}", data.len(), format.name());
    match format {
        Format::Mp3 => Id3Decoder::new(collab).decode(&mut stream),
        Format::Zip => ZipDecoder::new().decode(&mut stream),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"ID3\x03\x00", Some(Format::Mp3))]
    #[case(b"\xFF\xFB\x90\x00", Some(Format::Mp3))]
    #[case(b"PK\x03\x04", Some(Format::Zip))]
    #[case(b"PK\x05\x06", Some(Format::Zip))]
    #[case(b"PK\x07\x08", Some(Format::Zip))]
    #[case(b"PK\x01\x02", None)]
    #[case(b"\x89PNG", None)]
    #[case(b"", None)]
    fn sniffs_leading_bytes(#[case] data: &[u8], #[case] expected: Option<Format>) {
        assert_eq!(Format::sniff(data), expected);
    }
}
