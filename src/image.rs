//! Default structure decoders for images embedded in other containers.
//!
//! Both walkers follow the same pattern as the container decoders: read a
//! signature, then dispatch chunk by chunk until a terminal chunk, the end
//! of the stream or a length that fails a sanity check. They work on a clone
//! of the caller's stream.

use crate::decoder::{DecodeError, DecodeStatus, StructureDecoder, log_partial};
use crate::report::ReportNode;
use crate::stream::ByteStream;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// PNG chunk lengths are limited to 2^31 - 1.
const PNG_MAX_CHUNK: u64 = 0x7FFF_FFFF;

/// Image formats recognised by their first two bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn sniff(payload: &[u8]) -> Option<Self> {
        match payload {
            [0x89, 0x50, ..] => Some(ImageKind::Png),
            [0xFF, 0xD8, ..] => Some(ImageKind::Jpeg),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }
}

/// PNG chunk walker.
pub struct PngStructure;

impl StructureDecoder for PngStructure {
    fn decode(&self, stream: &ByteStream<'_>, offset: u64) -> ReportNode {
        let mut report = ReportNode::new("PNG structure");
        let status: DecodeStatus = stream
            .at(offset)
            .map_err(DecodeError::from)
            .and_then(|mut s| walk_png(&mut s, &mut report))
            .into();
        log_partial("PNG", &status);
        report
    }
}

fn walk_png(stream: &mut ByteStream<'_>, report: &mut ReportNode) -> Result<(), DecodeError> {
    if stream.read_bytes(PNG_SIGNATURE.len() as u64)? != PNG_SIGNATURE {
        return Ok(());
    }

    while !stream.eof() {
        let length = stream.read_u32_be()? as u64;
        if length > PNG_MAX_CHUNK {
            return Err(DecodeError::LengthGuard {
                field: "PNG chunk",
                length,
                limit: PNG_MAX_CHUNK,
            });
        }
        let chunk_type = stream.read_latin1(4)?;
        let node = report.add(chunk_type.clone(), length);
        log::trace!("PNG chunk {} ({} bytes)", chunk_type, length);

        if chunk_type == "IHDR" && length >= 13 {
            node.add("Width", stream.read_u32_be()?);
            node.add("Height", stream.read_u32_be()?);
            node.add("Bit depth", stream.read_u8()?);
            node.add("Color type", stream.read_u8()?);
            stream.skip(length - 10)?;
        } else {
            stream.skip(length)?;
        }
        node.add("CRC", format!("{:08x}", stream.read_u32_be()?));

        if chunk_type == "IEND" {
            break;
        }
    }
    Ok(())
}

/// JPEG marker segment walker.
pub struct JpegStructure;

impl StructureDecoder for JpegStructure {
    fn decode(&self, stream: &ByteStream<'_>, offset: u64) -> ReportNode {
        let mut report = ReportNode::new("JPEG structure");
        let status: DecodeStatus = stream
            .at(offset)
            .map_err(DecodeError::from)
            .and_then(|mut s| walk_jpeg(&mut s, &mut report))
            .into();
        log_partial("JPEG", &status);
        report
    }
}

fn marker_name(marker: u8) -> &'static str {
    match marker {
        0xD8 => "Start of image",
        0xC0 => "Start of frame (baseline)",
        0xC1 => "Start of frame (extended)",
        0xC2 => "Start of frame (progressive)",
        0xC4 => "Huffman table",
        0xDB => "Quantization table",
        0xDD => "Restart interval",
        0xDA => "Start of scan",
        0xD9 => "End of image",
        0xFE => "Comment",
        0xE0..=0xEF => "Application segment",
        0xD0..=0xD7 => "Restart marker",
        _ => "Unknown",
    }
}

fn walk_jpeg(stream: &mut ByteStream<'_>, report: &mut ReportNode) -> Result<(), DecodeError> {
    if stream.read_u16_be()? != 0xFFD8 {
        return Ok(());
    }
    report.add("0xFFD8", marker_name(0xD8));

    while !stream.eof() {
        if stream.read_u8()? != 0xFF {
            break;
        }
        let marker = stream.read_u8()?;
        // fill bytes
        if marker == 0xFF {
            stream.rewind(1)?;
            continue;
        }
        let node = report.add(format!("0xFF{:02X}", marker), marker_name(marker));

        if matches!(marker, 0x01 | 0xD0..=0xD7) {
            continue;
        }
        if marker == 0xD9 {
            break;
        }

        let length = stream.read_u16_be()? as u64;
        node.add("Length", length);
        let body = length.saturating_sub(2);

        if matches!(marker, 0xC0..=0xC2) && body >= 6 {
            node.add("Precision", stream.read_u8()?);
            node.add("Height", stream.read_u16_be()?);
            node.add("Width", stream.read_u16_be()?);
            node.add("Components", stream.read_u8()?);
            stream.skip(body - 6)?;
        } else {
            stream.skip(body)?;
        }

        // entropy-coded data follows
        if marker == 0xDA {
            break;
        }
    }
    Ok(())
}
