//! ID3v2 tag walker.
//!
//! The tag sits at the start of the stream:
//! 1. `ID3` signature, version, revision, flags and a sync-safe tag size
//! 2. An optional extended header, skipped
//! 3. Frames until the declared tag size is used up or padding begins
//!
//! Frames are collected into an [`Id3Tag`] first; the report is built from
//! that afterwards so a walk that stops early still reports every frame it
//! finished.

use base64::{Engine, engine::general_purpose};

use crate::decoder::{Collaborators, DecodeError, DecodeStatus, Decoded, log_partial};
use crate::image::ImageKind;
use crate::report::ReportNode;
use crate::stream::ByteStream;

use super::structures::*;

/// Decoder for ID3v2 tags at the start of an MP3-like stream.
pub struct Id3Decoder<'c> {
    collab: &'c Collaborators,
}

impl<'c> Id3Decoder<'c> {
    pub fn new(collab: &'c Collaborators) -> Self {
        Self { collab }
    }

    /// Walk the tag and build its report.
    ///
    /// Never fails: a stream without a tag yields a bare root node, and a
    /// corrupt or truncated tag yields the frames read before the problem
    /// with a [`DecodeStatus::Partial`] status.
    pub fn decode(&self, stream: &mut ByteStream<'_>) -> Decoded {
        let mut tag = Id3Tag::default();
        let status: DecodeStatus = read_container(stream, &mut tag).into();
        log_partial("ID3", &status);

        let mut report = ReportNode::new("ID3 structure");
        if let Some(header) = &tag.header {
            report.add("ID3 version", header.version);
            report.add("Revision", header.revision);
            report.add("Flags", format!("{:#04x}", header.flags));
            report.add("Tag size", header.size);
        }
        for frame in &tag.frames {
            self.report_frame(stream, frame, &mut report);
        }

        Decoded::new(report, status)
    }

    fn report_frame(&self, stream: &ByteStream<'_>, frame: &Id3Frame, report: &mut ReportNode) {
        match &frame.body {
            FrameBody::Text(text) => {
                let text = match frame.kind() {
                    FrameKind::Text { linkable: true } => self.collab.link_text(text.clone()),
                    _ => text.clone(),
                };
                report.add(frame.id.clone(), text);
            }
            FrameBody::Picture(picture) => self.report_picture(stream, frame, picture, report),
            FrameBody::Skipped => {
                report.add_label(frame.id.clone());
            }
        }
    }

    fn report_picture(
        &self,
        stream: &ByteStream<'_>,
        frame: &Id3Frame,
        picture: &Picture,
        report: &mut ReportNode,
    ) {
        let payload = stream.peek_at(picture.offset, picture.size).unwrap_or_default();
        let kind = ImageKind::sniff(payload);

        let mime_type = match kind {
            Some(kind) => kind.mime_type(),
            None if picture.mime_type.contains('/') => picture.mime_type.as_str(),
            None => "application/octet-stream",
        };
        let data_uri = format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(payload)
        );

        let node = report.add(frame.id.clone(), data_uri.clone());
        node.add("MIME type", picture.mime_type.clone());
        node.add("Description", picture.description.clone());
        if let Some(picture_type) = picture.picture_type {
            node.add("Picture type", picture_type);
        }
        node.add("Image offset", picture.offset);
        node.add("Image size", picture.size);

        match kind {
            Some(ImageKind::Png) => {
                node.attach(self.collab.png.decode(stream, picture.offset));
            }
            Some(ImageKind::Jpeg) => {
                node.attach(self.collab.jpeg.decode(stream, picture.offset));
            }
            None => log::debug!(
                "{} frame at {}: payload is neither PNG nor JPEG",
                frame.id,
                frame.offset
            ),
        }

        self.collab.preview.preview(&data_uri);
    }
}

/// Read the tag header, or `None` when the signature is absent.
pub fn read_header(stream: &mut ByteStream<'_>) -> Result<Option<TagHeader>, DecodeError> {
    if stream.peek_at(stream.position(), ID3_SIGNATURE.len() as u64) != Some(ID3_SIGNATURE) {
        return Ok(None);
    }
    stream.skip(ID3_SIGNATURE.len() as u64)?;

    Ok(Some(TagHeader {
        version: stream.read_u8()?,
        revision: stream.read_u8()?,
        flags: stream.read_u8()?,
        size: stream.read_syncsafe(4)?,
    }))
}

/// Walk a tag, pushing each completed frame into `tag`.
///
/// On error `tag` keeps everything read so far.
pub fn read_container(stream: &mut ByteStream<'_>, tag: &mut Id3Tag) -> Result<(), DecodeError> {
    let Some(header) = read_header(stream)? else {
        log::debug!("no ID3 signature");
        return Ok(());
    };
    tag.header = Some(header);
    log::debug!(
        "ID3v2.{}.{} tag, {} bytes, flags {:#04x}",
        header.version,
        header.revision,
        header.size,
        header.flags
    );

    if header.has_extended_header() {
        let length = match header.version {
            v if v >= 4 => stream.read_syncsafe(4)?,
            _ => stream.read_u32_be()?,
        } as u64;
        if length > MAX_EXTENDED_HEADER {
            return Err(DecodeError::LengthGuard {
                field: "ID3 extended header",
                length,
                limit: MAX_EXTENDED_HEADER,
            });
        }
        stream.skip(length)?;
    }

    let mut consumed = 0u64;
    while consumed < header.size as u64 {
        let Some(frame) = read_frame(stream, &header)? else {
            log::trace!("padding starts at {}", stream.position());
            break;
        };
        consumed += frame.size as u64 + FRAME_HEADER_SIZE;
        tag.frames.push(frame);
    }
    Ok(())
}

/// Read one frame header and body. Returns `None` for a zero-size frame,
/// which marks the start of padding.
pub fn read_frame(
    stream: &mut ByteStream<'_>,
    header: &TagHeader,
) -> Result<Option<Id3Frame>, DecodeError> {
    let id = stream.read_latin1(header.frame_id_len())?;
    let size = match header.version {
        v if v >= 4 => stream.read_syncsafe(4)?,
        3 => stream.read_u32_be()?,
        _ => stream.read_u24_be()?,
    };
    let flags = if header.version > 2 {
        Some(stream.read_u16_be()?)
    } else {
        None
    };

    if size == 0 {
        return Ok(None);
    }

    let offset = stream.position();
    log::trace!("frame {} at {}, {} bytes", id, offset, size);

    let body = match FrameKind::of(&id) {
        FrameKind::Picture => FrameBody::Picture(read_picture(stream, header, size)?),
        FrameKind::Text { .. } if size < MAX_TEXT_FRAME => {
            FrameBody::Text(read_text(stream, size)?)
        }
        _ => {
            stream.skip(size as u64)?;
            FrameBody::Skipped
        }
    };

    Ok(Some(Id3Frame {
        id,
        size,
        flags,
        offset,
        body,
    }))
}

/// Read an attached picture frame body of `size` bytes.
///
/// Leaves the stream at the end of the frame whatever the NUL-terminated
/// fields contained.
fn read_picture(
    stream: &mut ByteStream<'_>,
    header: &TagHeader,
    size: u32,
) -> Result<Picture, DecodeError> {
    let frame_end = stream.position() + size as u64;

    let encoding = stream.read_u8()?;
    if header.version > 2 {
        stream.skip(3)?;
    }
    let mime_type = stream.read_cstring(MAX_CSTRING)?;
    let picture_type = if header.version > 2 {
        Some(stream.read_u8()?)
    } else {
        None
    };
    let description = stream.read_cstring(MAX_CSTRING)?;

    let offset = stream.position();
    if offset > frame_end {
        log::warn!(
            "ID3: picture fields overrun frame end at {} by {} bytes",
            frame_end,
            offset - frame_end
        );
    }
    stream.seek_to(frame_end)?;

    Ok(Picture {
        encoding,
        mime_type,
        picture_type,
        description,
        offset,
        size: frame_end.saturating_sub(offset),
    })
}
