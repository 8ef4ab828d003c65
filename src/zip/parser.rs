//! Forward ZIP record walker.
//!
//! This module walks a ZIP-family stream from the start as a flat sequence
//! of self-describing records, each introduced by `PK` and a 2-byte type
//! code. It does not consult the central directory to find entries, so it
//! also reports archives whose tail is missing or damaged.
//!
//! ## Walking Strategy
//!
//! 1. Require `PK` at the cursor, else stop (trailing data)
//! 2. Read the record type and dispatch on it
//! 3. Consume the record in full, including every variable-length field,
//!    so the cursor lands on the next signature
//! 4. Stop on an unknown record type or a length that fails a sanity check
//!
//! Local file header names are collected for [`classify`], and a small
//! stored `mimetype` member is read as the container's MIME string.

use crate::decoder::{DecodeError, DecodeStatus, Decoded, log_partial};
use crate::report::ReportNode;
use crate::stream::ByteStream;

use super::classify::{ContainerKind, classify};
use super::structures::*;

/// Everything collected by a record walk, kept even when it stops early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipContents {
    /// One child per record, in stream order.
    pub report: ReportNode,
    /// Local file header names, in stream order.
    pub members: Vec<String>,
    /// Contents of a stored `mimetype` member.
    pub mime_type: Option<String>,
}

impl Default for ZipContents {
    fn default() -> Self {
        Self {
            report: ReportNode::new("ZIP contents"),
            members: Vec::new(),
            mime_type: None,
        }
    }
}

impl ZipContents {
    pub fn classify(&self) -> ContainerKind {
        classify(&self.members, self.mime_type.as_deref())
    }
}

/// Decoder for ZIP-family containers.
#[derive(Debug, Default)]
pub struct ZipDecoder;

impl ZipDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Walk the records and classify the container.
    ///
    /// Never fails; see [`ZipDecoder::walk`] for how far the walk gets.
    pub fn decode(&self, stream: &mut ByteStream<'_>) -> Decoded {
        let (contents, status) = self.walk(stream);
        let kind = contents.classify();
        log::debug!(
            "{} members, mimetype {:?}: {}",
            contents.members.len(),
            contents.mime_type,
            kind.extension()
        );

        let mut report = ReportNode::new("ZIP structure");
        report.add("File type", kind.description());
        report.add("File extension", kind.extension());
        report.attach(contents.report);

        Decoded::new(report, status)
    }

    /// Walk records until the end of the stream, a missing signature, an
    /// unknown record type or a failed sanity check.
    pub fn walk(&self, stream: &mut ByteStream<'_>) -> (ZipContents, DecodeStatus) {
        let mut contents = ZipContents::default();
        let status: DecodeStatus = read_contents(stream, &mut contents).into();
        log_partial("ZIP", &status);
        (contents, status)
    }
}

/// Walk records into `contents`. On error `contents` keeps everything read
/// so far, including the partially filled node of the failing record.
pub fn read_contents(
    stream: &mut ByteStream<'_>,
    contents: &mut ZipContents,
) -> Result<(), DecodeError> {
    while !stream.eof() {
        let offset = stream.position();
        if stream.peek_at(offset, PK_SIGNATURE.len() as u64) != Some(PK_SIGNATURE) {
            log::debug!("no record signature at {}, stopping", offset);
            break;
        }
        stream.skip(PK_SIGNATURE.len() as u64)?;

        let code = stream.read_u16_le()?;
        let record = RecordType::from_u16(code);
        log::trace!("{} at {}", record.name(), offset);

        let node = contents.report.add(record.label(), record.name());

        match record {
            RecordType::LocalFileHeader => read_local_file(
                stream,
                node,
                &mut contents.members,
                &mut contents.mime_type,
            )?,
            RecordType::DataDescriptor => {
                let descriptor = DataDescriptor::read(stream)?;
                node.add("CRC32", format!("{:08x}", descriptor.crc32));
                node.add("Size (compressed)", descriptor.compressed_size);
                node.add("Size (uncompressed)", descriptor.uncompressed_size);
            }
            RecordType::ArchiveExtraData => {
                let length = stream.read_u32_le()?;
                node.add("Size", length);
                stream.skip(length as u64)?;
            }
            RecordType::CentralDirectoryHeader => read_central_file(stream, node)?,
            RecordType::DigitalSignature => {
                let length = stream.read_u16_le()?;
                node.add("Size", length);
                stream.skip(length as u64)?;
            }
            RecordType::Zip64EndOfCentralDirectory => {
                let size = stream.read_u64_le()?;
                node.add("Size", size);
                if size > 0 {
                    stream.skip(size)?;
                }
            }
            RecordType::Zip64EndOfCentralDirectoryLocator => {
                let locator = Zip64EOCDLocator::read(stream)?;
                log::trace!(
                    "zip64 locator: record at {}, {} disks",
                    locator.eocd64_offset,
                    locator.total_disks
                );
            }
            RecordType::EndOfCentralDirectory => {
                let eocd = EndOfCentralDirectory::read(stream)?;
                node.add("Entries", eocd.total_entries);
                if eocd.is_zip64() {
                    log::trace!("end of central directory defers to zip64 record");
                }
                read_comment(stream, node, eocd.comment_len)?;
            }
            RecordType::Unknown(code) => return Err(DecodeError::UnknownRecord(code)),
        }
    }
    Ok(())
}

fn read_local_file(
    stream: &mut ByteStream<'_>,
    node: &mut ReportNode,
    members: &mut Vec<String>,
    mime_type: &mut Option<String>,
) -> Result<(), DecodeError> {
    let header = LocalFileHeader::read(stream)?;
    let info = header.info;

    if info.file_name_length > MAX_NAME_LENGTH {
        return Err(DecodeError::LengthGuard {
            field: "ZIP file name",
            length: info.file_name_length as u64,
            limit: MAX_NAME_LENGTH as u64,
        });
    }

    let name = info.read_name(stream)?;
    report_file_info(node, &name, &info);
    members.push(name.clone());

    stream.skip(info.extra_field_length as u64)?;

    if name == MIMETYPE_MEMBER
        && info.compressed_size == info.uncompressed_size
        && info.compressed_size < MAX_MIMETYPE_SIZE
    {
        let sniffed = stream.read_latin1(info.compressed_size as u64)?;
        node.add("MIME type", sniffed.clone());
        *mime_type = Some(sniffed);
    } else {
        stream.skip(info.compressed_size as u64)?;
    }

    // The trailing descriptor is left to the next iteration: when sizes
    // are deferred the walk stops at the compressed data instead.
    if info.has_data_descriptor() {
        log::trace!("{}: data descriptor follows", name);
    }
    Ok(())
}

fn read_central_file(stream: &mut ByteStream<'_>, node: &mut ReportNode) -> Result<(), DecodeError> {
    let header = CentralDirectoryHeader::read(stream)?;
    let info = header.info;

    let name = info.read_name(stream)?;
    report_file_info(node, &name, &info);
    node.add("Local header offset", header.lfh_offset);

    stream.skip(info.extra_field_length as u64)?;
    read_comment(stream, node, header.file_comment_length)
}

fn report_file_info(node: &mut ReportNode, name: &str, info: &FileInfo) {
    node.add("Name", name);
    node.add("Size (compressed)", info.compressed_size);
    node.add("Size (uncompressed)", info.uncompressed_size);
    node.add("Compression", info.compression_method.name());
    node.add("Flags", format!("{:#06x}", info.flags));
    node.add("CRC32", format!("{:08x}", info.crc32));
    node.add("Modified", info.modified());
}

/// Report a comment shorter than [`MAX_COMMENT_LENGTH`], skip any other.
fn read_comment(
    stream: &mut ByteStream<'_>,
    node: &mut ReportNode,
    length: u16,
) -> Result<(), DecodeError> {
    if length > 0 && length < MAX_COMMENT_LENGTH {
        node.add("Comment", stream.read_latin1(length as u64)?);
    } else {
        stream.skip(length as u64)?;
    }
    Ok(())
}
