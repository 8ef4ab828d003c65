//! # binpeek
//!
//! Inspect the internal structure of binary container files.
//!
//! Given the bytes of an MP3 file carrying an ID3v2 tag, or of a ZIP-family
//! container (plain ZIP, DOCX/XLSX/PPTX, APK, EPUB, OpenDocument, ...), this
//! library walks the container format and produces a hierarchical report of
//! its records and fields. Payloads are located, never decoded: ZIP entries
//! are not decompressed and audio is not decoded, but an image embedded in
//! an ID3 tag is handed to a PNG or JPEG structure decoder.
//!
//! ## Features
//!
//! - ID3v2.2 / v2.3 / v2.4 tag walking with text decoding in all four encodings
//! - Attached pictures surfaced as data URIs and walked by a nested decoder
//! - Forward ZIP record walk covering zip64 and signature records
//! - Fingerprinting of ZIP-based document formats
//! - Best-effort decoding: truncated or corrupt input yields a partial report
//!
//! ## Example
//!
//! ```no_run
//! use binpeek::{Collaborators, Format, inspect};
//!
//! let data = std::fs::read("report.docx")?;
//! let format = Format::sniff(&data).unwrap_or(Format::Zip);
//! let decoded = inspect(&data, format, &Collaborators::default());
//!
//! print!("{}", decoded.report);
//! if let Some(err) = decoded.status.error() {
//!     eprintln!("stopped early: {}", err);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod cli;
pub mod decoder;
pub mod format;
pub mod id3;
pub mod image;
pub mod io;
pub mod link;
pub mod report;
pub mod stream;
pub mod zip;

pub use cli::Cli;
pub use decoder::{
    Collaborators, DecodeError, DecodeStatus, Decoded, PreviewSink, StructureDecoder, TextLinker,
};
pub use format::{Format, inspect};
pub use id3::Id3Decoder;
pub use image::{ImageKind, JpegStructure, PngStructure};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt, read_prefix};
pub use link::WikiLinker;
pub use report::{ReportNode, Value};
pub use stream::ByteStream;
pub use zip::{ContainerKind, ZipDecoder, classify};
