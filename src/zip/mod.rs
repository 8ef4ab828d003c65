//! ZIP-family container inspection.
//!
//! This module reports the record structure of ZIP archives and of the many
//! formats built on them (Office Open XML, OpenDocument, EPUB, APK, ...).
//!
//! ## Layout
//!
//! - [`structures`]: record codes, fixed-size headers and length limits
//! - [`parser`]: the forward record walker behind [`ZipDecoder`]
//! - [`classify`]: member-name and MIME fingerprints for ZIP-based formats
//!
//! ## Walking Order
//!
//! An archive is normally local file headers with their data, then the
//! central directory, then the end of central directory record. Extraction
//! tools start from that last record; an inspector cannot trust it, so the
//! records are walked from the front and reported as they are found.
//! Entry data is skipped, never decompressed.

mod classify;
mod parser;
mod structures;

pub use classify::{ContainerKind, classify};
pub use parser::{ZipContents, ZipDecoder, read_contents};
pub use structures::*;
