//! Decoder contract shared by the container walkers.
//!
//! Decoders never fail past their boundary. Each entry point returns a
//! [`Decoded`] holding the report built so far and a [`DecodeStatus`] saying
//! whether the walk ran to its natural end or stopped early.
//!
//! The collaborators a decoder calls out to are traits:
//!
//! - [`StructureDecoder`]: nested format decoders (PNG, JPEG) invoked with
//!   the shared stream and the absolute offset of an embedded payload
//! - [`PreviewSink`]: notified with a data URI whenever an image is found
//! - [`TextLinker`]: post-processes selected text fields
//!
//! [`Collaborators`] bundles one of each; its default uses the bundled
//! image decoders, drops previews and leaves text untouched.

use std::io;
use thiserror::Error;

use crate::image::{JpegStructure, PngStructure};
use crate::report::ReportNode;
use crate::stream::ByteStream;

/// Reason a walk stopped before its natural end.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of stream: {0}")]
    Truncated(#[from] io::Error),

    #[error("{field} length {length} exceeds limit of {limit} bytes")]
    LengthGuard {
        field: &'static str,
        length: u64,
        limit: u64,
    },

    #[error("unknown record type {0:#06x}")]
    UnknownRecord(u16),
}

/// Whether a decode ran to completion.
#[derive(Debug, Default)]
pub enum DecodeStatus {
    #[default]
    Complete,
    Partial(DecodeError),
}

impl DecodeStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, DecodeStatus::Complete)
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            DecodeStatus::Complete => None,
            DecodeStatus::Partial(err) => Some(err),
        }
    }
}

impl From<Result<(), DecodeError>> for DecodeStatus {
    fn from(result: Result<(), DecodeError>) -> Self {
        match result {
            Ok(()) => DecodeStatus::Complete,
            Err(err) => DecodeStatus::Partial(err),
        }
    }
}

/// A report plus how far the decoder got.
#[derive(Debug)]
pub struct Decoded {
    pub report: ReportNode,
    pub status: DecodeStatus,
}

impl Decoded {
    pub fn new(report: ReportNode, status: DecodeStatus) -> Self {
        Self { report, status }
    }
}

/// Emit the advisory diagnostic for a walk that stopped early.
pub(crate) fn log_partial(format: &str, status: &DecodeStatus) {
    if let DecodeStatus::Partial(err) = status {
        log::warn!("{}: stopped early: {}", format, err);
    }
}

/// A nested format decoder reachable through an embedded payload.
pub trait StructureDecoder {
    /// Decode the structure starting at `offset` of `stream`.
    ///
    /// Implementations must not rely on the stream's current position and
    /// must not fail: a partial subtree is returned instead.
    fn decode(&self, stream: &ByteStream<'_>, offset: u64) -> ReportNode;
}

/// Receives a data URI for every embedded image found.
pub trait PreviewSink {
    fn preview(&self, data_uri: &str);
}

impl<F: Fn(&str)> PreviewSink for F {
    fn preview(&self, data_uri: &str) {
        self(data_uri)
    }
}

/// Ignores previews.
pub struct NoPreview;

impl PreviewSink for NoPreview {
    fn preview(&self, _data_uri: &str) {}
}

/// Adds cross-reference markup to selected text fields.
pub trait TextLinker {
    fn link(&self, text: &str) -> anyhow::Result<String>;
}

/// Returns text unchanged.
pub struct PlainText;

impl TextLinker for PlainText {
    fn link(&self, text: &str) -> anyhow::Result<String> {
        Ok(text.to_string())
    }
}

/// Everything a decoder may call out to.
pub struct Collaborators {
    pub png: Box<dyn StructureDecoder>,
    pub jpeg: Box<dyn StructureDecoder>,
    pub preview: Box<dyn PreviewSink>,
    pub linker: Box<dyn TextLinker>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            png: Box::new(PngStructure),
            jpeg: Box::new(JpegStructure),
            preview: Box::new(NoPreview),
            linker: Box::new(PlainText),
        }
    }
}

impl Collaborators {
    pub fn with_png(mut self, png: impl StructureDecoder + 'static) -> Self {
        self.png = Box::new(png);
        self
    }

    pub fn with_jpeg(mut self, jpeg: impl StructureDecoder + 'static) -> Self {
        self.jpeg = Box::new(jpeg);
        self
    }

    pub fn with_preview(mut self, preview: impl PreviewSink + 'static) -> Self {
        self.preview = Box::new(preview);
        self
    }

    pub fn with_linker(mut self, linker: impl TextLinker + 'static) -> Self {
        self.linker = Box::new(linker);
        self
    }

    /// Run the linker, falling back to the original text when it fails.
    pub(crate) fn link_text(&self, text: String) -> String {
        match self.linker.link(&text) {
            Ok(linked) => linked,
            Err(err) => {
                log::warn!("text linker failed on {:?}: {}", text, err);
                text
            }
        }
    }
}
