//! ID3v2 tag decoding.
//!
//! An ID3v2 tag is prepended to MP3 audio and holds metadata frames. This
//! module walks the tag header, the optional extended header and the frame
//! sequence, decoding text frames and locating attached pictures.
//!
//! ## Layout
//!
//! - [`structures`]: tag header, frame types and the identifier tables
//! - [`parser`]: the frame walker and report builder
//!
//! ## Version differences
//!
//! | | v2.2 | v2.3 | v2.4 |
//! |---|---|---|---|
//! | frame id | 3 chars | 4 chars | 4 chars |
//! | frame size | 24-bit BE | 32-bit BE | sync-safe |
//! | frame flags | none | 2 bytes | 2 bytes |
//! | extended header size | - | 32-bit BE | sync-safe |
//!
//! The tag size in the main header is sync-safe in every version.

mod parser;
mod structures;

pub use parser::{Id3Decoder, read_container, read_frame, read_header};
pub use structures::*;
