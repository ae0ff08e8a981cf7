//! Errors raised by fallible constructors.
//!
//! Drawing operations never fail; only building pixmaps, bitmaps and
//! glyphs can.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid pixmap size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("pixmap of {width}x{height} exceeds the configured area limit of {limit} pixels")]
    TooLarge { width: u32, height: u32, limit: u64 },
    #[error("unsupported depth {0}")]
    UnsupportedDepth(u8),
    #[error("expected {expected} bytes of bitmap data, got {actual}")]
    ShortData { expected: usize, actual: usize },
    #[error("invalid glyph pad {0} (allowed values are: 1, 2, 4, 8)")]
    InvalidGlyphPad(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
