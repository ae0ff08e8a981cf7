//! Monochrome sources: font glyphs and stipple bitmaps.
//!
//! Both store one bit per pixel, least significant bit first within each
//! byte, rows top to bottom. Glyph rows are padded to the font's glyph pad;
//! bitmap rows carry an explicit stride.

use crate::error::{Error, Result};
use crate::pixmap::PixmapKind;

// ============================================================================
// BitRows: shared read-only view
// ============================================================================

/// Read-only view of packed 1-bit rows.
#[derive(Debug, Clone, Copy)]
pub struct BitRows<'a> {
    bits: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> BitRows<'a> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row `y` as raw bytes.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.bits[start..start + self.stride]
    }

    #[inline]
    pub fn bit(&self, x: u32, y: u32) -> bool {
        let row = self.row(y);
        row[(x / 8) as usize] & (1 << (x % 8)) != 0
    }

    /// Number of set bits in the `w` x `h` top-left area.
    pub fn count_set(&self, w: u32, h: u32) -> usize {
        let w = w.min(self.width);
        let h = h.min(self.height);
        let mut n = 0;
        for y in 0..h {
            for x in 0..w {
                if self.bit(x, y) {
                    n += 1;
                }
            }
        }
        n
    }
}

fn check_len(stride: usize, height: u32, len: usize) -> Result<()> {
    let expected = stride * height as usize;
    if len < expected {
        return Err(Error::ShortData {
            expected,
            actual: len,
        });
    }
    Ok(())
}

// ============================================================================
// Bitmap
// ============================================================================

/// A depth-1 pixmap used as a stipple or as the source of a bitmap push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: usize,
    bits: Vec<u8>,
    kind: PixmapKind,
}

impl Bitmap {
    /// Wrap packed rows of `stride` bytes each.
    pub fn new(width: u32, height: u32, stride: usize, bits: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize { width, height });
        }
        if stride * 8 < width as usize {
            return Err(Error::ShortData {
                expected: (width as usize + 7) / 8,
                actual: stride,
            });
        }
        check_len(stride, height, bits.len())?;
        Ok(Self {
            width,
            height,
            stride,
            bits,
            kind: PixmapKind::Memory,
        })
    }

    /// Build from rows of booleans, one byte-aligned row per entry.
    pub fn from_rows(rows: &[&[bool]]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let stride = ((width as usize) + 7) / 8;
        let mut bits = vec![0u8; stride * height as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, &on) in row.iter().enumerate() {
                if on {
                    bits[y * stride + x / 8] |= 1 << (x % 8);
                }
            }
        }
        Self::new(width, height, stride, bits)
    }

    /// Report a different storage kind, as for a bitmap uploaded to the GPU.
    pub fn with_kind(mut self, kind: PixmapKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn kind(&self) -> PixmapKind {
        self.kind
    }

    pub fn rows(&self) -> BitRows<'_> {
        BitRows {
            bits: &self.bits,
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

// ============================================================================
// Glyphs
// ============================================================================

/// Row padding of glyph bitmaps, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphPad {
    Byte = 1,
    Short = 2,
    #[default]
    Int = 4,
    Long = 8,
}

impl GlyphPad {
    pub fn from_bytes(bytes: u32) -> Result<Self> {
        match bytes {
            1 => Ok(GlyphPad::Byte),
            2 => Ok(GlyphPad::Short),
            4 => Ok(GlyphPad::Int),
            8 => Ok(GlyphPad::Long),
            other => Err(Error::InvalidGlyphPad(other)),
        }
    }

    /// Bytes per row for a glyph `width` pixels wide.
    pub fn padded_width(self, width: u32) -> usize {
        let pad = self as usize;
        let bytes = (width as usize + 7) / 8;
        (bytes + pad - 1) / pad * pad
    }
}

/// Placement and advance of one glyph relative to the pen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharMetrics {
    pub left_side_bearing: i16,
    pub right_side_bearing: i16,
    pub character_width: i16,
    pub ascent: i16,
    pub descent: i16,
}

impl CharMetrics {
    /// Bitmap width in pixels.
    pub fn width(&self) -> u32 {
        (self.right_side_bearing as i32 - self.left_side_bearing as i32).max(0) as u32
    }

    /// Bitmap height in pixels.
    pub fn height(&self) -> u32 {
        (self.ascent as i32 + self.descent as i32).max(0) as u32
    }
}

/// A glyph: metrics plus its padded bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharInfo {
    metrics: CharMetrics,
    stride: usize,
    bits: Vec<u8>,
}

impl CharInfo {
    pub fn new(metrics: CharMetrics, pad: GlyphPad, bits: Vec<u8>) -> Result<Self> {
        let stride = pad.padded_width(metrics.width());
        check_len(stride, metrics.height(), bits.len())?;
        Ok(Self {
            metrics,
            stride,
            bits,
        })
    }

    /// A glyph with no pixels that only advances the pen, like a space.
    pub fn blank(character_width: i16) -> Self {
        Self {
            metrics: CharMetrics {
                character_width,
                ..CharMetrics::default()
            },
            stride: 0,
            bits: Vec::new(),
        }
    }

    /// Build a glyph from rows of booleans; the top row sits `ascent`
    /// pixels above the baseline.
    pub fn from_rows(
        rows: &[&[bool]],
        left_side_bearing: i16,
        ascent: i16,
        character_width: i16,
        pad: GlyphPad,
    ) -> Result<Self> {
        let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let too_large = || Error::InvalidSize {
            width: u32::try_from(columns).unwrap_or(u32::MAX),
            height: u32::try_from(rows.len()).unwrap_or(u32::MAX),
        };
        let height = i16::try_from(rows.len()).map_err(|_| too_large())?;
        let width = i16::try_from(columns).map_err(|_| too_large())?;
        let metrics = CharMetrics {
            left_side_bearing,
            right_side_bearing: left_side_bearing.checked_add(width).ok_or_else(too_large)?,
            character_width,
            ascent,
            descent: height.checked_sub(ascent).ok_or_else(too_large)?,
        };
        let stride = pad.padded_width(metrics.width());
        let mut bits = vec![0u8; stride * rows.len()];
        for (y, row) in rows.iter().enumerate() {
            for (x, &on) in row.iter().enumerate() {
                if on {
                    bits[y * stride + x / 8] |= 1 << (x % 8);
                }
            }
        }
        Self::new(metrics, pad, bits)
    }

    pub fn metrics(&self) -> &CharMetrics {
        &self.metrics
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn rows(&self) -> BitRows<'_> {
        BitRows {
            bits: &self.bits,
            width: self.metrics.width(),
            height: self.metrics.height(),
            stride: self.stride,
        }
    }
}

/// Font-wide metrics needed by image text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontInfo {
    pub font_ascent: i16,
    pub font_descent: i16,
}

/// Sum of the advances of a glyph run.
pub fn run_width(glyphs: &[&CharInfo]) -> i32 {
    glyphs
        .iter()
        .map(|g| g.metrics().character_width as i32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: bool = true;
    const O: bool = false;

    #[test]
    fn test_padded_width() {
        assert_eq!(GlyphPad::Byte.padded_width(9), 2);
        assert_eq!(GlyphPad::Int.padded_width(9), 4);
        assert_eq!(GlyphPad::Long.padded_width(1), 8);
        assert_eq!(GlyphPad::Int.padded_width(0), 0);
        assert!(GlyphPad::from_bytes(3).is_err());
    }

    #[test]
    fn test_bitmap_lsb_first() {
        let b = Bitmap::new(10, 1, 2, vec![0b0000_0010, 0b0000_0010]).unwrap();
        let rows = b.rows();
        assert!(!rows.bit(0, 0));
        assert!(rows.bit(1, 0));
        assert!(rows.bit(9, 0));
        assert_eq!(rows.count_set(10, 1), 2);
    }

    #[test]
    fn test_bitmap_from_rows() {
        let b = Bitmap::from_rows(&[&[X, O, X], &[O, X, O]]).unwrap();
        assert_eq!(b.width(), 3);
        assert_eq!(b.stride(), 1);
        assert!(b.rows().bit(2, 0));
        assert!(b.rows().bit(1, 1));
        assert!(!b.rows().bit(0, 1));
    }

    #[test]
    fn test_bitmap_rejects_short_data() {
        assert!(Bitmap::new(8, 2, 1, vec![0]).is_err());
        assert!(Bitmap::new(9, 1, 1, vec![0]).is_err());
    }

    #[test]
    fn test_char_info_metrics() {
        let g = CharInfo::from_rows(&[&[X, X], &[X, O], &[O, X]], 1, 2, 4, GlyphPad::Int).unwrap();
        let m = g.metrics();
        assert_eq!(m.width(), 2);
        assert_eq!(m.height(), 3);
        assert_eq!(m.descent, 1);
        assert_eq!(g.stride(), 4);
        assert!(g.rows().bit(1, 2));
        assert!(!g.rows().bit(1, 1));
    }

    #[test]
    fn test_char_info_rejects_oversized_rows() {
        let cell: &[bool] = &[X];
        let tall = vec![cell; 32768];
        assert!(matches!(
            CharInfo::from_rows(&tall, 0, 0, 1, GlyphPad::Byte),
            Err(Error::InvalidSize {
                width: 1,
                height: 32768
            })
        ));

        let wide = vec![O; 32768];
        assert!(matches!(
            CharInfo::from_rows(&[wide.as_slice()], 0, 1, 1, GlyphPad::Byte),
            Err(Error::InvalidSize {
                width: 32768,
                height: 1
            })
        ));

        let row: &[bool] = &[X, X, X, X];
        assert!(matches!(
            CharInfo::from_rows(&[row], i16::MAX - 1, 1, 1, GlyphPad::Byte),
            Err(Error::InvalidSize { .. })
        ));
        assert!(CharInfo::from_rows(&vec![row; 32767], 0, 0, 4, GlyphPad::Byte).is_ok());
    }

    #[test]
    fn test_blank_glyph() {
        let g = CharInfo::blank(6);
        assert_eq!(g.metrics().width(), 0);
        assert_eq!(g.metrics().height(), 0);
        assert_eq!(run_width(&[&g, &g]), 12);
    }
}
