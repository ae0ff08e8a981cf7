//! Pixel formats and pixel <-> color conversion.
//!
//! Pixels are stored as `u32` values laid out according to a [`PictFormat`]
//! chosen from the pixmap depth. The solid shader takes a floating point
//! color, so foreground pixels are expanded through the destination format
//! before being uploaded as a uniform; the GPU packs them back when it
//! writes the framebuffer.

use crate::error::{Error, Result};

// ============================================================================
// PictFormat
// ============================================================================

/// Channel layout of a pixmap's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictFormat {
    /// Alpha only, 8 bits.
    A8,
    /// 5 bits per color channel, top bit unused.
    X1R5G5B5,
    R5G6B5,
    /// 8 bits per color channel, top byte unused.
    X8R8G8B8,
    A8R8G8B8,
}

/// Bit widths of (alpha, red, green, blue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Channels {
    a: u32,
    r: u32,
    g: u32,
    b: u32,
}

impl PictFormat {
    /// The format used for drawables of the given depth.
    pub fn for_depth(depth: u8) -> Result<Self> {
        match depth {
            8 => Ok(PictFormat::A8),
            15 => Ok(PictFormat::X1R5G5B5),
            16 => Ok(PictFormat::R5G6B5),
            24 => Ok(PictFormat::X8R8G8B8),
            32 => Ok(PictFormat::A8R8G8B8),
            _ => Err(Error::UnsupportedDepth(depth)),
        }
    }

    pub fn depth(self) -> u8 {
        match self {
            PictFormat::A8 => 8,
            PictFormat::X1R5G5B5 => 15,
            PictFormat::R5G6B5 => 16,
            PictFormat::X8R8G8B8 => 24,
            PictFormat::A8R8G8B8 => 32,
        }
    }

    fn channels(self) -> Channels {
        match self {
            PictFormat::A8 => Channels {
                a: 8,
                r: 0,
                g: 0,
                b: 0,
            },
            PictFormat::X1R5G5B5 => Channels {
                a: 0,
                r: 5,
                g: 5,
                b: 5,
            },
            PictFormat::R5G6B5 => Channels {
                a: 0,
                r: 5,
                g: 6,
                b: 5,
            },
            PictFormat::X8R8G8B8 => Channels {
                a: 0,
                r: 8,
                g: 8,
                b: 8,
            },
            PictFormat::A8R8G8B8 => Channels {
                a: 8,
                r: 8,
                g: 8,
                b: 8,
            },
        }
    }

    /// Shifts of (alpha, red, green, blue). Alpha-only formats keep alpha
    /// in the low bits; ARGB formats pack blue lowest.
    fn shifts(self) -> (u32, u32, u32, u32) {
        let c = self.channels();
        if c.r == 0 && c.g == 0 && c.b == 0 {
            (0, 0, 0, 0)
        } else {
            let b = 0;
            let g = c.b;
            let r = g + c.g;
            let a = r + c.r;
            (a, r, g, b)
        }
    }
}

/// All bits significant for pixels of `depth`.
#[inline]
pub fn depth_mask(depth: u8) -> u32 {
    if depth >= 32 {
        u32::MAX
    } else {
        (1u32 << depth) - 1
    }
}

// ============================================================================
// Rgba
// ============================================================================

/// Normalized floating point color, as fed to the solid shader.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

#[inline]
fn channel_to_float(pixel: u32, shift: u32, bits: u32) -> f32 {
    let max = (1u32 << bits) - 1;
    ((pixel >> shift) & max) as f32 / max as f32
}

#[inline]
fn float_to_channel(v: f32, shift: u32, bits: u32) -> u32 {
    let max = (1u32 << bits) - 1;
    let v = v.clamp(0.0, 1.0);
    ((v * max as f32).round() as u32 & max) << shift
}

/// Expand a pixel value into a normalized color.
///
/// Missing color channels read as 0 and a missing alpha channel as 1.
pub fn rgba_from_pixel(pixel: u32, format: PictFormat) -> Rgba {
    let c = format.channels();
    let (ashift, rshift, gshift, bshift) = format.shifts();
    let r = if c.r > 0 {
        channel_to_float(pixel, rshift, c.r)
    } else {
        0.0
    };
    let g = if c.g > 0 {
        channel_to_float(pixel, gshift, c.g)
    } else {
        0.0
    };
    let b = if c.b > 0 {
        channel_to_float(pixel, bshift, c.b)
    } else {
        0.0
    };
    let a = if c.a > 0 {
        channel_to_float(pixel, ashift, c.a)
    } else {
        1.0
    };
    Rgba::new(r, g, b, a)
}

/// Pack a normalized color into a pixel value of `format`.
pub fn pixel_from_rgba(color: Rgba, format: PictFormat) -> u32 {
    let c = format.channels();
    let (ashift, rshift, gshift, bshift) = format.shifts();
    let mut pixel = 0;
    if c.r > 0 {
        pixel |= float_to_channel(color.r, rshift, c.r);
    }
    if c.g > 0 {
        pixel |= float_to_channel(color.g, gshift, c.g);
    }
    if c.b > 0 {
        pixel |= float_to_channel(color.b, bshift, c.b);
    }
    if c.a > 0 {
        pixel |= float_to_channel(color.a, ashift, c.a);
    }
    pixel
}

// ============================================================================
// Tests
// ============================================================================
