//! Raster logical operations.
//!
//! The sixteen boolean functions a graphics context can combine source and
//! destination pixels with. The GPU path maps them onto the hardware
//! logic-op unit; the software path evaluates them per pixel.

use crate::color::depth_mask;

/// Logical operation applied between a source pixel and the destination.
///
/// Discriminants follow the X11 `GX*` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Alu {
    Clear = 0x0,
    And = 0x1,
    AndReverse = 0x2,
    #[default]
    Copy = 0x3,
    AndInverted = 0x4,
    NoOp = 0x5,
    Xor = 0x6,
    Or = 0x7,
    Nor = 0x8,
    Equiv = 0x9,
    Invert = 0xa,
    OrReverse = 0xb,
    CopyInverted = 0xc,
    OrInverted = 0xd,
    Nand = 0xe,
    Set = 0xf,
}

impl Alu {
    pub const ALL: [Alu; 16] = [
        Alu::Clear,
        Alu::And,
        Alu::AndReverse,
        Alu::Copy,
        Alu::AndInverted,
        Alu::NoOp,
        Alu::Xor,
        Alu::Or,
        Alu::Nor,
        Alu::Equiv,
        Alu::Invert,
        Alu::OrReverse,
        Alu::CopyInverted,
        Alu::OrInverted,
        Alu::Nand,
        Alu::Set,
    ];

    pub fn from_u8(v: u8) -> Option<Alu> {
        Self::ALL.get(v as usize).copied()
    }

    /// Evaluate the function for one pixel.
    #[inline]
    pub fn apply(self, src: u32, dst: u32) -> u32 {
        match self {
            Alu::Clear => 0,
            Alu::And => src & dst,
            Alu::AndReverse => src & !dst,
            Alu::Copy => src,
            Alu::AndInverted => !src & dst,
            Alu::NoOp => dst,
            Alu::Xor => src ^ dst,
            Alu::Or => src | dst,
            Alu::Nor => !(src | dst),
            Alu::Equiv => !src ^ dst,
            Alu::Invert => !dst,
            Alu::OrReverse => src | !dst,
            Alu::CopyInverted => !src,
            Alu::OrInverted => !src | dst,
            Alu::Nand => !(src & dst),
            Alu::Set => !0,
        }
    }

    /// True when the result does not depend on the destination.
    pub fn is_destination_independent(self) -> bool {
        matches!(
            self,
            Alu::Clear | Alu::Copy | Alu::CopyInverted | Alu::Set
        )
    }
}

/// Combine `src` into `dst` through `alu`, touching only the bits in
/// `plane_mask`, and keep the result inside `depth`.
#[inline]
pub fn merge_rop(alu: Alu, src: u32, dst: u32, plane_mask: u32, depth: u8) -> u32 {
    let v = alu.apply(src, dst);
    ((v & plane_mask) | (dst & !plane_mask)) & depth_mask(depth)
}

/// A plane mask is solid when it selects every bit of the depth.
#[inline]
pub fn plane_mask_is_solid(plane_mask: u32, depth: u8) -> bool {
    let full = depth_mask(depth);
    plane_mask & full == full
}
