//! # accel2d
//!
//! GPU acceleration paths for core X-style 2D drawing, with exact software
//! fallbacks.
//!
//! Two requests are accelerated:
//!
//! - **Glyph and bitmap stippling**: every set bit of a glyph run or pushed
//!   bitmap that survives the clip is drawn as one point in the GC's
//!   foreground, in batched draw calls.
//! - **Thin axis-aligned polylines**: each segment becomes a filled
//!   rectangle and the whole list goes to the accelerated rectangle fill.
//!   Other thin polylines are drawn in software on a scratch pixmap bounded
//!   to the polyline.
//!
//! Whenever a fast path does not apply, the same request is rendered by
//! the generic software layer. Drawing never fails; only the path differs.
//!
//! ## Architecture
//!
//! 1. **GpuContext**: the GPU services used, behind a trait, with
//!    [`SoftGpu`] as a reference implementation
//! 2. **Screen**: owns the context, allocates pixmaps and maps them into
//!    memory for software rendering
//! 3. **GcOps**: the per-GC operation table, implemented by [`Screen`]
//!    (accelerated) and [`Generic`] (software only)
//! 4. **fb**: the software renderers every fast path must match
//!
//! Fallback decisions are logged at debug level under the
//! [`FALLBACK_TARGET`] log target.

/// Log target for fast-path fallback decisions.
pub const FALLBACK_TARGET: &str = "accel2d::fallback";

macro_rules! fallback {
    ($($arg:tt)+) => {
        log::debug!(target: $crate::FALLBACK_TARGET, $($arg)+)
    };
}

// Foundation types
pub mod alu;
pub mod basics;
pub mod color;
pub mod config;
pub mod error;
pub mod math;
pub mod region;

// Sources, surfaces and drawing state
pub mod gc;
pub mod glyph;
pub mod pixmap;

// GPU
pub mod gpu;
pub mod screen;
pub mod soft_gpu;
mod solid;

// Software rendering
pub mod dda_line;
pub mod fb;
pub mod generic;
pub mod wide_line;

// Operations
mod fill_rect;
mod glyph_blt;
pub mod ops;
pub mod polylines;

pub use alu::Alu;
pub use basics::{CoordMode, PointI, RectI, Rectangle};
pub use color::PictFormat;
pub use config::AccelConfig;
pub use error::{Error, Result};
pub use gc::{CapStyle, Fill, Gc, JoinStyle, LineStyle};
pub use generic::Generic;
pub use glyph::{Bitmap, CharInfo, FontInfo, GlyphPad};
pub use gpu::{GpuContext, TextureId};
pub use ops::GcOps;
pub use pixmap::{Drawable, PixelBuf, Pixmap, PixmapKind};
pub use polylines::{polyline_bounds, segments_to_rects, LinePath};
pub use region::Region;
pub use screen::{Access, Screen};
pub use soft_gpu::SoftGpu;
