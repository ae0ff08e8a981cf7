//! The per-GC drawing operation table.

use crate::basics::{CoordMode, PointI, Rectangle};
use crate::gc::Gc;
use crate::glyph::{Bitmap, CharInfo, FontInfo};
use crate::gpu::GpuContext;
use crate::pixmap::Drawable;
use crate::screen::Screen;

/// Drawing operations a GC dispatches to.
///
/// Implemented by [`Screen`](crate::Screen), which takes the accelerated
/// paths when it can, and by [`Generic`](crate::Generic), which always
/// renders in software. The GC must have been validated against the
/// drawable. Coordinates are drawable-relative except for `push_pixels`,
/// whose position is in screen space.
pub trait GcOps {
    fn poly_fill_rect(&mut self, drawable: &mut Drawable<'_>, gc: &Gc, rects: &[Rectangle]);

    fn poly_lines(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    );

    fn poly_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    );

    #[allow(clippy::too_many_arguments)]
    fn image_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        font: &FontInfo,
        glyphs: &[&CharInfo],
    );

    #[allow(clippy::too_many_arguments)]
    fn push_pixels(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &mut Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    );
}

impl<G: GpuContext> GcOps for Screen<G> {
    fn poly_fill_rect(&mut self, drawable: &mut Drawable<'_>, gc: &Gc, rects: &[Rectangle]) {
        Screen::poly_fill_rect(self, drawable, gc, rects);
    }

    fn poly_lines(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) {
        Screen::poly_lines(self, drawable, gc, mode, points);
    }

    fn poly_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    ) {
        Screen::poly_glyph_blt(self, drawable, gc, x, y, glyphs);
    }

    fn image_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        font: &FontInfo,
        glyphs: &[&CharInfo],
    ) {
        Screen::image_glyph_blt(self, drawable, gc, x, y, font, glyphs);
    }

    fn push_pixels(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &mut Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    ) {
        Screen::push_pixels(self, gc, bitmap, drawable, w, h, x, y);
    }
}
