//! Software implementation of the operation table.

use crate::basics::{CoordMode, PointI, Rectangle};
use crate::fb::{self, Target};
use crate::gc::Gc;
use crate::glyph::{Bitmap, CharInfo, FontInfo};
use crate::gpu::GpuContext;
use crate::ops::GcOps;
use crate::pixmap::Drawable;
use crate::screen::{Access, Screen};

/// Draws every request in software on a mapped copy of the destination.
///
/// Requests whose destination cannot be mapped are dropped.
pub struct Generic<'a, G: GpuContext> {
    screen: &'a mut Screen<G>,
}

impl<'a, G: GpuContext> Generic<'a, G> {
    pub fn new(screen: &'a mut Screen<G>) -> Self {
        Self { screen }
    }

    /// Map the destination for read/write and run `f` on it. Returns
    /// `false` when the destination could not be mapped.
    pub fn render(&mut self, drawable: &mut Drawable<'_>, f: impl FnOnce(&mut Target<'_>)) -> bool {
        let deltas = drawable.deltas();
        let depth = drawable.depth();
        let mapped = self
            .screen
            .with_access(drawable.backing_mut(), Access::ReadWrite, |buf| {
                f(&mut Target::new(buf, deltas, depth))
            })
            .is_some();
        if !mapped {
            fallback!("destination could not be mapped, request skipped");
        }
        mapped
    }
}

impl<G: GpuContext> GcOps for Generic<'_, G> {
    fn poly_fill_rect(&mut self, drawable: &mut Drawable<'_>, gc: &Gc, rects: &[Rectangle]) {
        let origin = PointI::new(drawable.x(), drawable.y());
        self.render(drawable, |t| fb::fill_rects(t, gc, origin, rects));
    }

    fn poly_lines(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) {
        let origin = PointI::new(drawable.x(), drawable.y());
        self.render(drawable, |t| fb::poly_line(t, gc, origin, mode, points));
    }

    fn poly_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    ) {
        let pen = PointI::new(x + drawable.x(), y + drawable.y());
        self.render(drawable, |t| fb::poly_glyph_blt(t, gc, pen, glyphs));
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
        let pen = PointI::new(x + drawable.x(), y + drawable.y());
        self.render(drawable, |t| fb::image_glyph_blt(t, gc, pen, font, glyphs));
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
        self.render(drawable, |t| fb::push_pixels(t, gc, bitmap, w, h, x, y));
    }
}
