//! Glyph and bitmap stippling with point primitives.
//!
//! Every set bit of a glyph run or pushed bitmap that survives the clip
//! becomes one point drawn in the GC's foreground. Points are batched
//! (`AccelConfig::point_batch` per draw call) in source order: glyph by
//! glyph, rows top to bottom, bits left to right.

use crate::basics::PointI;
use crate::gc::Gc;
use crate::generic::Generic;
use crate::glyph::{Bitmap, BitRows, CharInfo, FontInfo};
use crate::gpu::{GpuContext, Primitive};
use crate::ops::GcOps;
use crate::pixmap::{Drawable, PixmapKind};
use crate::region::Region;
use crate::screen::{ddx_can_fallback_gc, ddx_can_fallback_pixmap, Screen};
use crate::solid::SolidPass;

/// Accumulates point vertices and flushes them in fixed-size batches.
struct PointBatch<'a, G: GpuContext> {
    pass: SolidPass<'a, G>,
    capacity: usize,
    vertices: Vec<f32>,
}

impl<'a, G: GpuContext> PointBatch<'a, G> {
    fn new(pass: SolidPass<'a, G>, capacity: usize) -> Self {
        Self {
            pass,
            capacity,
            vertices: Vec::with_capacity(capacity * 2),
        }
    }

    /// Queue screen pixel (x, y).
    #[inline]
    fn push(&mut self, x: i32, y: i32) {
        self.vertices.extend_from_slice(&self.pass.center(x, y));
        if self.vertices.len() >= self.capacity * 2 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        log::trace!("flushing {} points", self.vertices.len() / 2);
        self.pass.draw(Primitive::Points, &self.vertices);
        self.vertices.clear();
    }

    /// Queue the set bits of the top-left `w` x `h` of `rows`, placed at
    /// screen position (x, y), that lie inside `clip`.
    fn push_bits(&mut self, rows: BitRows<'_>, clip: &Region, x: i32, y: i32, w: u32, h: u32) {
        let w = w.min(rows.width());
        let h = h.min(rows.height());
        for row in 0..h {
            let py = y + row as i32;
            for col in 0..w {
                let px = x + col as i32;
                if rows.bit(col, row) && clip.contains_point(px, py) {
                    self.push(px, py);
                }
            }
        }
    }

    /// Draw whatever is left; dropping the batch afterwards restores the
    /// GPU state.
    fn finish(mut self) {
        self.flush();
    }
}

impl<G: GpuContext> Screen<G> {
    fn point_batch<'a>(&'a mut self, drawable: &Drawable<'_>, gc: &Gc, op: &str) -> Option<PointBatch<'a, G>> {
        let capacity = self.config().point_batch.max(1);
        SolidPass::begin(self, drawable, gc, op).map(|pass| PointBatch::new(pass, capacity))
    }

    fn poly_glyph_points(
        &mut self,
        drawable: &Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    ) -> bool {
        if !self.config().glyph_points {
            return false;
        }
        let Some(mut batch) = self.point_batch(drawable, gc, "poly_glyph_blt") else {
            return false;
        };
        let clip = gc.composite_clip();
        let mut pen = PointI::new(x + drawable.x(), y + drawable.y());
        for glyph in glyphs {
            let m = glyph.metrics();
            let rows = glyph.rows();
            batch.push_bits(
                rows,
                clip,
                pen.x + m.left_side_bearing as i32,
                pen.y - m.ascent as i32,
                rows.width(),
                rows.height(),
            );
            pen.x += m.character_width as i32;
        }
        batch.finish();
        true
    }

    #[allow(clippy::too_many_arguments)]
    fn push_pixels_points(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    ) -> bool {
        if !self.config().push_pixels_points {
            return false;
        }
        // Vertex data for the whole area must be addressable.
        if w as u64 * h as u64 * 2 * std::mem::size_of::<f32>() as u64 > i32::MAX as u64 {
            fallback!("push_pixels: {}x{} area too large", w, h);
            return false;
        }
        let Some(mut batch) = self.point_batch(drawable, gc, "push_pixels") else {
            return false;
        };
        batch.push_bits(bitmap.rows(), gc.composite_clip(), x, y, w, h);
        batch.finish();
        true
    }

    /// Draw a glyph run through the GC's fill with the pen at (x, y).
    pub fn poly_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    ) {
        if !self.poly_glyph_points(drawable, gc, x, y, glyphs) {
            Generic::new(self).poly_glyph_blt(drawable, gc, x, y, glyphs);
        }
    }

    /// Like [`poly_glyph_blt`](Self::poly_glyph_blt), but returns `false`
    /// without drawing when the request is not accelerated and the caller
    /// can run its own software fallback.
    pub fn poly_glyph_blt_nf(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        glyphs: &[&CharInfo],
    ) -> bool {
        if self.poly_glyph_points(drawable, gc, x, y, glyphs) {
            return true;
        }
        if ddx_can_fallback_pixmap(drawable.backing().kind()) && ddx_can_fallback_gc(gc) {
            return false;
        }
        Generic::new(self).poly_glyph_blt(drawable, gc, x, y, glyphs);
        true
    }

    /// Image text: the run's font box in the background, glyphs in the
    /// foreground. Always rendered in software.
    #[allow(clippy::too_many_arguments)]
    pub fn image_glyph_blt(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        font: &FontInfo,
        glyphs: &[&CharInfo],
    ) {
        Generic::new(self).image_glyph_blt(drawable, gc, x, y, font, glyphs);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn image_glyph_blt_nf(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        x: i32,
        y: i32,
        font: &FontInfo,
        glyphs: &[&CharInfo],
    ) -> bool {
        if ddx_can_fallback_pixmap(drawable.backing().kind()) && ddx_can_fallback_gc(gc) {
            return false;
        }
        Generic::new(self).image_glyph_blt(drawable, gc, x, y, font, glyphs);
        true
    }

    /// Paint the set bits of the top-left `w` x `h` of `bitmap` at screen
    /// position (x, y). Only memory-held bitmaps are drawn as points.
    #[allow(clippy::too_many_arguments)]
    pub fn push_pixels(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &mut Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    ) {
        self.push_pixels_inner(gc, bitmap, drawable, w, h, x, y, true);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push_pixels_nf(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &mut Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
    ) -> bool {
        self.push_pixels_inner(gc, bitmap, drawable, w, h, x, y, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_pixels_inner(
        &mut self,
        gc: &Gc,
        bitmap: &Bitmap,
        drawable: &mut Drawable<'_>,
        w: u32,
        h: u32,
        x: i32,
        y: i32,
        fallback: bool,
    ) -> bool {
        if !fallback
            && ddx_can_fallback_pixmap(drawable.backing().kind())
            && ddx_can_fallback_pixmap(bitmap.kind())
            && ddx_can_fallback_gc(gc)
        {
            return false;
        }
        if bitmap.kind() == PixmapKind::Memory
            && self.push_pixels_points(gc, bitmap, drawable, w, h, x, y)
        {
            return true;
        }
        Generic::new(self).push_pixels(gc, bitmap, drawable, w, h, x, y);
        true
    }
}
