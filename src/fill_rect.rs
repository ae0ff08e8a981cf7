//! Solid rectangle fill on the GPU.

use crate::basics::Rectangle;
use crate::gc::Gc;
use crate::generic::Generic;
use crate::gpu::{GpuContext, Primitive};
use crate::ops::GcOps;
use crate::pixmap::Drawable;
use crate::screen::{ddx_can_fallback_gc, ddx_can_fallback_pixmap, Screen};
use crate::solid::SolidPass;

impl<G: GpuContext> Screen<G> {
    /// Clip every rectangle against the composite clip and draw the pieces
    /// as quads in one call.
    fn fill_rect_quads(&mut self, drawable: &Drawable<'_>, gc: &Gc, rects: &[Rectangle]) -> bool {
        let Some(mut pass) = SolidPass::begin(self, drawable, gc, "poly_fill_rect") else {
            return false;
        };
        let clip = gc.composite_clip();
        let mut vertices = Vec::with_capacity(rects.len() * 8);
        for rect in rects {
            let Some(r) = rect.to_rect() else {
                continue;
            };
            for b in clip.intersect_rect(&r.translate(drawable.x(), drawable.y())) {
                let [x1, y1] = pass.corner(b.x1, b.y1);
                let [x2, y2] = pass.corner(b.x2 + 1, b.y2 + 1);
                vertices.extend_from_slice(&[x1, y1, x2, y1, x2, y2, x1, y2]);
            }
        }
        pass.draw(Primitive::Quads, &vertices);
        true
    }

    /// Fill rectangles, given relative to the drawable origin.
    pub fn poly_fill_rect(&mut self, drawable: &mut Drawable<'_>, gc: &Gc, rects: &[Rectangle]) {
        if !self.fill_rect_quads(drawable, gc, rects) {
            Generic::new(self).poly_fill_rect(drawable, gc, rects);
        }
    }

    pub fn poly_fill_rect_nf(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        rects: &[Rectangle],
    ) -> bool {
        if self.fill_rect_quads(drawable, gc, rects) {
            return true;
        }
        if ddx_can_fallback_pixmap(drawable.backing().kind()) && ddx_can_fallback_gc(gc) {
            return false;
        }
        Generic::new(self).poly_fill_rect(drawable, gc, rects);
        true
    }
}
