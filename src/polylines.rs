//! Polylines.
//!
//! Thin solid polylines made only of horizontal and vertical segments are
//! turned into one rectangle per segment and handed to the accelerated
//! rectangle fill. Anything else is drawn in software; thin lines are
//! staged through a scratch pixmap covering just the polyline's bounding
//! box so only that area has to be mapped.

use crate::basics::{absolute_points, CoordMode, PointI, RectI, Rectangle};
use crate::fb;
use crate::gc::{Gc, LineStyle};
use crate::generic::Generic;
use crate::gpu::GpuContext;
use crate::pixmap::Drawable;
use crate::screen::{ddx_can_fallback_gc, ddx_can_fallback_pixmap, Screen};

/// Route a polyline request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePath {
    /// Filled as this many rectangles.
    Rectangles(usize),
    /// Drawn in software on a scratch pixmap, then copied back.
    Staged,
    /// Drawn in software directly on the destination.
    Direct,
    /// The target could not be mapped; nothing was drawn.
    Skipped,
}

/// One inclusive rectangle per segment, in segment order, or `None` as
/// soon as a segment is diagonal or longer than a rectangle can be.
pub fn segments_to_rects(mode: CoordMode, points: &[PointI]) -> Option<Vec<Rectangle>> {
    let pts = absolute_points(mode, points);
    let mut rects = Vec::with_capacity(pts.len().saturating_sub(1));
    for seg in pts.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        if a.x != b.x && a.y != b.y {
            return None;
        }
        rects.push(Rectangle::new(
            a.x.min(b.x),
            a.y.min(b.y),
            a.x.abs_diff(b.x).checked_add(1)?,
            a.y.abs_diff(b.y).checked_add(1)?,
        ));
    }
    Some(rects)
}

/// Inclusive bounding box of the points, drawable-relative. `None` for no
/// points, or when the box is wider or taller than `i32::MAX` pixels.
pub fn polyline_bounds(mode: CoordMode, points: &[PointI]) -> Option<RectI> {
    let pts = absolute_points(mode, points);
    let first = pts.first()?;
    let init = RectI::new(first.x, first.y, first.x, first.y);
    let r = pts.iter().fold(init, |r, p| {
        RectI::new(r.x1.min(p.x), r.y1.min(p.y), r.x2.max(p.x), r.y2.max(p.y))
    });
    r.x2.checked_sub(r.x1)?.checked_add(1)?;
    r.y2.checked_sub(r.y1)?.checked_add(1)?;
    Some(r)
}

impl<G: GpuContext> Screen<G> {
    fn poly_lines_rects(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) -> Option<usize> {
        if !self.config().polyline_rects || gc.line_width != 0 {
            return None;
        }
        if gc.line_style != LineStyle::Solid || !gc.fill.is_solid() {
            fallback!(
                "poly_lines: non-solid line style {:?} or fill style",
                gc.line_style
            );
            return None;
        }
        let Some(rects) = segments_to_rects(mode, points) else {
            fallback!("poly_lines: diagonal or oversized segment");
            return None;
        };
        self.poly_fill_rect(drawable, gc, &rects);
        Some(rects.len())
    }

    /// Draw thin lines in software through a scratch pixmap sized to their
    /// bounding box. `None` when no scratch pixmap could be allocated or
    /// filled from the destination, or the box lies outside the coordinate
    /// range.
    fn poly_lines_staged(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) -> Option<LinePath> {
        let Some(bounds) = polyline_bounds(mode, points) else {
            fallback!("poly_lines: no usable bounding box, drawing directly");
            return None;
        };
        // Screen position of the bounding box and its place in the backing pixmap.
        let (dx, dy) = drawable.deltas();
        let screen_pos = bounds
            .x1
            .checked_add(drawable.x())
            .zip(bounds.y1.checked_add(drawable.y()));
        let backing_pos =
            screen_pos.and_then(|(sx, sy)| sx.checked_add(dx).zip(sy.checked_add(dy)));
        let (Some((sx, sy)), Some((bx, by))) = (screen_pos, backing_pos) else {
            fallback!("poly_lines: bounding box outside the coordinate range, drawing directly");
            return None;
        };
        let (w, h) = (bounds.width(), bounds.height());
        let mut scratch = match self.create_pixmap(w, h, drawable.depth()) {
            Ok(p) => p,
            Err(err) => {
                fallback!("poly_lines: no scratch pixmap ({}), drawing directly", err);
                return None;
            }
        };

        if !self.copy_area(drawable.backing(), &mut scratch, bx, by, w, h, 0, 0) {
            fallback!("poly_lines: destination could not be read back, drawing directly");
            self.destroy_pixmap(scratch);
            return None;
        }

        let local: Vec<PointI> = absolute_points(mode, points)
            .into_iter()
            .map(|p| PointI::new(p.x - bounds.x1, p.y - bounds.y1))
            .collect();
        let scratch_gc = gc.translated(sx.saturating_neg(), sy.saturating_neg());
        let drawn = {
            let mut target = Drawable::pixmap(&mut scratch);
            Generic::new(self).render(&mut target, |t| {
                fb::poly_line(t, &scratch_gc, PointI::new(0, 0), CoordMode::Origin, &local)
            })
        };

        let path = if drawn {
            self.copy_area(&scratch, drawable.backing_mut(), 0, 0, w, h, bx, by);
            LinePath::Staged
        } else {
            LinePath::Skipped
        };
        self.destroy_pixmap(scratch);
        Some(path)
    }

    /// Draw a connected polyline and report how it was rendered.
    pub fn poly_lines(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) -> LinePath {
        if let Some(n) = self.poly_lines_rects(drawable, gc, mode, points) {
            return LinePath::Rectangles(n);
        }
        if gc.line_width == 0 && self.config().scratch_staging {
            if let Some(path) = self.poly_lines_staged(drawable, gc, mode, points) {
                return path;
            }
        }
        let origin = PointI::new(drawable.x(), drawable.y());
        let drawn = Generic::new(self).render(drawable, |t| fb::poly_line(t, gc, origin, mode, points));
        if drawn {
            LinePath::Direct
        } else {
            LinePath::Skipped
        }
    }

    /// Like [`poly_lines`](Self::poly_lines), but returns `false` without
    /// drawing when the lines are not reducible to rectangles and the caller
    /// can run its own software fallback.
    pub fn poly_lines_nf(
        &mut self,
        drawable: &mut Drawable<'_>,
        gc: &Gc,
        mode: CoordMode,
        points: &[PointI],
    ) -> bool {
        if self.poly_lines_rects(drawable, gc, mode, points).is_some() {
            return true;
        }
        if ddx_can_fallback_pixmap(drawable.backing().kind()) && ddx_can_fallback_gc(gc) {
            return false;
        }
        self.poly_lines(drawable, gc, mode, points);
        true
    }
}
