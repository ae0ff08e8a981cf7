//! Generic software rendering.
//!
//! These routines draw into a mapped [`PixelBuf`] and are the reference
//! every accelerated path must match. Each one takes drawable-relative
//! coordinates plus the drawable origin, except the glyph and bitmap
//! entry points which take a screen-space pen position. Every pixel write
//! goes through the GC's composite clip, fill and logical operation.

use crate::alu::merge_rop;
use crate::basics::{absolute_points, CoordMode, PointI, RectI, Rectangle};
use crate::dda_line::ZeroWidthLine;
use crate::gc::{CapStyle, Gc, LineStyle, Paint};
use crate::glyph::{run_width, Bitmap, BitRows, CharInfo, FontInfo};
use crate::pixmap::PixelBuf;
use crate::wide_line;

// ============================================================================
// Target
// ============================================================================

/// A mapped destination: pixels plus the offset from screen coordinates
/// to buffer coordinates.
pub struct Target<'a> {
    buf: &'a mut PixelBuf,
    dx: i32,
    dy: i32,
    depth: u8,
}

impl<'a> Target<'a> {
    pub fn new(buf: &'a mut PixelBuf, deltas: (i32, i32), depth: u8) -> Self {
        Self {
            buf,
            dx: deltas.0,
            dy: deltas.1,
            depth,
        }
    }

    pub fn buf(&self) -> &PixelBuf {
        self.buf
    }

    /// Paint the screen pixel (x, y) if the clip allows it.
    #[inline]
    pub fn paint(&mut self, gc: &Gc, x: i32, y: i32, paint: Paint) {
        if gc.composite_clip().contains_point(x, y) {
            self.paint_unclipped(gc, x, y, paint);
        }
    }

    #[inline]
    fn paint_unclipped(&mut self, gc: &Gc, x: i32, y: i32, paint: Paint) {
        let Some(src) = gc.fill_pixel(x, y, paint) else {
            return;
        };
        let (bx, by) = (x + self.dx, y + self.dy);
        if let Some(dst) = self.buf.get(bx, by) {
            self.buf.set(
                bx,
                by,
                merge_rop(gc.function, src, dst, gc.plane_mask, self.depth),
            );
        }
    }

    /// Fill an inclusive screen box that is already inside the clip.
    fn fill_box(&mut self, gc: &Gc, r: &RectI, paint: Paint) {
        for y in r.y1..=r.y2 {
            for x in r.x1..=r.x2 {
                self.paint_unclipped(gc, x, y, paint);
            }
        }
    }

    /// Fill an inclusive screen box, clipped.
    pub fn fill_clipped(&mut self, gc: &Gc, r: &RectI, paint: Paint) {
        for b in gc.composite_clip().intersect_rect(r) {
            self.fill_box(gc, &b, paint);
        }
    }
}

// ============================================================================
// Rectangles
// ============================================================================

pub fn fill_rects(t: &mut Target<'_>, gc: &Gc, origin: PointI, rects: &[Rectangle]) {
    for rect in rects {
        if let Some(r) = rect.to_rect() {
            t.fill_clipped(gc, &r.translate(origin.x, origin.y), Paint::Foreground);
        }
    }
}

// ============================================================================
// Polylines
// ============================================================================

/// Position within a dash list, advanced one unit at a time.
#[derive(Debug, Clone)]
pub(crate) struct DashState<'a> {
    dashes: &'a [u8],
    index: usize,
    remaining: u32,
}

impl<'a> DashState<'a> {
    /// `dashes` must not be empty nor contain zero entries.
    pub(crate) fn new(dashes: &'a [u8], offset: u32) -> Self {
        let total: u32 = dashes.iter().map(|&d| d as u32).sum();
        let mut off = offset % total.max(1);
        let mut index = 0;
        while off >= dashes[index] as u32 {
            off -= dashes[index] as u32;
            index = (index + 1) % dashes.len();
        }
        Self {
            dashes,
            index,
            remaining: dashes[index] as u32 - off,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Even dashes are "on".
    #[inline]
    pub(crate) fn is_on(&self) -> bool {
        self.index % 2 == 0
    }

    /// Units left in the current dash.
    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consume `n` units, at most the rest of the current dash.
    pub(crate) fn advance_by(&mut self, n: u32) {
        self.remaining = self.remaining.saturating_sub(n);
        if self.remaining == 0 {
            self.index = (self.index + 1) % self.dashes.len();
            self.remaining = self.dashes[self.index] as u32;
        }
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Consume `n` units across any number of dashes.
    pub(crate) fn skip(&mut self, n: u64) {
        let total: u64 = self.dashes.iter().map(|&d| u64::from(d)).sum();
        let mut n = n % total.max(1);
        while n > 0 {
            let step = n.min(u64::from(self.remaining));
            self.advance_by(step as u32);
            n -= step;
        }
    }
}

/// Draw a connected polyline.
pub fn poly_line(t: &mut Target<'_>, gc: &Gc, origin: PointI, mode: CoordMode, points: &[PointI]) {
    let pts: Vec<PointI> = absolute_points(mode, points)
        .into_iter()
        .map(|p| PointI::new(p.x.saturating_add(origin.x), p.y.saturating_add(origin.y)))
        .collect();
    if gc.line_width == 0 {
        zero_width_line(t, gc, &pts);
    } else {
        wide_line::stroke(t, gc, &pts);
    }
}

/// Thin polyline through screen-space points.
///
/// Each segment stops one pixel short of its end so that shared vertices
/// are drawn once; the very last point is added unless the cap style is
/// `NotLast` or the polyline closes on itself. Only the stretch of each
/// segment inside the clip extents on its major axis is walked; the dash
/// pattern is carried across the rest.
fn zero_width_line(t: &mut Target<'_>, gc: &Gc, pts: &[PointI]) {
    let Some(&last) = pts.last() else {
        return;
    };
    let Some(extents) = gc.composite_clip().extents() else {
        return;
    };
    let dashed = gc.line_style != LineStyle::Solid && !gc.dashes().is_empty();
    let solid: &[u8] = &[1];
    let mut dash = DashState::new(if dashed { gc.dashes() } else { solid }, gc.dash_offset);

    let plot = |t: &mut Target<'_>, p: PointI, dash: &DashState<'_>| {
        let paint = match gc.line_style {
            _ if !dashed => Some(Paint::Foreground),
            _ if dash.is_on() => Some(Paint::Foreground),
            LineStyle::DoubleDash => Some(Paint::Background),
            _ => None,
        };
        if let Some(paint) = paint {
            t.paint(gc, p.x, p.y, paint);
        }
    };

    for seg in pts.windows(2) {
        let mut line = ZeroWidthLine::new(seg[0], seg[1]);
        let (lead, inside) = line.major_span(&extents);
        line.skip_pixels(lead);
        dash.skip(lead);
        for p in line.by_ref().take(inside as usize) {
            plot(t, p, &dash);
            dash.advance();
        }
        dash.skip(line.len() as u64);
    }

    let closed = pts.len() > 2 && pts[0] == last;
    if gc.cap_style != CapStyle::NotLast && !closed {
        plot(t, last, &dash);
    }
}

// ============================================================================
// Glyphs and bitmaps
// ============================================================================

/// Paint the set bits of `rows` (limited to `w` x `h`) with the top-left
/// corner at screen (x, y).
fn blit_bits(t: &mut Target<'_>, gc: &Gc, rows: BitRows<'_>, x: i32, y: i32, w: u32, h: u32) {
    let w = w.min(rows.width());
    let h = h.min(rows.height());
    for row in 0..h {
        for col in 0..w {
            if rows.bit(col, row) {
                t.paint(gc, x + col as i32, y + row as i32, Paint::Foreground);
            }
        }
    }
}

/// Paint a glyph run through the GC's fill, starting with the pen at
/// screen position `pen`.
pub fn poly_glyph_blt(t: &mut Target<'_>, gc: &Gc, pen: PointI, glyphs: &[&CharInfo]) {
    let mut pen_x = pen.x;
    for glyph in glyphs {
        let m = glyph.metrics();
        let rows = glyph.rows();
        blit_bits(
            t,
            gc,
            rows,
            pen_x + m.left_side_bearing as i32,
            pen.y - m.ascent as i32,
            rows.width(),
            rows.height(),
        );
        pen_x += m.character_width as i32;
    }
}

/// Image text: fill the run's font box with the background, then paint
/// the glyphs in the foreground. Both passes copy with a solid fill.
pub fn image_glyph_blt(
    t: &mut Target<'_>,
    gc: &Gc,
    pen: PointI,
    font: &FontInfo,
    glyphs: &[&CharInfo],
) {
    let width = run_width(glyphs);
    let (x, width) = if width < 0 {
        (pen.x + width, -width)
    } else {
        (pen.x, width)
    };
    let height = font.font_ascent as i32 + font.font_descent as i32;
    if width > 0 && height > 0 {
        let bg = gc.solid_copy(gc.bg_pixel);
        let r = RectI::from_size(
            x,
            pen.y - font.font_ascent as i32,
            width as u32,
            height as u32,
        );
        t.fill_clipped(&bg, &r, Paint::Foreground);
    }
    poly_glyph_blt(t, &gc.solid_copy(gc.fg_pixel), pen, glyphs);
}

/// Paint the set bits of the top-left `w` x `h` of `bitmap` at screen
/// position (x, y).
pub fn push_pixels(
    t: &mut Target<'_>,
    gc: &Gc,
    bitmap: &Bitmap,
    w: u32,
    h: u32,
    x: i32,
    y: i32,
) {
    blit_bits(t, gc, bitmap.rows(), x, y, w, h);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alu::Alu;
    use crate::glyph::GlyphPad;
    use crate::pixmap::{Drawable, Pixmap};
    use crate::region::Region;

    const X: bool = true;
    const O: bool = false;

    fn setup(w: u32, h: u32) -> (Pixmap, Gc) {
        let mut p = Pixmap::new_memory(w, h, 8).unwrap();
        let mut gc = Gc::new(8).with_foreground(1).with_background(2);
        gc.validate(&Drawable::pixmap(&mut p));
        (p, gc)
    }

    fn lit(buf: &PixelBuf) -> Vec<(i32, i32)> {
        let mut v = Vec::new();
        for y in 0..buf.height() as i32 {
            for x in 0..buf.width() as i32 {
                if buf.get(x, y) != Some(0) {
                    v.push((x, y));
                }
            }
        }
        v
    }

    #[test]
    fn test_fill_rects_clipped() {
        let (mut p, mut gc) = setup(10, 10);
        gc.set_client_clip(Some(Region::from_rect(RectI::new(0, 0, 4, 4))));
        gc.validate(&Drawable::pixmap(&mut p));
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        fill_rects(
            &mut t,
            &gc,
            PointI::new(0, 0),
            &[Rectangle::new(3, 3, 4, 4), Rectangle::new(0, 0, 0, 5)],
        );
        assert_eq!(lit(t.buf()), vec![(3, 3), (4, 3), (3, 4), (4, 4)]);
    }

    #[test]
    fn test_xor_fill_twice_restores() {
        let (mut p, gc) = setup(4, 4);
        let gc = gc.with_function(Alu::Xor).with_foreground(0xff);
        let buf = p.memory_mut().unwrap();
        buf.set(1, 1, 0x0f);
        let before = buf.clone();
        let mut t = Target::new(buf, (0, 0), 8);
        let r = [Rectangle::new(0, 0, 4, 4)];
        fill_rects(&mut t, &gc, PointI::new(0, 0), &r);
        assert_eq!(t.buf().get(1, 1), Some(0xf0));
        fill_rects(&mut t, &gc, PointI::new(0, 0), &r);
        assert_eq!(t.buf(), &before);
    }

    #[test]
    fn test_thin_line_last_point() {
        let (mut p, gc) = setup(8, 4);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [PointI::new(1, 1), PointI::new(4, 1)];
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(lit(t.buf()), vec![(1, 1), (2, 1), (3, 1), (4, 1)]);

        let gc = gc.with_cap_style(CapStyle::NotLast).with_foreground(0);
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(lit(t.buf()), vec![(4, 1)]);
    }

    #[test]
    fn test_thin_line_closed_draws_vertex_once() {
        let (mut p, gc) = setup(6, 6);
        let gc = gc.with_function(Alu::Xor);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [
            PointI::new(1, 1),
            PointI::new(4, 1),
            PointI::new(4, 4),
            PointI::new(1, 4),
            PointI::new(1, 1),
        ];
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(lit(t.buf()).len(), 12);
        assert_eq!(t.buf().get(1, 1), Some(1));
    }

    #[test]
    fn test_thin_line_relative_and_origin() {
        let (mut p, gc) = setup(8, 8);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [PointI::new(0, 0), PointI::new(0, 2)];
        poly_line(&mut t, &gc, PointI::new(3, 1), CoordMode::Previous, &pts);
        assert_eq!(lit(t.buf()), vec![(3, 1), (3, 2), (3, 3)]);
    }

    #[test]
    fn test_dashes() {
        let (mut p, mut gc) = setup(10, 1);
        gc.line_style = LineStyle::OnOffDash;
        gc.set_dashes(0, &[2, 1]);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [PointI::new(0, 0), PointI::new(9, 0)];
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(
            t.buf().row(0),
            &[1, 1, 0, 1, 1, 0, 1, 1, 0, 1]
        );

        gc.line_style = LineStyle::DoubleDash;
        gc.set_dashes(1, &[2, 1]);
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(t.buf().row(0), &[1, 2, 1, 1, 2, 1, 1, 2, 1, 1]);
    }

    #[test]
    fn test_dash_state_offset() {
        let mut d = DashState::new(&[3, 2], 4);
        assert!(!d.is_on());
        assert_eq!(d.remaining(), 1);
        d.advance();
        assert!(d.is_on());
        assert_eq!(d.remaining(), 3);
    }

    #[test]
    fn test_dash_state_skip() {
        for n in 0..40u64 {
            let mut stepped = DashState::new(&[3, 1, 2], 2);
            for _ in 0..n {
                stepped.advance();
            }
            let mut skipped = DashState::new(&[3, 1, 2], 2);
            skipped.skip(n);
            assert_eq!(skipped.index(), stepped.index(), "{}", n);
            assert_eq!(skipped.remaining(), stepped.remaining(), "{}", n);
        }
    }

    #[test]
    fn test_far_thin_lines_walk_only_the_clip() {
        let (mut p, mut gc) = setup(16, 5);
        gc.line_style = LineStyle::OnOffDash;
        gc.set_dashes(0, &[3, 2]);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [PointI::new(-1_000_000_000, 2), PointI::new(1_000_000_000, 2)];
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        // The dash phase counts from the far-away first point.
        let expected: Vec<u32> = (0..16).map(|x| u32::from(x % 5 < 3)).collect();
        assert_eq!(t.buf().row(2), expected.as_slice());

        let (mut p, gc) = setup(8, 5);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        let pts = [PointI::new(3, -2_000_000_000), PointI::new(4, 2_000_000_000)];
        poly_line(&mut t, &gc, PointI::new(0, 0), CoordMode::Origin, &pts);
        assert_eq!(lit(t.buf()), vec![(3, 0), (3, 1), (3, 2), (3, 3), (3, 4)]);
    }

    #[test]
    fn test_poly_glyph_blt_pen_advance() {
        let (mut p, gc) = setup(12, 6);
        let a = CharInfo::from_rows(&[&[X, O], &[O, X]], 0, 2, 3, GlyphPad::Int).unwrap();
        let space = CharInfo::blank(2);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        poly_glyph_blt(&mut t, &gc, PointI::new(1, 3), &[&a, &space, &a]);
        assert_eq!(lit(t.buf()), vec![(1, 1), (6, 1), (2, 2), (7, 2)]);
    }

    #[test]
    fn test_image_glyph_blt_background() {
        let (mut p, gc) = setup(8, 6);
        let a = CharInfo::from_rows(&[&[X]], 0, 1, 3, GlyphPad::Byte).unwrap();
        let font = FontInfo {
            font_ascent: 2,
            font_descent: 1,
        };
        let gc = gc.with_function(Alu::Xor);
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        image_glyph_blt(&mut t, &gc, PointI::new(1, 3), &font, &[&a]);
        // Box rows 1..=3, columns 1..=3; glyph pixel copied on top.
        assert_eq!(t.buf().get(1, 1), Some(2));
        assert_eq!(t.buf().get(3, 3), Some(2));
        assert_eq!(t.buf().get(1, 2), Some(1));
        assert_eq!(t.buf().get(4, 2), Some(0));
        assert_eq!(lit(t.buf()).len(), 9);
    }

    #[test]
    fn test_push_pixels_limits_area() {
        let (mut p, gc) = setup(8, 8);
        let bm = Bitmap::from_rows(&[&[X, X, X], &[X, X, X]]).unwrap();
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, (0, 0), 8);
        push_pixels(&mut t, &gc, &bm, 2, 5, 4, 4);
        assert_eq!(lit(t.buf()), vec![(4, 4), (5, 4), (4, 5), (5, 5)]);
    }

    #[test]
    fn test_target_deltas() {
        let mut p = Pixmap::new_memory(4, 4, 8).unwrap();
        p.screen_x = 10;
        p.screen_y = 20;
        let mut gc = Gc::new(8).with_foreground(5);
        let d = Drawable::pixmap(&mut p);
        gc.validate(&d);
        let deltas = d.deltas();
        let buf = p.memory_mut().unwrap();
        let mut t = Target::new(buf, deltas, 8);
        t.paint(&gc, 11, 22, Paint::Foreground);
        t.paint(&gc, 1, 2, Paint::Foreground);
        assert_eq!(lit(t.buf()), vec![(1, 2)]);
    }
}
