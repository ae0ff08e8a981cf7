//! Wide line stroking.
//!
//! A wide polyline is decomposed into convex pieces (segment bodies,
//! caps, joins) and rasterized through a coverage test: a pixel is
//! painted once if any piece covers its sample point, so overlapping
//! pieces never apply the logical operation twice. Point coordinates
//! address pixel centers.

use crate::basics::{PointD, PointI, RectI};
use crate::fb::{DashState, Target};
use crate::gc::{CapStyle, Gc, JoinStyle, LineStyle, Paint};
use crate::math::{calc_distance, calc_intersection, calc_orthogonal, point_in_convex_polygon};

/// Joins sharper than this are beveled instead of mitered.
const MITER_LIMIT_DEGREES: f64 = 11.0;

/// Samples sit just below and right of the pixel center, so an edge that
/// passes exactly through centers claims pixels on one side only.
const SAMPLE_BIAS: f64 = 1.0 / 1024.0;

#[derive(Debug, Clone)]
enum Shape {
    /// Convex polygon.
    Polygon(Vec<PointD>),
    Disc { center: PointD, radius: f64 },
}

impl Shape {
    fn covers(&self, x: f64, y: f64) -> bool {
        match self {
            Shape::Polygon(v) => point_in_convex_polygon(v, x, y),
            Shape::Disc { center, radius } => {
                let dx = x - center.x;
                let dy = y - center.y;
                dx * dx + dy * dy <= radius * radius
            }
        }
    }

    /// Horizontal extent along the row `y`, or `None` when the row misses
    /// the shape.
    fn row_span(&self, y: f64) -> Option<(f64, f64)> {
        match self {
            Shape::Polygon(v) => {
                let mut span: Option<(f64, f64)> = None;
                for (i, a) in v.iter().enumerate() {
                    let b = v[(i + 1) % v.len()];
                    if y < a.y.min(b.y) || y > a.y.max(b.y) {
                        continue;
                    }
                    let (lo, hi) = if a.y == b.y {
                        (a.x.min(b.x), a.x.max(b.x))
                    } else {
                        let x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                        (x, x)
                    };
                    span = Some(match span {
                        Some((l, h)) => (l.min(lo), h.max(hi)),
                        None => (lo, hi),
                    });
                }
                span
            }
            Shape::Disc { center, radius } => {
                let dy = y - center.y;
                let d = radius * radius - dy * dy;
                (d >= 0.0).then(|| (center.x - d.sqrt(), center.x + d.sqrt()))
            }
        }
    }

    /// (x1, y1, x2, y2)
    fn bounds(&self) -> (f64, f64, f64, f64) {
        match self {
            Shape::Polygon(v) => v.iter().fold(
                (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
                |(x1, y1, x2, y2), p| (x1.min(p.x), y1.min(p.y), x2.max(p.x), y2.max(p.y)),
            ),
            Shape::Disc { center, radius } => (
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
        }
    }
}

#[inline]
fn offset(p: PointD, dx: f64, dy: f64) -> PointD {
    PointD::new(p.x + dx, p.y + dy)
}

/// Segment body from `a` to `b`, `hw` to each side.
fn body(a: PointD, b: PointD, hw: f64) -> Shape {
    let (nx, ny) = calc_orthogonal(hw, a.x, a.y, b.x, b.y);
    Shape::Polygon(vec![
        offset(a, nx, ny),
        offset(b, nx, ny),
        offset(b, -nx, -ny),
        offset(a, -nx, -ny),
    ])
}

/// Cap at `p`, where the line leaves `p` in direction `toward`.
fn cap(style: CapStyle, p: PointD, toward: PointD, hw: f64) -> Option<Shape> {
    match style {
        CapStyle::NotLast | CapStyle::Butt => None,
        CapStyle::Round => Some(Shape::Disc {
            center: p,
            radius: hw,
        }),
        CapStyle::Projecting => {
            let len = calc_distance(p.x, p.y, toward.x, toward.y);
            let (ux, uy) = ((toward.x - p.x) / len, (toward.y - p.y) / len);
            let back = offset(p, -ux * hw, -uy * hw);
            Some(body(back, p, hw))
        }
    }
}

/// Join at `p` between the segments `prev -> p` and `p -> next`.
fn join(style: JoinStyle, prev: PointD, p: PointD, next: PointD, hw: f64) -> Option<Shape> {
    if style == JoinStyle::Round {
        return Some(Shape::Disc {
            center: p,
            radius: hw,
        });
    }
    let (n1x, n1y) = calc_orthogonal(hw, prev.x, prev.y, p.x, p.y);
    let (n2x, n2y) = calc_orthogonal(hw, p.x, p.y, next.x, next.y);
    let l1 = calc_distance(prev.x, prev.y, p.x, p.y);
    let l2 = calc_distance(p.x, p.y, next.x, next.y);
    let d1 = ((p.x - prev.x) / l1, (p.y - prev.y) / l1);
    let d2 = ((next.x - p.x) / l2, (next.y - p.y) / l2);

    // The outer side is the one the outgoing segment turns away from.
    let lean = n1x * d2.0 + n1y * d2.1;
    if lean.abs() < 1e-12 {
        return None;
    }
    let s = if lean > 0.0 { -1.0 } else { 1.0 };
    let o1 = offset(p, s * n1x, s * n1y);
    let o2 = offset(p, s * n2x, s * n2y);

    let cos_theta = -(d1.0 * d2.0 + d1.1 * d2.1);
    let theta = cos_theta.clamp(-1.0, 1.0).acos().to_degrees();
    if style == JoinStyle::Miter && theta >= MITER_LIMIT_DEGREES {
        let a = offset(prev, s * n1x, s * n1y);
        let b = offset(next, s * n2x, s * n2y);
        if let Some((mx, my)) = calc_intersection(a.x, a.y, o1.x, o1.y, o2.x, o2.y, b.x, b.y) {
            return Some(Shape::Polygon(vec![p, o1, PointD::new(mx, my), o2]));
        }
    }
    Some(Shape::Polygon(vec![p, o1, o2]))
}

/// Dash walker over real-valued lengths.
struct DashWalk<'a> {
    dashes: &'a [u8],
    index: usize,
    left: f64,
}

impl<'a> DashWalk<'a> {
    fn new(dashes: &'a [u8], dash_offset: u32) -> Self {
        let state = DashState::new(dashes, dash_offset);
        Self {
            dashes,
            index: state.index(),
            left: state.remaining() as f64,
        }
    }

    fn is_on(&self) -> bool {
        self.index % 2 == 0
    }

    /// Consume up to `len`, returning how much stayed in the current dash.
    fn take(&mut self, len: f64) -> f64 {
        if len < self.left {
            self.left -= len;
            len
        } else {
            let used = self.left;
            self.index = (self.index + 1) % self.dashes.len();
            self.left = self.dashes[self.index] as f64;
            used
        }
    }

    /// Move `len` along the pattern without producing pieces.
    fn skip(&mut self, len: f64) {
        let total: f64 = self.dashes.iter().map(|&d| d as f64).sum();
        let mut len = len % total.max(1.0);
        while len > 1e-9 {
            len -= self.take(len);
        }
    }
}

/// Distances along the segment from `a` in unit direction `dir` over
/// `len` that pass within `margin` of `r`.
fn visible_range(
    a: PointD,
    dir: (f64, f64),
    len: f64,
    r: &RectI,
    margin: f64,
) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = (0.0f64, len);
    for (start, d, min, max) in [
        (a.x, dir.0, r.x1 as f64 - margin, r.x2 as f64 + margin),
        (a.y, dir.1, r.y1 as f64 - margin, r.y2 as f64 + margin),
    ] {
        if d.abs() < 1e-12 {
            if start < min || start > max {
                return None;
            }
        } else {
            let (t1, t2) = ((min - start) / d, (max - start) / d);
            lo = lo.max(t1.min(t2));
            hi = hi.min(t1.max(t2));
        }
    }
    (lo <= hi).then_some((lo, hi))
}

/// Pieces painted with the foreground and with the background.
#[derive(Default)]
struct Pieces {
    fg: Vec<Shape>,
    bg: Vec<Shape>,
}

impl Pieces {
    fn push(&mut self, paint: Option<Paint>, shape: Option<Shape>) {
        match (paint, shape) {
            (Some(Paint::Foreground), Some(s)) => self.fg.push(s),
            (Some(Paint::Background), Some(s)) => self.bg.push(s),
            _ => {}
        }
    }
}

/// Stroke a polyline through screen-space points with `gc.line_width`.
pub fn stroke(t: &mut Target<'_>, gc: &Gc, pts: &[PointI]) {
    let Some(extents) = gc.composite_clip().extents() else {
        return;
    };
    let pieces = cut_pieces(gc, &extents, pts);
    rasterize(t, gc, &pieces);
}

/// Convex pieces of the stroke; dashes are cut only near `extents`.
fn cut_pieces(gc: &Gc, extents: &RectI, pts: &[PointI]) -> Pieces {
    let hw = gc.line_width as f64 / 2.0;
    let mut path: Vec<PointD> = Vec::with_capacity(pts.len());
    for p in pts {
        let p = PointD::new(p.x as f64, p.y as f64);
        if path.last() != Some(&p) {
            path.push(p);
        }
    }
    let mut pieces = Pieces::default();
    let Some(&first) = path.first() else {
        return pieces;
    };

    if path.len() == 1 {
        // A lone point only shows through its caps.
        match gc.cap_style {
            CapStyle::Round => pieces.fg.push(Shape::Disc {
                center: first,
                radius: hw,
            }),
            CapStyle::Projecting => pieces.fg.push(Shape::Polygon(vec![
                offset(first, -hw, -hw),
                offset(first, hw, -hw),
                offset(first, hw, hw),
                offset(first, -hw, hw),
            ])),
            CapStyle::NotLast | CapStyle::Butt => {}
        }
        return pieces;
    }

    let n = path.len();
    let closed = n > 2 && path[0] == path[n - 1];
    let dashed = gc.line_style != LineStyle::Solid && !gc.dashes().is_empty();
    let paint_of = |on: bool| {
        if on {
            Some(Paint::Foreground)
        } else if gc.line_style == LineStyle::DoubleDash {
            Some(Paint::Background)
        } else {
            None
        }
    };

    let solid: &[u8] = &[1];
    let mut walk = DashWalk::new(if dashed { gc.dashes() } else { solid }, gc.dash_offset);
    let mut vertex_paint = Vec::with_capacity(n);
    for seg in path.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        let len = calc_distance(a.x, a.y, b.x, b.y);
        if !dashed {
            vertex_paint.push(Some(Paint::Foreground));
            pieces.fg.push(body(a, b, hw));
            continue;
        }
        vertex_paint.push(paint_of(walk.is_on()));
        let (ux, uy) = ((b.x - a.x) / len, (b.y - a.y) / len);
        // Dashes are only cut where the body can reach the clip.
        let Some((near, far)) = visible_range(a, (ux, uy), len, extents, hw + 1.0) else {
            walk.skip(len);
            continue;
        };
        walk.skip(near);
        let mut pos = near;
        while len - pos > 1e-9 && pos <= far {
            let on = walk.is_on();
            let step = walk.take(len - pos);
            let from = offset(a, ux * pos, uy * pos);
            let to = offset(a, ux * (pos + step), uy * (pos + step));
            pieces.push(paint_of(on), Some(body(from, to, hw)));
            pos += step;
        }
        walk.skip(len - pos);
    }
    vertex_paint.push(if dashed {
        paint_of(walk.is_on())
    } else {
        Some(Paint::Foreground)
    });

    for i in 1..n - 1 {
        let shape = join(gc.join_style, path[i - 1], path[i], path[i + 1], hw);
        pieces.push(vertex_paint[i], shape);
    }
    if closed {
        let shape = join(gc.join_style, path[n - 2], path[0], path[1], hw);
        pieces.push(vertex_paint[0], shape);
    } else {
        pieces.push(vertex_paint[0], cap(gc.cap_style, path[0], path[1], hw));
        pieces.push(
            vertex_paint[n - 1],
            cap(gc.cap_style, path[n - 1], path[n - 2], hw),
        );
    }
    pieces
}

/// A piece with its pixel bounds cut to the clip extents.
struct Placed<'a> {
    shape: &'a Shape,
    paint: Paint,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
}

/// Paint every pixel whose sample point a piece covers, foreground first.
///
/// Rows are swept top to bottom with the pieces that reach them; within a
/// row each piece only tests the pixels around its own span.
fn rasterize(t: &mut Target<'_>, gc: &Gc, pieces: &Pieces) {
    let Some(clip) = gc.composite_clip().extents() else {
        return;
    };
    let fg = pieces.fg.iter().map(|s| (s, Paint::Foreground));
    let bg = pieces.bg.iter().map(|s| (s, Paint::Background));
    let mut placed: Vec<Placed<'_>> = fg
        .chain(bg)
        .filter_map(|(shape, paint)| {
            let (x1, y1, x2, y2) = shape.bounds();
            let p = Placed {
                shape,
                paint,
                x1: (x1.floor() as i32).max(clip.x1),
                y1: (y1.floor() as i32).max(clip.y1),
                x2: (x2.ceil() as i32).min(clip.x2),
                y2: (y2.ceil() as i32).min(clip.y2),
            };
            (p.x1 <= p.x2 && p.y1 <= p.y2).then_some(p)
        })
        .collect();
    placed.sort_by_key(|p| p.y1);

    let Some(mut y) = placed.first().map(|p| p.y1) else {
        return;
    };
    let mut active: Vec<&Placed<'_>> = Vec::new();
    let mut spans = Vec::new();
    let mut row = Vec::new();
    let mut next = 0;
    loop {
        if active.is_empty() {
            match placed.get(next) {
                Some(p) => y = y.max(p.y1),
                None => break,
            }
        }
        while let Some(p) = placed.get(next).filter(|p| p.y1 <= y) {
            active.push(p);
            next += 1;
        }
        paint_row(t, gc, y, &active, &mut spans, &mut row);
        active.retain(|p| p.y2 > y);
        match y.checked_add(1) {
            Some(n) => y = n,
            None => break,
        }
    }
}

fn paint_row(
    t: &mut Target<'_>,
    gc: &Gc,
    y: i32,
    active: &[&Placed<'_>],
    spans: &mut Vec<(usize, i32, i32)>,
    row: &mut Vec<Option<Paint>>,
) {
    let sy = y as f64 + SAMPLE_BIAS;
    spans.clear();
    for (i, p) in active.iter().enumerate() {
        let Some((lo, hi)) = p.shape.row_span(sy) else {
            continue;
        };
        // One pixel of slack on each side absorbs rounding in the span.
        let x1 = ((lo - SAMPLE_BIAS).floor() as i32).saturating_sub(1).max(p.x1);
        let x2 = ((hi - SAMPLE_BIAS).ceil() as i32).saturating_add(1).min(p.x2);
        if x1 <= x2 {
            spans.push((i, x1, x2));
        }
    }
    let (Some(left), Some(right)) = (
        spans.iter().map(|s| s.1).min(),
        spans.iter().map(|s| s.2).max(),
    ) else {
        return;
    };

    row.clear();
    row.resize((i64::from(right) - i64::from(left)) as usize + 1, None);
    for &(i, x1, x2) in spans.iter() {
        let p = active[i];
        for x in x1..=x2 {
            let cell = &mut row[(i64::from(x) - i64::from(left)) as usize];
            let settled = match *cell {
                Some(Paint::Foreground) => true,
                Some(Paint::Background) => p.paint == Paint::Background,
                None => false,
            };
            if !settled && p.shape.covers(x as f64 + SAMPLE_BIAS, sy) {
                *cell = Some(p.paint);
            }
        }
    }
    for (i, cell) in row.iter().enumerate() {
        if let Some(paint) = *cell {
            t.paint(gc, left + i as i32, y, paint);
        }
    }
}
