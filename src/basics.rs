//! Foundation types shared by every drawing path.
//!
//! Inclusive integer boxes, points, X-style rectangles and the coordinate
//! mode of point lists.

/// Floor a double toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

// ============================================================================
// Boxes
// ============================================================================

/// A box given by two inclusive corners, as clip rectangles and region
/// bands are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RectI {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RectI {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Inclusive box from an origin and a size. `w` and `h` must be non-zero.
    /// The far corner stops at `i32::MAX`.
    pub fn from_size(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self::new(x, y, far_corner(x, w), far_corner(y, h))
    }

    /// Order the corners so that x1 <= x2 and y1 <= y2.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// False once the corners have crossed, as after intersecting
    /// disjoint boxes.
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
    }

    pub fn overlaps(&self, r: &RectI) -> bool {
        self.x1 <= r.x2 && r.x1 <= self.x2 && self.y1 <= r.y2 && r.y1 <= self.y2
    }

    pub fn width(&self) -> u32 {
        extent(self.x1, self.x2)
    }

    pub fn height(&self) -> u32 {
        extent(self.y1, self.y2)
    }

    /// Shift by `(dx, dy)`, saturating at the ends of the coordinate range.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.x1.saturating_add(dx),
            self.y1.saturating_add(dy),
            self.x2.saturating_add(dx),
            self.y2.saturating_add(dy),
        )
    }
}

fn far_corner(origin: i32, size: u32) -> i32 {
    let end = i64::from(origin) + i64::from(size) - 1;
    end.min(i64::from(i32::MAX)) as i32
}

/// Pixel count between two inclusive bounds; a full `i32` span does not fit
/// and is clamped.
fn extent(lo: i32, hi: i32) -> u32 {
    let n = i64::from(hi) - i64::from(lo) + 1;
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Common part of two boxes; invalid when they do not overlap.
pub fn intersect_rectangles(a: &RectI, b: &RectI) -> RectI {
    RectI::new(a.x1.max(b.x1), a.y1.max(b.y1), a.x2.min(b.x2), a.y2.min(b.y2))
}

/// Smallest box covering both.
pub fn unite_rectangles(a: &RectI, b: &RectI) -> RectI {
    RectI::new(a.x1.min(b.x1), a.y1.min(b.y1), a.x2.max(b.x2), a.y2.max(b.y2))
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub type PointI = PointBase<i32>;
pub type PointD = PointBase<f64>;

// ============================================================================
// Rectangle (origin + extent)
// ============================================================================

/// A filled-rectangle request: top-left corner plus width and height.
///
/// Covers the pixels `x..x + width` by `y..y + height`. Zero-sized
/// rectangles cover nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The inclusive box covered by this rectangle, or `None` when empty.
    pub fn to_rect(&self) -> Option<RectI> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(RectI::from_size(self.x, self.y, self.width, self.height))
        }
    }
}

// ============================================================================
// Coordinate mode
// ============================================================================

/// How the points of a polyline are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordMode {
    /// Every point is relative to the drawable origin.
    #[default]
    Origin,
    /// Every point after the first is relative to the previous point.
    Previous,
}

/// Resolve a point list to drawable-relative absolute coordinates.
///
/// Relative offsets that run past the `i32` range stick at its ends.
pub fn absolute_points(mode: CoordMode, points: &[PointI]) -> Vec<PointI> {
    match mode {
        CoordMode::Origin => points.to_vec(),
        CoordMode::Previous => {
            let mut out = Vec::with_capacity(points.len());
            let mut prev = PointI::new(0, 0);
            for (i, p) in points.iter().enumerate() {
                let abs = if i == 0 {
                    *p
                } else {
                    PointI::new(prev.x.saturating_add(p.x), prev.y.saturating_add(p.y))
                };
                out.push(abs);
                prev = abs;
            }
            out
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
