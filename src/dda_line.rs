//! Integer line interpolation for zero-width lines.
//!
//! [`Dda2LineInterpolator`] distributes the minor-axis error of a line
//! evenly over the major-axis steps; [`ZeroWidthLine`] walks the pixels of a
//! segment with it.

use crate::basics::{PointI, RectI};

// ============================================================================
// DDA2 line interpolator (Bresenham-style integer)
// ============================================================================

/// Integer DDA line interpolator using Bresenham-style remainder tracking.
///
/// Reaches `y2` exactly after `count` calls to [`inc`](Self::inc). The
/// result only depends on `y2 - y1`, so translated lines rasterize
/// identically. State is kept in `i64` so that lines between any two `i32`
/// coordinates fit.
#[derive(Debug, Clone)]
pub struct Dda2LineInterpolator {
    cnt: i64,
    lft: i64,
    rem: i64,
    mod_val: i64,
    y: i64,
}

impl Dda2LineInterpolator {
    /// Forward-adjusted line from y1 to y2 over `count` steps.
    pub fn new_forward(y1: i64, y2: i64, count: i64) -> Self {
        let cnt = if count <= 0 { 1 } else { count };
        let mut lft = (y2 - y1) / cnt;
        let mut rem = (y2 - y1) % cnt;
        let mut mod_val = rem;

        if mod_val <= 0 {
            mod_val += cnt;
            rem += cnt;
            lft -= 1;
        }
        mod_val -= cnt;

        Self {
            cnt,
            lft,
            rem,
            mod_val,
            y: y1,
        }
    }

    /// Step forward one unit.
    #[inline]
    pub fn inc(&mut self) {
        self.mod_val += self.rem;
        self.y += self.lft;
        if self.mod_val > 0 {
            self.mod_val -= self.cnt;
            self.y += 1;
        }
    }

    /// Step forward `steps` units at once, landing where as many calls to
    /// [`inc`](Self::inc) would.
    pub fn skip(&mut self, steps: i64) {
        if steps <= 0 {
            return;
        }
        // `mod_val` stays in (-cnt, 0]; each carry pulls it back by `cnt`.
        let cnt = i128::from(self.cnt);
        let raw = i128::from(self.mod_val) + i128::from(steps) * i128::from(self.rem);
        let carries = (raw + cnt - 1).div_euclid(cnt);
        self.mod_val = (raw - carries * cnt) as i64;
        self.y = (i128::from(self.y) + i128::from(steps) * i128::from(self.lft) + carries) as i64;
    }

    #[inline]
    pub fn y(&self) -> i64 {
        self.y
    }
}

// ============================================================================
// Zero-width segment walker
// ============================================================================

/// Pixels of a thin segment from `p1` towards `p2`, excluding `p2`.
///
/// A zero-length segment yields nothing; the caller decides whether the
/// final point of a polyline is drawn.
#[derive(Debug, Clone)]
pub struct ZeroWidthLine {
    major: i64,
    major_step: i64,
    minor: Dda2LineInterpolator,
    x_major: bool,
    remaining: u64,
}

impl ZeroWidthLine {
    pub fn new(p1: PointI, p2: PointI) -> Self {
        let (x1, y1, x2, y2) = (
            i64::from(p1.x),
            i64::from(p1.y),
            i64::from(p2.x),
            i64::from(p2.y),
        );
        let x_major = (x2 - x1).abs() >= (y2 - y1).abs();
        let (major, major_end, minor, minor_end) = if x_major {
            (x1, x2, y1, y2)
        } else {
            (y1, y2, x1, x2)
        };
        let len = (major_end - major).abs();
        Self {
            major,
            major_step: (major_end - major).signum(),
            minor: Dda2LineInterpolator::new_forward(minor, minor_end, len),
            x_major,
            remaining: len as u64,
        }
    }

    /// Number of pixels still to come.
    pub fn len(&self) -> usize {
        self.remaining as usize
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Drop the next `n` pixels without visiting them.
    pub fn skip_pixels(&mut self, n: u64) {
        let n = n.min(self.remaining);
        self.major += self.major_step * n as i64;
        self.minor.skip(n as i64);
        self.remaining -= n;
    }

    /// Split the remaining pixels by the major-axis range of `r`: how many
    /// come before the range, then how many fall inside it.
    pub fn major_span(&self, r: &RectI) -> (u64, u64) {
        let (lo, hi) = if self.x_major {
            (i64::from(r.x1), i64::from(r.x2))
        } else {
            (i64::from(r.y1), i64::from(r.y2))
        };
        // Pixel k sits at `major + k * major_step`.
        let (before, through) = match self.major_step {
            1 => (lo - self.major, hi - self.major + 1),
            -1 => (self.major - hi, self.major - lo + 1),
            _ => (0, 0),
        };
        let clamp = |k: i64| k.clamp(0, self.remaining as i64) as u64;
        let lead = clamp(before);
        (lead, clamp(through).saturating_sub(lead))
    }
}

impl Iterator for ZeroWidthLine {
    type Item = PointI;

    fn next(&mut self) -> Option<PointI> {
        if self.remaining == 0 {
            return None;
        }
        // Both coordinates lie between the segment's `i32` endpoints.
        let (major, minor) = (self.major as i32, self.minor.y() as i32);
        let p = if self.x_major {
            PointI::new(major, minor)
        } else {
            PointI::new(minor, major)
        };
        self.major += self.major_step;
        self.minor.inc();
        self.remaining -= 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

// ============================================================================
// Tests
// ============================================================================
