//! Clip regions.
//!
//! A region is a set of disjoint inclusive boxes plus their bounding box.
//! Drawing code only ever queries it: point containment for the stipple
//! paths, rectangle intersection for the fill path. Boxes are kept
//! disjoint so that clipping a rectangle never yields overlapping pieces,
//! which would paint pixels twice under non-idempotent logical operations.

use crate::basics::{intersect_rectangles, unite_rectangles, RectI};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    boxes: Vec<RectI>,
    extents: Option<RectI>,
}

impl Region {
    /// An empty region.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(r: RectI) -> Self {
        let mut region = Self::new();
        region.union_rect(r);
        region
    }

    /// Union of possibly overlapping boxes.
    pub fn from_rects(rects: &[RectI]) -> Self {
        let mut region = Self::new();
        for r in rects {
            region.union_rect(*r);
        }
        region
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn boxes(&self) -> &[RectI] {
        &self.boxes
    }

    pub fn num_boxes(&self) -> usize {
        self.boxes.len()
    }

    /// Bounding box of the region, `None` when empty.
    pub fn extents(&self) -> Option<RectI> {
        self.extents
    }

    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        match self.extents {
            Some(e) if e.hit_test(x, y) => self.boxes.iter().any(|b| b.hit_test(x, y)),
            _ => false,
        }
    }

    /// Add `r` to the region. Invalid boxes are ignored.
    pub fn union_rect(&mut self, r: RectI) {
        let mut r = r;
        r.normalize();
        let mut pieces = vec![r];
        for existing in &self.boxes {
            if !existing.overlaps(&r) {
                continue;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| subtract_box(&p, existing))
                .collect();
            if pieces.is_empty() {
                return;
            }
        }
        for p in pieces {
            self.extents = Some(match self.extents {
                Some(e) => unite_rectangles(&e, &p),
                None => p,
            });
            self.boxes.push(p);
        }
    }

    /// Parts of `r` covered by the region, as disjoint boxes.
    pub fn intersect_rect(&self, r: &RectI) -> Vec<RectI> {
        match self.extents {
            Some(e) if e.overlaps(r) => self
                .boxes
                .iter()
                .map(|b| intersect_rectangles(b, r))
                .filter(|b| b.is_valid())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn intersect(&self, other: &Region) -> Region {
        let mut out = Region::new();
        for b in &other.boxes {
            for piece in self.intersect_rect(b) {
                out.boxes.push(piece);
                out.extents = Some(match out.extents {
                    Some(e) => unite_rectangles(&e, &piece),
                    None => piece,
                });
            }
        }
        out
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for b in &mut self.boxes {
            *b = b.translate(dx, dy);
        }
        self.extents = self.extents.map(|e| e.translate(dx, dy));
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Region {
        let mut r = self.clone();
        r.translate(dx, dy);
        r
    }
}

/// The parts of `a` not covered by `b`, as at most four disjoint boxes.
fn subtract_box(a: &RectI, b: &RectI) -> Vec<RectI> {
    if !a.overlaps(b) {
        return vec![*a];
    }
    let mut out = Vec::with_capacity(4);
    // Band above and below the overlap span the full width of `a`.
    if a.y1 < b.y1 {
        out.push(RectI::new(a.x1, a.y1, a.x2, b.y1 - 1));
    }
    if a.y2 > b.y2 {
        out.push(RectI::new(a.x1, b.y2 + 1, a.x2, a.y2));
    }
    let y1 = a.y1.max(b.y1);
    let y2 = a.y2.min(b.y2);
    if a.x1 < b.x1 {
        out.push(RectI::new(a.x1, y1, b.x1 - 1, y2));
    }
    if a.x2 > b.x2 {
        out.push(RectI::new(b.x2 + 1, y1, a.x2, y2));
    }
    out
}
