//! Graphics context: the drawing state consulted by every operation.

use std::sync::Arc;

use crate::alu::Alu;
use crate::basics::PointI;
use crate::color::depth_mask;
use crate::glyph::Bitmap;
use crate::pixmap::{Drawable, PixelBuf, PixmapKind};
use crate::region::Region;

/// How lines are dashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    /// Even dashes drawn, odd dashes skipped.
    OnOffDash,
    /// Even dashes in the foreground, odd dashes in the background.
    DoubleDash,
}

/// Shape of the ends of a polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStyle {
    /// Like `Butt`, but thin lines also skip their final point.
    NotLast,
    #[default]
    Butt,
    Round,
    Projecting,
}

/// Shape of interior corners of wide polylines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// A repeating pixel pattern used by `Fill::Tiled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub pixels: PixelBuf,
    pub kind: PixmapKind,
}

impl Tile {
    pub fn new(pixels: PixelBuf) -> Self {
        Self {
            pixels,
            kind: PixmapKind::Memory,
        }
    }
}

/// Source of the pixels painted by fills, lines and glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    Solid,
    Tiled(Arc<Tile>),
    /// Foreground where the stipple is set, untouched elsewhere.
    Stippled(Arc<Bitmap>),
    /// Foreground where the stipple is set, background elsewhere.
    OpaqueStippled(Arc<Bitmap>),
}

impl Fill {
    pub fn is_solid(&self) -> bool {
        matches!(self, Fill::Solid)
    }

    /// Storage kind of the tile or stipple, if any.
    pub fn source_kind(&self) -> Option<PixmapKind> {
        match self {
            Fill::Solid => None,
            Fill::Tiled(t) => Some(t.kind),
            Fill::Stippled(b) | Fill::OpaqueStippled(b) => Some(b.kind()),
        }
    }
}

/// Which GC color a painted pixel takes under a solid fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Foreground,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gc {
    pub depth: u8,
    pub function: Alu,
    pub plane_mask: u32,
    pub fg_pixel: u32,
    pub bg_pixel: u32,
    /// 0 selects the thin-line algorithm.
    pub line_width: u32,
    pub line_style: LineStyle,
    pub cap_style: CapStyle,
    pub join_style: JoinStyle,
    pub fill: Fill,
    /// Tile/stipple origin, relative to the drawable.
    pub ts_origin: PointI,
    dashes: Vec<u8>,
    pub dash_offset: u32,
    client_clip: Option<Region>,
    composite_clip: Region,
    composite_ts: PointI,
}

impl Gc {
    pub fn new(depth: u8) -> Self {
        Self {
            depth,
            function: Alu::Copy,
            plane_mask: u32::MAX,
            fg_pixel: 0,
            bg_pixel: 1,
            line_width: 0,
            line_style: LineStyle::Solid,
            cap_style: CapStyle::Butt,
            join_style: JoinStyle::Miter,
            fill: Fill::Solid,
            ts_origin: PointI::new(0, 0),
            dashes: vec![4, 4],
            dash_offset: 0,
            client_clip: None,
            composite_clip: Region::new(),
            composite_ts: PointI::new(0, 0),
        }
    }

    pub fn with_function(mut self, function: Alu) -> Self {
        self.function = function;
        self
    }

    pub fn with_foreground(mut self, pixel: u32) -> Self {
        self.fg_pixel = pixel;
        self
    }

    pub fn with_background(mut self, pixel: u32) -> Self {
        self.bg_pixel = pixel;
        self
    }

    pub fn with_plane_mask(mut self, plane_mask: u32) -> Self {
        self.plane_mask = plane_mask;
        self
    }

    pub fn with_line_width(mut self, width: u32) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = style;
        self
    }

    pub fn with_cap_style(mut self, style: CapStyle) -> Self {
        self.cap_style = style;
        self
    }

    pub fn with_join_style(mut self, style: JoinStyle) -> Self {
        self.join_style = style;
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Set the dash list. Zero entries are dropped; an empty list keeps the
    /// previous dashes.
    pub fn set_dashes(&mut self, offset: u32, dashes: &[u8]) {
        let dashes: Vec<u8> = dashes.iter().copied().filter(|&d| d > 0).collect();
        if !dashes.is_empty() {
            self.dashes = dashes;
        }
        self.dash_offset = offset;
    }

    pub fn dashes(&self) -> &[u8] {
        &self.dashes
    }

    /// Restrict drawing to `clip`, given relative to the drawable origin.
    /// Takes effect at the next `validate`.
    pub fn set_client_clip(&mut self, clip: Option<Region>) {
        self.client_clip = clip;
    }

    /// Recompute the screen-space composite clip and tile origin for
    /// drawing into `drawable`.
    pub fn validate(&mut self, drawable: &Drawable<'_>) {
        let bounds = Region::from_rect(drawable.bounds());
        self.composite_clip = match &self.client_clip {
            Some(clip) => bounds.intersect(&clip.translated(drawable.x(), drawable.y())),
            None => bounds,
        };
        self.composite_ts = PointI::new(
            self.ts_origin.x.saturating_add(drawable.x()),
            self.ts_origin.y.saturating_add(drawable.y()),
        );
    }

    /// Clip in screen coordinates, valid after `validate`.
    pub fn composite_clip(&self) -> &Region {
        &self.composite_clip
    }

    /// Copy of this GC with all screen-space state shifted by (dx, dy), for
    /// drawing the same request into a surface at another position.
    pub fn translated(&self, dx: i32, dy: i32) -> Gc {
        let mut gc = self.clone();
        gc.composite_clip.translate(dx, dy);
        gc.composite_ts = PointI::new(
            self.composite_ts.x.saturating_add(dx),
            self.composite_ts.y.saturating_add(dy),
        );
        gc
    }

    /// Copy of this GC that paints `pixel` with a plain copy, as image
    /// text requires.
    pub fn solid_copy(&self, pixel: u32) -> Gc {
        let mut gc = self.clone();
        gc.function = Alu::Copy;
        gc.fill = Fill::Solid;
        gc.fg_pixel = pixel;
        gc
    }

    /// Source pixel for the screen pixel (x, y), or `None` when the fill
    /// leaves it untouched.
    pub fn fill_pixel(&self, x: i32, y: i32, paint: Paint) -> Option<u32> {
        let mask = depth_mask(self.depth);
        let color = match paint {
            Paint::Foreground => self.fg_pixel,
            Paint::Background => self.bg_pixel,
        };
        let tx = i64::from(x) - i64::from(self.composite_ts.x);
        let ty = i64::from(y) - i64::from(self.composite_ts.y);
        let v = match &self.fill {
            Fill::Solid => color,
            Fill::Tiled(tile) => {
                let px = wrap(tx, tile.pixels.width()) as i32;
                let py = wrap(ty, tile.pixels.height()) as i32;
                tile.pixels.get(px, py)?
            }
            Fill::Stippled(stipple) => {
                if stipple_bit(stipple, tx, ty) {
                    color
                } else {
                    return None;
                }
            }
            Fill::OpaqueStippled(stipple) => {
                if stipple_bit(stipple, tx, ty) {
                    self.fg_pixel
                } else {
                    self.bg_pixel
                }
            }
        };
        Some(v & mask)
    }
}

/// Offset into a pattern repeating every `n` pixels.
fn wrap(v: i64, n: u32) -> u32 {
    v.rem_euclid(i64::from(n.max(1))) as u32
}

fn stipple_bit(stipple: &Bitmap, x: i64, y: i64) -> bool {
    stipple
        .rows()
        .bit(wrap(x, stipple.width()), wrap(y, stipple.height()))
}
