//! Tunables for the accelerated paths.

/// Points per vertex batch in the stipple renderer.
pub const DEFAULT_POINT_BATCH: usize = 500;

/// Largest pixmap, in pixels, the screen agrees to allocate.
pub const DEFAULT_MAX_PIXMAP_AREA: u64 = 32767 * 32767;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccelConfig {
    /// Points drawn per draw call by the stipple renderer.
    pub point_batch: usize,
    /// Render poly glyph blits as points when eligible.
    pub glyph_points: bool,
    /// Render bitmap pushes as points when eligible.
    pub push_pixels_points: bool,
    /// Reduce thin axis-aligned polylines to rectangle fills.
    pub polyline_rects: bool,
    /// Stage thin-line software fallbacks through a scratch pixmap sized to
    /// the polyline's bounding box.
    pub scratch_staging: bool,
    /// Pixmap allocation limit; scratch pixmaps above it are not created.
    pub max_pixmap_area: u64,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            point_batch: DEFAULT_POINT_BATCH,
            glyph_points: true,
            push_pixels_points: true,
            polyline_rects: true,
            scratch_staging: true,
            max_pixmap_area: DEFAULT_MAX_PIXMAP_AREA,
        }
    }
}

impl AccelConfig {
    /// Configuration with every accelerated path turned off, so that all
    /// requests take the software route.
    pub fn software_only() -> Self {
        Self {
            glyph_points: false,
            push_pixels_points: false,
            polyline_rects: false,
            ..Self::default()
        }
    }

    /// Batch size, at least 1.
    pub fn with_point_batch(mut self, points: usize) -> Self {
        self.point_batch = points.max(1);
        self
    }

    pub fn with_scratch_staging(mut self, enabled: bool) -> Self {
        self.scratch_staging = enabled;
        self
    }

    pub fn with_max_pixmap_area(mut self, area: u64) -> Self {
        self.max_pixmap_area = area;
        self
    }

    pub fn with_polyline_rects(mut self, enabled: bool) -> Self {
        self.polyline_rects = enabled;
        self
    }

    pub fn with_glyph_points(mut self, enabled: bool) -> Self {
        self.glyph_points = enabled;
        self
    }

    pub fn with_push_pixels_points(mut self, enabled: bool) -> Self {
        self.push_pixels_points = enabled;
        self
    }
}
