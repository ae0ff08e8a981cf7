//! Pixel storage, pixmaps and drawables.
//!
//! - [`PixelBuf`]: a CPU-side block of pixels, one `u32` per pixel. This is
//!   what software rendering writes into, either directly (memory pixmaps)
//!   or on a mapped copy of a GPU texture.
//! - [`Pixmap`]: an offscreen surface with a depth, a screen position and a
//!   backing that is either a `PixelBuf` or a texture owned by the GPU
//!   context.
//! - [`Drawable`]: the target of a drawing request. Either a whole pixmap
//!   or a window-like view with its own origin and size on top of one.

use crate::basics::RectI;
use crate::color::{depth_mask, PictFormat};
use crate::error::{Error, Result};
use crate::gpu::TextureId;

// ============================================================================
// PixelBuf
// ============================================================================

/// Row-major pixel storage with a stride equal to the width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuf {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl PixelBuf {
    /// A zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::ShortData {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn inbox(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at (x, y), `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if self.inbox(x, y) {
            Some(self.data[self.offset(x, y)])
        } else {
            None
        }
    }

    /// Store a pixel; writes outside the buffer are dropped.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, v: u32) {
        if self.inbox(x, y) {
            let off = self.offset(x, y);
            self.data[off] = v;
        }
    }

    pub fn row(&self, y: u32) -> &[u32] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn fill(&mut self, v: u32) {
        self.data.iter_mut().for_each(|p| *p = v);
    }

    /// Copy a `w` x `h` block from `src` at (sx, sy) to (dx, dy), clipped
    /// to both buffers.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_from(
        &mut self,
        src: &PixelBuf,
        sx: i32,
        sy: i32,
        w: u32,
        h: u32,
        dx: i32,
        dy: i32,
    ) {
        for row in 0..h as i32 {
            for col in 0..w as i32 {
                if let Some(v) = src.get(sx.saturating_add(col), sy.saturating_add(row)) {
                    self.set(dx.saturating_add(col), dy.saturating_add(row), v);
                }
            }
        }
    }
}

// ============================================================================
// Pixmap
// ============================================================================

/// Where a pixmap's pixels live and who may map them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixmapKind {
    /// Plain system memory; never rendered by the GPU.
    Memory,
    /// GPU texture with a framebuffer, private to this driver.
    TextureOnly,
    /// GPU texture with a framebuffer, shared with the display driver.
    TextureDrm,
    /// Display-driver buffer with no framebuffer of ours.
    DrmOnly,
}

impl PixmapKind {
    /// True when the GPU can render into pixmaps of this kind.
    pub fn has_fbo(self) -> bool {
        matches!(self, PixmapKind::TextureOnly | PixmapKind::TextureDrm)
    }
}

#[derive(Debug)]
pub(crate) enum Backing {
    Memory(PixelBuf),
    Texture(TextureId),
}

/// An offscreen surface.
#[derive(Debug)]
pub struct Pixmap {
    width: u32,
    height: u32,
    depth: u8,
    format: PictFormat,
    pub screen_x: i32,
    pub screen_y: i32,
    kind: PixmapKind,
    pub(crate) backing: Backing,
}

impl Pixmap {
    /// A zero-filled pixmap held in system memory.
    pub fn new_memory(width: u32, height: u32, depth: u8) -> Result<Self> {
        Self::new_memory_of_kind(width, height, depth, PixmapKind::Memory)
    }

    /// A memory-held pixmap that reports `kind` (`Memory` or `DrmOnly`).
    pub fn new_memory_of_kind(width: u32, height: u32, depth: u8, kind: PixmapKind) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize { width, height });
        }
        let format = PictFormat::for_depth(depth)?;
        Ok(Self {
            width,
            height,
            depth,
            format,
            screen_x: 0,
            screen_y: 0,
            kind,
            backing: Backing::Memory(PixelBuf::new(width, height)),
        })
    }

    pub(crate) fn new_texture(
        width: u32,
        height: u32,
        depth: u8,
        format: PictFormat,
        kind: PixmapKind,
        texture: TextureId,
    ) -> Self {
        Self {
            width,
            height,
            depth,
            format,
            screen_x: 0,
            screen_y: 0,
            kind,
            backing: Backing::Texture(texture),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn format(&self) -> PictFormat {
        self.format
    }

    pub fn kind(&self) -> PixmapKind {
        self.kind
    }

    /// The framebuffer texture, when the GPU can render into this pixmap.
    pub fn fbo(&self) -> Option<TextureId> {
        match self.backing {
            Backing::Texture(t) if self.kind.has_fbo() => Some(t),
            _ => None,
        }
    }

    /// Direct access to memory-held pixels.
    pub fn memory(&self) -> Option<&PixelBuf> {
        match &self.backing {
            Backing::Memory(buf) => Some(buf),
            Backing::Texture(_) => None,
        }
    }

    pub fn memory_mut(&mut self) -> Option<&mut PixelBuf> {
        match &mut self.backing {
            Backing::Memory(buf) => Some(buf),
            Backing::Texture(_) => None,
        }
    }

    /// Fill a memory pixmap with a pixel value. Texture pixmaps are filled
    /// through the screen.
    pub fn fill_memory(&mut self, pixel: u32) -> bool {
        let mask = depth_mask(self.depth);
        match self.memory_mut() {
            Some(buf) => {
                buf.fill(pixel & mask);
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Drawable
// ============================================================================

/// A drawing target: a pixmap seen through an origin and a size.
///
/// Coordinates handed to drawing operations are relative to the drawable
/// origin; `x`/`y` place that origin in screen space.
#[derive(Debug)]
pub struct Drawable<'a> {
    pixmap: &'a mut Pixmap,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl<'a> Drawable<'a> {
    /// The whole pixmap, with its origin at the pixmap's screen position.
    pub fn pixmap(pixmap: &'a mut Pixmap) -> Self {
        let (x, y) = (pixmap.screen_x, pixmap.screen_y);
        let (width, height) = (pixmap.width, pixmap.height);
        Self {
            pixmap,
            x,
            y,
            width,
            height,
        }
    }

    /// A window-like view of `width` x `height` at screen position (x, y)
    /// rendered into `pixmap`.
    pub fn window(pixmap: &'a mut Pixmap, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            pixmap,
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u8 {
        self.pixmap.depth
    }

    pub fn backing(&self) -> &Pixmap {
        &*self.pixmap
    }

    pub fn backing_mut(&mut self) -> &mut Pixmap {
        &mut *self.pixmap
    }

    /// Screen-space box covered by the drawable.
    pub fn bounds(&self) -> RectI {
        RectI::from_size(self.x, self.y, self.width, self.height)
    }

    /// Offset from screen coordinates to backing pixmap coordinates.
    pub fn deltas(&self) -> (i32, i32) {
        (-self.pixmap.screen_x, -self.pixmap.screen_y)
    }
}
