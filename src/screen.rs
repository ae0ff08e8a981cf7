//! The screen: owner of the GPU context and of pixmap storage.
//!
//! Every accelerated operation runs through a [`Screen`]. It decides where
//! new pixmaps live, maps texture pixmaps into memory for software
//! rendering and hands out the scoped dispatch guard.

use crate::color::PictFormat;
use crate::config::AccelConfig;
use crate::error::{Error, Result};
use crate::gc::Gc;
use crate::gpu::{Dispatch, GpuContext};
use crate::pixmap::{Backing, PixelBuf, Pixmap, PixmapKind};

/// Largest width or height of a pixmap.
pub const MAX_PIXMAP_DIMENSION: u32 = 32767;

/// How a mapped pixmap is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

pub struct Screen<G: GpuContext> {
    gpu: G,
    config: AccelConfig,
}

impl<G: GpuContext> Screen<G> {
    pub fn new(gpu: G, config: AccelConfig) -> Self {
        Self { gpu, config }
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn config(&self) -> &AccelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AccelConfig) {
        self.config = config;
    }

    /// Acquire the GPU context until the guard is dropped.
    pub fn dispatch(&mut self) -> Dispatch<'_, G> {
        Dispatch::new(&mut self.gpu)
    }

    fn check_size(&self, width: u32, height: u32, depth: u8) -> Result<PictFormat> {
        if width == 0 || height == 0 || width > MAX_PIXMAP_DIMENSION || height > MAX_PIXMAP_DIMENSION
        {
            return Err(Error::InvalidSize { width, height });
        }
        let limit = self.config.max_pixmap_area;
        if width as u64 * height as u64 > limit {
            return Err(Error::TooLarge {
                width,
                height,
                limit,
            });
        }
        PictFormat::for_depth(depth)
    }

    /// Allocate a pixmap, on the GPU when it has room for it and in system
    /// memory otherwise.
    pub fn create_pixmap(&mut self, width: u32, height: u32, depth: u8) -> Result<Pixmap> {
        let format = self.check_size(width, height, depth)?;
        match self.gpu.create_texture(width, height, format) {
            Some(texture) => Ok(Pixmap::new_texture(
                width,
                height,
                depth,
                format,
                PixmapKind::TextureOnly,
                texture,
            )),
            None => {
                log::debug!("no texture for {}x{} pixmap, using memory", width, height);
                Pixmap::new_memory(width, height, depth)
            }
        }
    }

    pub fn create_memory_pixmap(&self, width: u32, height: u32, depth: u8) -> Result<Pixmap> {
        self.check_size(width, height, depth)?;
        Pixmap::new_memory(width, height, depth)
    }

    /// Release the storage of a pixmap created by this screen.
    pub fn destroy_pixmap(&mut self, pixmap: Pixmap) {
        if let Backing::Texture(texture) = pixmap.backing {
            self.gpu.destroy_texture(texture);
        }
    }

    /// Map `pixmap` into memory and run `f` on its pixels. With
    /// `ReadWrite` the result is written back to the texture afterwards.
    /// Returns `None` when the pixmap cannot be mapped.
    pub fn with_access<R>(
        &mut self,
        pixmap: &mut Pixmap,
        access: Access,
        f: impl FnOnce(&mut PixelBuf) -> R,
    ) -> Option<R> {
        match &mut pixmap.backing {
            Backing::Memory(buf) => Some(f(buf)),
            Backing::Texture(texture) => {
                let texture = *texture;
                let mut buf = self.gpu.download(texture)?;
                let r = f(&mut buf);
                if access == Access::ReadWrite && !self.gpu.upload(texture, &buf) {
                    log::warn!("failed to write back texture {:?}", texture);
                }
                Some(r)
            }
        }
    }

    /// Snapshot of a pixmap's pixels.
    pub fn read_pixels(&mut self, pixmap: &Pixmap) -> Option<PixelBuf> {
        match &pixmap.backing {
            Backing::Memory(buf) => Some(buf.clone()),
            Backing::Texture(texture) => self.gpu.download(*texture),
        }
    }

    /// Replace a pixmap's pixels. `pixels` must match the pixmap size.
    pub fn write_pixels(&mut self, pixmap: &mut Pixmap, pixels: &PixelBuf) -> bool {
        if pixels.width() != pixmap.width() || pixels.height() != pixmap.height() {
            return false;
        }
        match &mut pixmap.backing {
            Backing::Memory(buf) => {
                buf.clone_from(pixels);
                true
            }
            Backing::Texture(texture) => self.gpu.upload(*texture, pixels),
        }
    }

    /// Copy a `width` x `height` block from `src` at (sx, sy) to `dst` at
    /// (dx, dy), pixmap coordinates, clipped to both pixmaps.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_area(
        &mut self,
        src: &Pixmap,
        dst: &mut Pixmap,
        sx: i32,
        sy: i32,
        width: u32,
        height: u32,
        dx: i32,
        dy: i32,
    ) -> bool {
        if let (Backing::Texture(s), Backing::Texture(d)) = (&src.backing, &dst.backing) {
            if self
                .gpu
                .copy_texture(*s, *d, sx, sy, width, height, dx, dy)
            {
                return true;
            }
        }
        let Some(source) = self.read_pixels(src) else {
            log::debug!("copy_area: source could not be mapped");
            return false;
        };
        self.with_access(dst, Access::ReadWrite, |buf| {
            buf.copy_from(&source, sx, sy, width, height, dx, dy)
        })
        .is_some()
    }
}

/// True when the embedding driver can map pixmaps of `kind` itself and so
/// run its own software fallback.
pub fn ddx_can_fallback_pixmap(kind: PixmapKind) -> bool {
    matches!(
        kind,
        PixmapKind::Memory | PixmapKind::TextureDrm | PixmapKind::DrmOnly
    )
}

/// True when the GC's tile or stipple, if any, passes
/// [`ddx_can_fallback_pixmap`].
pub fn ddx_can_fallback_gc(gc: &Gc) -> bool {
    gc.fill.source_kind().map_or(true, ddx_can_fallback_pixmap)
}
