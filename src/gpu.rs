//! GPU context interface.
//!
//! The accelerated paths talk to the GPU only through [`GpuContext`]: a
//! narrow, GL-shaped set of services (logic-op state, a solid-color
//! program, one vertex attribute fed from an array buffer, draw calls and
//! texture storage). Access goes through a [`Dispatch`] guard so the
//! context is released on every exit path.

use core::ops::{Deref, DerefMut};

use crate::alu::Alu;
use crate::color::{PictFormat, Rgba};
use crate::pixmap::PixelBuf;

/// Handle of a texture (with its framebuffer) owned by the GPU context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Attribute slot carrying vertex positions.
pub const VERTEX_POS: u32 = 0;

/// Primitive assembled by a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// One pixel per vertex.
    Points,
    /// Axis-aligned quads, four vertices each.
    Quads,
}

/// GPU services used by the accelerated drawing paths.
pub trait GpuContext {
    /// Make the context current for the calling operation.
    fn acquire(&mut self);
    /// Give the context back; paired with `acquire`.
    fn release(&mut self);

    /// True when framebuffer rows run top-down, matching screen order.
    fn y_inverted(&self) -> bool;

    /// Select the logical operation applied when writing fragments.
    /// Returns `false` when the hardware cannot perform `alu`; the state is
    /// left at plain copy in that case.
    fn set_logic_op(&mut self, alu: Alu) -> bool;

    /// Direct subsequent draws into the framebuffer of `target`.
    fn bind_framebuffer(&mut self, target: TextureId);

    /// Bind the solid-color program and set its color uniform.
    fn use_solid_program(&mut self, color: Rgba);
    /// Unbind any program.
    fn use_no_program(&mut self);

    fn enable_vertex_attrib(&mut self, index: u32);
    fn disable_vertex_attrib(&mut self, index: u32);

    /// Copy `vertices` into vertex-buffer space, bind that buffer as the
    /// array buffer and return the float offset of the data within it.
    fn upload_vertices(&mut self, vertices: &[f32]) -> usize;
    /// Source attribute `index` from the bound array buffer, `components`
    /// floats per vertex starting at float `offset`.
    fn vertex_attrib_pointer(&mut self, index: u32, components: u32, offset: usize);
    fn unbind_array_buffer(&mut self);

    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize);

    /// Allocate a zeroed texture, `None` when the GPU cannot hold it.
    fn create_texture(&mut self, width: u32, height: u32, format: PictFormat) -> Option<TextureId>;
    fn destroy_texture(&mut self, texture: TextureId);

    /// Read a texture back into memory. `None` when mapping fails.
    fn download(&mut self, texture: TextureId) -> Option<PixelBuf>;
    /// Replace a texture's content. Returns `false` when mapping fails.
    fn upload(&mut self, texture: TextureId, pixels: &PixelBuf) -> bool;

    /// Blit a block between textures, clipped to both. Returns `false`
    /// when the copy could not be performed on the GPU.
    #[allow(clippy::too_many_arguments)]
    fn copy_texture(
        &mut self,
        src: TextureId,
        dst: TextureId,
        sx: i32,
        sy: i32,
        width: u32,
        height: u32,
        dx: i32,
        dy: i32,
    ) -> bool;
}

// ============================================================================
// Dispatch guard
// ============================================================================

/// Scoped access to a GPU context: acquired on creation, released on drop.
pub struct Dispatch<'a, G: GpuContext + ?Sized> {
    gpu: &'a mut G,
}

impl<'a, G: GpuContext + ?Sized> Dispatch<'a, G> {
    pub fn new(gpu: &'a mut G) -> Self {
        gpu.acquire();
        Self { gpu }
    }
}

impl<G: GpuContext + ?Sized> Deref for Dispatch<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        self.gpu
    }
}

impl<G: GpuContext + ?Sized> DerefMut for Dispatch<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        self.gpu
    }
}

impl<G: GpuContext + ?Sized> Drop for Dispatch<'_, G> {
    fn drop(&mut self) {
        self.gpu.release();
    }
}

// ============================================================================
// Coordinate mapping
// ============================================================================

/// Per-destination factors mapping pixel coordinates to device space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestScale {
    pub xscale: f32,
    pub yscale: f32,
}

impl DestScale {
    pub fn for_size(width: u32, height: u32) -> Self {
        Self {
            xscale: 1.0 / width as f32,
            yscale: 1.0 / height as f32,
        }
    }

    #[inline]
    pub fn x(&self, x: f32) -> f32 {
        x * 2.0 * self.xscale - 1.0
    }

    /// Map y, flipping unless the framebuffer is y-inverted.
    #[inline]
    pub fn y(&self, y: f32, y_inverted: bool) -> f32 {
        if y_inverted {
            y * 2.0 * self.yscale - 1.0
        } else {
            -y * 2.0 * self.yscale + 1.0
        }
    }
}

/// Device-space center of pixel (x, y) in a framebuffer.
#[inline]
pub fn pixel_center(scale: &DestScale, x: i32, y: i32, y_inverted: bool) -> [f32; 2] {
    [
        scale.x(x as f32 + 0.5),
        scale.y(y as f32 + 0.5, y_inverted),
    ]
}

/// Select `alu` on the context. `Clear` is still drawable without logic-op
/// support by painting pixel value 0, so the returned foreground replaces
/// `fg_pixel`; `None` means the operation cannot run on this GPU.
pub fn set_alu<G: GpuContext + ?Sized>(gpu: &mut G, alu: Alu, fg_pixel: u32) -> Option<u32> {
    if gpu.set_logic_op(alu) {
        Some(fg_pixel)
    } else if alu == Alu::Clear {
        Some(0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_scale_corners() {
        let s = DestScale::for_size(4, 2);
        assert_eq!(s.x(0.0), -1.0);
        assert_eq!(s.x(4.0), 1.0);
        assert_eq!(s.y(0.0, true), -1.0);
        assert_eq!(s.y(0.0, false), 1.0);
        assert_eq!(s.y(2.0, false), -1.0);
    }

    #[test]
    fn test_pixel_center() {
        let s = DestScale::for_size(4, 4);
        assert_eq!(pixel_center(&s, 0, 0, true), [-0.75, -0.75]);
        assert_eq!(pixel_center(&s, 3, 0, false), [0.75, 0.75]);
    }
}
