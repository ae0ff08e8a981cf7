//! Solid-color GPU pass shared by the point and rectangle paths.
//!
//! [`SolidPass::begin`] performs the eligibility checks common to every
//! accelerated operation and sets up the solid program for the GC's
//! foreground. Dropping the pass restores the context state and releases
//! the dispatch handle, on success and failure alike.

use crate::alu::{plane_mask_is_solid, Alu};
use crate::color::{depth_mask, rgba_from_pixel};
use crate::gc::Gc;
use crate::gpu::{pixel_center, set_alu, DestScale, Dispatch, GpuContext, Primitive, VERTEX_POS};
use crate::pixmap::Drawable;
use crate::screen::Screen;

pub(crate) struct SolidPass<'a, G: GpuContext> {
    gpu: Dispatch<'a, G>,
    scale: DestScale,
    y_inverted: bool,
    dx: i32,
    dy: i32,
}

impl<'a, G: GpuContext> SolidPass<'a, G> {
    /// Set up a solid draw into `drawable`, or `None` when the request
    /// cannot run on the GPU. `op` names the caller in log messages.
    pub(crate) fn begin(
        screen: &'a mut Screen<G>,
        drawable: &Drawable<'_>,
        gc: &Gc,
        op: &str,
    ) -> Option<Self> {
        if !gc.fill.is_solid() {
            fallback!("{}: fill style is not solid", op);
            return None;
        }
        let pixmap = drawable.backing();
        let Some(fbo) = pixmap.fbo() else {
            fallback!("{}: destination {:?} has no framebuffer", op, pixmap.kind());
            return None;
        };
        if !plane_mask_is_solid(gc.plane_mask, drawable.depth()) {
            fallback!("{}: plane mask {:#x} is not solid", op, gc.plane_mask);
            return None;
        }

        let format = pixmap.format();
        let (dx, dy) = drawable.deltas();
        let scale = DestScale::for_size(pixmap.width(), pixmap.height());
        let mut gpu = screen.dispatch();
        let Some(fg) = set_alu(&mut *gpu, gc.function, gc.fg_pixel) else {
            fallback!("{}: unsupported logical operation {:?}", op, gc.function);
            return None;
        };
        let y_inverted = gpu.y_inverted();
        gpu.bind_framebuffer(fbo);
        gpu.use_solid_program(rgba_from_pixel(fg & depth_mask(drawable.depth()), format));
        gpu.enable_vertex_attrib(VERTEX_POS);

        Some(Self {
            gpu,
            scale,
            y_inverted,
            dx,
            dy,
        })
    }

    /// Device-space center of screen pixel (x, y).
    #[inline]
    pub(crate) fn center(&self, x: i32, y: i32) -> [f32; 2] {
        pixel_center(&self.scale, x + self.dx, y + self.dy, self.y_inverted)
    }

    /// Device-space position of the top-left corner of screen pixel (x, y).
    #[inline]
    pub(crate) fn corner(&self, x: i32, y: i32) -> [f32; 2] {
        [
            self.scale.x((x + self.dx) as f32),
            self.scale.y((y + self.dy) as f32, self.y_inverted),
        ]
    }

    /// Upload `vertices` (x, y pairs) and draw them as `primitive`.
    pub(crate) fn draw(&mut self, primitive: Primitive, vertices: &[f32]) {
        if vertices.is_empty() {
            return;
        }
        let offset = self.gpu.upload_vertices(vertices);
        self.gpu.vertex_attrib_pointer(VERTEX_POS, 2, offset);
        self.gpu.draw_arrays(primitive, 0, vertices.len() / 2);
    }
}

impl<G: GpuContext> Drop for SolidPass<'_, G> {
    fn drop(&mut self) {
        self.gpu.disable_vertex_attrib(VERTEX_POS);
        self.gpu.unbind_array_buffer();
        self.gpu.use_no_program();
        self.gpu.set_logic_op(Alu::Copy);
    }
}
