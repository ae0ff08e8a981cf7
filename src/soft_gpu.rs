//! Software implementation of [`GpuContext`].
//!
//! Textures are plain pixel buffers stored in screen row order; draw calls
//! map device coordinates back to pixels and write the solid program's
//! color through the current logic op. Every draw call is recorded, which
//! makes this backend the reference the tests measure the accelerated
//! paths against. It also serves as a headless backend.

use crate::alu::{merge_rop, Alu};
use crate::basics::ifloor;
use crate::color::{pixel_from_rgba, PictFormat, Rgba};
use crate::gpu::{GpuContext, Primitive, TextureId, VERTEX_POS};
use crate::pixmap::PixelBuf;

#[derive(Debug)]
struct Texture {
    pixels: PixelBuf,
    format: PictFormat,
}

/// One recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub count: usize,
    pub target: TextureId,
}

#[derive(Debug)]
pub struct SoftGpu {
    textures: Vec<Option<Texture>>,
    y_inverted: bool,
    logic_ops: bool,
    max_texture_size: u32,
    map_failure: bool,

    acquired: u32,
    acquire_count: u64,
    target: Option<TextureId>,
    logic_op: Alu,
    program: Option<Rgba>,
    attrib_enabled: bool,
    attrib_offset: usize,
    array_buffer_bound: bool,
    vbo: Vec<f32>,
    draws: Vec<DrawCall>,
}

impl Default for SoftGpu {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftGpu {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            y_inverted: true,
            logic_ops: true,
            max_texture_size: 8192,
            map_failure: false,
            acquired: 0,
            acquire_count: 0,
            target: None,
            logic_op: Alu::Copy,
            program: None,
            attrib_enabled: false,
            attrib_offset: 0,
            array_buffer_bound: false,
            vbo: Vec::new(),
            draws: Vec::new(),
        }
    }

    /// Report bottom-up framebuffers; rendering results are unchanged, only
    /// the device-space mapping flips.
    pub fn with_y_inverted(mut self, y_inverted: bool) -> Self {
        self.y_inverted = y_inverted;
        self
    }

    /// Emulate hardware without a logic-op unit: only `Copy` is accepted.
    pub fn with_logic_ops(mut self, supported: bool) -> Self {
        self.logic_ops = supported;
        self
    }

    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size;
        self
    }

    /// Make every subsequent download/upload fail.
    pub fn set_map_failure(&mut self, fail: bool) {
        self.map_failure = fail;
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn clear_draw_calls(&mut self) {
        self.draws.clear();
    }

    /// Total vertices drawn as points since the last clear.
    pub fn points_drawn(&self) -> usize {
        self.draws
            .iter()
            .filter(|d| d.primitive == Primitive::Points)
            .map(|d| d.count)
            .sum()
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired > 0
    }

    /// Number of times the context has been acquired.
    pub fn acquire_count(&self) -> u64 {
        self.acquire_count
    }

    pub fn vertex_attrib_enabled(&self) -> bool {
        self.attrib_enabled
    }

    pub fn array_buffer_bound(&self) -> bool {
        self.array_buffer_bound
    }

    pub fn program_bound(&self) -> bool {
        self.program.is_some()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.iter().filter(|t| t.is_some()).count()
    }

    fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id.0 as usize).and_then(|t| t.as_mut())
    }

    fn vertex(&self, index: usize) -> Option<[f32; 2]> {
        let base = self.attrib_offset + index * 2;
        let v = self.vbo.get(base..base + 2)?;
        Some([v[0], v[1]])
    }
}

impl GpuContext for SoftGpu {
    fn acquire(&mut self) {
        self.acquired += 1;
        self.acquire_count += 1;
    }

    fn release(&mut self) {
        self.acquired = self.acquired.saturating_sub(1);
        if self.acquired == 0 {
            self.vbo.clear();
        }
    }

    fn y_inverted(&self) -> bool {
        self.y_inverted
    }

    fn set_logic_op(&mut self, alu: Alu) -> bool {
        if alu == Alu::Copy || self.logic_ops {
            self.logic_op = alu;
            true
        } else {
            self.logic_op = Alu::Copy;
            false
        }
    }

    fn bind_framebuffer(&mut self, target: TextureId) {
        self.target = Some(target);
    }

    fn use_solid_program(&mut self, color: Rgba) {
        self.program = Some(color);
    }

    fn use_no_program(&mut self) {
        self.program = None;
    }

    fn enable_vertex_attrib(&mut self, index: u32) {
        if index == VERTEX_POS {
            self.attrib_enabled = true;
        }
    }

    fn disable_vertex_attrib(&mut self, index: u32) {
        if index == VERTEX_POS {
            self.attrib_enabled = false;
        }
    }

    fn upload_vertices(&mut self, vertices: &[f32]) -> usize {
        let offset = self.vbo.len();
        self.vbo.extend_from_slice(vertices);
        self.array_buffer_bound = true;
        offset
    }

    fn vertex_attrib_pointer(&mut self, index: u32, _components: u32, offset: usize) {
        if index == VERTEX_POS {
            self.attrib_offset = offset;
        }
    }

    fn unbind_array_buffer(&mut self) {
        self.array_buffer_bound = false;
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: usize, count: usize) {
        let (Some(target), Some(color)) = (self.target, self.program) else {
            log::warn!("draw_arrays without a framebuffer or program bound");
            return;
        };
        if !self.attrib_enabled || !self.array_buffer_bound {
            log::warn!("draw_arrays without vertex positions bound");
            return;
        }
        self.draws.push(DrawCall {
            primitive,
            count,
            target,
        });

        let mut vertices = Vec::with_capacity(count);
        for i in first..first + count {
            match self.vertex(i) {
                Some(v) => vertices.push(v),
                None => break,
            }
        }

        let alu = self.logic_op;
        let y_inverted = self.y_inverted;
        let Some(tex) = self.texture_mut(target) else {
            return;
        };
        let width = tex.pixels.width();
        let height = tex.pixels.height();
        let depth = tex.format.depth();
        let src = pixel_from_rgba(color, tex.format);
        // Device space back to continuous pixel coordinates.
        let map = |ndc: [f32; 2]| {
            let x = (ndc[0] as f64 + 1.0) * 0.5 * width as f64;
            let y = if y_inverted {
                (ndc[1] as f64 + 1.0) * 0.5 * height as f64
            } else {
                (1.0 - ndc[1] as f64) * 0.5 * height as f64
            };
            (x, y)
        };
        let write = |pixels: &mut PixelBuf, x: i32, y: i32| {
            if let Some(dst) = pixels.get(x, y) {
                pixels.set(x, y, merge_rop(alu, src, dst, u32::MAX, depth));
            }
        };

        match primitive {
            Primitive::Points => {
                for v in &vertices {
                    let (x, y) = map(*v);
                    write(&mut tex.pixels, ifloor(x), ifloor(y));
                }
            }
            Primitive::Quads => {
                for quad in vertices.chunks_exact(4) {
                    let mut x1 = f64::MAX;
                    let mut y1 = f64::MAX;
                    let mut x2 = f64::MIN;
                    let mut y2 = f64::MIN;
                    for v in quad {
                        let (x, y) = map(*v);
                        x1 = x1.min(x);
                        y1 = y1.min(y);
                        x2 = x2.max(x);
                        y2 = y2.max(y);
                    }
                    // Pixels whose centers fall inside [x1, x2) x [y1, y2).
                    let px1 = (x1 - 0.5).ceil() as i32;
                    let px2 = (x2 - 0.5).ceil() as i32;
                    let py1 = (y1 - 0.5).ceil() as i32;
                    let py2 = (y2 - 0.5).ceil() as i32;
                    for y in py1..py2 {
                        for x in px1..px2 {
                            write(&mut tex.pixels, x, y);
                        }
                    }
                }
            }
        }
    }

    fn create_texture(&mut self, width: u32, height: u32, format: PictFormat) -> Option<TextureId> {
        if width == 0 || height == 0 || width > self.max_texture_size || height > self.max_texture_size
        {
            return None;
        }
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Some(Texture {
            pixels: PixelBuf::new(width, height),
            format,
        }));
        Some(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.0 as usize) {
            *slot = None;
        }
        if self.target == Some(texture) {
            self.target = None;
        }
    }

    fn download(&mut self, texture: TextureId) -> Option<PixelBuf> {
        if self.map_failure {
            return None;
        }
        self.texture_mut(texture).map(|t| t.pixels.clone())
    }

    fn upload(&mut self, texture: TextureId, pixels: &PixelBuf) -> bool {
        if self.map_failure {
            return false;
        }
        match self.texture_mut(texture) {
            Some(t) if t.pixels.width() == pixels.width() && t.pixels.height() == pixels.height() => {
                t.pixels = pixels.clone();
                true
            }
            _ => false,
        }
    }

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
    ) -> bool {
        let Some(source) = self.texture_mut(src).map(|t| t.pixels.clone()) else {
            return false;
        };
        match self.texture_mut(dst) {
            Some(t) => {
                t.pixels.copy_from(&source, sx, sy, width, height, dx, dy);
                true
            }
            None => false,
        }
    }
}
