use accel2d::gpu::Primitive;
use accel2d::{
    AccelConfig, Alu, Bitmap, CharInfo, Drawable, Gc, GcOps, Generic, GlyphPad, PixelBuf, Pixmap,
    PixmapKind, RectI, Region, Screen, SoftGpu,
};

const X: bool = true;
const O: bool = false;

fn screen(gpu: SoftGpu) -> Screen<SoftGpu> {
    Screen::new(gpu, AccelConfig::default())
}

/// A texture pixmap filled with a position-dependent pattern.
fn patterned(screen: &mut Screen<SoftGpu>, width: u32, height: u32) -> Pixmap {
    let mut pixmap = screen.create_pixmap(width, height, 24).unwrap();
    let mut buf = PixelBuf::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            buf.set(x, y, ((x * 0x0b0305 + y * 0x010d07) & 0xffffff) as u32);
        }
    }
    assert!(screen.write_pixels(&mut pixmap, &buf));
    pixmap
}

fn solid_bitmap(width: u32, height: u32) -> Bitmap {
    let stride = (width as usize + 7) / 8;
    Bitmap::new(width, height, stride, vec![0xff; stride * height as usize]).unwrap()
}

fn glyph_run() -> Vec<CharInfo> {
    vec![
        CharInfo::from_rows(
            &[&[O, X, X, O], &[X, O, O, X], &[X, X, X, X], &[X, O, O, X]],
            0,
            4,
            5,
            GlyphPad::Int,
        )
        .unwrap(),
        CharInfo::blank(3),
        CharInfo::from_rows(&[&[X, X, X], &[X, O, O], &[X, X, O]], 1, 2, 4, GlyphPad::Byte)
            .unwrap(),
    ]
}

fn assert_released(gpu: &SoftGpu) {
    assert!(!gpu.is_acquired());
    assert!(!gpu.vertex_attrib_enabled());
    assert!(!gpu.array_buffer_bound());
    assert!(!gpu.program_bound());
}

#[test]
fn zero_set_bits_issue_no_draws() {
    let mut s = screen(SoftGpu::new());
    let mut p = s.create_pixmap(32, 32, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(3);
    gc.validate(&d);

    let empty = Bitmap::new(20, 20, 4, vec![0; 80]).unwrap();
    s.push_pixels(&gc, &empty, &mut d, 20, 20, 0, 0);
    s.poly_glyph_blt(&mut d, &gc, 4, 10, &[&CharInfo::blank(6), &CharInfo::blank(2)]);

    assert!(s.gpu().draw_calls().is_empty());
    assert_eq!(s.gpu().acquire_count(), 2);
    assert_released(s.gpu());
    assert!(s.read_pixels(&p).unwrap().data().iter().all(|&v| v == 0));
}

#[test]
fn points_are_drawn_in_full_batches_then_a_remainder() {
    let mut s = screen(SoftGpu::new());
    let mut p = s.create_pixmap(64, 64, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(0x5a);
    gc.validate(&d);

    // 40 x 40 set bits: three full batches and 100 left over.
    s.push_pixels(&gc, &solid_bitmap(40, 40), &mut d, 40, 40, 2, 3);

    let calls = s.gpu().draw_calls();
    let counts: Vec<usize> = calls.iter().map(|c| c.count).collect();
    assert_eq!(counts, vec![500, 500, 500, 100]);
    assert!(calls.iter().all(|c| c.primitive == Primitive::Points));
    assert_eq!(s.gpu().points_drawn(), 1600);
    assert_released(s.gpu());

    let px = s.read_pixels(&p).unwrap();
    assert_eq!(px.get(2, 3), Some(0x5a));
    assert_eq!(px.get(41, 42), Some(0x5a));
    assert_eq!(px.get(42, 42), Some(0));
    assert_eq!(px.get(1, 3), Some(0));
}

#[test]
fn clipped_bits_are_not_submitted() {
    let mut s = screen(SoftGpu::new());
    let mut p = s.create_pixmap(64, 64, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(1);
    gc.set_client_clip(Some(Region::from_rect(RectI::new(5, 5, 14, 14))));
    gc.validate(&d);

    s.push_pixels(&gc, &solid_bitmap(32, 32), &mut d, 32, 32, 0, 0);

    let counts: Vec<usize> = s.gpu().draw_calls().iter().map(|c| c.count).collect();
    assert_eq!(counts, vec![100]);
}

#[test]
fn glyph_points_match_software_for_every_alu() {
    let run = glyph_run();
    let glyphs: Vec<&CharInfo> = run.iter().collect();
    for alu in Alu::ALL {
        let mut fast = screen(SoftGpu::new().with_y_inverted(false));
        let mut soft = screen(SoftGpu::new());
        let mut pf = patterned(&mut fast, 24, 16);
        let mut ps = patterned(&mut soft, 24, 16);

        let mut gc = Gc::new(24).with_foreground(0x123456).with_function(alu);
        {
            let mut d = Drawable::window(&mut pf, 1, 2, 20, 12);
            gc.validate(&d);
            fast.poly_glyph_blt(&mut d, &gc, 3, 6, &glyphs);
        }
        {
            let mut d = Drawable::window(&mut ps, 1, 2, 20, 12);
            gc.validate(&d);
            Generic::new(&mut soft).poly_glyph_blt(&mut d, &gc, 3, 6, &glyphs);
        }

        assert!(!fast.gpu().draw_calls().is_empty(), "{:?} not accelerated", alu);
        assert_eq!(
            fast.read_pixels(&pf).unwrap(),
            soft.read_pixels(&ps).unwrap(),
            "{:?}",
            alu
        );
    }
}

#[test]
fn push_pixels_position_is_in_screen_space() {
    let mut s = screen(SoftGpu::new());
    let mut p = s.create_pixmap(16, 16, 8).unwrap();
    let mut d = Drawable::window(&mut p, 4, 4, 8, 8);
    let mut gc = Gc::new(8).with_foreground(9);
    gc.validate(&d);

    let bm = Bitmap::from_rows(&[&[X, O], &[O, X]]).unwrap();
    s.push_pixels(&gc, &bm, &mut d, 2, 2, 5, 6);

    let px = s.read_pixels(&p).unwrap();
    assert_eq!(px.get(5, 6), Some(9));
    assert_eq!(px.get(6, 7), Some(9));
    assert_eq!(px.get(6, 6), Some(0));
    assert_eq!(s.gpu().points_drawn(), 2);
}

#[test]
fn declined_attempts_leave_the_gpu_released() {
    // Plane mask with holes: rejected before touching the GPU.
    let mut s = screen(SoftGpu::new());
    let mut p = s.create_pixmap(8, 8, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(0xff).with_plane_mask(0x0f);
    gc.validate(&d);
    s.push_pixels(&gc, &solid_bitmap(2, 2), &mut d, 2, 2, 0, 0);
    assert!(s.gpu().draw_calls().is_empty());
    assert_eq!(s.gpu().acquire_count(), 0);
    assert_eq!(s.read_pixels(&p).unwrap().get(1, 1), Some(0x0f));

    // Logic op the GPU cannot do: rejected after acquiring.
    let mut s = screen(SoftGpu::new().with_logic_ops(false));
    let mut p = s.create_pixmap(8, 8, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(0x0f).with_function(Alu::Or);
    gc.validate(&d);
    let run = glyph_run();
    s.poly_glyph_blt(&mut d, &gc, 0, 4, &[&run[0]]);
    assert!(s.gpu().draw_calls().is_empty());
    assert_eq!(s.gpu().acquire_count(), 1);
    assert_released(s.gpu());
    assert_eq!(s.read_pixels(&p).unwrap().get(1, 0), Some(0x0f));
}

#[test]
fn screen_and_generic_agree_through_the_op_table() {
    let bm = Bitmap::from_rows(&[&[X, X, O, X], &[O, X, X, O], &[X, O, O, X]]).unwrap();
    let mut fast = screen(SoftGpu::new());
    let mut soft = screen(SoftGpu::new());
    let mut pf = patterned(&mut fast, 12, 12);
    let mut ps = patterned(&mut soft, 12, 12);
    let gc = Gc::new(24).with_foreground(0xabcdef).with_function(Alu::Xor);

    let run = |ops: &mut dyn GcOps, pixmap: &mut Pixmap, mut gc: Gc| {
        let mut d = Drawable::pixmap(pixmap);
        gc.validate(&d);
        ops.push_pixels(&gc, &bm, &mut d, 4, 3, 2, 2);
        ops.push_pixels(&gc, &bm, &mut d, 3, 2, 4, 3);
    };
    run(&mut fast, &mut pf, gc.clone());
    run(&mut Generic::new(&mut soft), &mut ps, gc);

    assert_eq!(fast.gpu().draw_calls().len(), 2);
    assert_eq!(fast.read_pixels(&pf).unwrap(), soft.read_pixels(&ps).unwrap());
}

#[test]
fn memory_destination_is_left_to_the_caller() {
    let mut s = screen(SoftGpu::new());
    let mut p = Pixmap::new_memory_of_kind(8, 8, 8, PixmapKind::DrmOnly).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(2);
    gc.validate(&d);
    let bm = solid_bitmap(2, 2);

    assert!(!s.push_pixels_nf(&gc, &bm, &mut d, 2, 2, 0, 0));
    assert_eq!(d.backing().memory().unwrap().get(0, 0), Some(0));

    s.push_pixels(&gc, &bm, &mut d, 2, 2, 0, 0);
    assert!(s.gpu().draw_calls().is_empty());
    assert_eq!(p.memory().unwrap().get(1, 1), Some(2));
}
