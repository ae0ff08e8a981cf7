use accel2d::gpu::Primitive;
use accel2d::{
    AccelConfig, Alu, CapStyle, CoordMode, Drawable, Gc, GcOps, Generic, JoinStyle, LinePath,
    LineStyle, PixelBuf, Pixmap, PointI, RectI, Region, Screen, SoftGpu,
};

fn pts(v: &[(i32, i32)]) -> Vec<PointI> {
    v.iter().map(|&(x, y)| PointI::new(x, y)).collect()
}

fn screen(config: AccelConfig) -> Screen<SoftGpu> {
    Screen::new(SoftGpu::new(), config)
}

fn patterned(screen: &mut Screen<SoftGpu>, width: u32, height: u32) -> Pixmap {
    let mut pixmap = screen.create_pixmap(width, height, 24).unwrap();
    let mut buf = PixelBuf::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            buf.set(x, y, ((x * 0x070b01 + y * 0x0305a3) & 0xffffff) as u32);
        }
    }
    assert!(screen.write_pixels(&mut pixmap, &buf));
    pixmap
}

/// Draw `points` into a window at (2, 3) of a fresh patterned pixmap and
/// return the path taken with the resulting pixels.
fn draw_accelerated(config: AccelConfig, gc: &Gc, points: &[PointI]) -> (LinePath, PixelBuf) {
    let mut s = screen(config);
    let mut p = patterned(&mut s, 64, 48);
    let mut gc = gc.clone();
    let path = {
        let mut d = Drawable::window(&mut p, 2, 3, 60, 44);
        gc.validate(&d);
        s.poly_lines(&mut d, &gc, CoordMode::Origin, points)
    };
    assert!(!s.gpu().is_acquired());
    (path, s.read_pixels(&p).unwrap())
}

fn draw_generic(gc: &Gc, points: &[PointI]) -> PixelBuf {
    let mut s = screen(AccelConfig::default());
    let mut p = patterned(&mut s, 64, 48);
    let mut gc = gc.clone();
    {
        let mut d = Drawable::window(&mut p, 2, 3, 60, 44);
        gc.validate(&d);
        Generic::new(&mut s).poly_lines(&mut d, &gc, CoordMode::Origin, points);
    }
    s.read_pixels(&p).unwrap()
}

#[test]
fn axis_aligned_polyline_becomes_rectangles() {
    let mut s = screen(AccelConfig::default());
    let mut p = s.create_pixmap(32, 32, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(6);
    gc.validate(&d);

    let points = pts(&[(2, 2), (10, 2), (10, 8), (4, 8)]);
    let path = s.poly_lines(&mut d, &gc, CoordMode::Origin, &points);
    assert_eq!(path, LinePath::Rectangles(3));

    let calls = s.gpu().draw_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].primitive, Primitive::Quads);
    assert_eq!(calls[0].count, 12);

    let px = s.read_pixels(&p).unwrap();
    assert_eq!(px.get(2, 2), Some(6));
    assert_eq!(px.get(10, 2), Some(6));
    assert_eq!(px.get(10, 8), Some(6));
    assert_eq!(px.get(4, 8), Some(6));
    assert_eq!(px.get(3, 8), Some(0));
    assert_eq!(px.get(11, 2), Some(0));
    assert_eq!(px.get(5, 5), Some(0));
}

#[test]
fn relative_coordinates_are_resolved_before_reduction() {
    let mut s = screen(AccelConfig::default());
    let mut p = s.create_pixmap(16, 16, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(1);
    gc.validate(&d);

    let path = s.poly_lines(&mut d, &gc, CoordMode::Previous, &pts(&[(1, 1), (5, 0), (0, 3)]));
    assert_eq!(path, LinePath::Rectangles(2));
    let px = s.read_pixels(&p).unwrap();
    assert_eq!(px.get(6, 4), Some(1));
    assert_eq!(px.get(1, 1), Some(1));
}

#[test]
fn diagonal_polyline_is_staged_and_matches_software() {
    let points = pts(&[(3, 4), (40, 20), (40, 30), (10, 41)]);
    for alu in [Alu::Copy, Alu::Xor, Alu::Invert, Alu::AndInverted] {
        let gc = Gc::new(24).with_foreground(0xff00ff).with_function(alu);
        let (path, staged) = draw_accelerated(AccelConfig::default(), &gc, &points);
        assert_eq!(path, LinePath::Staged);

        let config = AccelConfig::default().with_scratch_staging(false);
        let (path, direct) = draw_accelerated(config, &gc, &points);
        assert_eq!(path, LinePath::Direct);

        let generic = draw_generic(&gc, &points);
        assert_eq!(staged, direct, "{:?}", alu);
        assert_eq!(staged, generic, "{:?}", alu);
    }
}

#[test]
fn staging_respects_client_clip_and_dashes() {
    let points = pts(&[(0, 0), (50, 35), (5, 40), (5, 2)]);
    let mut gc = Gc::new(24)
        .with_foreground(0x00ff00)
        .with_background(0x0000ff)
        .with_line_style(LineStyle::DoubleDash)
        .with_function(Alu::Xor);
    gc.set_dashes(2, &[3, 1, 2]);
    gc.set_client_clip(Some(Region::from_rects(&[
        RectI::new(0, 0, 20, 30),
        RectI::new(30, 10, 59, 43),
    ])));

    let (path, staged) = draw_accelerated(AccelConfig::default(), &gc, &points);
    assert_eq!(path, LinePath::Staged);
    assert_eq!(staged, draw_generic(&gc, &points));
}

#[test]
fn dashed_axis_aligned_lines_are_not_reduced() {
    let mut gc = Gc::new(24).with_foreground(0xffffff).with_line_style(LineStyle::OnOffDash);
    gc.set_dashes(0, &[2]);
    let points = pts(&[(4, 4), (30, 4)]);
    let (path, px) = draw_accelerated(AccelConfig::default(), &gc, &points);
    assert_eq!(path, LinePath::Staged);
    assert_eq!(px, draw_generic(&gc, &points));
}

#[test]
fn wide_lines_are_drawn_directly() {
    let points = pts(&[(5, 5), (30, 5), (30, 25)]);
    for join in [JoinStyle::Miter, JoinStyle::Round, JoinStyle::Bevel] {
        let gc = Gc::new(24)
            .with_foreground(0x804020)
            .with_line_width(5)
            .with_cap_style(CapStyle::Projecting)
            .with_join_style(join)
            .with_function(Alu::Xor);
        let (path, px) = draw_accelerated(AccelConfig::default(), &gc, &points);
        assert_eq!(path, LinePath::Direct);
        assert_eq!(px, draw_generic(&gc, &points), "{:?}", join);
    }
}

#[test]
fn scratch_allocation_failure_draws_directly() {
    let mut gc = Gc::new(24).with_foreground(0x010203);
    let points = pts(&[(1, 1), (20, 9)]);
    let mut s = screen(AccelConfig::default());
    let mut p = patterned(&mut s, 32, 32);
    s.set_config(AccelConfig::default().with_max_pixmap_area(16));

    let path = {
        let mut d = Drawable::pixmap(&mut p);
        gc.validate(&d);
        s.poly_lines(&mut d, &gc, CoordMode::Origin, &points)
    };
    assert_eq!(path, LinePath::Direct);
    assert_eq!(s.gpu().live_textures(), 1);

    let mut reference = screen(AccelConfig::default());
    let mut r = patterned(&mut reference, 32, 32);
    {
        let mut d = Drawable::pixmap(&mut r);
        gc.validate(&d);
        Generic::new(&mut reference).poly_lines(&mut d, &gc, CoordMode::Origin, &points);
    }
    assert_eq!(s.read_pixels(&p), reference.read_pixels(&r));
}

#[test]
fn unmappable_destination_is_skipped() {
    let gc = Gc::new(24).with_foreground(0xffffff);
    for staging in [true, false] {
        let mut s = screen(AccelConfig::default().with_scratch_staging(staging));
        let mut p = patterned(&mut s, 16, 16);
        let before = s.read_pixels(&p).unwrap();
        s.gpu_mut().set_map_failure(true);

        let mut gc = gc.clone();
        let path = {
            let mut d = Drawable::pixmap(&mut p);
            gc.validate(&d);
            s.poly_lines(&mut d, &gc, CoordMode::Origin, &pts(&[(0, 0), (9, 5)]))
        };
        assert_eq!(path, LinePath::Skipped);

        s.gpu_mut().set_map_failure(false);
        assert_eq!(s.read_pixels(&p).unwrap(), before);
        assert_eq!(s.gpu().live_textures(), 1);
        assert!(!s.gpu().is_acquired());
    }
}

#[test]
fn nf_variant_only_claims_what_it_accelerates() {
    let mut s = screen(AccelConfig::default());
    let mut p = Pixmap::new_memory(16, 16, 8).unwrap();
    let mut d = Drawable::pixmap(&mut p);
    let mut gc = Gc::new(8).with_foreground(3);
    gc.validate(&d);

    assert!(!s.poly_lines_nf(&mut d, &gc, CoordMode::Origin, &pts(&[(0, 0), (5, 3)])));
    assert!(d.backing().memory().unwrap().data().iter().all(|&v| v == 0));

    // Reducible lines are always handled, here by the software fill.
    assert!(s.poly_lines_nf(&mut d, &gc, CoordMode::Origin, &pts(&[(0, 0), (5, 0)])));
    assert_eq!(p.memory().unwrap().get(5, 0), Some(3));
}

#[test]
fn op_table_dispatch_matches_for_screen_and_generic() {
    let points = pts(&[(2, 2), (12, 2), (12, 12), (3, 9), (3, 2)]);
    let draw = |ops: &mut dyn GcOps, pixmap: &mut Pixmap| {
        let mut d = Drawable::pixmap(pixmap);
        let mut gc = Gc::new(24).with_foreground(0x445566).with_function(Alu::Or);
        gc.validate(&d);
        ops.poly_lines(&mut d, &gc, CoordMode::Origin, &points);
    };

    let mut fast = screen(AccelConfig::default());
    let mut pf = patterned(&mut fast, 16, 16);
    draw(&mut fast, &mut pf);

    let mut soft = screen(AccelConfig::default());
    let mut ps = patterned(&mut soft, 16, 16);
    draw(&mut Generic::new(&mut soft), &mut ps);

    assert_eq!(fast.read_pixels(&pf), soft.read_pixels(&ps));
}

#[test]
fn far_endpoints_do_not_overflow() {
    let gc = Gc::new(24).with_foreground(0xfedcba);

    // Horizontal: still one rectangle, clipped to the window.
    let horizontal = pts(&[(-2_000_000_000, 3), (2_000_000_000, 3)]);
    let (path, px) = draw_accelerated(AccelConfig::default(), &gc, &horizontal);
    assert_eq!(path, LinePath::Rectangles(1));
    assert_eq!(px, draw_generic(&gc, &horizontal));
    // Window row 3 is pixmap row 6, columns 2..62.
    assert!((2..62).all(|x| px.get(x, 6) == Some(0xfedcba)));
    assert_ne!(px.get(1, 6), Some(0xfedcba));

    // Diagonal: the bounding box is too wide to stage.
    let diagonal = pts(&[(-2_000_000_000, 3), (2_000_000_000, 4)]);
    let (path, px) = draw_accelerated(AccelConfig::default(), &gc, &diagonal);
    assert_eq!(path, LinePath::Direct);
    assert_eq!(px, draw_generic(&gc, &diagonal));
    assert!((2..62).all(|x| px.get(x, 6) == Some(0xfedcba)));

    // Full coordinate range, and relative offsets that run past it.
    let full = pts(&[(i32::MIN, 10), (i32::MAX, 10)]);
    let (path, px) = draw_accelerated(AccelConfig::default(), &gc, &full);
    assert_eq!(path, LinePath::Direct);
    assert!((2..62).all(|x| px.get(x, 13) == Some(0xfedcba)));

    let mut s = screen(AccelConfig::default());
    let mut p = patterned(&mut s, 16, 16);
    let mut gc = gc.clone();
    let mut d = Drawable::pixmap(&mut p);
    gc.validate(&d);
    let relative = pts(&[(i32::MAX - 5, 2), (100, 0), (0, 5)]);
    assert_eq!(
        s.poly_lines(&mut d, &gc, CoordMode::Previous, &relative),
        LinePath::Rectangles(2)
    );
}
