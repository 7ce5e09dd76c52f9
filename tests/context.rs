use raster2d::basics::PI;
use raster2d::{
    ContextConfig, FillRule, GraphicContext, ImageBuffer, LineCap, Path, PathBuilder, Rgba8,
    TransAffine,
};

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
    let mut p = Path::new();
    p.move_to(x0, y0);
    p.line_to(x1, y0);
    p.line_to(x1, y1);
    p.line_to(x0, y1);
    p.close();
    p
}

/// Same rectangle with an extra point on the first side, which keeps it off
/// the rectangle fast path.
fn split_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
    let mut p = Path::new();
    p.move_to(x0, y0);
    p.line_to((x0 + x1) / 2.0, y0);
    p.line_to(x1, y0);
    p.line_to(x1, y1);
    p.line_to(x0, y1);
    p.close();
    p
}

fn blob() -> Path {
    let mut p = Path::new();
    p.move_to(8.0, 30.0);
    p.cubic_curve_to(10.0, 2.0, 40.0, 2.0, 52.0, 28.0);
    p.quad_curve_to(40.0, 56.0, 20.0, 50.0);
    p.line_to(30.0, 30.0);
    p.close();
    p.move_to(24.0, 24.0);
    p.arc_to(24.0, 24.0, 6.0, 6.0, 0.0, 2.0 * PI);
    p.close();
    p
}

fn context(m: &TransAffine, rule: FillRule) -> GraphicContext {
    let mut ctx = GraphicContext::new(48, 48);
    ctx.set_matrix_transform(*m);
    ctx.set_fill_rule(rule);
    ctx.set_fill_color(Rgba8::new(20, 200, 90, 255));
    ctx
}

#[test]
fn rect_fast_path_matches_rasterizer() {
    let rects = [
        (4.0, 4.0, 20.0, 12.0),
        (3.3, 5.75, 17.1, 6.2),
        (10.5, 10.5, 10.9, 30.25),
        (30.0, 20.0, 5.5, 2.25),
        (-10.0, -3.5, 60.0, 20.1),
        (40.2, 40.7, 70.0, 90.0),
        (7.1, 7.1, 7.6, 7.4),
    ];
    let mut scaled = TransAffine::identity();
    scaled.translate(3.5, 40.0).scale(1.5, -0.75);
    let matrices = [TransAffine::identity(), TransAffine::from_translation(0.3, 0.6), scaled];

    for m in &matrices {
        for rule in [FillRule::NonZero, FillRule::EvenOdd] {
            for &(x0, y0, x1, y1) in &rects {
                let mut fast = context(m, rule);
                fast.fill(&[&rect(x0, y0, x1, y1)]);
                let mut general = context(m, rule);
                general.fill(&[&split_rect(x0, y0, x1, y1)]);
                assert_eq!(
                    fast.image().data(),
                    general.image().data(),
                    "rect ({x0}, {y0}, {x1}, {y1}) rule {rule:?} matrix {m:?}"
                );
            }
        }
    }
}

/// Small deterministic generator for randomized geometry.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, lo: f64, hi: f64) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        lo + (hi - lo) * ((self.0 >> 11) as f64 / (1u64 << 53) as f64)
    }
}

#[test]
fn rect_fast_path_matches_rasterizer_in_every_corner_order() {
    let mut rng = Lcg(0x9e37_79b9);
    let mut mirrored = TransAffine::identity();
    mirrored.translate(44.0, 2.0).scale(-0.8, 1.3);
    let matrices = [TransAffine::identity(), TransAffine::from_translation(-0.45, 0.7), mirrored];

    for _ in 0..150 {
        let (x0, y0) = (rng.next(-6.0, 54.0), rng.next(-6.0, 54.0));
        let (x1, y1) = (rng.next(-6.0, 54.0), rng.next(-6.0, 54.0));
        let orders = [(x0, y0, x1, y1), (x1, y0, x0, y1), (x0, y1, x1, y0), (x1, y1, x0, y0)];
        for m in &matrices {
            for rule in [FillRule::NonZero, FillRule::EvenOdd] {
                for &(ax, ay, bx, by) in &orders {
                    let mut fast = context(m, rule);
                    fast.fill(&[&rect(ax, ay, bx, by)]);
                    let mut general = context(m, rule);
                    general.fill(&[&split_rect(ax, ay, bx, by)]);
                    assert_eq!(
                        fast.image().data(),
                        general.image().data(),
                        "rect ({ax}, {ay}, {bx}, {by}) rule {rule:?} matrix {m:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn fill_stroke_on_rect_equals_fill_then_stroke() {
    let r = rect(2.3, 2.3, 10.7, 10.7);
    let setup = |ctx: &mut GraphicContext| {
        ctx.set_fill_color(Rgba8::new(200, 40, 40, 255));
        ctx.set_stroke_color(Rgba8::new(10, 10, 120, 128));
        ctx.set_line_width(0.5);
    };

    let mut combined = GraphicContext::new(16, 16);
    setup(&mut combined);
    combined.fill_stroke(&[&r]);

    let mut separate = GraphicContext::new(16, 16);
    setup(&mut separate);
    separate.fill(&[&r]);
    separate.stroke(&[&r]);

    assert_eq!(combined.image().data(), separate.image().data());
}

#[test]
fn rect_with_explicit_return_line_uses_same_pixels() {
    let mut a = GraphicContext::new(16, 16);
    a.move_to(2.5, 2.5);
    a.line_to(12.25, 2.5);
    a.line_to(12.25, 9.0);
    a.line_to(2.5, 9.0);
    a.line_to(2.5, 2.5);
    a.fill(&[]);

    let mut b = GraphicContext::new(16, 16);
    b.fill(&[&split_rect(2.5, 2.5, 12.25, 9.0)]);
    assert_eq!(a.image().data(), b.image().data());
}

#[test]
fn zero_flatness_tolerance_in_config_falls_back_to_default() {
    let config = ContextConfig {
        flatness_tolerance: 0.0,
        ..ContextConfig::default()
    };
    let mut ctx = GraphicContext::with_config(ImageBuffer::new(48, 48), config);
    assert_eq!(ctx.config().flatness_tolerance, 0.5);
    ctx.fill(&[&blob()]);

    let mut reference = GraphicContext::new(48, 48);
    reference.fill(&[&blob()]);
    assert_eq!(ctx.image(), reference.image());
}

#[test]
fn zero_stroke_width_leaves_buffer_untouched() {
    let mut ctx = GraphicContext::new(32, 32);
    ctx.clear(Rgba8::WHITE);
    let before = ctx.image().clone();
    ctx.set_line_width(0.0);
    ctx.move_to(2.0, 2.0);
    ctx.line_to(30.0, 30.0);
    ctx.stroke(&[&blob()]);
    assert_eq!(ctx.image(), &before);
    assert!(ctx.path().is_empty());
}

#[test]
fn fill_stroke_equals_fill_then_stroke() {
    let setup = |ctx: &mut GraphicContext| {
        ctx.set_fill_color(Rgba8::new(200, 40, 40, 180));
        ctx.set_stroke_color(Rgba8::new(10, 10, 120, 220));
        ctx.set_line_width(3.0);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_dash(&[6.0, 3.0], 1.5);
        ctx.translate(4.0, 2.0);
        ctx.rotate(0.2);
    };

    let mut combined = GraphicContext::new(64, 64);
    setup(&mut combined);
    combined.fill_stroke(&[&blob()]);

    let mut separate = GraphicContext::new(64, 64);
    setup(&mut separate);
    separate.fill(&[&blob()]);
    separate.stroke(&[&blob()]);

    assert_eq!(combined.image().data(), separate.image().data());
    assert!(combined.image().data().iter().any(|b| *b != 0));
}

#[test]
fn save_restore_isolates_state_but_keeps_path() {
    let mut ctx = GraphicContext::new(8, 8);
    ctx.move_to(1.0, 2.0);
    ctx.save();
    ctx.set_stroke_color(Rgba8::RED);
    ctx.set_fill_rule(FillRule::NonZero);
    ctx.set_line_width(7.0);
    ctx.set_line_dash(&[1.0, 1.0], 0.5);
    ctx.set_dpi(300.0);
    ctx.translate(10.0, 10.0);
    ctx.line_to(3.0, 4.0);
    ctx.restore();

    assert_eq!(ctx.stroke_color(), Rgba8::BLACK);
    assert_eq!(ctx.fill_rule(), FillRule::EvenOdd);
    assert_eq!(ctx.line_width(), 1.0);
    assert_eq!(ctx.line_dash(), (&[][..], 0.0));
    assert_eq!(ctx.dpi(), 92.0);
    assert_eq!(ctx.matrix_transform(), TransAffine::identity());
    assert_eq!(ctx.path().points(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn translate_then_rotate_maps_in_local_space() {
    let mut ctx = GraphicContext::new(8, 8);
    ctx.translate(2.0, 3.0);
    ctx.rotate(PI / 2.0);
    let (x, y) = ctx.matrix_transform().transform(1.0, 0.0);
    assert!((x - 2.0).abs() < 1e-9 && (y - 4.0).abs() < 1e-9, "({x}, {y})");

    let mut composed = GraphicContext::new(8, 8);
    composed.compose_matrix(&TransAffine::from_translation(2.0, 3.0));
    composed.compose_matrix(&TransAffine::from_rotation(PI / 2.0));
    assert!(composed.matrix_transform().is_equal(&ctx.matrix_transform(), 1e-12));
}

#[test]
fn transform_applies_to_fill() {
    let mut ctx = GraphicContext::new(32, 32);
    ctx.set_fill_color(Rgba8::BLUE);
    ctx.translate(10.0, 10.0);
    ctx.scale(2.0, 2.0);
    ctx.fill(&[&rect(0.0, 0.0, 4.0, 4.0)]);
    assert_eq!(ctx.image().pixel(12, 12), Rgba8::BLUE);
    assert_eq!(ctx.image().pixel(17, 17), Rgba8::BLUE);
    assert_eq!(ctx.image().pixel(9, 9), Rgba8::TRANSPARENT);
    assert_eq!(ctx.image().pixel(18, 18), Rgba8::TRANSPARENT);
}

#[test]
fn fill_rule_controls_overlap() {
    let draw = |rule: FillRule| {
        let mut ctx = GraphicContext::new(20, 20);
        ctx.set_fill_rule(rule);
        ctx.fill(&[&rect(2.0, 2.0, 14.0, 14.0), &rect(6.0, 6.0, 18.0, 18.0)]);
        ctx.into_image()
    };
    let even_odd = draw(FillRule::EvenOdd);
    let non_zero = draw(FillRule::NonZero);
    assert_eq!(even_odd.pixel(10, 10), Rgba8::TRANSPARENT);
    assert_eq!(non_zero.pixel(10, 10), Rgba8::WHITE);
    assert_eq!(even_odd.pixel(3, 3), Rgba8::WHITE);
}

#[test]
fn dashed_stroke_leaves_gaps() {
    let line = || {
        let mut p = Path::new();
        p.move_to(0.0, 5.5);
        p.line_to(40.0, 5.5);
        p
    };
    let mut ctx = GraphicContext::new(40, 10);
    ctx.set_line_width(1.0);
    ctx.set_line_dash(&[4.0, 4.0], 0.0);
    ctx.stroke(&[&line()]);
    assert_eq!(ctx.image().pixel(1, 5), Rgba8::BLACK);
    assert_eq!(ctx.image().pixel(5, 5), Rgba8::TRANSPARENT);
    assert_eq!(ctx.image().pixel(9, 5), Rgba8::BLACK);
}

#[test]
fn invalid_dash_strokes_solid() {
    let draw = |dash: &[f64]| {
        let mut ctx = GraphicContext::new(32, 32);
        ctx.set_line_width(2.0);
        ctx.set_line_dash(dash, 0.0);
        ctx.stroke(&[&blob()]);
        ctx.into_image()
    };
    let solid = draw(&[]);
    assert_eq!(draw(&[-1.0, 3.0]), solid);
    assert_eq!(draw(&[0.0, 0.0]), solid);
}

#[test]
fn arc_ends_exactly_at_end_angle() {
    let mut ctx = GraphicContext::new(8, 8);
    ctx.move_to(0.0, 0.0);
    ctx.arc_to(10.0, 20.0, 5.0, 3.0, 0.25, 1.9);
    let (x, y) = ctx.last_point();
    assert_eq!(x, 10.0 + (0.25f64 + 1.9).cos() * 5.0);
    assert_eq!(y, 20.0 + (0.25f64 + 1.9).sin() * 3.0);
}

#[test]
fn geometry_outside_buffer_is_clipped() {
    let mut ctx = GraphicContext::new(16, 16);
    ctx.set_fill_color(Rgba8::GREEN);
    ctx.set_line_width(4.0);
    ctx.move_to(-1e6, -1e6);
    ctx.line_to(1e6, 8.0);
    ctx.line_to(-1e6, 1e6);
    ctx.close();
    ctx.fill_stroke(&[]);
    assert_eq!(ctx.image().pixel(4, 8), Rgba8::GREEN);
}
