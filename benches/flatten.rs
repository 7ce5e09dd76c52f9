use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raster2d::curves::{trace_cubic, trace_quad};
use raster2d::flatten::{flatten, SegmentedPath, DEFAULT_FLATNESS_TOLERANCE};
use raster2d::{GraphicContext, Path, PathBuilder, Rgba8};

fn wavy_path() -> Path {
    let mut p = Path::new();
    p.move_to(10.0, 250.0);
    for i in 0..32 {
        let x = 10.0 + i as f64 * 15.0;
        p.cubic_curve_to(x + 5.0, 50.0, x + 10.0, 450.0, x + 15.0, 250.0);
    }
    p.arc_to(250.0, 250.0, 200.0, 120.0, 0.0, std::f64::consts::PI);
    p.close();
    p
}

fn curves(c: &mut Criterion) {
    let mut g = c.benchmark_group("curves");
    let cubic = [0.0, 0.0, 100.0, 400.0, 300.0, -200.0, 400.0, 200.0];
    let quad = [0.0, 0.0, 200.0, 400.0, 400.0, 0.0];
    let threshold = DEFAULT_FLATNESS_TOLERANCE;

    g.bench_function("cubic", |b| {
        b.iter(|| {
            let mut n = 0usize;
            trace_cubic(&mut |_x, _y| n += 1, black_box(&cubic), threshold);
            n
        })
    });
    g.bench_function("quad", |b| {
        b.iter(|| {
            let mut n = 0usize;
            trace_quad(&mut |_x, _y| n += 1, black_box(&quad), threshold);
            n
        })
    });
    g.finish();
}

fn paths(c: &mut Criterion) {
    let mut g = c.benchmark_group("paths");
    let path = wavy_path();

    g.bench_function("flatten", |b| {
        b.iter(|| {
            let mut out = SegmentedPath::new();
            flatten(black_box(&path), &mut out, 1.0, DEFAULT_FLATNESS_TOLERANCE);
            out.point_count()
        })
    });
    g.bench_function("fill", |b| {
        let mut ctx = GraphicContext::new(512, 512);
        ctx.set_fill_color(Rgba8::BLUE);
        b.iter(|| ctx.fill(&[black_box(&path)]))
    });
    g.bench_function("stroke", |b| {
        let mut ctx = GraphicContext::new(512, 512);
        ctx.set_line_width(3.0);
        b.iter(|| ctx.stroke(&[black_box(&path)]))
    });
    g.finish();
}

criterion_group!(benches, curves, paths);
criterion_main!(benches);
