use archmage::SimdToken;
use criterion::{BenchmarkGroup, Criterion, Throughput, measurement::WallTime};
use pigment::{Color, DitherTarget, Image, Rect, UncompressedFormat};

// === SIMD tier detection ===

fn probe<T: SimdToken>() -> &'static str {
    if T::summon().is_some() { "available" } else { "not available" }
}

fn print_simd_info() {
    eprintln!("=== SIMD Tier Detection ===");
    #[cfg(target_arch = "x86_64")]
    eprintln!("  AVX2+FMA (x86-64-v3):    {}", probe::<archmage::X64V3Token>());
    #[cfg(target_arch = "aarch64")]
    eprintln!("  NEON:                    {}", probe::<archmage::NeonToken>());
    eprintln!("  Scalar:                  always available");
    eprintln!("===========================");
}

fn disable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(true);
}

fn enable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(false);
}

// === Naive baselines ===

fn naive_premultiply(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = (u16::from(*c) * a / 255) as u8;
        }
    }
}

fn naive_rgb_to_rgba(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
        d[..3].copy_from_slice(s);
        d[3] = 255;
    }
}

// === Helpers ===

const W: usize = 1920;
const H: usize = 1080;

fn test_image(w: usize, h: usize) -> Image {
    let colors: Vec<Color> = (0..w * h)
        .map(|i| Color::new((i % 251) as u8, (i % 241) as u8, (i % 239) as u8, (i % 233) as u8))
        .collect();
    Image::from_colors(w, h, &colors).unwrap()
}

/// Dispatched kernel, the same kernel with SIMD disabled, and a naive loop.
fn bench_inplace(
    group: &mut BenchmarkGroup<WallTime>,
    kernel: fn(&mut [u8]) -> Result<(), pigment::SizeError>,
    naive: fn(&mut [u8]),
    buf: &[u8],
) {
    group.bench_function("dispatched", |b| {
        let mut v = buf.to_vec();
        b.iter(|| kernel(&mut v).unwrap());
    });

    disable_all_simd();
    group.bench_function("scalar", |b| {
        let mut v = buf.to_vec();
        b.iter(|| kernel(&mut v).unwrap());
    });
    enable_all_simd();

    group.bench_function("naive", |b| {
        let mut v = buf.to_vec();
        b.iter(|| naive(&mut v));
    });
}

fn bench_copy(
    group: &mut BenchmarkGroup<WallTime>,
    kernel: fn(&[u8], &mut [u8]) -> Result<(), pigment::SizeError>,
    naive: fn(&[u8], &mut [u8]),
    src: &[u8],
    dst_len: usize,
) {
    group.bench_function("dispatched", |b| {
        let mut dst = vec![0u8; dst_len];
        b.iter(|| kernel(src, &mut dst).unwrap());
    });

    disable_all_simd();
    group.bench_function("scalar", |b| {
        let mut dst = vec![0u8; dst_len];
        b.iter(|| kernel(src, &mut dst).unwrap());
    });
    enable_all_simd();

    group.bench_function("naive", |b| {
        let mut dst = vec![0u8; dst_len];
        b.iter(|| naive(src, &mut dst));
    });
}

// === Benchmark groups ===

fn bench_premultiply(c: &mut Criterion) {
    let mut group = c.benchmark_group("premultiply_rgba");
    let n = W * H * 4;
    group.throughput(Throughput::Bytes(n as u64));
    let buf: Vec<u8> = (0..n).map(|i| (i % 251) as u8).collect();
    bench_inplace(&mut group, pigment::bytes::premultiply_rgba_inplace, naive_premultiply, &buf);
    group.finish();
}

fn bench_rgb_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("rgb_to_rgba");
    let src: Vec<u8> = (0..W * H * 3).map(|i| (i % 251) as u8).collect();
    group.throughput(Throughput::Bytes((W * H * 4) as u64));
    bench_copy(&mut group, pigment::bytes::rgb_to_rgba, naive_rgb_to_rgba, &src, W * H * 4);
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let img = test_image(512, 512);
    group.throughput(Throughput::Elements((512 * 512) as u64));
    for target in [
        UncompressedFormat::R8G8B8,
        UncompressedFormat::R5G6B5,
        UncompressedFormat::R16G16B16A16,
        UncompressedFormat::R32G32B32A32,
    ] {
        group.bench_function(format!("rgba8_to_{target:?}"), |b| {
            b.iter(|| {
                let mut i = img.clone();
                i.convert(target).unwrap();
                i
            });
        });
    }
    group.bench_function("dither_r5g6b5", |b| {
        b.iter(|| {
            let mut i = img.clone();
            i.dither(DitherTarget::R5G6B5).unwrap();
            i
        });
    });
    group.finish();
}

fn bench_draw_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_image");
    let src = test_image(256, 256);
    let opaque = {
        let mut s = src.clone();
        s.convert(UncompressedFormat::R8G8B8).unwrap();
        s
    };
    let canvas = Image::gen_color(512, 512, Color::LIGHTGRAY);
    group.throughput(Throughput::Elements((256 * 256) as u64));
    for (name, image, tint) in [
        ("opaque_copy", &opaque, Color::WHITE),
        ("alpha_blend", &src, Color::WHITE),
        ("tinted", &src, Color::SKYBLUE),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut dst = canvas.clone();
                dst.draw_image(image, Rect::new(0, 0, 256, 256), Rect::new(100, 100, 256, 256), tint)
                    .unwrap();
                dst
            });
        });
    }
    group.bench_function("scaled_2x", |b| {
        b.iter(|| {
            let mut dst = canvas.clone();
            dst.draw_image(&src, Rect::new(0, 0, 256, 256), Rect::new(0, 0, 512, 512), Color::WHITE)
                .unwrap();
            dst
        });
    });
    group.finish();
}

fn bench_blur(c: &mut Criterion) {
    let mut group = c.benchmark_group("blur_gaussian");
    let img = test_image(256, 256);
    group.throughput(Throughput::Elements((256 * 256) as u64));
    for size in [2, 8] {
        group.bench_function(format!("size_{size}"), |b| {
            b.iter(|| {
                let mut i = img.clone();
                i.blur_gaussian_default(size).unwrap();
                i
            });
        });
    }
    group.finish();
}

fn main() {
    print_simd_info();

    let mut criterion = Criterion::default().configure_from_args();
    bench_premultiply(&mut criterion);
    bench_rgb_expand(&mut criterion);
    bench_convert(&mut criterion);
    bench_draw_image(&mut criterion);
    bench_blur(&mut criterion);
    criterion.final_summary();
}
