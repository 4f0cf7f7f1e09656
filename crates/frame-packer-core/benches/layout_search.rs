use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use frame_packer_core::prelude::*;
use frame_packer_core::transform::{trim, TrimMode};
use image::{Rgba, RgbaImage};

fn generate_sizes(count: usize, min_size: u32, max_size: u32) -> Vec<(u32, u32)> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            // HD sprites always have even sizes
            (w + w % 2, h + h % 2)
        })
        .collect()
}

fn bench_layout_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_search");

    for count in [50, 200, 800] {
        let sizes = generate_sizes(count, 16, 96);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("auto", count), &sizes, |b, sizes| {
            let ctx = PackContext::builder().hd(true).build();
            b.iter(|| black_box(select_layout(sizes, &ctx)))
        });

        group.bench_with_input(
            BenchmarkId::new("auto_sheet_height", count),
            &sizes,
            |b, sizes| {
                let ctx = PackContext::builder()
                    .hd(true)
                    .sheet_height(Some(4096))
                    .build();
                b.iter(|| black_box(select_layout(sizes, &ctx)))
            },
        );

        group.bench_with_input(BenchmarkId::new("fixed_width", count), &sizes, |b, sizes| {
            let ctx = PackContext::builder().hd(true).build();
            b.iter(|| black_box(layout_for_width(sizes, 2048, &ctx)))
        });
    }

    group.finish();
}

fn bench_trim(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim");

    let mut frame = RgbaImage::new(256, 256);
    for y in 40..200 {
        for x in 60..180 {
            frame.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let key = BackgroundColor {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    group.bench_function("alpha", |b| {
        b.iter(|| black_box(trim(frame.clone(), TrimMode::Alpha, true)))
    });
    group.bench_function("color", |b| {
        b.iter(|| {
            black_box(trim(
                frame.clone(),
                TrimMode::Color {
                    color: key,
                    threshold: 100,
                },
                true,
            ))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_layout_search, bench_trim);
criterion_main!(benches);
