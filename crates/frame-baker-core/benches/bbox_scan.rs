use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use frame_baker_core::prelude::*;
use frame_baker_core::{bounding_box_of, crop_frame};
use image::{Rgba, RgbaImage};

fn generate_frame(size: u32) -> RgbaImage {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut img = RgbaImage::new(size, size);
    // a blob somewhere in the middle plus sparse renderer noise
    let (x0, y0) = (size / 4, size / 3);
    for y in y0..y0 + size / 3 {
        for x in x0..x0 + size / 2 {
            img.put_pixel(x, y, Rgba([200, 120, 40, 255]));
        }
    }
    for _ in 0..size {
        let x = rng.gen_range(0..size);
        let y = rng.gen_range(0..size);
        img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
    }
    img
}

fn bench_bbox(c: &mut Criterion) {
    let mut group = c.benchmark_group("bbox_scan");

    for size in [128u32, 512, 700] {
        let frame = generate_frame(size);
        group.throughput(Throughput::Elements((size * size) as u64));

        group.bench_with_input(BenchmarkId::new("bounding_box", size), &frame, |b, f| {
            b.iter(|| black_box(bounding_box_of(f, 0.002)));
        });

        let buf = FrameBuffer::Rgba8(frame.clone());
        let rect = CropRect::new(-8, -8, size / 2 + 16, size / 2 + 16);
        group.bench_with_input(BenchmarkId::new("crop_padded", size), &buf, |b, f| {
            b.iter(|| black_box(crop_frame(f, &rect)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bbox);
criterion_main!(benches);
