use frame_baker_core::prelude::*;
use frame_baker_core::{Rgba16Image, bounding_box_of};
use image::{ImageFormat, Rgba, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::path::PathBuf;

fn rect_frame(w: u32, h: u32, r: BoundingBox) -> RgbaImage {
    let mut img = RgbaImage::new(w, h);
    for y in r.y..r.y + r.height {
        for x in r.x..r.x + r.width {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    img
}

#[test]
fn opaque_rectangle_is_found_exactly() {
    let r = BoundingBox::new(7, 3, 12, 5);
    for (w, h) in [(32, 32), (20, 9), (200, 64)] {
        let img = rect_frame(w, h, r);
        let bbox = bounding_box_of(&img, frame_baker_core::DEFAULT_ALPHA_THRESHOLD);
        assert_eq!(bbox, Some(r), "image {}x{}", w, h);
    }
}

#[test]
fn random_rectangles_round_trip() {
    let mut rng = StdRng::seed_from_u64(0xF7A3E);
    for _ in 0..200 {
        let w = rng.gen_range(1..48);
        let h = rng.gen_range(1..48);
        let rw = rng.gen_range(1..=w);
        let rh = rng.gen_range(1..=h);
        let rx = rng.gen_range(0..=w - rw);
        let ry = rng.gen_range(0..=h - rh);
        let r = BoundingBox::new(rx, ry, rw, rh);
        let img = rect_frame(w, h, r);
        assert_eq!(bounding_box_of(&img, 0.002), Some(r));
    }
}

#[test]
fn single_pixel_content_is_a_one_by_one_box() {
    let img = rect_frame(16, 16, BoundingBox::new(9, 4, 1, 1));
    let bbox = bounding_box_of(&img, 0.002).expect("bbox");
    assert_eq!((bbox.width, bbox.height), (1, 1));
    assert_eq!((bbox.right(), bbox.bottom()), (9, 4));
}

#[test]
fn scattered_pixels_span_their_extremes() {
    let mut img = RgbaImage::new(20, 20);
    img.put_pixel(3, 15, Rgba([0, 0, 0, 10]));
    img.put_pixel(17, 2, Rgba([0, 0, 0, 200]));
    assert_eq!(
        bounding_box_of(&img, 0.002),
        Some(BoundingBox::new(3, 2, 15, 14))
    );
}

#[test]
fn eight_bit_threshold_boundary() {
    // 0 / 255 is transparent; 1 / 255 (~0.0039) is above 0.002
    let mut img = RgbaImage::new(8, 8);
    img.put_pixel(1, 1, Rgba([255, 0, 0, 0]));
    assert_eq!(bounding_box_of(&img, 0.002), None);
    img.put_pixel(6, 5, Rgba([255, 0, 0, 1]));
    assert_eq!(
        bounding_box_of(&img, 0.002),
        Some(BoundingBox::new(6, 5, 1, 1))
    );
}

#[test]
fn sixteen_bit_threshold_boundary() {
    // 131 / 65535 = 0.001999 (transparent), 132 / 65535 = 0.002014 (visible)
    let mut img = Rgba16Image::new(8, 8);
    img.put_pixel(1, 1, Rgba([u16::MAX, 0, 0, 131]));
    assert_eq!(bounding_box_of(&img, 0.002), None);
    img.put_pixel(5, 6, Rgba([u16::MAX, 0, 0, 132]));
    assert_eq!(
        bounding_box_of(&img, 0.002),
        Some(BoundingBox::new(5, 6, 1, 1))
    );
}

#[test]
fn pixel_exactly_at_custom_threshold_is_transparent() {
    // threshold 0.2 = 51 / 255 exactly
    let mut img = RgbaImage::new(4, 4);
    img.put_pixel(0, 0, Rgba([0, 0, 0, 51]));
    assert_eq!(bounding_box_of(&img, 0.2), None);
    img.put_pixel(3, 3, Rgba([0, 0, 0, 52]));
    assert_eq!(bounding_box_of(&img, 0.2), Some(BoundingBox::new(3, 3, 1, 1)));
}

#[test]
fn empty_frame_is_degenerate() {
    let frames = vec![
        Frame {
            path: PathBuf::from("0001.png"),
            format: ImageFormat::Png,
            buffer: FrameBuffer::Rgba8(rect_frame(8, 8, BoundingBox::new(1, 1, 2, 2))),
        },
        Frame {
            path: PathBuf::from("0002.png"),
            format: ImageFormat::Png,
            buffer: FrameBuffer::Rgba8(RgbaImage::new(8, 8)),
        },
    ];
    match plan_crop(&frames, &CropConfig::default()) {
        Err(FrameBakeError::DegenerateFrame { path }) => {
            assert_eq!(path, PathBuf::from("0002.png"));
        }
        other => panic!("expected DegenerateFrame, got {:?}", other),
    }
}
