use frame_packer_core::prelude::*;
use frame_packer_core::transform::{ensure_even_dimensions, trim};
use image::{Rgba, RgbaImage};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: BackgroundColor = BackgroundColor {
    r: 0,
    g: 255,
    b: 0,
    a: 255,
};

fn two_dots() -> RgbaImage {
    let mut img = RgbaImage::new(10, 10);
    img.put_pixel(3, 2, RED);
    img.put_pixel(6, 7, RED);
    img
}

#[test]
fn alpha_trim_tight_box() {
    let (img, offset) = trim(two_dots(), TrimMode::Alpha, false);
    assert_eq!(img.dimensions(), (4, 6));
    assert_eq!(offset, (3, 2));
    assert_eq!(*img.get_pixel(0, 0), RED);
    assert_eq!(*img.get_pixel(3, 5), RED);
}

#[test]
fn alpha_trim_hd_grows_to_even_edges() {
    let (img, offset) = trim(two_dots(), TrimMode::Alpha, true);
    assert_eq!(img.dimensions(), (6, 6));
    assert_eq!(offset, (2, 2));
    assert_eq!(*img.get_pixel(1, 0), RED);
    assert_eq!(*img.get_pixel(4, 5), RED);
}

#[test]
fn color_trim_keeps_off_key_pixels() {
    let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255]));
    img.put_pixel(2, 5, RED);
    let mode = TrimMode::Color {
        color: GREEN,
        threshold: 100,
    };
    let (img, offset) = trim(img, mode, false);
    assert_eq!(img.dimensions(), (1, 1));
    assert_eq!(offset, (2, 5));
}

#[test]
fn color_trim_counts_alpha_difference() {
    // transparent black is far from opaque green, so nothing is trimmed
    let img = RgbaImage::new(5, 4);
    let mode = TrimMode::Color {
        color: GREEN,
        threshold: 100,
    };
    let (out, offset) = trim(img.clone(), mode, false);
    assert_eq!(out, img);
    assert_eq!(offset, (0, 0));
}

#[test]
fn fully_transparent_frame_is_kept() {
    let img = RgbaImage::new(7, 3);
    let (out, offset) = trim(img.clone(), TrimMode::Alpha, true);
    assert_eq!(out, img);
    assert_eq!(offset, (0, 0));
}

#[test]
fn trimming_is_idempotent() {
    let (once, _) = trim(two_dots(), TrimMode::Alpha, false);
    let (twice, offset) = trim(once.clone(), TrimMode::Alpha, false);
    assert_eq!(twice, once);
    assert_eq!(offset, (0, 0));
}

#[test]
fn hd_frames_end_up_even() {
    let mut img = RgbaImage::new(9, 4);
    img.put_pixel(8, 0, RED);
    img.put_pixel(2, 3, RED);
    let (img, offset) = trim(img, TrimMode::Alpha, true);
    assert_eq!(offset, (1, 0));
    assert_eq!(img.dimensions(), (8, 4));
    let padded = ensure_even_dimensions(RgbaImage::new(7, 5));
    assert_eq!(padded.dimensions(), (8, 6));
}
