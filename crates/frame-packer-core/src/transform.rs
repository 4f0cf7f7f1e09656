use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::color::rgba_distance2;
use crate::config::BackgroundColor;

/// How the trim box of a frame is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimMode {
    /// Keep every pixel with non-zero alpha.
    Alpha,
    /// Keep every pixel farther than `threshold` from `color` (RGBA metric).
    Color {
        color: BackgroundColor,
        threshold: u32,
    },
}

/// Nearest-neighbor resize by `percent`. Sizes are rounded half-to-even and
/// floored at 1. Returns the input untouched when the percent is 100 or not
/// positive, or when rounding keeps the size.
pub fn resize_percent(image: RgbaImage, percent: i32) -> RgbaImage {
    if percent == 100 || percent <= 0 {
        return image;
    }
    let scale = percent as f64 / 100.0;
    let (w, h) = image.dimensions();
    let nw = ((w as f64 * scale).round_ties_even() as u32).max(1);
    let nh = ((h as f64 * scale).round_ties_even() as u32).max(1);
    if (nw, nh) == (w, h) {
        return image;
    }
    imageops::resize(&image, nw, nh, FilterType::Nearest)
}

/// Nearest-neighbor half-size copy: `ceil(dim / 2)` per axis, at least 1.
pub fn half_size(image: &RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let hw = w.div_ceil(2).max(1);
    let hh = h.div_ceil(2).max(1);
    imageops::resize(image, hw, hh, FilterType::Nearest)
}

/// Crop `image` to its trim box. Returns the kept image and the top-left of
/// the box. An image with nothing to keep, or whose box spans the whole image,
/// comes back unchanged with offset `(0, 0)`.
///
/// With `hd` the box is grown to even edges (see [`align_even_box`]).
pub fn trim(image: RgbaImage, mode: TrimMode, hd: bool) -> (RgbaImage, (u32, u32)) {
    let (w, h) = image.dimensions();
    let found = match mode {
        TrimMode::Alpha => alpha_box(&image),
        TrimMode::Color { color, threshold } => color_box(&image, color, threshold),
    };
    let Some((mut left, mut top, mut right, mut bottom)) = found else {
        return (image, (0, 0));
    };
    if hd {
        (left, top, right, bottom) = align_even_box(left, top, right, bottom, (w, h));
    }
    if (left, top, right, bottom) == (0, 0, w, h) {
        return (image, (0, 0));
    }
    let cropped = imageops::crop_imm(&image, left, top, right - left, bottom - top).to_image();
    (cropped, (left, top))
}

/// Exclusive box of all pixels with non-zero alpha.
fn alpha_box(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = image.dimensions();
    let (mut left, mut top, mut right, mut bottom) = (w, h, 0, 0);
    let mut any = false;
    for (x, y, px) in image.enumerate_pixels() {
        if px.0[3] != 0 {
            any = true;
            left = left.min(x);
            top = top.min(y);
            right = right.max(x);
            bottom = bottom.max(y);
        }
    }
    any.then_some((left, top, right + 1, bottom + 1))
}

/// Exclusive box of rows and columns holding a pixel that is not close to the
/// background color.
fn color_box(
    image: &RgbaImage,
    color: BackgroundColor,
    threshold: u32,
) -> Option<(u32, u32, u32, u32)> {
    let (w, h) = image.dimensions();
    let thr2 = threshold as u64 * threshold as u64;
    let target = [color.r, color.g, color.b, color.a];
    let mut row_has = vec![false; h as usize];
    let mut col_has = vec![false; w as usize];
    for (x, y, px) in image.enumerate_pixels() {
        if rgba_distance2(px.0, target) > thr2 {
            row_has[y as usize] = true;
            col_has[x as usize] = true;
        }
    }
    let top = row_has.iter().position(|&v| v)?;
    let bottom = row_has.iter().rposition(|&v| v)? + 1;
    let left = col_has.iter().position(|&v| v)?;
    let right = col_has.iter().rposition(|&v| v)? + 1;
    Some((left as u32, top as u32, right as u32, bottom as u32))
}

/// Grow an exclusive box so that every edge is even, never past `size`.
/// If an axis still has odd length (the far edge hit the image border), the
/// far edge grows by one when possible, otherwise the near edge moves one
/// pixel toward zero, growing the box on that side.
pub fn align_even_box(
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
    size: (u32, u32),
) -> (u32, u32, u32, u32) {
    let (w, h) = size;
    let mut l = left - left % 2;
    let mut t = top - top % 2;
    let mut r = (right + right % 2).min(w);
    let mut b = (bottom + bottom % 2).min(h);

    if (r - l) % 2 == 1 {
        if r < w {
            r += 1;
        } else if l > 0 {
            l -= 1;
        }
    }
    if (b - t) % 2 == 1 {
        if b < h {
            b += 1;
        } else if t > 0 {
            t -= 1;
        }
    }
    (l, t, r, b)
}

/// Pad an image on the right/bottom with transparent pixels so both
/// dimensions are even.
pub fn ensure_even_dimensions(image: RgbaImage) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (nw, nh) = (w + w % 2, h + h % 2);
    if (nw, nh) == (w, h) {
        return image;
    }
    let mut padded = RgbaImage::new(nw, nh);
    imageops::replace(&mut padded, &image, 0, 0);
    padded
}
