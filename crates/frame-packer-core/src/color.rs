use image::RgbaImage;

use crate::config::BackgroundColor;

/// Erase every visible pixel whose RGB lies within `threshold` (Euclidean,
/// three channels) of `target`. Alpha is set to 0; with `reduce_file_size`
/// the color channels are zeroed as well so the PNG compresses better.
/// Fully transparent pixels are left alone.
pub fn remove_background(
    image: &mut RgbaImage,
    target: BackgroundColor,
    threshold: u32,
    reduce_file_size: bool,
) {
    let thr2 = threshold as u64 * threshold as u64;
    for px in image.pixels_mut() {
        let [r, g, b, a] = px.0;
        if a == 0 {
            continue;
        }
        if rgb_distance2([r, g, b], [target.r, target.g, target.b]) <= thr2 {
            if reduce_file_size {
                px.0 = [0, 0, 0, 0];
            } else {
                px.0[3] = 0;
            }
        }
    }
}

/// Squared distance over R, G and B only.
pub fn rgb_distance2(a: [u8; 3], b: [u8; 3]) -> u64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i64 - y as i64;
            (d * d) as u64
        })
        .sum()
}

/// Squared distance over R, G, B and A. Used by color trimming, which also
/// treats alpha as a color channel.
pub fn rgba_distance2(a: [u8; 4], b: [u8; 4]) -> u64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i64 - y as i64;
            (d * d) as u64
        })
        .sum()
}
