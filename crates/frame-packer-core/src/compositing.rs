use image::RgbaImage;
use tracing::instrument;

use crate::config::PackContext;
use crate::error::{PackError, Result};
use crate::model::ProcessedSprite;
use crate::transform::half_size;

/// Sheet bitmaps of one run.
#[derive(Debug, Clone)]
pub struct AtlasImages {
    /// `{subject}.png`: the half-size sheet for HD subjects, the full sheet otherwise.
    pub primary: RgbaImage,
    /// `{subject}@2x.png`: the full-size sheet, HD subjects only.
    pub retina: Option<RgbaImage>,
}

/// Blit `src` into `canvas` with its top-left at (dx, dy).
///
/// The canvas is expected to be clear where `src` lands, so alpha-over reduces
/// to copying every pixel with non-zero alpha. Pixels falling outside the
/// canvas are dropped.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32) {
    let (cw, ch) = canvas.dimensions();
    for (x, y, px) in src.enumerate_pixels() {
        if px.0[3] == 0 {
            continue;
        }
        let (tx, ty) = (dx + x, dy + y);
        if tx < cw && ty < ch {
            canvas.put_pixel(tx, ty, *px);
        }
    }
}

/// Draw every sprite at its position onto a transparent canvas.
///
/// Fails with [`PackError::EmptyCanvas`] when either canvas dimension is 1 or
/// less. HD subjects additionally get a half-size copy, which becomes the
/// primary image.
#[instrument(skip_all, fields(w = canvas_size.0, h = canvas_size.1))]
pub fn compose_sheet(
    sprites: &[ProcessedSprite],
    positions: &[(u32, u32)],
    canvas_size: (u32, u32),
    ctx: &PackContext,
) -> Result<AtlasImages> {
    let (width, height) = canvas_size;
    if width <= 1 || height <= 1 {
        return Err(PackError::EmptyCanvas { width, height });
    }
    let mut canvas = RgbaImage::new(width, height);
    for (sprite, &(x, y)) in sprites.iter().zip(positions) {
        blit_rgba(&sprite.image, &mut canvas, x, y);
    }
    if ctx.is_hd {
        Ok(AtlasImages {
            primary: half_size(&canvas),
            retina: Some(canvas),
        })
    } else {
        Ok(AtlasImages {
            primary: canvas,
            retina: None,
        })
    }
}
