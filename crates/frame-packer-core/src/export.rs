//! `.sprite` metadata export.
//!
//! Frame rectangles are in sheet pixels. For HD subjects the layout is computed
//! at double resolution and every coordinate is mapped onto the half-size sheet
//! with per-edge rounding: near edges round half up, far edges round away from
//! zero. Origin offsets use the same per-axis factor.

use serde::{Deserialize, Serialize};

use crate::config::{AnimationSettings, PackContext};
use crate::error::Result;
use crate::model::{AnimationGroup, ProcessedSprite};

/// Version tag written into every document.
pub const SPRITE_VERSION: &str = "Neoarc's Sprite v2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteFrame {
    /// `"<x> <y>"` origin offset.
    pub offset: String,
    /// `"<left> <top> <right> <bottom>"`.
    pub rect: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedAnimation {
    pub name: String,
    /// Comma-joined frame indices.
    pub frames: String,
    pub delay: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpriteDocument {
    pub frames: Vec<SpriteFrame>,
    pub named_animations: Vec<NamedAnimation>,
    /// Reserved; always empty.
    pub sub_positions: String,
    pub version: String,
}

impl SpriteDocument {
    /// Indented JSON text as written to `{subject}.sprite`.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `floor(v + 0.5)`.
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Rounds positive values up and negative values down, with a 1e-9 tolerance
/// so values a hair above an integer stay on it.
pub fn round_away_from_zero(v: f64) -> i64 {
    if v > 0.0 {
        (v - 1e-9).ceil() as i64
    } else if v < 0.0 {
        (v + 1e-9).floor() as i64
    } else {
        0
    }
}

/// Scale from the full sheet to the exported one along one axis.
fn axis_scale(dim: u32, hd: bool) -> f64 {
    if !hd || dim == 0 {
        1.0
    } else {
        (dim / 2) as f64 / dim as f64
    }
}

/// Build the `.sprite` document for placed sprites.
///
/// `positions[i]` is the sheet position of `sprites[i]`; `groups` partition
/// the sprite list in animation order. A sprite outside every group is
/// exported with default animation settings.
pub fn export_sprite_document(
    sprites: &[ProcessedSprite],
    positions: &[(u32, u32)],
    canvas_size: (u32, u32),
    groups: &[AnimationGroup],
    ctx: &PackContext,
) -> SpriteDocument {
    let hd = ctx.is_hd;
    let scale_x = axis_scale(canvas_size.0, hd);
    let scale_y = axis_scale(canvas_size.1, hd);
    let defaults = AnimationSettings::default();

    let frames = sprites
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (sprite, &(x, y)))| {
            let (w, h) = sprite.size();
            let (mut left, mut top) = (x as i64, y as i64);
            let (mut right, mut bottom) = ((x + w) as i64, (y + h) as i64);
            if hd {
                left = round_half_up(left as f64 * scale_x);
                top = round_half_up(top as f64 * scale_y);
                right = round_away_from_zero(right as f64 * scale_x);
                bottom = round_away_from_zero(bottom as f64 * scale_y);
            }

            let group = groups.iter().find(|g| g.frames.contains(&index));
            let (offset, recover) = match group {
                Some(g) => (g.offset, g.recover_cropped_offset),
                None => (defaults.offset(), defaults.recover_cropped_offset),
            };
            let factor = if hd { 2 } else { 1 };

            let (mut trim_left, mut trim_top) =
                (sprite.trim_offset.0 as i64, sprite.trim_offset.1 as i64);
            let (mut orig_w, mut orig_h) =
                (sprite.original_size.0 as i64, sprite.original_size.1 as i64);
            if !recover.x {
                trim_left = 0;
                orig_w = (right - left).abs() * factor;
            }
            if !recover.y {
                trim_top = 0;
                orig_h = (bottom - top).abs() * factor;
            }

            let origin_x = orig_w as f64 / 2.0 - trim_left as f64 + offset.x;
            let origin_y = orig_h as f64 - trim_top as f64 + offset.y;
            let origin_x = round_away_from_zero(origin_x * scale_x);
            let origin_y = round_away_from_zero(origin_y * scale_y);

            SpriteFrame {
                offset: format!("{origin_x} {origin_y}"),
                rect: format!("{left} {top} {right} {bottom}"),
            }
        })
        .collect();

    let named_animations = groups
        .iter()
        .map(|g| NamedAnimation {
            name: g.name.clone(),
            frames: g
                .frames
                .clone()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(","),
            delay: g.delay,
        })
        .collect();

    SpriteDocument {
        frames,
        named_animations,
        sub_positions: String::new(),
        version: SPRITE_VERSION.to_string(),
    }
}
