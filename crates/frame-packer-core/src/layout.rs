//! Row-based sheet layout.
//!
//! Sprites keep their list order: they fill rows left to right and a new row
//! starts whenever the next sprite would overflow the width limit. Inside a row
//! sprites sit on a common baseline (bottom-aligned). Without an explicit sheet
//! width, a small set of candidate widths is tried and the best-scoring layout
//! wins.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::config::PackContext;
use crate::error::{PackError, Result};
use crate::model::LayoutResult;

/// Output of [`layout_for_width`]: content size and one slot per sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub size: (u32, u32),
    pub positions: Vec<Option<(u32, u32)>>,
}

#[derive(Debug, Default)]
struct Row {
    indices: Vec<usize>,
    width: u32,
    height: u32,
}

/// Greedy row fill of `sizes` within `width_limit`.
///
/// Gaps are 2px for HD subjects and 1px otherwise. For HD subjects every
/// sprite x-origin and every row y-origin is rounded up to even.
pub fn layout_for_width(
    sizes: &[(u32, u32)],
    width_limit: u32,
    ctx: &PackContext,
) -> Result<RowLayout> {
    let gap = ctx.gap();
    let align = |v: u32| if ctx.is_hd { v + v % 2 } else { v };
    let Some(widest) = sizes.iter().map(|s| s.0).max() else {
        return Ok(RowLayout {
            size: (0, 0),
            positions: Vec::new(),
        });
    };
    if width_limit < widest {
        return Err(PackError::WidthTooNarrow {
            width_limit,
            widest,
        });
    }

    let mut rows: Vec<Row> = Vec::new();
    let mut current = Row::default();
    for (index, &(w, h)) in sizes.iter().enumerate() {
        if !current.indices.is_empty() {
            let advanced = align(current.width + gap);
            if advanced + w > width_limit {
                rows.push(std::mem::take(&mut current));
            } else {
                current.width = advanced;
            }
        }
        current.indices.push(index);
        current.width += w;
        current.height = current.height.max(h);
    }
    if !current.indices.is_empty() {
        rows.push(current);
    }

    let mut positions = vec![None; sizes.len()];
    let mut y_offset = 0u32;
    for (row_index, row) in rows.iter().enumerate() {
        if row_index > 0 {
            y_offset = align(y_offset + gap);
        }
        let mut x_offset = 0u32;
        for (item, &sprite) in row.indices.iter().enumerate() {
            let (w, h) = sizes[sprite];
            positions[sprite] = Some((x_offset, y_offset + (row.height - h)));
            x_offset += w;
            if item + 1 < row.indices.len() {
                x_offset = align(x_offset + gap);
            }
        }
        y_offset += row.height;
    }
    let width = rows.iter().map(|r| r.width).max().unwrap_or(0);

    Ok(RowLayout {
        size: (width, y_offset),
        positions,
    })
}

/// Search candidate widths for the best layout.
///
/// Candidates are the widest sprite, the single-row width, and every prefix
/// width (with gaps) of the sprite list, tried in ascending order. Layouts
/// taller than an explicit sheet height are skipped. The winner minimizes
/// `(|sheet height - height|, |width - height|, area)`; ties keep the
/// narrower candidate.
pub fn auto_layout(sizes: &[(u32, u32)], ctx: &PackContext) -> Result<RowLayout> {
    let gap = ctx.gap();
    let height_limit = ctx.subject.sheet.height;
    let Some(widest) = sizes.iter().map(|s| s.0).max() else {
        return Ok(RowLayout {
            size: (0, 0),
            positions: Vec::new(),
        });
    };
    let total: u32 = sizes.iter().map(|s| s.0).sum();
    let gaps = gap * (sizes.len() as u32 - 1);

    let mut candidates = BTreeSet::new();
    candidates.insert(widest);
    candidates.insert(total + gaps);
    let mut prefix = 0u32;
    for (i, &(w, _)) in sizes.iter().enumerate() {
        prefix += w;
        candidates.insert(widest.max(prefix + gap * i as u32));
    }

    let mut best: Option<((u32, u32, u64), u32, RowLayout)> = None;
    for &width_limit in &candidates {
        let layout = match layout_for_width(sizes, width_limit, ctx) {
            Ok(l) => l,
            Err(e) => {
                debug!(width_limit, error = %e, "candidate rejected");
                continue;
            }
        };
        let (w, h) = layout.size;
        if let Some(limit) = height_limit {
            if h > limit {
                debug!(width_limit, height = h, limit, "candidate too tall");
                continue;
            }
        }
        let height_gap = height_limit.map_or(0, |limit| limit.abs_diff(h));
        let score = (height_gap, w.abs_diff(h), w as u64 * h.max(1) as u64);
        if best.as_ref().is_none_or(|(s, _, _)| score < *s) {
            best = Some((score, width_limit, layout));
        }
    }

    match best {
        Some((score, width_limit, layout)) => {
            debug!(width_limit, ?score, "auto layout selected");
            Ok(layout)
        }
        None => Err(PackError::NoViableLayout {
            candidates: candidates.len(),
        }),
    }
}

/// Choose the layout for a subject and derive the canvas size.
///
/// - no sprites: the canvas is the configured sheet size (0 where unset)
/// - explicit sheet width: one row fill at that width; the content must fit an
///   explicit sheet height
/// - otherwise: [`auto_layout`]
///
/// Explicit sheet dimensions replace the content size on the canvas.
#[instrument(skip_all, fields(sprites = sizes.len()))]
pub fn select_layout(sizes: &[(u32, u32)], ctx: &PackContext) -> Result<LayoutResult> {
    let sheet = ctx.subject.sheet;
    if sizes.is_empty() {
        let canvas = (sheet.width.unwrap_or(0), sheet.height.unwrap_or(0));
        return Ok(LayoutResult {
            content_size: canvas,
            canvas_size: canvas,
            positions: Vec::new(),
        });
    }

    let layout = match sheet.width {
        Some(width) => {
            let layout = layout_for_width(sizes, width, ctx)?;
            if let Some(limit) = sheet.height {
                if layout.size.1 > limit {
                    return Err(PackError::HeightExceeded {
                        height: layout.size.1,
                        limit,
                    });
                }
            }
            layout
        }
        None => auto_layout(sizes, ctx)?,
    };

    let canvas_size = (
        sheet.width.unwrap_or(layout.size.0),
        sheet.height.unwrap_or(layout.size.1),
    );
    let positions = resolve_positions(layout.positions)?;
    info!(
        content_w = layout.size.0,
        content_h = layout.size.1,
        canvas_w = canvas_size.0,
        canvas_h = canvas_size.1,
        "layout chosen"
    );
    Ok(LayoutResult {
        content_size: layout.size,
        canvas_size,
        positions,
    })
}

/// Unwrap every position slot; any empty slot fails the whole layout.
pub fn resolve_positions(slots: Vec<Option<(u32, u32)>>) -> Result<Vec<(u32, u32)>> {
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(PackError::UnresolvedPosition { index }))
        .collect()
}
