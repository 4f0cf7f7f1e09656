use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::config::{Offset, RecoverCroppedOffset};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A frame after background removal, resize, trim and even padding.
/// Index `i` of the sprite list is frame `i` of the exported document.
#[derive(Debug, Clone)]
pub struct ProcessedSprite {
    pub image: RgbaImage,
    /// Post-resize, pre-trim size.
    pub original_size: (u32, u32),
    /// Top-left of the kept box inside `original_size`.
    pub trim_offset: (u32, u32),
    pub animation: String,
}

impl ProcessedSprite {
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// True if trimming removed any border.
    pub fn trimmed(&self) -> bool {
        self.trim_offset != (0, 0) || self.image.dimensions() != self.original_size
    }
}

/// One animation folder: a contiguous range of the flattened sprite list plus
/// the settings that shape its exported frames.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationGroup {
    pub name: String,
    pub frames: Range<usize>,
    pub delay: i32,
    pub offset: Offset,
    pub recover_cropped_offset: RecoverCroppedOffset,
    pub regenerate: bool,
}

/// Placement of every sprite of a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResult {
    /// Tight bound of the placed sprites.
    pub content_size: (u32, u32),
    /// Final sheet size; an explicit sheet width/height replaces the content axis.
    pub canvas_size: (u32, u32),
    /// Top-left of each sprite, in sprite-list order.
    pub positions: Vec<(u32, u32)>,
}

/// Statistics about sheet packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_frames: usize,
    pub num_animations: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// `canvas_width * canvas_height`.
    pub canvas_area: u64,
    /// Sum of the sprite areas.
    pub used_area: u64,
    /// used_area / canvas_area (0.0 to 1.0).
    pub occupancy: f64,
    /// Number of frames whose border was trimmed.
    pub num_trimmed: usize,
}

impl PackStats {
    pub fn compute(
        sprites: &[ProcessedSprite],
        groups: &[AnimationGroup],
        layout: &LayoutResult,
    ) -> Self {
        let (canvas_width, canvas_height) = layout.canvas_size;
        let canvas_area = canvas_width as u64 * canvas_height as u64;
        let used_area = sprites
            .iter()
            .map(|s| s.image.width() as u64 * s.image.height() as u64)
            .sum();
        let occupancy = if canvas_area > 0 {
            used_area as f64 / canvas_area as f64
        } else {
            0.0
        };
        Self {
            num_frames: sprites.len(),
            num_animations: groups.len(),
            canvas_width,
            canvas_height,
            canvas_area,
            used_area,
            occupancy,
            num_trimmed: sprites.iter().filter(|s| s.trimmed()).count(),
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Frames: {}, Animations: {}, Sheet: {}x{}, Occupancy: {:.2}%, Used Area: {} px², Wasted: {} px², Trimmed: {}",
            self.num_frames,
            self.num_animations,
            self.canvas_width,
            self.canvas_height,
            self.occupancy * 100.0,
            self.used_area,
            self.wasted_area(),
            self.num_trimmed,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.canvas_area.saturating_sub(self.used_area)
    }
}
