use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PackError, Result};

/// Chroma-key color parsed from `#RRGGBB` or `#RRGGBBAA`.
/// The six-digit form is fully opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl FromStr for BackgroundColor {
    type Err = PackError;
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PackError::InvalidColor(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| PackError::InvalidColor(s.to_string()))?;
        let color = if hex.len() == 6 {
            Self {
                r: (value >> 16) as u8,
                g: (value >> 8) as u8,
                b: value as u8,
                a: 255,
            }
        } else {
            Self {
                r: (value >> 24) as u8,
                g: (value >> 16) as u8,
                b: (value >> 8) as u8,
                a: value as u8,
            }
        };
        Ok(color)
    }
}

/// Explicit sheet dimensions. Unset axes are derived from the packed content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSize {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Per-subject processing settings (`<subject>/config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectSettings {
    /// Nearest-neighbor scale in percent; 100 or non-positive disables resizing.
    pub resize_to_percent: i32,
    /// Chroma-key color; `None` (or a blank string) means no background color.
    pub background_color: Option<String>,
    /// Euclidean color distance used by background removal and color trimming.
    pub color_threshold: u32,
    pub remove_background: bool,
    pub crop_sprites: bool,
    pub sheet: SheetSize,
}

impl Default for SubjectSettings {
    fn default() -> Self {
        Self {
            resize_to_percent: 100,
            background_color: None,
            color_threshold: 100,
            remove_background: true,
            crop_sprites: true,
            sheet: SheetSize::default(),
        }
    }
}

/// Extra origin shift applied to every frame of an animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default, alias = "X")]
    pub x: f64,
    #[serde(default, alias = "Y")]
    pub y: f64,
}

/// Whether the origin offset of each axis uses the pre-trim artwork box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverCroppedOffset {
    #[serde(default = "default_true")]
    pub x: bool,
    #[serde(default = "default_true")]
    pub y: bool,
}

impl Default for RecoverCroppedOffset {
    fn default() -> Self {
        Self { x: true, y: true }
    }
}

/// Per-animation settings (`raw/<animation>/config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Folder name under `raw/`. Not stored in the animation's own config file.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Carried for compatibility; the packing pipeline does not consult it.
    pub regenerate: bool,
    pub delay: i32,
    /// `None` behaves as `(0, 0)`.
    pub offset: Option<Offset>,
    pub recover_cropped_offset: RecoverCroppedOffset,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            regenerate: true,
            delay: 1,
            offset: None,
            recover_cropped_offset: RecoverCroppedOffset::default(),
        }
    }
}

impl AnimationSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn offset(&self) -> Offset {
        self.offset.unwrap_or_default()
    }
}

/// Settings snapshot for one packing run, built once and passed to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackContext {
    #[serde(default)]
    pub subject: SubjectSettings,
    /// Inherited from the owning game theme.
    #[serde(default = "default_true")]
    pub is_hd: bool,
    /// Program-wide: zero RGB of erased pixels and encode PNGs with best compression.
    #[serde(default)]
    pub reduce_file_size: bool,
    /// Settings of known animations. Order here is not the output order; the
    /// animation order always comes from the frames handed to the pipeline.
    #[serde(default)]
    pub animations: Vec<AnimationSettings>,
}

impl Default for PackContext {
    fn default() -> Self {
        Self {
            subject: SubjectSettings::default(),
            is_hd: true,
            reduce_file_size: false,
            animations: Vec::new(),
        }
    }
}

impl PackContext {
    /// Validates the settings before a run.
    ///
    /// Returns an error if:
    /// - the background color is set but cannot be parsed
    /// - an explicit sheet width or height is zero
    pub fn validate(&self) -> Result<()> {
        self.background_color()?;
        let sheet = self.subject.sheet;
        if sheet.width == Some(0) || sheet.height == Some(0) {
            return Err(PackError::InvalidConfig(format!(
                "sheet dimensions must be positive (width: {:?}, height: {:?})",
                sheet.width, sheet.height
            )));
        }
        Ok(())
    }

    /// Parsed chroma-key color. Blank strings count as unset.
    pub fn background_color(&self) -> Result<Option<BackgroundColor>> {
        match self.subject.background_color.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }

    /// Settings for `name`, or the defaults when the animation has none.
    pub fn animation(&self, name: &str) -> AnimationSettings {
        self.animations
            .iter()
            .find(|a| a.name == name)
            .cloned()
            .unwrap_or_else(|| AnimationSettings::named(name))
    }

    /// Pixels between neighbouring sprites, horizontally and vertically.
    pub fn gap(&self) -> u32 {
        if self.is_hd { 2 } else { 1 }
    }

    /// Create a fluent builder for `PackContext`.
    pub fn builder() -> PackContextBuilder {
        PackContextBuilder::new()
    }
}

fn default_true() -> bool {
    true
}

/// Builder for `PackContext` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackContextBuilder {
    ctx: PackContext,
}

impl PackContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: PackContext::default(),
        }
    }
    pub fn hd(mut self, v: bool) -> Self {
        self.ctx.is_hd = v;
        self
    }
    pub fn reduce_file_size(mut self, v: bool) -> Self {
        self.ctx.reduce_file_size = v;
        self
    }
    pub fn resize_to_percent(mut self, v: i32) -> Self {
        self.ctx.subject.resize_to_percent = v;
        self
    }
    pub fn background_color(mut self, v: Option<&str>) -> Self {
        self.ctx.subject.background_color = v.map(str::to_string);
        self
    }
    pub fn color_threshold(mut self, v: u32) -> Self {
        self.ctx.subject.color_threshold = v;
        self
    }
    pub fn remove_background(mut self, v: bool) -> Self {
        self.ctx.subject.remove_background = v;
        self
    }
    pub fn crop_sprites(mut self, v: bool) -> Self {
        self.ctx.subject.crop_sprites = v;
        self
    }
    pub fn sheet_width(mut self, v: Option<u32>) -> Self {
        self.ctx.subject.sheet.width = v;
        self
    }
    pub fn sheet_height(mut self, v: Option<u32>) -> Self {
        self.ctx.subject.sheet.height = v;
        self
    }
    pub fn subject(mut self, v: SubjectSettings) -> Self {
        self.ctx.subject = v;
        self
    }
    pub fn animation(mut self, v: AnimationSettings) -> Self {
        self.ctx.animations.retain(|a| a.name != v.name);
        self.ctx.animations.push(v);
        self
    }
    pub fn build(self) -> PackContext {
        self.ctx
    }
}
