//! Core library for packing animation frame folders into a sprite sheet.
//!
//! - Processing: chroma-key removal, nearest-neighbor resize, alpha/color trim with
//!   even-edge alignment and even padding for HD subjects
//! - Layout: ordered row fill with an automatic width search
//! - Output: sheet bitmap (plus a half-size copy for HD) and a `.sprite` document
//!
//! Quick example:
//! ```ignore
//! use std::path::Path;
//! use frame_packer_core::{PackContext, pack_subject, write_outputs};
//! # fn main() -> anyhow::Result<()> {
//! let ctx = PackContext::builder().hd(false).build();
//! let subject = Path::new("themes/forest/slime");
//! let out = pack_subject(subject, &ctx)?;
//! write_outputs(&out, subject, "slime", &ctx)?;
//! println!("{}", out.stats().summary());
//! # Ok(()) }
//! ```

pub mod color;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod transform;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use layout::*;
pub use loader::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `frame_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        AnimationSettings, BackgroundColor, Offset, PackContext, PackContextBuilder,
        RecoverCroppedOffset, SheetSize, SubjectSettings,
    };
    pub use crate::error::PackError;
    pub use crate::export::{NamedAnimation, SpriteDocument, SpriteFrame};
    pub use crate::loader::AnimationFrames;
    pub use crate::model::{AnimationGroup, LayoutResult, PackStats, ProcessedSprite, Rect};
    pub use crate::transform::TrimMode;
    pub use crate::{
        PackOutput, layout_for_width, pack_animations, pack_subject, select_layout,
        write_outputs,
    };
}
