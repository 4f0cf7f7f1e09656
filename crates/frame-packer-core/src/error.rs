use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid background color: {0:?}")]
    InvalidColor(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Canvas {width}x{height} is too small to hold any sprite")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("Sheet width {width_limit} is smaller than the widest sprite ({widest})")]
    WidthTooNarrow { width_limit: u32, widest: u32 },
    #[error("Sprites need {height}px but the sheet height is limited to {limit}px")]
    HeightExceeded { height: u32, limit: u32 },
    #[error("No automatic layout satisfies the constraints ({candidates} widths tried)")]
    NoViableLayout { candidates: usize },
    #[error("Layout did not assign a position to sprite #{index}")]
    UnresolvedPosition { index: usize },
}

pub type Result<T> = std::result::Result<T, PackError>;
