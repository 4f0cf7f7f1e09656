use std::path::{Path, PathBuf};

use image::{ImageReader, RgbaImage};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PackError, Result};

/// Decoded frames of one animation folder, in file-name order.
#[derive(Debug, Clone)]
pub struct AnimationFrames {
    pub name: String,
    pub frames: Vec<RgbaImage>,
}

/// Immediate children of `dir`, sorted by file name.
fn sorted_children(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    if !dir.is_dir() {
        return Err(PackError::MissingDirectory(dir.to_path_buf()));
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|e| e.map_err(|err| PackError::Io(err.into())))
        .collect()
}

/// Animation folder names under a subject's `raw/` directory.
pub fn discover_animations(raw_dir: &Path) -> Result<Vec<String>> {
    Ok(sorted_children(raw_dir)?
        .into_iter()
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect())
}

fn is_png(p: &Path) -> bool {
    p.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// PNG files directly inside `animation_dir`.
pub fn frame_paths(animation_dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(sorted_children(animation_dir)?
        .into_iter()
        .filter(|e| e.file_type().is_file() && is_png(e.path()))
        .map(|e| e.into_path())
        .collect())
}

/// Decode one frame to RGBA8.
pub fn load_frame(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    debug!(?path, w = img.width(), h = img.height(), "decoded frame");
    Ok(img.to_rgba8())
}

/// Decode every frame of an animation folder.
pub fn load_frames(animation_dir: &Path) -> Result<Vec<RgbaImage>> {
    frame_paths(animation_dir)?
        .iter()
        .map(|p| load_frame(p))
        .collect()
}

/// Load all animations under `raw_dir`, in folder-name order.
pub fn load_animations(raw_dir: &Path) -> Result<Vec<AnimationFrames>> {
    discover_animations(raw_dir)?
        .into_iter()
        .map(|name| {
            let frames = load_frames(&raw_dir.join(&name))?;
            Ok(AnimationFrames { name, frames })
        })
        .collect()
}
