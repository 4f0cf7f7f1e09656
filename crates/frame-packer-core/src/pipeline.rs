use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, RgbaImage};
use tracing::{debug, info, instrument, warn};

use crate::color;
use crate::compositing::{AtlasImages, compose_sheet};
use crate::config::PackContext;
use crate::error::{PackError, Result};
use crate::export::{SpriteDocument, export_sprite_document};
use crate::layout::select_layout;
use crate::loader::{AnimationFrames, load_animations};
use crate::model::{AnimationGroup, LayoutResult, PackStats, ProcessedSprite};
use crate::transform::{TrimMode, ensure_even_dimensions, resize_percent, trim};

/// Name of the folder holding a subject's animation folders.
pub const RAW_DIR: &str = "raw";
/// Name of the folder receiving the generated files.
pub const GENERATED_DIR: &str = "generated";

/// Output of a packing run: sprites, layout, bitmaps and metadata.
#[derive(Debug)]
pub struct PackOutput {
    pub sprites: Vec<ProcessedSprite>,
    pub groups: Vec<AnimationGroup>,
    pub layout: LayoutResult,
    pub images: AtlasImages,
    pub document: SpriteDocument,
}

impl PackOutput {
    pub fn stats(&self) -> PackStats {
        PackStats::compute(&self.sprites, &self.groups, &self.layout)
    }
}

/// Run one frame through background removal, resize, trim and even padding.
pub fn process_frame(
    image: RgbaImage,
    animation: &str,
    ctx: &PackContext,
) -> Result<ProcessedSprite> {
    let subject = &ctx.subject;
    let background = ctx.background_color()?;
    let mut image = image;

    if let (Some(bg), true) = (background, subject.remove_background) {
        color::remove_background(&mut image, bg, subject.color_threshold, ctx.reduce_file_size);
    }

    let image = resize_percent(image, subject.resize_to_percent);
    let original_size = image.dimensions();

    let (image, trim_offset) = if subject.crop_sprites {
        let mode = match background {
            Some(color) if !subject.remove_background => TrimMode::Color {
                color,
                threshold: subject.color_threshold,
            },
            _ => TrimMode::Alpha,
        };
        trim(image, mode, ctx.is_hd)
    } else {
        (image, (0, 0))
    };

    let image = if ctx.is_hd {
        ensure_even_dimensions(image)
    } else {
        image
    };

    debug!(
        animation,
        orig_w = original_size.0,
        orig_h = original_size.1,
        w = image.width(),
        h = image.height(),
        trim_x = trim_offset.0,
        trim_y = trim_offset.1,
        "processed frame"
    );
    Ok(ProcessedSprite {
        image,
        original_size,
        trim_offset,
        animation: animation.to_string(),
    })
}

/// Packs decoded animation frames into a sheet and its `.sprite` document.
///
/// Animations keep the order of `inputs`, frames keep their order within each
/// animation, and frame indices in the document count across animations.
/// Nothing is written; see [`write_outputs`].
#[instrument(skip_all, fields(animations = inputs.len()))]
pub fn pack_animations(inputs: Vec<AnimationFrames>, ctx: &PackContext) -> Result<PackOutput> {
    ctx.validate()?;

    let mut sprites: Vec<ProcessedSprite> = Vec::new();
    let mut groups: Vec<AnimationGroup> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let settings = ctx.animation(&input.name);
        let start = sprites.len();
        for frame in input.frames {
            sprites.push(process_frame(frame, &input.name, ctx)?);
        }
        info!(animation = %input.name, frames = sprites.len() - start, "animation processed");
        groups.push(AnimationGroup {
            name: input.name,
            frames: start..sprites.len(),
            delay: settings.delay,
            offset: settings.offset(),
            recover_cropped_offset: settings.recover_cropped_offset,
            regenerate: settings.regenerate,
        });
    }

    let sizes: Vec<(u32, u32)> = sprites.iter().map(|s| s.size()).collect();
    let layout = select_layout(&sizes, ctx)?;
    let images = compose_sheet(&sprites, &layout.positions, layout.canvas_size, ctx)?;
    let document = export_sprite_document(
        &sprites,
        &layout.positions,
        layout.canvas_size,
        &groups,
        ctx,
    );

    Ok(PackOutput {
        sprites,
        groups,
        layout,
        images,
        document,
    })
}

/// Loads `<subject_dir>/raw` and packs it.
pub fn pack_subject(subject_dir: &Path, ctx: &PackContext) -> Result<PackOutput> {
    let inputs = load_animations(&subject_dir.join(RAW_DIR))?;
    pack_animations(inputs, ctx)
}

/// Paths of the files a run writes, `@2x` only for HD subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub sheet: PathBuf,
    pub sheet_2x: Option<PathBuf>,
    pub sprite: PathBuf,
}

impl OutputPaths {
    pub fn new(generated_dir: &Path, subject_name: &str, hd: bool) -> Self {
        Self {
            sheet: generated_dir.join(format!("{subject_name}.png")),
            sheet_2x: hd.then(|| generated_dir.join(format!("{subject_name}@2x.png"))),
            sprite: generated_dir.join(format!("{subject_name}.sprite")),
        }
    }
}

/// Replace the generated files of a subject with `out`.
///
/// Existing files in `<subject_dir>/generated` are removed first; removal
/// failures are logged and ignored. Sub-directories are left alone.
#[instrument(skip_all, fields(subject = subject_name))]
pub fn write_outputs(
    out: &PackOutput,
    subject_dir: &Path,
    subject_name: &str,
    ctx: &PackContext,
) -> Result<OutputPaths> {
    let generated = subject_dir.join(GENERATED_DIR);
    clear_generated(&generated);
    fs::create_dir_all(&generated)?;

    let paths = OutputPaths::new(&generated, subject_name, ctx.is_hd);
    save_png(&out.images.primary, &paths.sheet, ctx.reduce_file_size)?;
    info!(
        path = ?paths.sheet,
        w = out.images.primary.width(),
        h = out.images.primary.height(),
        "wrote sheet"
    );
    if let (Some(retina), Some(path)) = (&out.images.retina, &paths.sheet_2x) {
        save_png(retina, path, ctx.reduce_file_size)?;
        info!(?path, w = retina.width(), h = retina.height(), "wrote @2x sheet");
    }
    fs::write(&paths.sprite, out.document.to_json_pretty()?)?;
    info!(path = ?paths.sprite, frames = out.document.frames.len(), "wrote sprite metadata");
    Ok(paths)
}

fn clear_generated(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!(?path, "removed stale output"),
            Err(e) => warn!(?path, error = %e, "could not remove stale output"),
        }
    }
}

fn save_png(img: &RgbaImage, path: &Path, reduce_file_size: bool) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    let encoder = if reduce_file_size {
        PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive)
    } else {
        PngEncoder::new(writer)
    };
    encoder
        .write_image(img.as_raw(), img.width(), img.height(), image::ExtendedColorType::Rgba8)
        .map_err(PackError::from)
}
