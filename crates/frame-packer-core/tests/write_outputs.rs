use std::fs;
use std::path::Path;

use frame_packer_core::prelude::*;
use frame_packer_core::{frame_paths, GENERATED_DIR, RAW_DIR};
use image::{Rgba, RgbaImage};

fn save_frame(dir: &Path, name: &str, w: u32, h: u32) {
    fs::create_dir_all(dir).expect("mkdir");
    RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]))
        .save(dir.join(name))
        .expect("save frame");
}

fn subject_with_two_animations(root: &Path) -> std::path::PathBuf {
    let subject = root.join("slime");
    let raw = subject.join(RAW_DIR);
    save_frame(&raw.join("walk"), "01.png", 6, 4);
    save_frame(&raw.join("walk"), "02.png", 6, 4);
    save_frame(&raw.join("idle"), "00.png", 4, 4);
    subject
}

#[test]
fn writes_sheet_and_sprite_and_clears_stale_files() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let subject = subject_with_two_animations(tmp.path());
    let generated = subject.join(GENERATED_DIR);
    fs::create_dir_all(generated.join("keep")).expect("mkdir keep");
    fs::write(generated.join("old.png"), b"stale").expect("stale file");

    let ctx = PackContext::builder().hd(false).build();
    let out = pack_subject(&subject, &ctx).expect("pack");
    let paths = write_outputs(&out, &subject, "slime", &ctx).expect("write");

    assert!(paths.sheet.is_file());
    assert!(paths.sprite.is_file());
    assert!(paths.sheet_2x.is_none());
    assert!(!generated.join("old.png").exists());
    assert!(generated.join("keep").is_dir());

    let sheet = image::open(&paths.sheet).expect("open sheet").to_rgba8();
    assert_eq!(sheet.dimensions(), out.layout.canvas_size);

    let text = fs::read_to_string(&paths.sprite).expect("read sprite");
    let doc: SpriteDocument = serde_json::from_str(&text).expect("parse sprite");
    assert_eq!(doc, out.document);
}

#[test]
fn animations_follow_folder_name_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let subject = subject_with_two_animations(tmp.path());
    let ctx = PackContext::builder().hd(false).build();
    let out = pack_subject(&subject, &ctx).expect("pack");

    let names: Vec<_> = out
        .document
        .named_animations
        .iter()
        .map(|a| (a.name.as_str(), a.frames.as_str()))
        .collect();
    assert_eq!(names, vec![("idle", "0"), ("walk", "1,2")]);
}

#[test]
fn hd_subject_writes_retina_sheet() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let subject = subject_with_two_animations(tmp.path());
    let ctx = PackContext::builder().hd(true).reduce_file_size(true).build();
    let out = pack_subject(&subject, &ctx).expect("pack");
    let paths = write_outputs(&out, &subject, "slime", &ctx).expect("write");

    let retina_path = paths.sheet_2x.expect("@2x path");
    assert!(retina_path.ends_with("slime@2x.png"));
    let full = image::open(&retina_path).expect("open @2x").to_rgba8();
    let half = image::open(&paths.sheet).expect("open sheet").to_rgba8();
    assert_eq!(full.dimensions(), out.layout.canvas_size);
    assert_eq!(half.width(), full.width().div_ceil(2));
    assert_eq!(half.height(), full.height().div_ceil(2));
}

#[test]
fn frame_listing_is_sorted_and_png_only() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().join("run");
    save_frame(&dir, "b.png", 2, 2);
    save_frame(&dir, "a.PNG", 2, 2);
    fs::write(dir.join("notes.txt"), "x").expect("txt");
    fs::create_dir_all(dir.join("nested.png")).expect("dir named like a frame");

    let names: Vec<String> = frame_paths(&dir)
        .expect("list")
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(names, vec!["a.PNG", "b.png"]);
}

#[test]
fn missing_raw_directory() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let ctx = PackContext::default();
    match pack_subject(&tmp.path().join("ghost"), &ctx) {
        Err(PackError::MissingDirectory(p)) => assert!(p.ends_with(RAW_DIR)),
        other => panic!("expected MissingDirectory, got {other:?}"),
    }
}
