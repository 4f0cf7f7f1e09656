//! Read-only view of the `config.json` files of a working directory.
//!
//! Layout on disk:
//! ```text
//! <root>/config.json                       program settings
//! <root>/<theme>/config.json               game theme (optional level)
//! <root>/[<theme>/]<subject>/config.json   subject settings
//! <root>/[<theme>/]<subject>/raw/<animation>/config.json
//! ```
//! A missing file means defaults. A file that exists but does not parse is an
//! error naming that file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use frame_packer_core::prelude::*;
use frame_packer_core::{RAW_DIR, discover_animations};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const CONFIG_FILE: &str = "config.json";

/// Program-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgramSettings {
    /// Root of the theme/subject hierarchy.
    pub working_path: Option<PathBuf>,
    pub reduce_file_size: bool,
    /// `[theme, subject, animation]`. Without themes the first entry is either
    /// the subject or a placeholder theme name with no folder behind it.
    pub selected_node: Option<Vec<String>>,
    /// Used when subjects sit directly under the root.
    pub is_hd: bool,
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            working_path: None,
            reduce_file_size: false,
            selected_node: None,
            is_hd: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub is_hd: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self { is_hd: true }
    }
}

/// Subject picked for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub theme: Option<String>,
    pub subject: String,
}

impl Selection {
    pub fn subject_dir(&self, root: &Path) -> PathBuf {
        match &self.theme {
            Some(theme) => root.join(theme).join(&self.subject),
            None => root.join(&self.subject),
        }
    }
}

/// Command-line overrides applied on top of the files.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub theme: Option<String>,
    pub subject: Option<String>,
    pub hd: Option<bool>,
    pub reduce_file_size: bool,
}

/// Everything a run needs: where the subject lives and how to pack it.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub root: PathBuf,
    pub selection: Selection,
    pub subject_dir: PathBuf,
    pub ctx: PackContext,
}

pub fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> anyhow::Result<T> {
    if !path.is_file() {
        debug!(?path, "no config file, using defaults");
        return Ok(T::default());
    }
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    debug!(?path, "loaded config file");
    Ok(value)
}

fn is_subject_dir(dir: &Path) -> bool {
    dir.join(RAW_DIR).is_dir()
}

/// Decide which subject to pack from the flags and the program selection.
pub fn resolve_selection(
    root: &Path,
    program: &ProgramSettings,
    overrides: &Overrides,
) -> anyhow::Result<Selection> {
    let selected = program.selected_node.as_deref().unwrap_or_default();
    match (&overrides.theme, &overrides.subject) {
        (Some(theme), Some(subject)) => Ok(Selection {
            theme: Some(theme.clone()),
            subject: subject.clone(),
        }),
        (Some(theme), None) => match (selected.first(), selected.get(1)) {
            (Some(t), Some(subject)) if t == theme => Ok(Selection {
                theme: Some(theme.clone()),
                subject: subject.clone(),
            }),
            _ => bail!("no subject selected in theme {theme:?}; pass --subject"),
        },
        (None, Some(subject)) => {
            let theme = selected
                .first()
                .filter(|t| {
                    !is_subject_dir(&root.join(subject))
                        && is_subject_dir(&root.join(t).join(subject))
                })
                .cloned();
            Ok(Selection {
                theme,
                subject: subject.clone(),
            })
        }
        (None, None) => {
            let Some(first) = selected.first() else {
                bail!("no subject selected; pass --subject (and --theme)");
            };
            if is_subject_dir(&root.join(first)) {
                return Ok(Selection {
                    theme: None,
                    subject: first.clone(),
                });
            }
            // flat trees store a placeholder theme name ahead of the subject
            if let Some(subject) = selected.get(1) {
                if !root.join(first).is_dir() && is_subject_dir(&root.join(subject)) {
                    return Ok(Selection {
                        theme: None,
                        subject: subject.clone(),
                    });
                }
            }
            match selected.get(1) {
                Some(subject) => Ok(Selection {
                    theme: Some(first.clone()),
                    subject: subject.clone(),
                }),
                None => bail!("theme {first:?} is selected but no subject; pass --subject"),
            }
        }
    }
}

/// Build the settings snapshot for one subject.
///
/// Animation settings are read for every folder under `raw/`; a subject
/// without `raw/` gets none and fails later when its frames are loaded.
pub fn build_context(
    root: &Path,
    program: &ProgramSettings,
    selection: &Selection,
    overrides: &Overrides,
) -> anyhow::Result<PackContext> {
    let subject_dir = selection.subject_dir(root);
    let is_hd = match (overrides.hd, &selection.theme) {
        (Some(hd), _) => hd,
        (None, Some(theme)) => {
            load_json_or_default::<ThemeSettings>(&root.join(theme).join(CONFIG_FILE))?.is_hd
        }
        (None, None) => program.is_hd,
    };
    let subject: SubjectSettings = load_json_or_default(&subject_dir.join(CONFIG_FILE))?;

    let raw = subject_dir.join(RAW_DIR);
    let mut animations = Vec::new();
    if raw.is_dir() {
        for name in discover_animations(&raw)? {
            let mut settings: AnimationSettings =
                load_json_or_default(&raw.join(&name).join(CONFIG_FILE))?;
            settings.name = name;
            animations.push(settings);
        }
    }

    Ok(PackContext {
        subject,
        is_hd,
        reduce_file_size: overrides.reduce_file_size || program.reduce_file_size,
        animations,
    })
}

/// Resolve root, selection and settings.
///
/// The program file is `config` when given, else `<root>/config.json`. The
/// hierarchy root is `--root`, else the program's `working_path`, else the
/// directory holding the program file.
pub fn resolve_run(
    root: Option<&Path>,
    config: Option<&Path>,
    overrides: &Overrides,
) -> anyhow::Result<ResolvedRun> {
    let base = root.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let program_path = config.map_or_else(|| base.join(CONFIG_FILE), Path::to_path_buf);
    let program: ProgramSettings = load_json_or_default(&program_path)?;

    let root = match (root, &program.working_path) {
        (Some(r), _) => r.to_path_buf(),
        (None, Some(p)) if !p.as_os_str().is_empty() => p.clone(),
        _ => program_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    };
    if !root.is_dir() {
        bail!("working path does not exist: {}", root.display());
    }

    let selection = resolve_selection(&root, &program, overrides)?;
    let ctx = build_context(&root, &program, &selection, overrides)?;
    let subject_dir = selection.subject_dir(&root);
    Ok(ResolvedRun {
        root,
        selection,
        subject_dir,
        ctx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn themed_tree(root: &Path) {
        write(
            &root.join(CONFIG_FILE),
            r#"{"selected_node":["forest","slime","walk"],"reduce_file_size":true}"#,
        );
        write(&root.join("forest").join(CONFIG_FILE), r#"{"is_hd":false,"is_expanded":true}"#);
        let subject = root.join("forest").join("slime");
        write(
            &subject.join(CONFIG_FILE),
            r##"{"background_color":"#FF00FF","sheet":{"width":null,"height":128}}"##,
        );
        write(
            &subject.join(RAW_DIR).join("walk").join(CONFIG_FILE),
            r#"{"delay":3,"offset":{"X":1.0,"Y":2.0}}"#,
        );
        fs::create_dir_all(subject.join(RAW_DIR).join("idle")).unwrap();
    }

    #[test]
    fn themed_selection_from_program_file() {
        let tmp = tempfile::tempdir().unwrap();
        themed_tree(tmp.path());
        let run = resolve_run(Some(tmp.path()), None, &Overrides::default()).unwrap();

        assert_eq!(
            run.selection,
            Selection {
                theme: Some("forest".into()),
                subject: "slime".into()
            }
        );
        assert!(run.subject_dir.ends_with("forest/slime"));
        assert!(!run.ctx.is_hd);
        assert!(run.ctx.reduce_file_size);
        assert_eq!(run.ctx.subject.sheet.height, Some(128));
        assert_eq!(run.ctx.subject.background_color.as_deref(), Some("#FF00FF"));

        let names: Vec<_> = run.ctx.animations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["idle", "walk"]);
        let walk = run.ctx.animation("walk");
        assert_eq!(walk.delay, 3);
        assert_eq!(walk.offset(), Offset { x: 1.0, y: 2.0 });
        assert_eq!(run.ctx.animation("idle").delay, 1);
    }

    #[test]
    fn flags_override_files() {
        let tmp = tempfile::tempdir().unwrap();
        themed_tree(tmp.path());
        let overrides = Overrides {
            hd: Some(true),
            ..Default::default()
        };
        let run = resolve_run(Some(tmp.path()), None, &overrides).unwrap();
        assert!(run.ctx.is_hd);
    }

    #[test]
    fn subject_without_theme() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("bat").join(RAW_DIR)).unwrap();
        write(&tmp.path().join(CONFIG_FILE), r#"{"is_hd":false}"#);
        let overrides = Overrides {
            subject: Some("bat".into()),
            ..Default::default()
        };
        let run = resolve_run(Some(tmp.path()), None, &overrides).unwrap();
        assert_eq!(run.selection.theme, None);
        assert!(!run.ctx.is_hd);
        assert!(run.ctx.animations.is_empty());
    }

    #[test]
    fn flat_selection_with_placeholder_theme() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            &tmp.path().join(CONFIG_FILE),
            r#"{"selected_node":["Game Theme","bat","idle"],"is_hd":false}"#,
        );
        fs::create_dir_all(tmp.path().join("bat").join(RAW_DIR).join("idle")).unwrap();
        let run = resolve_run(Some(tmp.path()), None, &Overrides::default()).unwrap();

        assert_eq!(
            run.selection,
            Selection {
                theme: None,
                subject: "bat".into()
            }
        );
        assert!(run.subject_dir.ends_with("bat"));
        assert!(!run.ctx.is_hd);
        let names: Vec<_> = run.ctx.animations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["idle"]);
    }

    #[test]
    fn theme_flag_without_subject_needs_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            theme: Some("desert".into()),
            ..Default::default()
        };
        let program = ProgramSettings::default();
        assert!(resolve_selection(tmp.path(), &program, &overrides).is_err());
    }

    #[test]
    fn malformed_file_names_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(&tmp.path().join(CONFIG_FILE), "{ not json");
        let err = resolve_run(Some(tmp.path()), None, &Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains(CONFIG_FILE));
    }
}
