use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use frame_packer_core::prelude::*;
use frame_packer_core::{RAW_DIR, discover_animations, load_frames};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

mod settings;

use settings::{Overrides, ResolvedRun, resolve_run};

#[derive(Parser, Debug)]
#[command(
    name = "frame-packer",
    about = "Pack animation frame folders into a sprite sheet and .sprite metadata",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack the selected subject and write its generated files
    Pack(PackArgs),
    /// Run the whole pipeline and print the .sprite document; writes nothing
    Layout(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Selection
    /// Working directory holding game themes or subjects
    #[arg(long, help_heading = "Selection")]
    root: Option<PathBuf>,
    /// Program config file (defaults to <root>/config.json)
    #[arg(long, help_heading = "Selection")]
    config: Option<PathBuf>,
    /// Game theme folder (omit when subjects sit directly under the root)
    #[arg(long, help_heading = "Selection")]
    theme: Option<String>,
    /// Subject folder to pack (defaults to the program's selected node)
    #[arg(long, help_heading = "Selection")]
    subject: Option<String>,

    // Overrides
    /// Treat the subject as HD (double-resolution source art)
    #[arg(long, overrides_with = "no_hd", help_heading = "Overrides")]
    hd: bool,
    /// Treat the subject as standard resolution
    #[arg(long, overrides_with = "hd", help_heading = "Overrides")]
    no_hd: bool,
    /// Zero erased pixels and write PNGs with best compression
    #[arg(long, default_value_t = false, help_heading = "Overrides")]
    reduce_file_size: bool,

    // Export
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the resolved configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: pack and report stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

impl PackArgs {
    fn overrides(&self) -> Overrides {
        let hd = if self.hd {
            Some(true)
        } else if self.no_hd {
            Some(false)
        } else {
            None
        };
        Overrides {
            theme: self.theme.clone(),
            subject: self.subject.clone(),
            hd,
            reduce_file_size: self.reduce_file_size,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet, false),
        Commands::Layout(args) => run_pack(args, false, true),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool, layout_only: bool) -> anyhow::Result<()> {
    let run = resolve_run(
        args.root.as_deref(),
        args.config.as_deref(),
        &args.overrides(),
    )?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&run.ctx)?),
            _ => println!("{}", serde_json::to_string_pretty(&run.ctx)?),
        }
        return Ok(());
    }

    let subject_name = run.selection.subject.clone();
    info!(
        root = %run.root.display(),
        theme = run.selection.theme.as_deref().unwrap_or("-"),
        subject = %subject_name,
        hd = run.ctx.is_hd,
        "packing subject"
    );

    let inputs = load_animations_with_progress(&run, show_progress)?;
    let out = pack_animations(inputs, &run.ctx)
        .with_context(|| format!("pack {}", run.subject_dir.display()))?;

    let stats = out.stats();
    info!(wasted = stats.wasted_area(), "{}", stats.summary());

    if layout_only {
        println!("{}", out.document.to_json_pretty()?);
        return Ok(());
    }

    if !args.dry_run {
        let paths = write_outputs(&out, &run.subject_dir, &subject_name, &run.ctx)
            .with_context(|| format!("write outputs for {}", run.subject_dir.display()))?;
        info!(sheet = ?paths.sheet, sprite = ?paths.sprite, "subject packed");
    }

    if let Some(stats_path) = &args.export_stats {
        fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
            .with_context(|| format!("write {}", stats_path.display()))?;
    }
    Ok(())
}

fn load_animations_with_progress(
    run: &ResolvedRun,
    progress: bool,
) -> anyhow::Result<Vec<AnimationFrames>> {
    let raw = run.subject_dir.join(RAW_DIR);
    let names = discover_animations(&raw).with_context(|| format!("list {}", raw.display()))?;
    let bar = if progress {
        let b = ProgressBar::new(names.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(b)
    } else {
        None
    };

    let mut list = Vec::with_capacity(names.len());
    for name in names {
        if let Some(b) = &bar {
            b.set_message(name.clone());
        }
        let dir = raw.join(&name);
        let frames = load_frames(&dir).with_context(|| format!("load {}", dir.display()))?;
        info!(animation = %name, frames = frames.len(), "loaded animation");
        list.push(AnimationFrames { name, frames });
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
