use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use frame_baker_core::config::{CropConfig, ProjectConfig, SheetConfig};
use frame_baker_core::model::Anchor;
use frame_baker_core::{
    bake_project_with, crop_sequence, pack_sequence, result_path_in, slug, write_json,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "frame-baker",
    about = "Crop rendered frame sequences and pack them into spritesheets",
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
    /// Crop every frame of a sequence directory to one shared size (in place)
    Crop(CropArgs),
    /// Pack a sequence directory into a single spritesheet
    Pack(PackArgs),
    /// Crop and pack every sequence listed in a YAML project file
    Bake(BakeArgs),
    /// Print the directory slug for a layer name
    Slug {
        /// Human-readable layer name
        name: String,
    },
}

#[derive(Parser, Debug, Clone)]
struct CropArgs {
    /// Sequence directory (one image per frame)
    #[arg(help_heading = "Input/Output")]
    dir: PathBuf,
    /// Fixed crop width (0 = widest bounding box)
    #[arg(long, default_value_t = 0, help_heading = "Crop")]
    width: u32,
    /// Fixed crop height (0 = tallest bounding box)
    #[arg(long, default_value_t = 0, help_heading = "Crop")]
    height: u32,
    /// Horizontal anchor: start|center|end (aliases left/right, -1/0/1)
    #[arg(long, default_value = "center", allow_hyphen_values = true, help_heading = "Crop")]
    anchor_x: String,
    /// Vertical anchor: start|center|end (aliases top/bottom, -1/0/1)
    #[arg(long, default_value = "center", allow_hyphen_values = true, help_heading = "Crop")]
    anchor_y: String,
    /// Absolute crop origin X; used only together with --origin-y (negative disables)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true, help_heading = "Crop")]
    origin_x: i64,
    /// Absolute crop origin Y; used only together with --origin-x (negative disables)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true, help_heading = "Crop")]
    origin_y: i64,
    /// Normalized alpha at or below which pixels count as transparent
    #[arg(long, default_value_t = frame_baker_core::DEFAULT_ALPHA_THRESHOLD, help_heading = "Crop")]
    alpha_threshold: f64,
    /// Print the crop configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Sequence directory (one image per frame)
    #[arg(help_heading = "Input/Output")]
    dir: PathBuf,
    /// Output PNG path (defaults to <textures-dir>/<dir name>.png)
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Destination directory used when --out is not given
    #[arg(long, default_value = "textures", help_heading = "Input/Output")]
    textures_dir: PathBuf,
    /// Two-row layout: consecutive frame pairs share a column
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    stacked: bool,
    /// UV asset: flatten over opaque blue, write uncompressed
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    uv: bool,
    /// Also write a JSON description next to the sheet
    #[arg(long, default_value_t = false, help_heading = "Export")]
    metadata: bool,
}

#[derive(Parser, Debug, Clone)]
struct BakeArgs {
    /// YAML project file
    #[arg(short, long, help_heading = "Input/Output")]
    config: PathBuf,
    /// Only bake these sequences (by name); may be repeated
    #[arg(long, help_heading = "Input/Output")]
    only: Vec<String>,
    /// Continue with remaining sequences after a failure
    #[arg(long, default_value_t = false, help_heading = "Run")]
    keep_going: bool,
    /// Also write a JSON description next to each sheet
    #[arg(long, default_value_t = false, help_heading = "Export")]
    metadata: bool,
    /// Print the merged configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "yaml", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Crop(args) => run_crop(args),
        Commands::Pack(args) => run_pack(args),
        Commands::Bake(args) => run_bake(args, cli.progress && !cli.quiet),
        Commands::Slug { name } => {
            println!("{}", slug(name));
            Ok(())
        }
    }
}

fn run_crop(args: &CropArgs) -> anyhow::Result<()> {
    let cfg = CropConfig::builder()
        .fixed_size(args.width, args.height)
        .anchor(parse_anchor(&args.anchor_x)?, parse_anchor(&args.anchor_y)?)
        .origin(args.origin_x, args.origin_y)
        .alpha_threshold(args.alpha_threshold)
        .build();
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }
    let (w, h) = crop_sequence(&args.dir, &cfg)
        .with_context(|| format!("crop {}", args.dir.display()))?;
    println!("{w}x{h}");
    Ok(())
}

fn run_pack(args: &PackArgs) -> anyhow::Result<()> {
    let out = match &args.out {
        Some(p) => p.clone(),
        None => default_output(&args.dir, &args.textures_dir)?,
    };
    let cfg = SheetConfig::new(args.stacked, args.uv);
    let meta = pack_sequence(&args.dir, &cfg, &out)
        .with_context(|| format!("pack {}", args.dir.display()))?;
    if args.metadata {
        let json_path = out.with_extension("json");
        write_json(&meta, &json_path)
            .with_context(|| format!("write {}", json_path.display()))?;
    }
    info!(out = %out.display(), w = meta.width, h = meta.height, "sheet written");
    println!("{}", out.display());
    Ok(())
}

fn run_bake(args: &BakeArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut project = ProjectConfig::load(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;
    if args.keep_going {
        project.keep_going = true;
    }
    if args.metadata {
        project.metadata = true;
    }
    if !args.only.is_empty() {
        for name in &args.only {
            if !project.sequences.iter().any(|s| &s.name == name) {
                anyhow::bail!("unknown sequence: {}", name);
            }
        }
        project.sequences.retain(|s| args.only.contains(&s.name));
    }

    if args.print_config {
        match args.print_config_format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&project)?),
            _ => println!("{}", serde_yaml::to_string(&project)?),
        }
        return Ok(());
    }

    let active = project.sequences.iter().filter(|s| s.is_active()).count();
    let bar = progress_bar(active as u64, show_progress)?;
    let result = bake_project_with(&project, |settings, outcome| {
        match outcome {
            Ok(r) => {
                let crop = r
                    .crop_size
                    .map(|(w, h)| format!("{w}x{h}"))
                    .unwrap_or_else(|| "-".into());
                info!(
                    "Layer '{}' cropped to {} and packed in {}",
                    r.name,
                    crop,
                    fmt_dur(r.elapsed)
                );
            }
            Err(e) => error!(error = %e, "bake failed"),
        }
        if let Some(b) = &bar {
            b.set_message(settings.name.clone());
            b.inc(1);
        }
    });
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    let report = result?;

    for name in &report.skipped {
        info!(sequence = %name, "skipped (disabled or not rendered)");
    }
    let total: Duration = report.baked.iter().map(|r| r.elapsed).sum();
    info!(
        baked = report.baked.len(),
        failed = report.failed.len(),
        skipped = report.skipped.len(),
        "=== Done in {}! ===",
        fmt_dur(total)
    );
    if !report.is_success() {
        anyhow::bail!("{} sequence(s) failed", report.failed.len());
    }
    Ok(())
}

fn progress_bar(len: u64, show: bool) -> anyhow::Result<Option<indicatif::ProgressBar>> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return Ok(None);
    }
    let b = ProgressBar::new(len);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} baking {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    Ok(Some(b))
}

/// `<textures_dir>/<slug of the directory name>.png`
fn default_output(dir: &Path, textures_dir: &Path) -> anyhow::Result<PathBuf> {
    let name = dir
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("cannot derive a sheet name from {}", dir.display()))?;
    Ok(result_path_in(textures_dir, name))
}

fn parse_anchor(s: &str) -> anyhow::Result<Anchor> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("invalid anchor: {} (expected start|center|end)", s))
}

fn fmt_dur(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
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
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_uses_slug_of_dir_name() {
        let out = default_output(Path::new("out/Fire Impact"), Path::new("tex")).unwrap();
        assert_eq!(out, Path::new("tex").join("fire-impact.png"));
    }

    #[test]
    fn anchors_accept_aliases() {
        assert_eq!(parse_anchor("left").unwrap(), Anchor::Start);
        assert_eq!(parse_anchor("-1").unwrap(), Anchor::Start);
        assert_eq!(parse_anchor("0").unwrap(), Anchor::Center);
        assert_eq!(parse_anchor("Bottom").unwrap(), Anchor::End);
        assert!(parse_anchor("diagonal").is_err());
    }

    #[test]
    fn cli_parses_crop_flags() {
        let cli = Cli::try_parse_from([
            "frame-baker",
            "crop",
            "out/smoke",
            "--width",
            "64",
            "--anchor-x",
            "start",
            "--origin-x",
            "3",
            "--origin-y",
            "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Crop(a) => {
                assert_eq!(a.width, 64);
                assert_eq!(a.height, 0);
                assert_eq!(a.anchor_x, "start");
                assert_eq!((a.origin_x, a.origin_y), (3, 4));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
