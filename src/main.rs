use std::fmt::Display;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use rootcause::prelude::*;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use mechimporter::config::{self, BaseDir, Config, ExportFormat, ImageFormat, Version};
use mechimporter::data::FsLoader;
use mechimporter::export::mech::MechAssets;
use mechimporter::export::{self, OUTPUT_FILE_NAME};

/// Generate a Blender import script for a MechWarrior Online mech
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Character definition (.cdf) to import. If not provided, the current
    /// directory is searched for one
    manifest: Option<PathBuf>,

    /// Directory the game assets were extracted to
    #[arg(short, long)]
    base_dir: Option<String>,

    /// Parts were converted to Collada (default)
    #[arg(long, conflicts_with = "obj")]
    dae: bool,

    /// Parts were converted to Wavefront OBJ
    #[arg(long)]
    obj: bool,

    /// Texture format the images were converted to: dds or tif
    #[arg(short, long, default_value = "dds")]
    image_format: String,

    /// Blender version the script is written for
    #[arg(long, default_value = "2.79")]
    target_version: String,

    /// Print the parsed manifest and materials as JSON instead of writing the script
    #[arg(long)]
    dump: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn usage_error(kind: clap::error::ErrorKind, err: impl Display) -> ! {
    Args::command().error(kind, err).exit()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn resolve_config(args: &Args, cwd: &Path) -> Config {
    let version: Version = args
        .target_version
        .parse()
        .unwrap_or_else(|err| usage_error(clap::error::ErrorKind::InvalidValue, err));
    if let Err(err) = config::check_target_version(&version) {
        usage_error(clap::error::ErrorKind::InvalidValue, err);
    }

    let manifest = config::locate_manifest(args.manifest.as_deref(), cwd)
        .unwrap_or_else(|err| usage_error(clap::error::ErrorKind::ValueValidation, err));
    let asset_name = config::asset_name(&manifest, cwd)
        .unwrap_or_else(|err| usage_error(clap::error::ErrorKind::ValueValidation, err));

    let export_format = if args.obj && !args.dae {
        ExportFormat::Simple
    } else {
        ExportFormat::Rich
    };

    Config::builder()
        .base_dir(BaseDir::resolve(args.base_dir.as_deref()))
        .export_format(export_format)
        .image_format(ImageFormat::from_arg(&args.image_format))
        .manifest(manifest)
        .asset_name(asset_name)
        .build()
}

fn main() -> Result<(), Report> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let config = resolve_config(&args, &cwd);

    let assets = MechAssets::load(&config, &FsLoader)?;

    if args.dump {
        let json = serde_json::to_string_pretty(&assets)
            .context("Failed to serialize the parsed mech")?;
        println!("{json}");
        return Ok(());
    }

    for path in assets.missing_textures(&config, &FsLoader) {
        warn!("texture {} does not exist", path.display());
    }

    let script = assets.build_script(&config)?;
    export::write_script(Path::new(OUTPUT_FILE_NAME), &script)
        .context_with(|| format!("Failed to write {OUTPUT_FILE_NAME}"))?;

    Ok(())
}
