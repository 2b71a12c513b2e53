//! High-level mech import API.
//!
//! [`MechAssets::load`] reads and validates the manifest and every material
//! library up front. Only then does [`MechAssets::build_script`] emit commands,
//! so a broken input never produces a half-written script.
//!
//! ```no_run
//! use std::path::PathBuf;
//! use mechimporter::config::{BaseDir, Config};
//! use mechimporter::data::FsLoader;
//! use mechimporter::export::mech::MechAssets;
//! # fn main() -> Result<(), rootcause::Report> {
//! let config = Config::builder()
//!     .base_dir(BaseDir::new(r"d:\depot\mwo"))
//!     .manifest(PathBuf::from("atlas.cdf"))
//!     .asset_name("atlas")
//!     .build();
//! let assets = MechAssets::load(&config, &FsLoader)?;
//! let script = assets.build_script(&config)?;
//! mechimporter::export::write_script(std::path::Path::new("import.txt"), &script)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use rootcause::prelude::*;
use tracing::{debug, info};

use crate::config::{Config, MINIMUM_TARGET_VERSION, Version};
use crate::data::{self, DataFileLoader};
use crate::manifest::Manifest;
use crate::materials::{self, MaterialDefinition};

use super::geometry::{self, import_command};
use super::material;
use super::rig::{self, ARMATURE};
use super::stream::{CommandStream, SymbolKind, quote};

/// Everything read from disk for one mech.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MechAssets {
    pub asset_name: String,
    pub manifest: Manifest,
    /// Body materials followed by cockpit materials, in file order.
    pub materials: Vec<MaterialDefinition>,
}

fn load_materials(
    config: &Config,
    loader: &impl DataFileLoader,
    relative: &str,
) -> Result<Vec<MaterialDefinition>, Report> {
    let path = config.base_dir.join(relative);
    let xml = data::read_text(loader, &path)
        .context_with(|| format!("Failed to read material file {}", path.display()))?;
    let parsed = materials::parse_material_file(&xml, &path.to_string_lossy())
        .context_with(|| format!("Failed to parse material file {}", path.display()))?;
    debug!("{} material(s) in {}", parsed.len(), path.display());
    Ok(parsed)
}

impl MechAssets {
    /// Read the manifest, the body material library and, when present, the
    /// cockpit material library.
    pub fn load(config: &Config, loader: &impl DataFileLoader) -> Result<Self, Report> {
        let manifest_path = config.manifest.display().to_string();
        let xml = data::read_text(loader, &config.manifest)
            .context_with(|| format!("Failed to read manifest {manifest_path}"))?;
        let manifest = Manifest::parse(&xml, &manifest_path)
            .context_with(|| format!("Failed to parse manifest {manifest_path}"))?;
        info!("{} attachment(s) in {manifest_path}", manifest.len());

        let mut materials = load_materials(config, loader, &config.body_material_file())?;

        let cockpit = config.base_dir.join(&config.cockpit_material_file());
        if loader.exists(&cockpit) {
            materials.extend(load_materials(
                config,
                loader,
                &config.cockpit_material_file(),
            )?);
        } else {
            info!("no cockpit materials at {}", cockpit.display());
        }

        Ok(Self {
            asset_name: config.asset_name.clone(),
            manifest,
            materials,
        })
    }

    /// Texture files referenced by the materials that do not exist under the
    /// base directory. The script still references them.
    pub fn missing_textures(&self, config: &Config, loader: &impl DataFileLoader) -> Vec<PathBuf> {
        self.materials
            .iter()
            .flat_map(|material| material.emitted_textures())
            .map(|(_, slot)| config.base_dir.join(&slot.image_path(config.image_format)))
            .filter(|path| !loader.exists(path))
            .collect()
    }

    /// Emit the full command script: preamble, materials, parts, rig.
    pub fn build_script(&self, config: &Config) -> Result<CommandStream, Report> {
        let mut stream = CommandStream::new();
        emit_preamble(&mut stream, config);
        material::emit_materials(
            &mut stream,
            &config.base_dir,
            config.image_format,
            &self.materials,
        )
        .context("Failed to emit material commands")?;
        geometry::emit_geometry(&mut stream, config, &self.manifest)
            .context("Failed to emit geometry commands")?;
        rig::emit_rig(&mut stream, config.export_format)
            .context("Failed to emit rig commands")?;
        Ok(stream)
    }
}

/// Stops the script in a Blender older than [`MINIMUM_TARGET_VERSION`].
fn version_guard() -> String {
    let Version {
        major,
        minor,
        patch,
    } = MINIMUM_TARGET_VERSION;
    format!(
        "if bpy.app.version < ({major}, {minor}, {patch}): raise RuntimeError({})",
        quote(&format!(
            "this script needs Blender {MINIMUM_TARGET_VERSION} or newer"
        ))
    )
}

/// Version guard, render engine and skeleton import. The armature always comes from the
/// Collada file next to the body parts, whatever format the parts use.
fn emit_preamble(stream: &mut CommandStream, config: &Config) {
    stream.push("import bpy");
    stream.push(version_guard());
    stream.push("bpy.context.scene.render.engine = 'CYCLES'");
    let armature = config.base_dir.script_path(&config.armature_file());
    stream.push(import_command(
        crate::config::ExportFormat::Rich,
        &armature,
        false,
    ));
    stream.declare(
        SymbolKind::Object,
        ARMATURE,
        format!("bpy.data.objects[{}]", quote(ARMATURE)),
    );
}
