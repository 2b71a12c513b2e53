//! Import, placement and skinning commands for each attachment.

use itertools::Itertools;
use tracing::debug;

use crate::classify::{self, MaterialOverrideReason};
use crate::config::{Config, ExportFormat};
use crate::error::ErrorKind;
use crate::manifest::{AttachmentRecord, Manifest};

use super::stream::{CommandStream, SymbolKind, quote, quote_path};

/// Import operator call for one geometry file. `path` is already escaped.
///
/// Cockpit parts are imported keeping vertex order and without merging vertex
/// groups. That is currently the same option set the other parts use.
pub fn import_command(format: ExportFormat, path: &str, cockpit: bool) -> String {
    let path = quote_path(path);
    // NOTE: the cockpit arms are identical to the standard ones. Unclear whether
    // cockpit imports were meant to use different options.
    match (format, cockpit) {
        (ExportFormat::Rich, true) => {
            format!("bpy.ops.wm.collada_import(filepath={path}, find_chains=True, auto_connect=True)")
        }
        (ExportFormat::Rich, false) => {
            format!("bpy.ops.wm.collada_import(filepath={path}, find_chains=True, auto_connect=True)")
        }
        (ExportFormat::Simple, true) => format!(
            "bpy.ops.import_scene.obj(filepath={path}, use_groups_as_vgroups=True, split_mode='OFF')"
        ),
        (ExportFormat::Simple, false) => format!(
            "bpy.ops.import_scene.obj(filepath={path}, use_groups_as_vgroups=True, split_mode='OFF')"
        ),
    }
}

fn tuple(values: &[f64]) -> String {
    format!("({})", values.iter().map(|v| format!("{v:?}")).join(", "))
}

pub fn emit_geometry(
    stream: &mut CommandStream,
    config: &Config,
    manifest: &Manifest,
) -> Result<(), ErrorKind> {
    for record in &manifest.attachments {
        emit_attachment(stream, config, record)?;
    }
    Ok(())
}

pub fn emit_attachment(
    stream: &mut CommandStream,
    config: &Config,
    record: &AttachmentRecord,
) -> Result<(), ErrorKind> {
    let format = config.export_format;
    let object_name = record.object_name(format);
    let material = classify::resolve_material(
        &config.asset_name,
        &record.name,
        &object_name,
        record.material_path.as_deref(),
    );
    match &material {
        Some(choice) if choice.reason != MaterialOverrideReason::Declared => {
            debug!("{}: material {} ({:?})", record.name, choice.name, choice.reason)
        }
        Some(_) => {}
        None => debug!("{}: no material path, skipping material", record.name),
    }

    let path = config.base_dir.script_path(&record.export_path(format));
    stream.push(import_command(format, &path, classify::is_cockpit(&object_name)));
    stream.declare(
        SymbolKind::Object,
        &object_name,
        format!("bpy.data.objects[{}]", quote(&object_name)),
    );

    let object = stream.resolve(SymbolKind::Object, &object_name)?.to_string();
    stream.push(format!("bpy.context.scene.objects.active = {object}"));
    stream.push("bpy.ops.object.parent_set(type='OBJECT', keep_transform=True)");

    if classify::is_secondary_layer(&object_name) {
        debug!("{object_name}: moves to the secondary layer once the rig is built");
    }

    if classify::is_helper(&object_name) {
        debug!("{object_name}: helper object, leaving untransformed");
        return Ok(());
    }

    stream.push("bpy.context.active_object.rotation_mode = 'QUATERNION'");
    stream.push(format!(
        "bpy.context.active_object.rotation_quaternion = {}",
        tuple(&record.rotation)
    ));
    stream.push(format!(
        "bpy.context.active_object.location = {}",
        tuple(&record.position)
    ));

    stream.push("bpy.ops.object.mode_set(mode='EDIT')");
    stream.push("bpy.ops.object.vertex_group_add()");
    stream.push(format!(
        "bpy.context.object.vertex_groups.active.name = {}",
        quote(&record.bone_name)
    ));
    stream.push("bpy.ops.mesh.select_all(action='SELECT')");
    stream.push("bpy.ops.object.vertex_group_assign()");
    stream.push("bpy.ops.mesh.select_all(action='DESELECT')");
    stream.push("bpy.ops.object.mode_set(mode='OBJECT')");

    if let Some(choice) = material {
        let material = stream.resolve(SymbolKind::Material, &choice.name)?.to_string();
        stream.push(format!("bpy.context.object.data.materials.append({material})"));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::config::BaseDir;

    fn config(format: ExportFormat) -> Config {
        Config::builder()
            .base_dir(BaseDir::new(r"d:\mwo"))
            .export_format(format)
            .manifest(PathBuf::from("atlas.cdf"))
            .asset_name("atlas")
            .build()
    }

    fn record(name: &str, binding: &str, material: Option<&str>) -> AttachmentRecord {
        AttachmentRecord {
            name: name.to_string(),
            rotation: [0.0, 0.0, 0.0, 1.0],
            position: [1.0, 2.0, 3.0],
            bone_name: "Bip01_L_UpperArm".to_string(),
            binding_path: binding.to_string(),
            material_path: material.map(str::to_string),
            flags: "0".to_string(),
        }
    }

    fn stream_with_materials(names: &[&str]) -> CommandStream {
        let mut stream = CommandStream::new();
        for name in names {
            stream.declare(SymbolKind::Material, name, format!("bpy.data.materials[\"{name}\"]"));
        }
        stream
    }

    #[test]
    fn cockpit_and_standard_imports_match() {
        for format in [ExportFormat::Rich, ExportFormat::Simple] {
            assert_eq!(
                import_command(format, "a.dae", true),
                import_command(format, "a.dae", false)
            );
        }
    }

    #[test]
    fn full_attachment_block() {
        let mut stream = stream_with_materials(&["atlas_variant"]);
        let record = record("leftarm_uac5", "objects/mechs/atlas/body/leftarm.cgf", Some("mech_body"));
        emit_attachment(&mut stream, &config(ExportFormat::Rich), &record).unwrap();

        assert_eq!(
            stream.lines(),
            [
                r#"bpy.ops.wm.collada_import(filepath="d:\\mwo\\objects\\mechs\\atlas\\body\\leftarm.dae", find_chains=True, auto_connect=True)"#,
                r#"bpy.context.scene.objects.active = bpy.data.objects["leftarm"]"#,
                "bpy.ops.object.parent_set(type='OBJECT', keep_transform=True)",
                "bpy.context.active_object.rotation_mode = 'QUATERNION'",
                "bpy.context.active_object.rotation_quaternion = (0.0, 0.0, 0.0, 1.0)",
                "bpy.context.active_object.location = (1.0, 2.0, 3.0)",
                "bpy.ops.object.mode_set(mode='EDIT')",
                "bpy.ops.object.vertex_group_add()",
                r#"bpy.context.object.vertex_groups.active.name = "Bip01_L_UpperArm""#,
                "bpy.ops.mesh.select_all(action='SELECT')",
                "bpy.ops.object.vertex_group_assign()",
                "bpy.ops.mesh.select_all(action='DESELECT')",
                "bpy.ops.object.mode_set(mode='OBJECT')",
                r#"bpy.context.object.data.materials.append(bpy.data.materials["atlas_variant"])"#,
            ]
        );
    }

    #[test]
    fn simple_format_imports_obj() {
        let mut stream = stream_with_materials(&["atlas_body"]);
        let record = record("ct", "objects/mechs/atlas/body/atlas_ct.cga", Some("objects/mechs/atlas/body/atlas_body"));
        emit_attachment(&mut stream, &config(ExportFormat::Simple), &record).unwrap();
        assert!(stream.lines()[0].starts_with("bpy.ops.import_scene.obj("));
        assert!(stream.lines()[0].contains(r"atlas_ct.obj"));
    }

    #[test]
    fn helpers_are_not_transformed() {
        for binding in ["objects/mechs/atlas/body/atlas_ct_proxy.cga", "objects/mechs/atlas/body/$hardpoint.cgf"] {
            let mut stream = stream_with_materials(&["atlas_body"]);
            let record = record("ct", binding, Some("atlas_body"));
            emit_attachment(&mut stream, &config(ExportFormat::Rich), &record).unwrap();

            assert_eq!(stream.len(), 3);
            assert!(stream.lines()[2].starts_with("bpy.ops.object.parent_set"));
            assert!(!stream.lines().iter().any(|l| l.contains("rotation")
                || l.contains("location")
                || l.contains("vertex_group")
                || l.contains("materials.append")));
        }
    }

    #[test]
    fn missing_material_path_skips_append() {
        let mut stream = CommandStream::new();
        let record = record("rightarm", "objects/mechs/atlas/body/rightarm.cgf", None);
        emit_attachment(&mut stream, &config(ExportFormat::Rich), &record).unwrap();
        assert!(stream.lines().iter().any(|l| l.contains("vertex_group_assign")));
        assert!(!stream.lines().iter().any(|l| l.contains("materials.append")));
    }

    #[test]
    fn undefined_material_is_an_error() {
        let mut stream = CommandStream::new();
        let record = record("rightarm", "objects/mechs/atlas/body/rightarm.cgf", Some("atlas_body"));
        let err = emit_attachment(&mut stream, &config(ExportFormat::Rich), &record).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::UnresolvedSymbol { kind: SymbolKind::Material, .. }
        ));
    }

    #[test]
    fn one_import_per_record() {
        let mut stream = stream_with_materials(&["atlas_body", "atlas_variant"]);
        let manifest = Manifest {
            attachments: vec![
                record("ct", "objects/mechs/atlas/body/atlas_ct.cga", Some("atlas_body")),
                record("la_uac5", "objects/mechs/atlas/body/atlas_la.cga", Some("atlas_body")),
                record("proxy", "objects/mechs/atlas/body/atlas_proxy.cgf", None),
            ],
        };
        emit_geometry(&mut stream, &config(ExportFormat::Rich), &manifest).unwrap();
        let imports: Vec<_> = stream
            .lines()
            .iter()
            .filter(|l| l.starts_with("bpy.ops.wm.collada_import"))
            .collect();
        assert_eq!(imports.len(), 3);
        assert!(imports[0].contains("atlas_ct.dae"));
        assert!(imports[1].contains("atlas_la.dae"));
        assert!(imports[2].contains("atlas_proxy.dae"));
    }
}
