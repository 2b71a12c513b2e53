//! Fixed rig setup appended after all parts are imported: armature parenting,
//! IK helper bones with custom display shapes, arm IK constraints, viewport
//! shading and moving effect helpers out of the way.

use itertools::Itertools;

use crate::classify::SECONDARY_LAYER_MARKERS;
use crate::config::ExportFormat;
use crate::error::ErrorKind;

use super::stream::{CommandStream, SymbolKind, quote};

/// Object name of the imported skeleton.
pub const ARMATURE: &str = "Armature";

/// Object the parenting pass leaves alone besides empties, cameras and lamps.
pub const DEFAULT_CUBE: &str = "Cube";

/// Layer (zero based) the bone display shapes are created on.
const SHAPE_LAYER: usize = 19;

/// Layer (zero based) effect and physics helpers are moved to.
const SECONDARY_LAYER: usize = 1;

const LAYER_COUNT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoneShape {
    Cube,
    Sphere,
}

impl BoneShape {
    fn object_name(self) -> &'static str {
        match self {
            BoneShape::Cube => "ik_shape_cube",
            BoneShape::Sphere => "ik_shape_sphere",
        }
    }

    fn add_operator(self) -> &'static str {
        match self {
            BoneShape::Cube => "bpy.ops.mesh.primitive_cube_add(radius=0.25",
            BoneShape::Sphere => "bpy.ops.mesh.primitive_ico_sphere_add(size=0.25",
        }
    }
}

/// An IK control bone placed relative to a skeleton bone.
struct IkBone {
    name: &'static str,
    anchor: &'static str,
    offset: [f32; 3],
    shape: BoneShape,
}

const IK_BONE_LENGTH: f32 = 0.5;

const IK_BONES: [IkBone; 8] = [
    IkBone {
        name: "foot_ik.L",
        anchor: "Bip01 L Foot",
        offset: [0.0, 0.0, 0.0],
        shape: BoneShape::Cube,
    },
    IkBone {
        name: "foot_ik.R",
        anchor: "Bip01 R Foot",
        offset: [0.0, 0.0, 0.0],
        shape: BoneShape::Cube,
    },
    IkBone {
        name: "knee_ik.L",
        anchor: "Bip01 L Calf",
        offset: [0.0, -1.5, 0.0],
        shape: BoneShape::Sphere,
    },
    IkBone {
        name: "knee_ik.R",
        anchor: "Bip01 R Calf",
        offset: [0.0, -1.5, 0.0],
        shape: BoneShape::Sphere,
    },
    IkBone {
        name: "hand_ik.L",
        anchor: "Bip01 L Hand",
        offset: [0.0, 0.0, 0.0],
        shape: BoneShape::Cube,
    },
    IkBone {
        name: "hand_ik.R",
        anchor: "Bip01 R Hand",
        offset: [0.0, 0.0, 0.0],
        shape: BoneShape::Cube,
    },
    IkBone {
        name: "elbow_ik.L",
        anchor: "Bip01 L Forearm",
        offset: [0.0, 1.5, 0.0],
        shape: BoneShape::Sphere,
    },
    IkBone {
        name: "elbow_ik.R",
        anchor: "Bip01 R Forearm",
        offset: [0.0, 1.5, 0.0],
        shape: BoneShape::Sphere,
    },
];

/// (constrained bone, IK target bone, chain length)
const IK_CONSTRAINTS: [(&str, &str, u32); 4] = [
    ("Bip01 L Forearm", "hand_ik.L", 2),
    ("Bip01 L UpperArm", "elbow_ik.L", 1),
    ("Bip01 R Forearm", "hand_ik.R", 2),
    ("Bip01 R UpperArm", "elbow_ik.R", 1),
];

fn layers(on: usize) -> String {
    format!("[i == {on} for i in range({LAYER_COUNT})]")
}

fn vector(v: [f32; 3]) -> String {
    format!("Vector(({}))", v.iter().map(|c| format!("{c:?}")).join(", "))
}

/// Emit the rig block. Parenting every part to the armature only happens for
/// Collada imports, the rest is the same for both formats.
pub fn emit_rig(stream: &mut CommandStream, format: ExportFormat) -> Result<(), ErrorKind> {
    let armature = stream.resolve(SymbolKind::Object, ARMATURE)?.to_string();
    stream.push("from mathutils import Vector");
    stream.push("bpy.ops.object.mode_set(mode='OBJECT')");

    if format == ExportFormat::Rich {
        stream.push(format!(
            "[setattr(o, 'select', o.type not in ('EMPTY', 'CAMERA', 'LAMP') and o.name != {}) for o in bpy.context.scene.objects]",
            quote(DEFAULT_CUBE)
        ));
        stream.push(format!("bpy.context.scene.objects.active = {armature}"));
        stream.push("bpy.ops.object.parent_set(type='ARMATURE', keep_transform=True)");
    }

    emit_shapes(stream);
    emit_ik_bones(stream, &armature)?;
    emit_ik_constraints(stream, &armature);

    stream.push(
        "[setattr(s, 'viewport_shade', 'MATERIAL') for a in bpy.context.screen.areas if a.type == 'VIEW_3D' for s in a.spaces if s.type == 'VIEW_3D']",
    );
    let markers = SECONDARY_LAYER_MARKERS.iter().map(|m| quote(m)).join(", ");
    stream.push(format!(
        "[setattr(o, 'layers', {}) for o in bpy.context.scene.objects if any(m in o.name.lower() for m in ({markers}))]",
        layers(SECONDARY_LAYER)
    ));
    Ok(())
}

fn emit_shapes(stream: &mut CommandStream) {
    for shape in [BoneShape::Cube, BoneShape::Sphere] {
        stream.push(format!(
            "{}, location=(0, 0, 0), layers={})",
            shape.add_operator(),
            layers(SHAPE_LAYER)
        ));
        stream.push(format!(
            "bpy.context.object.name = {}",
            quote(shape.object_name())
        ));
        stream.declare(
            SymbolKind::Object,
            shape.object_name(),
            format!("bpy.data.objects[{}]", quote(shape.object_name())),
        );
    }
}

fn emit_ik_bones(stream: &mut CommandStream, armature: &str) -> Result<(), ErrorKind> {
    stream.push(format!("bpy.context.scene.objects.active = {armature}"));
    stream.push("bpy.ops.object.mode_set(mode='EDIT')");
    for bone in &IK_BONES {
        stream.push(format!(
            "ik_bone = {armature}.data.edit_bones.new({})",
            quote(bone.name)
        ));
        stream.push(format!(
            "ik_bone.head = {armature}.data.edit_bones[{}].head + {}",
            quote(bone.anchor),
            vector(bone.offset)
        ));
        stream.push(format!(
            "ik_bone.tail = ik_bone.head + {}",
            vector([0.0, 0.0, IK_BONE_LENGTH])
        ));
        stream.push("ik_bone.use_deform = False");
    }

    stream.push("bpy.ops.object.mode_set(mode='POSE')");
    for bone in &IK_BONES {
        let shape = stream.resolve(SymbolKind::Object, bone.shape.object_name())?;
        let line = format!(
            "{armature}.pose.bones[{}].custom_shape = {shape}",
            quote(bone.name)
        );
        stream.push(line);
    }
    Ok(())
}

fn emit_ik_constraints(stream: &mut CommandStream, armature: &str) {
    for (bone, target, chain) in IK_CONSTRAINTS {
        stream.push(format!(
            "ik = {armature}.pose.bones[{}].constraints.new('IK')",
            quote(bone)
        ));
        stream.push(format!("ik.target = {armature}"));
        stream.push(format!("ik.subtarget = {}", quote(target)));
        stream.push(format!("ik.chain_count = {chain}"));
    }
    stream.push("bpy.ops.object.mode_set(mode='OBJECT')");
}

#[cfg(test)]
mod test {
    use super::*;

    fn rig(format: ExportFormat) -> CommandStream {
        let mut stream = CommandStream::new();
        stream.declare(SymbolKind::Object, ARMATURE, "bpy.data.objects[\"Armature\"]");
        emit_rig(&mut stream, format).unwrap();
        stream
    }

    fn count(stream: &CommandStream, needle: &str) -> usize {
        stream.lines().iter().filter(|l| l.contains(needle)).count()
    }

    #[test]
    fn armature_parenting_only_for_collada() {
        assert_eq!(count(&rig(ExportFormat::Rich), "parent_set(type='ARMATURE'"), 1);
        assert_eq!(count(&rig(ExportFormat::Simple), "parent_set(type='ARMATURE'"), 0);
    }

    #[test]
    fn ik_bones_and_constraints() {
        let stream = rig(ExportFormat::Simple);
        assert_eq!(count(&stream, "edit_bones.new("), 8);
        assert_eq!(count(&stream, "ik_bone.use_deform = False"), 8);
        assert_eq!(count(&stream, ".custom_shape = "), 8);
        assert_eq!(count(&stream, "constraints.new('IK')"), 4);
        assert_eq!(count(&stream, "ik.chain_count = 2"), 2);
        assert_eq!(count(&stream, "ik.chain_count = 1"), 2);
        assert!(stream.lines().contains(
            &r#"bpy.data.objects["Armature"].pose.bones["knee_ik.L"].custom_shape = bpy.data.objects["ik_shape_sphere"]"#
                .to_string()
        ));
    }

    #[test]
    fn shapes_created_before_use() {
        let stream = rig(ExportFormat::Rich);
        let lines = stream.lines();
        let position = |needle: &str| lines.iter().position(|l| l.contains(needle)).unwrap();
        assert!(position("primitive_cube_add") < position(".custom_shape = "));
        assert!(position("primitive_ico_sphere_add") < position(".custom_shape = "));
        assert!(lines.iter().any(|l| l.contains("viewport_shade")));
        assert!(lines.last().unwrap().contains(r#"("fire", "physics", "effect", "case")"#));
    }

    #[test]
    fn missing_armature_is_an_error() {
        let mut stream = CommandStream::new();
        assert!(matches!(
            emit_rig(&mut stream, ExportFormat::Rich),
            Err(ErrorKind::UnresolvedSymbol { kind: SymbolKind::Object, .. })
        ));
    }
}
