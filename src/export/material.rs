//! Shader graph commands for each material definition.
//!
//! Every material becomes a Principled BSDF feeding a Material Output, with
//! image texture nodes for the diffuse, specular and normal maps.

use convert_case::{Case, Casing};
use tracing::{debug, warn};

use crate::config::{BaseDir, ImageFormat};
use crate::error::ErrorKind;
use crate::materials::{MaterialDefinition, TextureRole, TextureSlot};

use super::stream::{CommandStream, SymbolKind, quote, quote_path};

const SHADER_LOCATION: (i32, i32) = (300, 500);
const OUTPUT_LOCATION: (i32, i32) = (500, 500);
const NORMAL_MAP_LOCATION: (i32, i32) = (100, 0);

/// Vertical spacing between repeated image nodes of the same role.
const STACK_SPACING: i32 = 100;

/// Python variable prefix for a material name. Always prefixed, so no name
/// can shadow `bpy` or turn into a keyword.
pub fn script_ident(name: &str) -> String {
    let snake: String = name
        .to_case(Case::Snake)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("mat_{snake}")
}

fn image_location(role: TextureRole) -> (i32, i32) {
    match role {
        TextureRole::Diffuse => (0, 600),
        TextureRole::Specular => (0, 325),
        _ => (-100, 0),
    }
}

fn shader_input(role: TextureRole) -> &'static str {
    match role {
        TextureRole::Diffuse => "Base Color",
        TextureRole::Specular => "Specular",
        _ => "Normal",
    }
}

fn node_key(material: &str, node: &str) -> String {
    format!("{material}/{node}")
}

/// Emit the node graphs for `materials` in order. A name that was already
/// emitted is skipped with a warning.
pub fn emit_materials(
    stream: &mut CommandStream,
    base_dir: &BaseDir,
    image_format: ImageFormat,
    materials: &[MaterialDefinition],
) -> Result<(), ErrorKind> {
    for material in materials {
        if stream.is_declared(SymbolKind::Material, &material.name) {
            warn!("material {} is defined more than once, keeping the first", material.name);
            continue;
        }
        emit_material(stream, base_dir, image_format, material)?;
    }
    Ok(())
}

pub fn emit_material(
    stream: &mut CommandStream,
    base_dir: &BaseDir,
    image_format: ImageFormat,
    material: &MaterialDefinition,
) -> Result<(), ErrorKind> {
    debug!("emitting material {}", material.name);
    let name = &material.name;
    let var = script_ident(name);

    stream.push(format!("{var} = bpy.data.materials.new({})", quote(name)));
    stream.push(format!("{var}.use_nodes = True"));
    stream.push(format!("{var}_nodes = {var}.node_tree.nodes"));
    stream.push(format!("{var}_links = {var}.node_tree.links"));
    stream.push(format!("{var}_nodes.clear()"));
    stream.declare(
        SymbolKind::Material,
        name,
        format!("bpy.data.materials[{}]", quote(name)),
    );

    new_node(stream, name, &var, "shader", "ShaderNodeBsdfPrincipled", SHADER_LOCATION);
    new_node(stream, name, &var, "output", "ShaderNodeOutputMaterial", OUTPUT_LOCATION);
    link(stream, name, &var, ("shader", "0"), ("output", "0"))?;

    let mut per_role = [0usize; TextureRole::EMITTED.len()];
    for (role, slot) in material.emitted_textures() {
        let index = TextureRole::EMITTED
            .iter()
            .position(|r| *r == role)
            .unwrap_or_default();
        let count = per_role[index];
        per_role[index] += 1;
        emit_texture(stream, base_dir, image_format, name, &var, role, slot, count)?;
    }

    let skipped = material.textures.len()
        - material
            .textures
            .iter()
            .filter(|slot| {
                slot.role
                    .known()
                    .is_some_and(|role| TextureRole::EMITTED.contains(role))
            })
            .count();
    if skipped > 0 {
        debug!("{name}: {skipped} texture(s) without a shader input were skipped");
    }
    Ok(())
}

/// Create a node named `node` in the material's tree and declare it.
fn new_node(
    stream: &mut CommandStream,
    material: &str,
    var: &str,
    node: &str,
    node_type: &str,
    (x, y): (i32, i32),
) -> String {
    let node_var = format!("{var}_{node}");
    stream.push(format!("{node_var} = {var}_nodes.new('{node_type}')"));
    stream.push(format!("{node_var}.location = ({x}, {y})"));
    stream.declare(SymbolKind::ShaderNode, &node_key(material, node), node_var)
}

/// Link `from` output socket to `to` input socket. Sockets are given as script
/// text: an index or a quoted socket name.
fn link(
    stream: &mut CommandStream,
    material: &str,
    var: &str,
    (from, output): (&str, &str),
    (to, input): (&str, &str),
) -> Result<(), ErrorKind> {
    let from = stream.resolve(SymbolKind::ShaderNode, &node_key(material, from))?;
    let to = stream.resolve(SymbolKind::ShaderNode, &node_key(material, to))?;
    let line = format!("{var}_links.new({from}.outputs[{output}], {to}.inputs[{input}])");
    stream.push(line);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn emit_texture(
    stream: &mut CommandStream,
    base_dir: &BaseDir,
    image_format: ImageFormat,
    material: &str,
    var: &str,
    role: TextureRole,
    slot: &TextureSlot,
    count: usize,
) -> Result<(), ErrorKind> {
    let node = match count {
        0 => role.name().to_lowercase(),
        n => format!("{}_{n}", role.name().to_lowercase()),
    };
    let image_path = base_dir.script_path(&slot.image_path(image_format));
    let (x, y) = image_location(role);
    let location = (x, y - STACK_SPACING * count as i32);

    let node_var = new_node(stream, material, var, &node, "ShaderNodeTexImage", location);
    stream.push(format!(
        "{node_var}.image = bpy.data.images.load({}, check_existing=True)",
        quote_path(&image_path)
    ));
    if role != TextureRole::Diffuse {
        stream.push(format!("{node_var}.color_space = 'NONE'"));
    }

    let input = format!("'{}'", shader_input(role));
    if role == TextureRole::Bumpmap {
        let normal_map = format!("{node}_normal_map");
        let (nx, ny) = NORMAL_MAP_LOCATION;
        new_node(
            stream,
            material,
            var,
            &normal_map,
            "ShaderNodeNormalMap",
            (nx, ny - STACK_SPACING * count as i32),
        );
        link(stream, material, var, (&node, "0"), (&normal_map, "'Color'"))?;
        link(stream, material, var, (&normal_map, "0"), ("shader", &input))?;
    } else {
        link(stream, material, var, (&node, "0"), ("shader", &input))?;
    }
    Ok(())
}
