//! Parser for CryEngine material libraries (`.mtl`).
//!
//! A mech's body library holds one sub-material per surface type:
//!
//! ```xml
//! <Material MtlFlags="524544">
//!   <SubMaterials>
//!     <Material Name="atlas_body" Shader="Illum">
//!       <Textures>
//!         <Texture Map="Diffuse" File="objects/mechs/atlas/body/textures/atlas_body_diff.dds"/>
//!         <Texture Map="Bumpmap" File="objects/mechs/atlas/body/textures/atlas_body_ddna.dds"/>
//!       </Textures>
//!     </Material>
//!   </SubMaterials>
//! </Material>
//! ```

use std::fmt;

use crate::config::ImageFormat;
use crate::data::paths;
use crate::error::ErrorKind;
use crate::recognized::Recognized;

/// Texture `Map` values with a meaning for the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextureRole {
    Diffuse,
    Specular,
    Bumpmap,
    /// Camo channel mask. Parsed so it shows up in dumps, never wired into a
    /// shader.
    Subsurface,
}

impl TextureRole {
    /// Roles that get shader nodes, in the order they are emitted.
    pub const EMITTED: [TextureRole; 3] = [
        TextureRole::Diffuse,
        TextureRole::Specular,
        TextureRole::Bumpmap,
    ];

    pub fn from_map(map: &str) -> Recognized<TextureRole> {
        match map {
            "Diffuse" => TextureRole::Diffuse.into(),
            "Specular" => TextureRole::Specular.into(),
            "Bumpmap" => TextureRole::Bumpmap.into(),
            "Subsurface" => TextureRole::Subsurface.into(),
            other => Recognized::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextureRole::Diffuse => "Diffuse",
            TextureRole::Specular => "Specular",
            TextureRole::Bumpmap => "Bumpmap",
            TextureRole::Subsurface => "Subsurface",
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureSlot {
    pub role: Recognized<TextureRole>,
    /// Game-relative path as written in the material file.
    pub file_path: String,
}

impl TextureSlot {
    /// The texture path with its extension swapped for `format`'s.
    pub fn image_path(&self, format: ImageFormat) -> String {
        paths::replace_extension(&self.file_path, format.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MaterialDefinition {
    pub name: String,
    pub textures: Vec<TextureSlot>,
}

impl MaterialDefinition {
    /// Slots that get shader nodes: diffuse first, then specular, then bump
    /// maps. Document order is kept within a role.
    pub fn emitted_textures(&self) -> impl Iterator<Item = (TextureRole, &TextureSlot)> {
        TextureRole::EMITTED.into_iter().flat_map(move |role| {
            self.textures
                .iter()
                .filter(move |slot| slot.role.known() == Some(&role))
                .map(move |slot| (role, slot))
        })
    }
}

/// Parse every named material in a material library, in document order.
///
/// Both the single-material form (a named root) and the usual
/// `<SubMaterials>` form are accepted. A library without any named material
/// is an error.
pub fn parse_material_file(xml: &str, path: &str) -> Result<Vec<MaterialDefinition>, ErrorKind> {
    let doc = roxmltree::Document::parse(xml).map_err(|err| ErrorKind::Xml {
        path: path.to_string(),
        err,
    })?;

    let root = doc.root_element();
    if !root.has_tag_name("Material") {
        return Err(ErrorKind::MissingElement {
            path: path.to_string(),
            element: "Material",
        });
    }

    let materials: Vec<MaterialDefinition> = root
        .descendants()
        .filter(|n| n.has_tag_name("Material"))
        .filter_map(|node| {
            let name = node.attribute("Name")?;
            Some(parse_material(&node, name, path))
        })
        .collect::<Result<_, _>>()?;

    if materials.is_empty() {
        return Err(ErrorKind::MissingAttribute {
            path: path.to_string(),
            element: "Material",
            attribute: "Name",
        });
    }
    Ok(materials)
}

fn parse_material(
    node: &roxmltree::Node,
    name: &str,
    path: &str,
) -> Result<MaterialDefinition, ErrorKind> {
    let textures = node
        .children()
        .filter(|n| n.has_tag_name("Textures"))
        .flat_map(|textures| textures.children().filter(|n| n.has_tag_name("Texture")))
        .map(|texture| {
            let missing = |attribute| ErrorKind::MissingAttribute {
                path: path.to_string(),
                element: "Texture",
                attribute,
            };
            let map = texture.attribute("Map").ok_or_else(|| missing("Map"))?;
            let file = texture.attribute("File").ok_or_else(|| missing("File"))?;
            Ok(TextureSlot {
                role: TextureRole::from_map(map),
                file_path: file.to_string(),
            })
        })
        .collect::<Result<Vec<_>, ErrorKind>>()?;

    Ok(MaterialDefinition {
        name: name.to_string(),
        textures,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    const ATLAS_BODY: &str = r#"<Material MtlFlags="524544">
        <SubMaterials>
            <Material Name="atlas_body" Shader="Illum">
                <Textures>
                    <Texture Map="Bumpmap" File="objects/mechs/atlas/body/textures/atlas_body_ddna.dds"/>
                    <Texture Map="Subsurface" File="objects/mechs/atlas/body/textures/atlas_body_camo.dds"/>
                    <Texture Map="Diffuse" File="objects/mechs/atlas/body/textures/atlas_body_diff.tif"/>
                    <Texture Map="Custom" File="objects/mechs/atlas/body/textures/atlas_body_mask.dds"/>
                    <Texture Map="Specular" File="objects/mechs/atlas/body/textures/atlas_body_spec.dds"/>
                </Textures>
            </Material>
            <Material Name="atlas_variant">
                <Textures>
                    <Texture Map="Diffuse" File="objects/mechs/atlas/body/textures/atlas_variant_diff.dds"/>
                </Textures>
            </Material>
            <Material Name="atlas_window"/>
        </SubMaterials>
    </Material>"#;

    #[test]
    fn parses_sub_materials() {
        let materials = parse_material_file(ATLAS_BODY, "atlas_body.mtl").unwrap();
        let names: Vec<_> = materials.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["atlas_body", "atlas_variant", "atlas_window"]);
        assert_eq!(materials[0].textures.len(), 5);
        assert!(materials[2].textures.is_empty());
    }

    #[test]
    fn unknown_roles_are_kept_raw() {
        let materials = parse_material_file(ATLAS_BODY, "atlas_body.mtl").unwrap();
        let custom = &materials[0].textures[3];
        assert!(!custom.role.is_known());
        assert_eq!(custom.role.unknown().map(String::as_str), Some("Custom"));
        assert_eq!(materials[0].textures[1].role.known(), Some(&TextureRole::Subsurface));
    }

    #[test]
    fn emitted_textures_follow_role_order() {
        let materials = parse_material_file(ATLAS_BODY, "atlas_body.mtl").unwrap();
        let roles: Vec<_> = materials[0].emitted_textures().map(|(role, _)| role).collect();
        assert_eq!(
            roles,
            [TextureRole::Diffuse, TextureRole::Specular, TextureRole::Bumpmap]
        );
    }

    #[test]
    fn image_path_uses_configured_format() {
        let materials = parse_material_file(ATLAS_BODY, "atlas_body.mtl").unwrap();
        for slot in &materials[0].textures {
            assert!(slot.image_path(ImageFormat::Dds).ends_with(".dds"));
            assert!(slot.image_path(ImageFormat::Tif).ends_with(".tif"));
        }
    }

    #[test]
    fn library_without_named_materials_is_an_error() {
        let err = parse_material_file("<Material><SubMaterials/></Material>", "x.mtl").unwrap_err();
        assert!(matches!(err, ErrorKind::MissingAttribute { attribute: "Name", .. }));

        let err = parse_material_file("<Materials/>", "x.mtl").unwrap_err();
        assert!(matches!(err, ErrorKind::MissingElement { element: "Material", .. }));
    }

    #[test]
    fn texture_without_file_is_an_error() {
        let xml = r#"<Material Name="a"><Textures><Texture Map="Diffuse"/></Textures></Material>"#;
        let err = parse_material_file(xml, "x.mtl").unwrap_err();
        assert!(matches!(err, ErrorKind::MissingAttribute { attribute: "File", .. }));
    }
}
