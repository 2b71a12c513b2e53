//! Parser for CryEngine character definitions (`.cdf`).
//!
//! Only the attachment list matters for the import:
//!
//! ```xml
//! <CharacterDefinition>
//!   <AttachmentList>
//!     <Attachment Type="CA_BONE" AName="leftarm_uac5" Rotation="1,0,0,0"
//!       Position="1.2,0.3,4.5" BoneName="Bip01 L UpperArm"
//!       Binding="objects/mechs/atlas/body/atlas_la_uac5.cga"
//!       Material="objects/mechs/atlas/body/atlas_body" Flags="0"/>
//!   </AttachmentList>
//! </CharacterDefinition>
//! ```

use crate::config::ExportFormat;
use crate::data::paths;
use crate::error::ErrorKind;

/// Geometry extensions the game ships attachments in. Both convert to the same
/// export format file.
pub const GEOMETRY_EXTENSIONS: &[&str] = &["cga", "cgf"];

/// One `<Attachment>` entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttachmentRecord {
    pub name: String,
    /// Quaternion, in the order the manifest stores it (w, x, y, z).
    pub rotation: [f64; 4],
    pub position: [f64; 3],
    /// Bone name with spaces replaced by underscores, as used for vertex groups.
    pub bone_name: String,
    /// Game-relative path to the `.cga`/`.cgf` source geometry.
    pub binding_path: String,
    pub material_path: Option<String>,
    pub flags: String,
}

impl AttachmentRecord {
    /// Binding path pointing at the converted file for `format`.
    pub fn export_path(&self, format: ExportFormat) -> String {
        paths::replace_extension(&self.binding_path, format.extension())
    }

    /// Name the imported object gets: the file name of the converted geometry
    /// without its extension.
    pub fn object_name(&self, format: ExportFormat) -> String {
        let export_path = self.export_path(format);
        let file_name = paths::last_segment(&export_path);
        let stem_len = file_name.len() - (format.extension().len() + 1);
        file_name[..stem_len].to_string()
    }
}

/// Parsed attachment list, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Manifest {
    pub attachments: Vec<AttachmentRecord>,
}

impl Manifest {
    /// Parse manifest XML. `path` is only used in error messages.
    pub fn parse(xml: &str, path: &str) -> Result<Self, ErrorKind> {
        let doc = roxmltree::Document::parse(xml).map_err(|err| ErrorKind::Xml {
            path: path.to_string(),
            err,
        })?;

        let list = doc
            .root_element()
            .descendants()
            .find(|n| n.has_tag_name("AttachmentList"))
            .ok_or_else(|| ErrorKind::MissingElement {
                path: path.to_string(),
                element: "AttachmentList",
            })?;

        let attachments = list
            .children()
            .filter(|n| n.has_tag_name("Attachment"))
            .map(|node| parse_attachment(&node, path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { attachments })
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

fn required<'a>(
    node: &roxmltree::Node<'a, '_>,
    attribute: &'static str,
    path: &str,
) -> Result<&'a str, ErrorKind> {
    node.attribute(attribute)
        .ok_or_else(|| ErrorKind::MissingAttribute {
            path: path.to_string(),
            element: "Attachment",
            attribute,
        })
}

fn parse_numbers<const N: usize>(
    value: &str,
    attribute: &'static str,
    path: &str,
) -> Result<[f64; N], ErrorKind> {
    let invalid = || ErrorKind::InvalidNumbers {
        path: path.to_string(),
        attribute,
        value: value.to_string(),
        expected: N,
    };
    let numbers = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(invalid)
        })
        .collect::<Result<Vec<_>, _>>()?;
    numbers.try_into().map_err(|_| invalid())
}

fn parse_attachment(node: &roxmltree::Node, path: &str) -> Result<AttachmentRecord, ErrorKind> {
    let binding_path = required(node, "Binding", path)?;
    let recognized = paths::extension(binding_path).is_some_and(|ext| {
        GEOMETRY_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    });
    if !recognized {
        return Err(ErrorKind::UnrecognizedGeometry {
            binding: binding_path.to_string(),
        });
    }

    Ok(AttachmentRecord {
        name: required(node, "AName", path)?.to_string(),
        rotation: parse_numbers(required(node, "Rotation", path)?, "Rotation", path)?,
        position: parse_numbers(required(node, "Position", path)?, "Position", path)?,
        bone_name: required(node, "BoneName", path)?.replace(' ', "_"),
        binding_path: binding_path.to_string(),
        material_path: node
            .attribute("Material")
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        flags: node.attribute("Flags").unwrap_or_default().to_string(),
    })
}
