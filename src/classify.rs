//! Name-based classification of mech parts.
//!
//! The game encodes part roles only in names: weapon hardpoints carry the
//! weapon's short name, cockpit glass ends in `_window`, collision helpers say
//! `proxy` or start with `$`. All matching here is case-insensitive.

/// Substrings marking weapon and hero/variant parts. These use the
/// `<asset>_variant` material.
pub const WEAPON_MARKERS: &[&str] = &[
    "hero", "missile", "narc", "uac", "uac2", "uac5", "uac10", "uac20", "ac2", "ac5", "ac10",
    "ac20", "gauss", "ppc", "flamer", "_mg_", "lbx", "laser", "ams", "phoenix", "blank",
    "invasion", "hmg", "lmg", "lams",
];

/// Object names containing this are cockpit geometry.
pub const COCKPIT_MARKER: &str = "cockpit";

/// Object names ending with this are cockpit glass and use `<asset>_window`.
pub const WINDOW_SUFFIX: &str = "_window";

/// Collision and physics helper geometry.
pub const PROXY_MARKER: &str = "proxy";

/// First character of CryEngine helper objects (`$physics_proxy`, ...).
pub const HELPER_PREFIX: char = '$';

/// Objects whose names contain one of these are moved to the secondary layer
/// at the end of the script.
pub const SECONDARY_LAYER_MARKERS: &[&str] = &["fire", "physics", "effect", "case"];

/// Why a part ended up with the material it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialOverrideReason {
    /// The material named by the attachment itself.
    Declared,
    /// Weapon or variant part.
    Variant,
    /// Cockpit glass.
    Window,
}

/// Material chosen for one attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialChoice {
    pub name: String,
    pub reason: MaterialOverrideReason,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub fn is_weapon(name: &str) -> bool {
    let name = name.to_lowercase();
    WEAPON_MARKERS.iter().any(|marker| name.contains(marker))
}

pub fn is_cockpit(object_name: &str) -> bool {
    contains_ignore_case(object_name, COCKPIT_MARKER)
}

pub fn is_window(object_name: &str) -> bool {
    object_name.to_lowercase().ends_with(WINDOW_SUFFIX)
}

/// Proxies and `$` helpers are imported and parented but never transformed,
/// weighted or given a material.
pub fn is_helper(object_name: &str) -> bool {
    object_name.starts_with(HELPER_PREFIX) || contains_ignore_case(object_name, PROXY_MARKER)
}

pub fn is_secondary_layer(object_name: &str) -> bool {
    let name = object_name.to_lowercase();
    SECONDARY_LAYER_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
}

/// Pick the material for an attachment.
///
/// Without a material path there is nothing to assign, whatever the name says.
/// Otherwise the path's last segment is the starting point, a weapon match on
/// either name switches to `<asset>_variant`, and a window object switches to
/// `<asset>_window`. The window check runs last, so it wins over the variant.
pub fn resolve_material(
    asset: &str,
    attachment_name: &str,
    object_name: &str,
    material_path: Option<&str>,
) -> Option<MaterialChoice> {
    let material_path = material_path?;
    let mut choice = MaterialChoice {
        name: crate::data::paths::last_segment(material_path).to_string(),
        reason: MaterialOverrideReason::Declared,
    };
    if is_weapon(object_name) || is_weapon(attachment_name) {
        choice = MaterialChoice {
            name: format!("{asset}_variant"),
            reason: MaterialOverrideReason::Variant,
        };
    }
    if is_window(object_name) {
        choice = MaterialChoice {
            name: format!("{asset}_window"),
            reason: MaterialOverrideReason::Window,
        };
    }
    Some(choice)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn declared_material_uses_last_segment() {
        let choice =
            resolve_material("atlas", "left_torso", "atlas_lt", Some("objects/mechs/atlas/body/atlas_body"))
                .unwrap();
        assert_eq!(choice.name, "atlas_body");
        assert_eq!(choice.reason, MaterialOverrideReason::Declared);
    }

    #[test]
    fn weapon_marker_on_either_name() {
        let by_attachment = resolve_material("atlas", "leftarm_uac5", "leftarm", Some("mech_body")).unwrap();
        assert_eq!(by_attachment.name, "atlas_variant");
        assert_eq!(by_attachment.reason, MaterialOverrideReason::Variant);

        let by_object = resolve_material("atlas", "rightarm", "atlas_ra_GAUSS", Some("mech_body")).unwrap();
        assert_eq!(by_object.name, "atlas_variant");
    }

    #[test]
    fn window_wins_over_variant() {
        let choice =
            resolve_material("atlas", "cockpit_laser", "atlas_cockpit_window", Some("mech_body")).unwrap();
        assert_eq!(choice.name, "atlas_window");
        assert_eq!(choice.reason, MaterialOverrideReason::Window);
    }

    #[test]
    fn no_material_path_means_no_material() {
        assert_eq!(resolve_material("atlas", "leftarm_uac5", "leftarm", None), None);
    }

    #[test]
    fn helpers() {
        assert!(is_helper("$physics_proxy"));
        assert!(is_helper("atlas_Proxy_ct"));
        assert!(!is_helper("atlas_ct"));
        assert!(is_cockpit("atlas_a_cockpit_standard"));
        assert!(is_secondary_layer("CT_Fire_Effect"));
        assert!(!is_secondary_layer("atlas_ct"));
    }
}
