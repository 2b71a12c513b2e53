//! Resolution of everything an import run needs before any XML is read:
//! formats, the asset root, the manifest location and the asset name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bon::Builder;
use tracing::{debug, warn};

use crate::data::paths;
use crate::error::ErrorKind;

/// Asset root used when none is given on the command line.
pub const DEFAULT_BASE_DIR: &str = r"d:\depot\mwo\";

/// Manifest file extension (CryEngine character definition).
pub const MANIFEST_EXTENSION: &str = "cdf";

/// Manifests with this in their file name drive cinematics, not mechs.
pub const MOVIE_MARKER: &str = "movie";

/// Oldest Blender release whose Python API the generated script targets.
pub const MINIMUM_TARGET_VERSION: Version = Version {
    major: 2,
    minor: 79,
    patch: 0,
};

/// Ordered by major, then minor, then patch.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for Version {
    type Err = ErrorKind;

    /// Accepts `major.minor` or `major.minor.patch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ErrorKind::InvalidVersion(s.to_string());
        let parts = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match parts[..] {
            [major, minor] => Ok(Version {
                major,
                minor,
                patch: 0,
            }),
            [major, minor, patch] => Ok(Version {
                major,
                minor,
                patch,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Fails when the script would be generated for a Blender older than
/// [`MINIMUM_TARGET_VERSION`].
pub fn check_target_version(version: &Version) -> Result<(), ErrorKind> {
    if *version >= MINIMUM_TARGET_VERSION {
        Ok(())
    } else {
        Err(ErrorKind::UnsupportedTargetVersion {
            found: *version,
            minimum: MINIMUM_TARGET_VERSION,
        })
    }
}

/// Geometry format the converted mech parts were exported to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Collada. Keeps the scene graph, so imports can find bone chains and
    /// auto-connect them.
    #[default]
    Rich,
    /// Wavefront OBJ. Plain polygons with the default grouping behavior.
    Simple,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Rich => "dae",
            ExportFormat::Simple => "obj",
        }
    }
}

/// Texture file format the material images were converted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Dds,
    Tif,
}

impl ImageFormat {
    /// `tif` or `.tif` in any case selects TIFF, anything else means DDS.
    pub fn from_arg(arg: &str) -> Self {
        if arg.trim_start_matches('.').eq_ignore_ascii_case("tif") {
            ImageFormat::Tif
        } else {
            ImageFormat::Dds
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Dds => "dds",
            ImageFormat::Tif => "tif",
        }
    }
}

/// The asset root, kept both as a filesystem path and as escaped script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDir {
    root: PathBuf,
    escaped: String,
}

impl BaseDir {
    pub fn new(dir: &str) -> Self {
        let escaped = paths::escape_dir(dir);
        Self {
            root: PathBuf::from(dir),
            escaped,
        }
    }

    /// Use `dir` if given, otherwise fall back to [`DEFAULT_BASE_DIR`] with a
    /// warning.
    pub fn resolve(dir: Option<&str>) -> Self {
        match dir {
            Some(dir) => Self::new(dir),
            None => {
                warn!(
                    "No base directory given, using {DEFAULT_BASE_DIR}. This is probably not where your assets are; pass --base-dir"
                );
                Self::new(DEFAULT_BASE_DIR)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// The directory with a trailing separator and every separator doubled.
    pub fn escaped(&self) -> &str {
        &self.escaped
    }

    /// Location on disk of a game-relative path under this root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root.join(paths::to_native(relative))
    }

    /// Script text for a game-relative path under this root.
    pub fn script_path(&self, relative: &str) -> String {
        format!("{}{}", self.escaped, paths::escape_separators(relative))
    }
}

/// Fully resolved settings for one run.
#[derive(Builder, Debug, Clone)]
pub struct Config {
    pub base_dir: BaseDir,
    #[builder(default)]
    pub export_format: ExportFormat,
    #[builder(default)]
    pub image_format: ImageFormat,
    pub manifest: PathBuf,
    /// Mech name, taken from the directory holding the manifest.
    #[builder(into)]
    pub asset_name: String,
}

impl Config {
    /// Game-relative directory of the asset, e.g. `objects/mechs/atlas`.
    pub fn asset_dir(&self) -> String {
        format!("objects/mechs/{}", self.asset_name)
    }

    /// `<asset dir>/body/<asset>_body.mtl`
    pub fn body_material_file(&self) -> String {
        format!("{}/body/{}_body.mtl", self.asset_dir(), self.asset_name)
    }

    /// `<asset dir>/cockpit_standard/<asset>_a_cockpit_standard.mtl`
    pub fn cockpit_material_file(&self) -> String {
        format!(
            "{}/cockpit_standard/{}_a_cockpit_standard.mtl",
            self.asset_dir(),
            self.asset_name
        )
    }

    /// `<asset dir>/body/<asset>.dae`
    pub fn armature_file(&self) -> String {
        format!("{}/body/{}.dae", self.asset_dir(), self.asset_name)
    }
}

/// Return `explicit` if it exists, otherwise look for a manifest in `cwd`.
pub fn locate_manifest(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf, ErrorKind> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(ErrorKind::ManifestMissing {
            path: path.to_path_buf(),
        }),
        None => discover_manifest(cwd),
    }
}

/// Find a `.cdf` in `dir`, ignoring movie manifests. When several qualify the
/// first in name order wins.
pub fn discover_manifest(dir: &Path) -> Result<PathBuf, ErrorKind> {
    let not_found = || ErrorKind::ManifestNotFound {
        dir: dir.to_path_buf(),
    };
    let pattern = format!(
        "{}/*.{MANIFEST_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };
    let mut candidates: Vec<PathBuf> = glob::glob_with(&pattern, options)
        .map_err(|_| not_found())?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if name.contains(MOVIE_MARKER) {
                debug!("skipping movie manifest {}", path.display());
                false
            } else {
                true
            }
        })
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        warn!(
            "found {} manifests in {}, using {}",
            candidates.len(),
            dir.display(),
            candidates[0].display()
        );
    }
    candidates.into_iter().next().ok_or_else(not_found)
}

/// Name of the directory holding `manifest`. A leading `.` component is
/// dropped, and a manifest with no directory part resolves against `cwd`.
pub fn asset_name(manifest: &Path, cwd: &Path) -> Result<String, ErrorKind> {
    let parent = manifest.parent().unwrap_or(Path::new(""));
    let parent = parent.strip_prefix(".").unwrap_or(parent);
    let dir = if parent.as_os_str().is_empty() {
        cwd
    } else {
        parent
    };
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ErrorKind::AssetNameUnresolved {
            path: manifest.to_path_buf(),
        })
}
