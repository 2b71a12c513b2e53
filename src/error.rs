use std::path::PathBuf;

use thiserror::Error;

use crate::config::Version;
use crate::export::stream::SymbolKind;

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("Blender {found} is not supported, the generated script needs at least {minimum}")]
    UnsupportedTargetVersion { found: Version, minimum: Version },
    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),
    #[error("No .cdf manifest found in {}", dir.display())]
    ManifestNotFound { dir: PathBuf },
    #[error("Manifest does not exist: {}", path.display())]
    ManifestMissing { path: PathBuf },
    #[error("Could not derive the asset name from {}", path.display())]
    AssetNameUnresolved { path: PathBuf },
    #[error("Malformed XML in {path}: {err}")]
    Xml {
        path: String,
        #[source]
        err: roxmltree::Error,
    },
    #[error("{path}: expected a <{element}> element")]
    MissingElement { path: String, element: &'static str },
    #[error("{path}: <{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        path: String,
        element: &'static str,
        attribute: &'static str,
    },
    #[error("{path}: {attribute}={value:?} should be {expected} comma separated numbers")]
    InvalidNumbers {
        path: String,
        attribute: &'static str,
        value: String,
        expected: usize,
    },
    #[error("Binding {binding:?} is not a .cga or .cgf file")]
    UnrecognizedGeometry { binding: String },
    #[error("{kind} {name:?} is referenced before it was created")]
    UnresolvedSymbol { kind: SymbolKind, name: String },
    #[error("Data file not found: {}", path.display())]
    DatafileNotFound { path: PathBuf },
    #[error("Error interpreting UTF-8 string: {err}")]
    Utf8Error {
        #[from]
        err: std::str::Utf8Error,
    },
    #[error("IO error")]
    IoError(#[from] std::io::Error),
}
