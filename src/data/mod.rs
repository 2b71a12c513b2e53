/// Path text helpers: extension rewriting and separator escaping
pub mod paths;

use std::borrow::Cow;
use std::io;
use std::path::Path;

use crate::error::ErrorKind;

/// Source of the XML documents and textures an import reads.
///
/// The binary reads straight from disk with [`FsLoader`]; tests hand in a
/// closure over an in-memory map with [`DataFileWithCallback`].
pub trait DataFileLoader {
    fn get(&self, path: &Path) -> Result<Cow<'static, [u8]>, ErrorKind>;

    fn exists(&self, path: &Path) -> bool {
        self.get(path).is_ok()
    }
}

/// Reads files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl DataFileLoader for FsLoader {
    fn get(&self, path: &Path) -> Result<Cow<'static, [u8]>, ErrorKind> {
        match std::fs::read(path) {
            Ok(data) => Ok(Cow::Owned(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ErrorKind::DatafileNotFound {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

pub struct DataFileWithCallback<F> {
    callback: F,
}

impl<F> DataFileWithCallback<F>
where
    F: Fn(&Path) -> Result<Cow<'static, [u8]>, ErrorKind>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DataFileLoader for DataFileWithCallback<F>
where
    F: Fn(&Path) -> Result<Cow<'static, [u8]>, ErrorKind>,
{
    fn get(&self, path: &Path) -> Result<Cow<'static, [u8]>, ErrorKind> {
        (self.callback)(path)
    }
}

/// Read a file through `loader` and decode it as UTF-8 text.
pub fn read_text(loader: &impl DataFileLoader, path: &Path) -> Result<String, ErrorKind> {
    let bytes = loader.get(path)?;
    Ok(std::str::from_utf8(&bytes)?.to_owned())
}
