use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;

use tracing::{debug, info};

use crate::error::ErrorKind;

pub mod geometry;
pub mod material;
pub mod mech;
pub mod rig;
pub mod stream;

use stream::CommandStream;

/// File the script is written to, relative to the working directory.
pub const OUTPUT_FILE_NAME: &str = "import.txt";

/// Replace `path` with the script. A previous script is removed first; not
/// finding one is fine.
pub fn write_script(path: &Path, stream: &CommandStream) -> Result<(), ErrorKind> {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed previous {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("no previous {} to remove", path.display())
        }
        Err(e) => return Err(e.into()),
    }

    let file = File::create(path)?;
    stream.write_to(BufWriter::new(file))?;
    info!("wrote {} commands to {}", stream.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rerun_overwrites_previous_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE_NAME);

        let mut stream = CommandStream::new();
        stream.push("import bpy");
        stream.push("bpy.context.scene.render.engine = 'CYCLES'");

        write_script(&path, &stream).unwrap();
        write_script(&path, &stream).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
