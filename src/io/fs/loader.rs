use std::fs;
use std::path::{Path, PathBuf};

use log::{error, trace};

use crate::io::common::loader::RawAssetLoader;

/// Loads memory images that have been dumped into a data directory.
pub struct FileLoader {
    data_folder: PathBuf,
}

impl FileLoader {
    pub fn new<P: AsRef<Path>>(data_folder: P) -> Self {
        Self {
            data_folder: data_folder.as_ref().to_path_buf(),
        }
    }
}

impl RawAssetLoader for FileLoader {
    fn load_raw_owned(&self, path: &str) -> Option<Vec<u8>> {
        let full_path = self.data_folder.join(path);
        match fs::read(&full_path) {
            Ok(buf) => {
                trace!("Loaded {} ({} bytes)", full_path.display(), buf.len());
                Some(buf)
            }
            Err(err) => {
                error!("Failed to load {}: {}", full_path.display(), err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_relative_to_the_data_folder() -> Result<(), anyhow::Error> {
        let folder = std::env::temp_dir().join(format!("kya-meshes-loader-{}", std::process::id()));
        fs::create_dir_all(&folder)?;
        fs::write(folder.join("image.bin"), [1u8, 2, 3])?;

        let loader = FileLoader::new(&folder);
        assert_eq!(loader.load_raw_owned("image.bin"), Some(vec![1, 2, 3]));
        assert_eq!(loader.load_raw_owned("missing.bin"), None);

        fs::remove_dir_all(&folder)?;
        Ok(())
    }
}
