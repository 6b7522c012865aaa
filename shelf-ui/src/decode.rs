//! Cover image decoding.

use std::path::{Path, PathBuf};

use shelf::{ImageDecoder, LoadError, Pixmap};

/// Decodes image files with the `image` crate, retrying relative paths under
/// the assets directory.
#[derive(Debug, Clone)]
pub struct FileDecoder {
    assets_dir: PathBuf,
}

impl FileDecoder {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }
}

impl ImageDecoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<Pixmap, LoadError> {
        match image::open(path) {
            Ok(img) => Ok(img.into_rgba8()),
            Err(first) if path.is_relative() => {
                let fallback = self.assets_dir.join(path);
                image::open(&fallback)
                    .map(|img| img.into_rgba8())
                    .map_err(|_| LoadError::decode(path, first))
            }
            Err(e) => Err(LoadError::decode(path, e)),
        }
    }
}
