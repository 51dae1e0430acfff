use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};

use crate::error::{CompareError, Result};

/// Name of the sub-directory of the system temp dir used when the caller gives none.
pub const DEFAULT_ARTIFACT_SUBDIR: &str = "pixel_compare";

pub fn default_artifact_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_ARTIFACT_SUBDIR)
}

/// A random suffix that keeps artifact names of repeated runs apart.
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// `<dir>/<kind>_<row>_<suffix>.png`
pub fn artifact_path(dir: &Path, kind: &str, row_index: u32, suffix: &str) -> PathBuf {
    dir.join(format!("{kind}_{row_index}_{suffix}.png"))
}

/// Encodes an RGBA canvas as PNG at `path`.
pub fn save_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let output = File::create(path).map_err(|source| CompareError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let encoder = PngEncoder::new(BufWriter::new(output));

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|source| CompareError::Render {
            path: path.to_path_buf(),
            source,
        })
}

/// Creates `dir` if needed, mapping failure to an error that names it.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| CompareError::ArtifactWrite {
        path: dir.to_path_buf(),
        source,
    })
}

/// Saves every `(path, image)` pair or none of them.
///
/// On the first failure the files already written by this call are removed.
pub fn save_all(artifacts: &[(&Path, &RgbaImage)]) -> Result<()> {
    for (index, (path, image)) in artifacts.iter().enumerate() {
        if let Err(error) = save_png(path, image) {
            for (written, _) in &artifacts[..index] {
                std::fs::remove_file(written).ok();
            }
            // a half-written file at the failing path goes too
            std::fs::remove_file(path).ok();
            return Err(error);
        }
    }
    Ok(())
}
