use brat_errors::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILENAME: &str = "brat-creation.png";
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Encoded PNG plus its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A file ready to hand to the user.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn new(image: PngImage) -> Self {
        Self::named(image, DEFAULT_FILENAME)
    }

    pub fn named(image: PngImage, filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: PNG_CONTENT_TYPE,
            bytes: image.bytes,
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Writes the file into `dir`. Goes through a temporary file so that a
    /// failed write never leaves a truncated image behind.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let target = dir.join(&self.filename);
        let temp = dir.join(format!(".{}.{}.part", self.filename, uuid::Uuid::new_v4()));

        let result = fs::write(&temp, &self.bytes).and_then(|_| fs::rename(&temp, &target));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp);
            tracing::error!("Failed to save {}: {}", target.display(), e);
            return Err(AppError::Internal(format!(
                "cannot write {}: {}",
                target.display(),
                e
            )));
        }

        tracing::info!("Saved {}", target.display());
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareMetadata {
    pub title: String,
    pub text: String,
    pub filename: String,
}

impl Default for ShareMetadata {
    fn default() -> Self {
        Self {
            title: "My BRAT Creation".to_string(),
            text: "Check out my BRAT creation!".to_string(),
            filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

/// The host's share surface.
#[derive(Debug, Clone)]
pub enum NativeShare {
    Unsupported,
    /// Drops shared images (and their metadata) into a directory picked up by the host.
    Directory(PathBuf),
}

impl NativeShare {
    pub fn is_supported(&self) -> bool {
        !matches!(self, NativeShare::Unsupported)
    }

    pub fn share(&self, image: PngImage, metadata: &ShareMetadata) -> Result<PathBuf, AppError> {
        match self {
            NativeShare::Unsupported => Err(AppError::CapabilityAbsent),
            NativeShare::Directory(dir) => {
                share_into(dir, &uuid::Uuid::new_v4().to_string(), image, metadata)
            }
        }
    }
}

/// Writes the metadata sidecar, then the image. A share either leaves both
/// files or neither.
fn share_into(
    dir: &Path,
    stem: &str,
    image: PngImage,
    metadata: &ShareMetadata,
) -> Result<PathBuf, AppError> {
    let sidecar = serde_json::to_vec_pretty(metadata)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let meta = Download {
        filename: format!("{}.json", stem),
        content_type: "application/json",
        bytes: sidecar,
    };
    let meta_path = meta.save_into(dir)?;

    let download = Download::named(image, &format!("{}-{}", stem, metadata.filename));
    download.save_into(dir).map_err(|e| {
        let _ = fs::remove_file(&meta_path);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> PngImage {
        PngImage {
            bytes: b"\x89PNG\r\n\x1a\nrest".to_vec(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_download_defaults() {
        let download = Download::new(image());
        assert_eq!(download.filename, "brat-creation.png");
        assert_eq!(download.content_type, "image/png");
        assert_eq!(
            download.content_disposition(),
            "attachment; filename=\"brat-creation.png\""
        );
    }

    #[test]
    fn test_save_into_leaves_only_the_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Download::new(image()).save_into(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("brat-creation.png"));
        assert_eq!(fs::read(&path).unwrap(), image().bytes);
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(Download::new(image()).save_into(&missing).is_err());
        assert!(!missing.exists());
    }

    #[test]
    fn test_unsupported_share() {
        let result = NativeShare::Unsupported.share(image(), &ShareMetadata::default());
        assert_eq!(result, Err(AppError::CapabilityAbsent));
        assert!(!NativeShare::Unsupported.is_supported());
    }

    #[test]
    fn test_failed_image_write_removes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the image should go makes the final rename fail.
        fs::create_dir(dir.path().join("s1-brat-creation.png")).unwrap();

        let result = share_into(dir.path(), "s1", image(), &ShareMetadata::default());
        assert!(result.is_err());
        assert!(!dir.path().join("s1.json").exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_directory_share_writes_image_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let share = NativeShare::Directory(dir.path().to_path_buf());
        let path = share.share(image(), &ShareMetadata::default()).unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().ends_with("brat-creation.png"));
        let json_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map_or(false, |x| x == "json"))
            .count();
        assert_eq!(json_files, 1);
    }
}
