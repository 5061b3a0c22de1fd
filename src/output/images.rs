//! Image persistence with content-derived naming

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Subdirectory of the target directory receiving all images
const IMAGES_SUBDIR: &str = "images";

/// Errors raised while naming or writing an image
#[derive(Debug, Error)]
pub enum ImageWriteError {
    #[error("No usable extension in content type '{content_type}'")]
    UnknownContentType { content_type: String },

    #[error("Image already exists at {path} (duplicate category/UPC)")]
    Collision { path: PathBuf },

    #[error("Failed to write image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes product images into the run's images directory
///
/// Write targets are disjoint by the `(category, upc)` invariant, so the
/// store needs no locking; an existing file at a derived name means an
/// upstream extraction defect and is reported, never overwritten.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Creates the images directory under the target directory
    pub async fn create(target_dir: &Path) -> std::io::Result<Self> {
        let dir = target_dir.join(IMAGES_SUBDIR);
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Writes image bytes under the derived filename
    ///
    /// Bytes go to a temporary name first and are renamed into place, so an
    /// interrupted run never leaves a partial file at the final name.
    pub async fn save(
        &self,
        category: &str,
        upc: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, ImageWriteError> {
        let filename = image_filename(category, upc, content_type)?;
        let path = self.dir.join(&filename);

        match fs::try_exists(&path).await {
            Ok(true) => return Err(ImageWriteError::Collision { path }),
            Ok(false) => {}
            Err(source) => return Err(ImageWriteError::Io { path, source }),
        }

        let tmp = self.dir.join(format!("{}.part", filename));
        if let Err(source) = fs::write(&tmp, bytes).await {
            return Err(ImageWriteError::Io { path: tmp, source });
        }
        if let Err(source) = fs::rename(&tmp, &path).await {
            return Err(ImageWriteError::Io { path, source });
        }

        tracing::trace!("Wrote image {}", path.display());
        Ok(path)
    }
}

/// Derives the image filename from record fields and the content type
///
/// `("Travel", "a22124811bfa8350", "image/jpeg")` yields
/// `travel_a22124811bfa8350.jpeg`.
pub fn image_filename(
    category: &str,
    upc: &str,
    content_type: &str,
) -> Result<String, ImageWriteError> {
    let slug = category.to_lowercase().replace(' ', "_");
    let extension = extension_for(content_type)?;
    Ok(format!("{}_{}{}", slug, upc, extension))
}

/// Maps a declared content type to a file extension
fn extension_for(content_type: &str) -> Result<String, ImageWriteError> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    let subtype = mime.split('/').nth(1).unwrap_or("").trim();
    if subtype.is_empty() {
        return Err(ImageWriteError::UnknownContentType {
            content_type: content_type.to_string(),
        });
    }
    Ok(format!(".{}", subtype))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_the_documented_filename() {
        assert_eq!(
            image_filename("Travel", "a22124811bfa8350", "image/jpeg").unwrap(),
            "travel_a22124811bfa8350.jpeg"
        );
    }

    #[test]
    fn spaces_become_underscores_and_case_folds() {
        assert_eq!(
            image_filename("Science Fiction", "abc123", "image/png").unwrap(),
            "science_fiction_abc123.png"
        );
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert_eq!(
            image_filename("Travel", "abc", "image/jpeg; charset=binary").unwrap(),
            "travel_abc.jpeg"
        );
    }

    #[test]
    fn unusable_content_type_is_an_error() {
        assert!(matches!(
            image_filename("Travel", "abc", ""),
            Err(ImageWriteError::UnknownContentType { .. })
        ));
        assert!(matches!(
            image_filename("Travel", "abc", "jpeg"),
            Err(ImageWriteError::UnknownContentType { .. })
        ));
    }

    #[tokio::test]
    async fn saves_bytes_under_the_derived_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::create(dir.path()).await.unwrap();

        let path = store
            .save("Travel", "a22124811bfa8350", "image/jpeg", b"jpegbytes")
            .await
            .unwrap();

        assert_eq!(
            path,
            dir.path().join("images").join("travel_a22124811bfa8350.jpeg")
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"jpegbytes");
    }

    #[tokio::test]
    async fn collision_is_reported_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::create(dir.path()).await.unwrap();

        store
            .save("Travel", "abc", "image/jpeg", b"first")
            .await
            .unwrap();
        let second = store.save("Travel", "abc", "image/jpeg", b"second").await;

        assert!(matches!(second, Err(ImageWriteError::Collision { .. })));
        let path = dir.path().join("images").join("travel_abc.jpeg");
        assert_eq!(std::fs::read(path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn no_partial_file_remains_at_the_final_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::create(dir.path()).await.unwrap();
        store
            .save("Travel", "abc", "image/jpeg", b"bytes")
            .await
            .unwrap();
        assert!(!dir
            .path()
            .join("images")
            .join("travel_abc.jpeg.part")
            .exists());
    }
}
