//! Image storage on the local filesystem
//!
//! Uploaded cover images land under `{root}/{module_id}/{file_name}` and
//! are served back under the public `/images` prefix. File names are
//! sanitized to a safe character set before they touch the filesystem.

use gnomercy_common::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// URL prefix the HTTP layer serves the image root under
pub const PUBLIC_PREFIX: &str = "/images";

/// Filesystem-backed image store
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded module image and return its public URL
    pub async fn save_module_image(
        &self,
        module_id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let name = sanitize_file_name(file_name);
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "A valid image has not been provided.".to_string(),
            ));
        }

        let dir = self.root.join(module_id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        info!(module_id = %module_id, file = %name, bytes = bytes.len(), "Stored module image");
        Ok(format!("{PUBLIC_PREFIX}/{module_id}/{name}"))
    }
}

/// Reduce an uploaded file name to its final component with a safe charset
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    base.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("cover.png"), "cover.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("dir\\cover.png"), "cover.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("my cover (1).png"), "my_cover__1_.png");
        assert_eq!(sanitize_file_name("..."), "");
    }

    #[tokio::test]
    async fn test_save_writes_file_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());
        let module_id = Uuid::new_v4();

        let url = store
            .save_module_image(module_id, "cover.png", b"png-bytes")
            .await
            .unwrap();
        assert_eq!(url, format!("/images/{module_id}/cover.png"));

        let on_disk = dir.path().join(module_id.to_string()).join("cover.png");
        let contents = tokio::fs::read(&on_disk).await.unwrap();
        assert_eq!(contents, b"png-bytes");
    }

    #[tokio::test]
    async fn test_unusable_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf());

        let result = store
            .save_module_image(Uuid::new_v4(), "..", b"data")
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
