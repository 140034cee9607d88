//! File system utils.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

pub struct FsHandler;

impl FsHandler {
    /// Create the output directory (and its parents) if it doesn't exist.
    pub async fn create_output_directory(path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await?;
        tracing::debug!("Created output directory: {}", path.display());
        Ok(())
    }

    /// Replace the contents of `path` in a single step.
    ///
    /// The bytes go to a sibling temporary file which is then renamed over `path`,
    /// so readers see either the previous contents or the new ones.
    pub async fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let tmp_path = Self::tmp_path(path);

        if let Err(err) = tokio::fs::write(&tmp_path, contents).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        Ok(())
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_replace_creates_and_overwrites() {
        let temp_dir = TempDir::new("selora-fs").expect("Failed to create temp dir");
        let path = temp_dir.path().join("out.json");

        FsHandler::replace_file(&path, b"first").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        FsHandler::replace_file(&path, b"second").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        assert!(!temp_dir.path().join("out.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_replace_in_missing_directory_fails() {
        let temp_dir = TempDir::new("selora-fs").expect("Failed to create temp dir");
        let path = temp_dir.path().join("missing/out.json");

        assert!(FsHandler::replace_file(&path, b"data").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_tmp_file() {
        let temp_dir = TempDir::new("selora-fs").expect("Failed to create temp dir");
        // A non-empty directory cannot be replaced by a file.
        let path = temp_dir.path().join("out.json");
        std::fs::create_dir_all(path.join("inner")).unwrap();

        assert!(FsHandler::replace_file(&path, b"data").await.is_err());
        assert!(!temp_dir.path().join("out.json.tmp").exists());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_create_output_directory() {
        let temp_dir = TempDir::new("selora-fs").expect("Failed to create temp dir");
        let path = temp_dir.path().join("scripts/deployments");

        FsHandler::create_output_directory(&path).await.unwrap();
        FsHandler::create_output_directory(&path).await.unwrap();
        assert!(path.is_dir());
    }
}
