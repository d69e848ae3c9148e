use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Permission bits for mountpoints and the mount root.
pub const MOUNTPOINT_MODE: u32 = 0o700;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0} already exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DirectoryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Make sure `path` exists as a directory.
///
/// Missing directories (and parents) are created owner-only. An existing
/// directory is left untouched. Symlinks are not followed.
pub async fn ensure_directory(path: &Path) -> Result<(), DirectoryError> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(DirectoryError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let mut builder = tokio::fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(MOUNTPOINT_MODE);
            builder
                .create(path)
                .await
                .map_err(|e| DirectoryError::io(path, e))?;
            tracing::debug!(path = %path.display(), "created directory");
            Ok(())
        }
        Err(e) => Err(DirectoryError::io(path, e)),
    }
}

/// Make sure the mount root exists as a directory.
///
/// Unlike [`ensure_directory`] this follows symlinks, so the root may point
/// at a directory elsewhere.
pub async fn ensure_root(path: &Path) -> Result<(), DirectoryError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(DirectoryError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => ensure_directory(path).await,
        Err(e) => Err(DirectoryError::io(path, e)),
    }
}

/// Recursively delete `path`. A path that is already gone counts as removed.
pub async fn remove_directory(path: &Path) -> Result<(), DirectoryError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DirectoryError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creates_missing_directory_with_parents() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("a").join("b");

        ensure_directory(&path).await.unwrap();
        assert!(path.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o077, 0, "mode {:o} is not owner-only", mode);
        }
    }

    #[tokio::test]
    async fn test_existing_directory_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("keep"), b"data").unwrap();

        ensure_directory(temp.path()).await.unwrap();
        assert!(temp.path().join("keep").exists());
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("file");
        std::fs::write(&path, b"data").unwrap();

        let err = ensure_directory(&path).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotADirectory(p) if p == path));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_to_directory_is_not_followed() {
        let temp = tempfile::tempdir().unwrap();
        let real = temp.path().join("real");
        let link = temp.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let err = ensure_directory(&link).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_root_may_be_a_symlink_to_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let real = temp.path().join("real");
        let link = temp.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        ensure_root(&link).await.unwrap();
        assert!(link.join(".").is_dir());
    }

    #[tokio::test]
    async fn test_root_is_created_or_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("mnt").join("minfs");
        ensure_root(&root).await.unwrap();
        assert!(root.is_dir());

        let file = temp.path().join("file");
        std::fs::write(&file, b"data").unwrap();
        let err = ensure_root(&file).await.unwrap_err();
        assert!(matches!(err, DirectoryError::NotADirectory(p) if p == file));
    }

    #[tokio::test]
    async fn test_remove_directory() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("vol");
        std::fs::create_dir_all(path.join("nested")).unwrap();
        std::fs::write(path.join("nested").join("f"), b"x").unwrap();

        remove_directory(&path).await.unwrap();
        assert!(!path.exists());

        // already gone
        remove_directory(&path).await.unwrap();
    }
}
