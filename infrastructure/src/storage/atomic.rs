//! Atomic file replacement: write a sibling temp file, fsync, rename.

use agentic_application::StoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Replace `path` with `contents` so readers see either the old or the new file.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| write_error(path, e))?;
    }

    let tmp = temp_path(path);
    let result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_error(path, e));
    }
    Ok(())
}

/// Read `path`, `None` when it does not exist or is blank
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Read(format!("{}: {}", path.display(), e))),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

fn write_error(path: &Path, e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => StoreError::QuotaExceeded,
        _ => StoreError::Write(format!("{}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("record.json");

        write_atomic(&path, b"{\"a\":1}").await.unwrap();
        write_atomic(&path, b"{\"a\":2}").await.unwrap();

        assert_eq!(read_optional(&path).await.unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_missing_and_blank_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        assert_eq!(read_optional(&path).await.unwrap(), None);
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(read_optional(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_atomic(&blocker.join("record.json"), b"{}")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Write(_)));
    }

    #[test]
    fn test_quota_errors_map_to_quota_exceeded() {
        let err = write_error(
            Path::new("x"),
            std::io::Error::new(ErrorKind::StorageFull, "disk full"),
        );
        assert_eq!(err, StoreError::QuotaExceeded);
    }
}
