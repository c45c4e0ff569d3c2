//! Atomic write operations for JSONL files.
//!
//! POSIX renames within one filesystem are atomic, so a crash-safe write is:
//! write everything to `{name}.{ext}.tmp`, flush, rename over the target.
//! A crash before the rename leaves the original file untouched; at worst a
//! stale temp file remains and is overwritten by the next save.

use crate::error::Result;
use crate::writer::JsonlWriter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Atomically writes a slice of values to a JSONL file.
///
/// The target file either keeps its previous content or holds the complete
/// new record set; it is never observed half-written.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, a value fails to
/// serialize, or the final rename fails. On failure the temp file is removed
/// best-effort and the original target is left unchanged.
///
/// # Examples
///
/// ```no_run
/// use trellis_jsonl::write_jsonl_atomic;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Record {
///     id: u32,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let records = vec![Record { id: 1 }, Record { id: 2 }];
/// write_jsonl_atomic("data.jsonl", &records).await?;
/// # Ok(())
/// # }
/// ```
pub async fn write_jsonl_atomic<T, P>(path: P, values: &[T]) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_jsonl_atomic_iter(path, values.iter()).await
}

/// Atomically writes an iterator of values to a JSONL file.
///
/// Like [`write_jsonl_atomic`] but avoids collecting into a slice first.
///
/// # Errors
///
/// See [`write_jsonl_atomic`].
pub async fn write_jsonl_atomic_iter<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Temp path for an atomic write: `data.jsonl` -> `data.jsonl.tmp`,
/// extension-less `data` -> `data.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let new_extension = match path.extension() {
        Some(ext) => {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".tmp");
            new_ext
        }
        None => std::ffi::OsString::from("tmp"),
    };
    temp_path.set_extension(new_extension);
    temp_path
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = JsonlWriter::new(file);
    writer.write_all(values).await?;
    writer.flush().await?;
    writer.into_inner().into_inner().sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestRecord {
        id: u32,
        name: String,
    }

    #[test]
    fn temp_path_appends_to_extension() {
        assert_eq!(
            make_temp_path(Path::new("/data/tasks.jsonl")),
            Path::new("/data/tasks.jsonl.tmp")
        );
        assert_eq!(
            make_temp_path(Path::new("/data/archive.tar.gz")),
            Path::new("/data/archive.tar.gz.tmp")
        );
        assert_eq!(make_temp_path(Path::new("/data/raw")), Path::new("/data/raw.tmp"));
    }

    #[tokio::test]
    async fn atomic_write_creates_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("records.jsonl");

        let records = vec![
            TestRecord {
                id: 1,
                name: "first".to_string(),
            },
            TestRecord {
                id: 2,
                name: "second".to_string(),
            },
        ];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let contents = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("records.jsonl");
        tokio::fs::write(&target, "old content\n").await.unwrap();

        let records = vec![TestRecord {
            id: 42,
            name: "new".to_string(),
        }];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let contents = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(contents.trim(), r#"{"id":42,"name":"new"}"#);
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("records.jsonl");

        let records = vec![TestRecord {
            id: 1,
            name: "only".to_string(),
        }];
        write_jsonl_atomic(&target, &records).await.unwrap();

        assert!(target.exists());
        assert!(!dir.path().join("records.jsonl.tmp").exists());
    }

    #[tokio::test]
    async fn atomic_write_empty_slice_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("records.jsonl");

        let records: Vec<TestRecord> = vec![];
        write_jsonl_atomic(&target, &records).await.unwrap();

        let metadata = tokio::fs::metadata(&target).await.unwrap();
        assert_eq!(metadata.len(), 0);
    }

    #[tokio::test]
    async fn atomic_write_iter_streams_values() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("records.jsonl");

        let records = (0..100).map(|id| TestRecord {
            id,
            name: format!("record_{id}"),
        });
        write_jsonl_atomic_iter(&target, records).await.unwrap();

        let contents = tokio::fs::read_to_string(&target).await.unwrap();
        assert_eq!(contents.lines().count(), 100);
        assert!(contents.lines().next().unwrap().contains(r#""id":0"#));
    }
}
