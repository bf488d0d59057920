//! Archive catalog: what is currently in the backup directory

use super::naming::{is_archive_name, parse_archive_timestamp};
use crate::error::{BackupError, Result};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// An archive file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl ArchiveEntry {
    /// Creation instant from the file name, falling back to the modification time
    pub fn created_at(&self) -> DateTime<Utc> {
        parse_archive_timestamp(&self.file_name).unwrap_or_else(|| self.modified.into())
    }
}

/// An opened archive ready to be streamed to a client
#[derive(Debug)]
pub struct ArchiveStream {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    pub reader: fs::File,
}

/// List archives in `dir`, newest first.
/// A missing directory yields an empty list.
pub async fn list_archives(dir: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if !is_archive_name(&file_name) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        entries.push(ArchiveEntry {
            file_name,
            path: entry.path(),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    entries.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| b.file_name.cmp(&a.file_name))
    });
    Ok(entries)
}

/// Archive file names in `dir`, newest first
pub async fn list(dir: &Path) -> Result<Vec<String>> {
    Ok(list_archives(dir)
        .await?
        .into_iter()
        .map(|e| e.file_name)
        .collect())
}

/// Resolve a client-supplied file name to an existing archive in `dir`
pub async fn resolve_archive(dir: &Path, file_name: &str) -> Result<PathBuf> {
    validate_file_name(file_name)?;

    let path = dir.join(file_name);
    match fs::metadata(&path).await {
        Ok(m) if m.is_file() => Ok(path),
        _ => Err(BackupError::ArchiveNotFound(path)),
    }
}

/// Open an archive at a known path for streaming
pub async fn open_path(path: &Path) -> Result<ArchiveStream> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| BackupError::InvalidArchiveName(path.display().to_string()))?
        .to_string();

    let reader = match fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BackupError::ArchiveNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let size = reader.metadata().await?.len();

    Ok(ArchiveStream {
        file_name,
        path: path.to_path_buf(),
        size,
        reader,
    })
}

/// Plain file names only: no separators, no parent references
fn validate_file_name(file_name: &str) -> Result<()> {
    let invalid = file_name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\\')
        || file_name.contains('\0');
    if invalid {
        return Err(BackupError::InvalidArchiveName(file_name.to_string()));
    }
    Ok(())
}
