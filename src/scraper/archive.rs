//! Gzipped tarballs of report directories

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::Builder;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("nothing to archive: {0} is not a directory")]
    MissingSource(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Pack `src` into a `.tar.gz` at `dest`. Entries are stored under the
/// directory's own name, e.g. `test-results/junit.xml`.
pub async fn archive_dir(src: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || write_archive(&src, &dest)).await?
}

fn write_archive(src: &Path, dest: &Path) -> Result<(), ArchiveError> {
    if !src.is_dir() {
        return Err(ArchiveError::MissingSource(src.to_path_buf()));
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let prefix = src
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let encoder = GzEncoder::new(File::create(dest)?, Compression::default());
    let mut tar = Builder::new(encoder);
    tar.append_dir_all(&prefix, src)?;
    tar.into_inner()?.finish()?;
    Ok(())
}
