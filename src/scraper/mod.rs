//! Artifact scraping
//!
//! After a failed test run the runner packs the report directory and hands
//! the resulting artifacts directory to an [`ArtifactScraper`]. Backends:
//! - `fs`: copy into a local artifact store
//! - `http`: upload every file with a PUT request

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod archive;
pub mod fs;
pub mod http;

pub use archive::{archive_dir, ArchiveError};
pub use fs::FsScraper;
pub use http::HttpScraper;

use crate::execution::ScraperConfig;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("artifact directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload of {url} failed with status {status}")]
    Upload { url: String, status: u16 },
}

/// Persists artifact directories for an execution
#[async_trait]
pub trait ArtifactScraper: Send + Sync {
    async fn scrape(&self, execution_id: &str, directories: &[PathBuf]) -> Result<(), ScrapeError>;
}

/// Build the configured scraper backend
pub fn from_config(config: &ScraperConfig) -> Result<Arc<dyn ArtifactScraper>, ScrapeError> {
    let scraper: Arc<dyn ArtifactScraper> = match config {
        ScraperConfig::Filesystem { path } => Arc::new(FsScraper::new(path.clone())),
        ScraperConfig::Http {
            endpoint,
            bucket,
            token,
        } => Arc::new(HttpScraper::new(endpoint, bucket, token.clone())?),
    };
    Ok(scraper)
}

/// All files under `dir`, as paths relative to it, sorted
pub(crate) async fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScrapeError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ScrapeError::MissingDirectory(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScrapeError::MissingDirectory(dir.to_path_buf()))
        }
        Err(e) => return Err(io_error(dir)(e)),
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current).await.map_err(io_error(&current))?;
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&current))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(io_error(&path))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                if let Ok(relative) = path.strip_prefix(dir) {
                    files.push(relative.to_path_buf());
                }
            }
        }
    }
    files.sort();
    Ok(files)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ScrapeError {
    let path = path.to_path_buf();
    move |source| ScrapeError::Io { path, source }
}

/// Last path component, used to namespace a directory's files
pub(crate) fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifacts".to_string())
}
