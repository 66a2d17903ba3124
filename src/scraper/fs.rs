//! Local filesystem artifact store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{dir_name, io_error, list_files, ArtifactScraper, ScrapeError};

/// Copies artifacts to `<root>/<execution id>/<directory name>/...`
#[derive(Debug, Clone)]
pub struct FsScraper {
    root: PathBuf,
}

impl FsScraper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactScraper for FsScraper {
    async fn scrape(&self, execution_id: &str, directories: &[PathBuf]) -> Result<(), ScrapeError> {
        for dir in directories {
            let target = self.root.join(execution_id).join(dir_name(dir));
            let files = list_files(dir).await?;

            for relative in &files {
                let dest = target.join(relative);
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(io_error(parent))?;
                }
                tokio::fs::copy(dir.join(relative), &dest)
                    .await
                    .map_err(io_error(&dest))?;
            }

            info!(
                execution_id,
                files = files.len(),
                target = %target.display(),
                "Stored artifacts"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scrape_copies_files() {
        let workspace = tempfile::tempdir().unwrap();
        let store = tempfile::tempdir().unwrap();

        let results = workspace.path().join("test-results");
        std::fs::create_dir_all(&results).unwrap();
        std::fs::write(results.join("test-results.tar.gz"), b"archive").unwrap();

        let scraper = FsScraper::new(store.path());
        scraper.scrape("exec-1", &[results]).await.unwrap();

        let stored = store
            .path()
            .join("exec-1/test-results/test-results.tar.gz");
        assert_eq!(std::fs::read(stored).unwrap(), b"archive");
    }

    #[tokio::test]
    async fn test_scrape_missing_directory() {
        let store = tempfile::tempdir().unwrap();
        let scraper = FsScraper::new(store.path());
        let err = scraper
            .scrape("exec-1", &[store.path().join("missing")])
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::MissingDirectory(_)));
    }
}
