//! HTTP artifact upload
//!
//! Every file is sent with `PUT <endpoint>/<bucket>/<execution id>/<dir>/<path>`,
//! with an optional bearer token. Stores that need signed requests are not
//! supported.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{dir_name, io_error, list_files, ArtifactScraper, ScrapeError};

#[derive(Debug, Clone)]
pub struct HttpScraper {
    endpoint: String,
    bucket: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpScraper {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        token: Option<String>,
    ) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
            token,
            client,
        })
    }

    fn object_url(&self, execution_id: &str, dir: &str, relative: &Path) -> String {
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}/{}/{}",
            self.endpoint, self.bucket, execution_id, dir, key
        )
    }
}

#[async_trait]
impl ArtifactScraper for HttpScraper {
    async fn scrape(&self, execution_id: &str, directories: &[PathBuf]) -> Result<(), ScrapeError> {
        for dir in directories {
            let name = dir_name(dir);
            let files = list_files(dir).await?;

            for relative in &files {
                let path = dir.join(relative);
                let body = tokio::fs::read(&path).await.map_err(io_error(&path))?;
                let url = self.object_url(execution_id, &name, relative);
                debug!(url = %url, bytes = body.len(), "Uploading artifact");

                let mut request = self.client.put(&url).body(body);
                if let Some(token) = &self.token {
                    request = request.header("Authorization", format!("Bearer {}", token));
                }

                let response = request.send().await?;
                if !response.status().is_success() {
                    return Err(ScrapeError::Upload {
                        url,
                        status: response.status().as_u16(),
                    });
                }
            }

            info!(execution_id, files = files.len(), "Uploaded artifacts");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url() {
        let scraper =
            HttpScraper::new("http://artifacts.local:9000/", "/artifacts/", None).unwrap();
        assert_eq!(
            scraper.object_url(
                "exec-1",
                "test-results",
                Path::new("trace/test-results.tar.gz")
            ),
            "http://artifacts.local:9000/artifacts/exec-1/test-results/trace/test-results.tar.gz"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("test-results");
        std::fs::create_dir_all(&results).unwrap();
        std::fs::write(results.join("a.txt"), "a").unwrap();

        let scraper = HttpScraper::new("http://127.0.0.1:9", "artifacts", None).unwrap();
        let err = scraper.scrape("exec-1", &[results]).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Http(_)));
    }
}
