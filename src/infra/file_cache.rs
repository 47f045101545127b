use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::{CacheBranch, CachedFile, FileCacheService};

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Client of the repo-file-cache HTTP service.
pub struct RepoFileCacheClient {
    http: Client,
    endpoint: String,
    max_retries: u32,
}

impl RepoFileCacheClient {
    pub fn new(endpoint: impl Into<String>, max_retries: u32) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            max_retries,
        }
    }

    fn files_endpoint(&self, branch: &CacheBranch, file_name: &str) -> String {
        format!(
            "{}/v1/file/{}/{}/{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            branch.platform,
            branch.org,
            branch.repo,
            branch.branch,
            file_name
        )
    }

    async fn fetch_once(&self, url: &str, recursive: bool) -> AppResult<CacheFilesResponse> {
        let response = self
            .http
            .get(url)
            .query(&[("recursive", recursive)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::FileCache(format!("failed to call file cache: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::FileCache(format!(
                "file cache responded with {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|err| {
                AppError::FileCache(format!("failed to parse file cache response: {err}"))
            })
    }
}

#[async_trait]
impl FileCacheService for RepoFileCacheClient {
    async fn lookup_files(
        &self,
        branch: &CacheBranch,
        file_name: &str,
        recursive: bool,
    ) -> AppResult<Vec<CachedFile>> {
        let url = self.files_endpoint(branch, file_name);
        let url = url.as_str();

        let payload = with_retries(self.max_retries, RETRY_BACKOFF, move || {
            self.fetch_once(url, recursive)
        })
        .await?;

        Ok(payload
            .data
            .files
            .into_iter()
            .map(|file| CachedFile {
                path: file.path.full_path(),
                content: file.content,
            })
            .collect())
    }
}

/// Runs `op` once, then up to `max_retries` more times while it fails,
/// sleeping `backoff * attempt` between tries.
async fn with_retries<T, F, Fut>(max_retries: u32, backoff: Duration, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                tracing::debug!(attempt, error = %err, "retrying file cache lookup");
                tokio::time::sleep(backoff * attempt).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[derive(Deserialize)]
struct CacheFilesResponse {
    #[serde(default)]
    data: CacheFiles,
}

#[derive(Deserialize, Default)]
struct CacheFiles {
    #[serde(default)]
    files: Vec<CacheFileEntry>,
}

#[derive(Deserialize)]
struct CacheFileEntry {
    path: CacheFilePath,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct CacheFilePath {
    #[serde(default)]
    dir: String,
    name: String,
}

impl CacheFilePath {
    fn full_path(&self) -> String {
        if self.dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.dir.trim_end_matches('/'), self.name)
        }
    }
}
