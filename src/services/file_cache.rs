use async_trait::async_trait;

use crate::error::AppResult;

/// Key of one cached branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheBranch {
    pub platform: String,
    pub org: String,
    pub repo: String,
    pub branch: String,
}

#[derive(Debug, Clone)]
pub struct CachedFile {
    pub path: String,
    pub content: String,
}

#[async_trait]
pub trait FileCacheService: Send + Sync {
    /// Files named `file_name` on `branch`, at the root only unless `recursive`.
    async fn lookup_files(
        &self,
        branch: &CacheBranch,
        file_name: &str,
        recursive: bool,
    ) -> AppResult<Vec<CachedFile>>;
}
