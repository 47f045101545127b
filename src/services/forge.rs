use async_trait::async_trait;

use crate::domain::change::ChangedFile;
use crate::domain::item::ItemRef;
use crate::domain::ownership::Collaborator;
use crate::domain::tree::TreeEntry;
use crate::error::AppResult;

/// A file fetched from a repository. `content` is base64 encoded.
#[derive(Debug, Clone)]
pub struct RepoContent {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct RepoLabel {
    pub name: String,
}

#[async_trait]
pub trait ForgeService: Send + Sync {
    async fn get_changed_files(&self, org: &str, repo: &str, number: i32)
    -> AppResult<Vec<ChangedFile>>;

    /// Head commit of `branch`.
    async fn get_ref(&self, org: &str, repo: &str, branch: &str) -> AppResult<String>;

    async fn get_directory_tree(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
        depth: u32,
    ) -> AppResult<Vec<TreeEntry>>;

    /// `Ok(None)` when the file does not exist at `git_ref`.
    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> AppResult<Option<RepoContent>>;

    async fn list_collaborators(&self, org: &str, repo: &str) -> AppResult<Vec<Collaborator>>;

    async fn get_repo_labels(&self, org: &str, repo: &str) -> AppResult<Vec<RepoLabel>>;

    async fn create_repo_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> AppResult<()>;

    async fn add_label(&self, org: &str, repo: &str, item: &ItemRef, label: &str) -> AppResult<()>;

    async fn post_comment(&self, org: &str, repo: &str, item: &ItemRef, body: &str)
    -> AppResult<()>;
}
