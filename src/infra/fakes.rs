//! In-memory collaborators for tests. Every forge call is appended to a
//! call log so tests can assert on ordering.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};

use crate::domain::change::ChangedFile;
use crate::domain::item::ItemRef;
use crate::domain::ownership::{Collaborator, Permissions};
use crate::domain::tree::TreeEntry;
use crate::error::{AppError, AppResult};
use crate::services::{
    CacheBranch, CachedFile, FileCacheService, ForgeService, RepoContent, RepoLabel,
};

#[derive(Debug, Default)]
pub struct FakeForge {
    pub files: Mutex<HashMap<String, String>>,
    pub collaborators: Mutex<Vec<Collaborator>>,
    pub labels: Mutex<Vec<String>>,
    pub changed_files: Mutex<Vec<ChangedFile>>,
    pub tree: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(ItemRef, String)>>,
    pub attached: Mutex<Vec<(ItemRef, String)>>,
    pub fail_labels: bool,
    pub fail_create_label: bool,
    pub fail_add_label: bool,
    pub fail_comment: bool,
    pub fail_collaborators: bool,
}

impl FakeForge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, org: &str, repo: &str, path: &str, text: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(format!("{org}/{repo}/{path}"), BASE64_STANDARD.encode(text));
        self
    }

    pub fn with_collaborator(self, login: &str, admin: bool, push: bool) -> Self {
        self.collaborators.lock().unwrap().push(Collaborator {
            login: login.to_string(),
            permissions: Permissions { admin, push },
        });
        self
    }

    pub fn with_label(self, name: &str) -> Self {
        self.labels.lock().unwrap().push(name.to_string());
        self
    }

    pub fn with_changed_file(self, filename: &str, diff: &str) -> Self {
        self.changed_files.lock().unwrap().push(ChangedFile {
            filename: filename.to_string(),
            diff: diff.to_string(),
        });
        self
    }

    pub fn with_tree(self, paths: &[&str]) -> Self {
        *self.tree.lock().unwrap() = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(ItemRef, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn attached(&self) -> Vec<(ItemRef, String)> {
        self.attached.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ForgeService for FakeForge {
    async fn get_changed_files(
        &self,
        org: &str,
        repo: &str,
        number: i32,
    ) -> AppResult<Vec<ChangedFile>> {
        self.record(format!("get_changed_files {org}/{repo}!{number}"));
        Ok(self.changed_files.lock().unwrap().clone())
    }

    async fn get_ref(&self, org: &str, repo: &str, branch: &str) -> AppResult<String> {
        self.record(format!("get_ref {org}/{repo}:{branch}"));
        Ok("0123abcd".to_string())
    }

    async fn get_directory_tree(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
        depth: u32,
    ) -> AppResult<Vec<TreeEntry>> {
        self.record(format!("get_directory_tree {org}/{repo}@{sha} {depth}"));
        Ok(self
            .tree
            .lock()
            .unwrap()
            .iter()
            .map(|path| TreeEntry { path: path.clone() })
            .collect())
    }

    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> AppResult<Option<RepoContent>> {
        self.record(format!("get_file_content {org}/{repo}/{path}@{git_ref}"));
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(&format!("{org}/{repo}/{path}"))
            .map(|content| RepoContent {
                path: path.to_string(),
                content: content.clone(),
            }))
    }

    async fn list_collaborators(&self, org: &str, repo: &str) -> AppResult<Vec<Collaborator>> {
        self.record(format!("list_collaborators {org}/{repo}"));
        if self.fail_collaborators {
            return Err(AppError::Forge("collaborators unavailable".to_string()));
        }
        Ok(self.collaborators.lock().unwrap().clone())
    }

    async fn get_repo_labels(&self, org: &str, repo: &str) -> AppResult<Vec<RepoLabel>> {
        self.record(format!("get_repo_labels {org}/{repo}"));
        if self.fail_labels {
            return Err(AppError::Forge("labels unavailable".to_string()));
        }
        Ok(self
            .labels
            .lock()
            .unwrap()
            .iter()
            .map(|name| RepoLabel { name: name.clone() })
            .collect())
    }

    async fn create_repo_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> AppResult<()> {
        self.record(format!("create_repo_label {org}/{repo} {name} {color}"));
        if self.fail_create_label {
            return Err(AppError::Forge("label already exists".to_string()));
        }
        self.labels.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn add_label(&self, org: &str, repo: &str, item: &ItemRef, label: &str) -> AppResult<()> {
        self.record(format!("add_label {org}/{repo} {item} {label}"));
        if self.fail_add_label {
            return Err(AppError::Forge("connection reset".to_string()));
        }
        self.attached
            .lock()
            .unwrap()
            .push((item.clone(), label.to_string()));
        Ok(())
    }

    async fn post_comment(
        &self,
        org: &str,
        repo: &str,
        item: &ItemRef,
        body: &str,
    ) -> AppResult<()> {
        self.record(format!("post_comment {org}/{repo} {item}"));
        if self.fail_comment {
            return Err(AppError::Forge("comment rejected".to_string()));
        }
        self.comments
            .lock()
            .unwrap()
            .push((item.clone(), body.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeFileCache {
    pub files: Mutex<HashMap<String, Vec<CachedFile>>>,
    pub lookups: Mutex<Vec<(CacheBranch, String, bool)>>,
}

impl FakeFileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, file_name: &str, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .entry(file_name.to_string())
            .or_default()
            .push(CachedFile {
                path: path.to_string(),
                content: content.to_string(),
            });
        self
    }

    pub fn lookups(&self) -> Vec<(CacheBranch, String, bool)> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileCacheService for FakeFileCache {
    async fn lookup_files(
        &self,
        branch: &CacheBranch,
        file_name: &str,
        recursive: bool,
    ) -> AppResult<Vec<CachedFile>> {
        self.lookups
            .lock()
            .unwrap()
            .push((branch.clone(), file_name.to_string(), recursive));
        Ok(self
            .files
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .unwrap_or_default())
    }
}
