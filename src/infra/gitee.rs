use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::change::ChangedFile;
use crate::domain::item::ItemRef;
use crate::domain::ownership::Collaborator;
use crate::domain::tree::TreeEntry;
use crate::error::{AppError, AppResult};
use crate::services::{ForgeService, RepoContent, RepoLabel};

pub const DEFAULT_ENDPOINT: &str = "https://gitee.com/api/v5";

const COLLABORATORS_PER_PAGE: usize = 100;

/// Gitee v5 REST client authenticated with a personal access token.
pub struct GiteeClient {
    http: Client,
    base_url: String,
    token: String,
}

impl GiteeClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn repo_endpoint(&self, org: &str, repo: &str, rest: &str) -> String {
        format!(
            "{}/repos/{org}/{repo}/{}",
            self.base_url.trim_end_matches('/'),
            rest.trim_start_matches('/')
        )
    }

    fn item_endpoint(&self, org: &str, repo: &str, item: &ItemRef, rest: &str) -> String {
        match item {
            ItemRef::Issue(number) => {
                self.repo_endpoint(org, repo, &format!("issues/{number}/{rest}"))
            }
            ItemRef::PullRequest(number) => {
                self.repo_endpoint(org, repo, &format!("pulls/{number}/{rest}"))
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .query(&[("access_token", self.token.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Forge(format!("failed to call Gitee: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Forge(format!("Gitee responded with {status}: {body}")));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> AppResult<T> {
        let response = self.send(self.http.get(url)).await?;
        response
            .json()
            .await
            .map_err(|err| AppError::Forge(format!("failed to parse Gitee response: {err}")))
    }
}

#[async_trait]
impl ForgeService for GiteeClient {
    async fn get_changed_files(
        &self,
        org: &str,
        repo: &str,
        number: i32,
    ) -> AppResult<Vec<ChangedFile>> {
        let files: Vec<GiteePullRequestFile> = self
            .get_json(self.repo_endpoint(org, repo, &format!("pulls/{number}/files")))
            .await?;

        Ok(files
            .into_iter()
            .map(|file| ChangedFile {
                filename: file.filename,
                diff: file.patch.map(|patch| patch.diff).unwrap_or_default(),
            })
            .collect())
    }

    async fn get_ref(&self, org: &str, repo: &str, branch: &str) -> AppResult<String> {
        let branch: GiteeBranch = self
            .get_json(self.repo_endpoint(org, repo, &format!("branches/{branch}")))
            .await?;
        Ok(branch.commit.sha)
    }

    async fn get_directory_tree(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
        depth: u32,
    ) -> AppResult<Vec<TreeEntry>> {
        let url = self.repo_endpoint(org, repo, &format!("git/trees/{sha}"));
        let response = self
            .send(self.http.get(url).query(&[("recursive", depth)]))
            .await?;
        let tree: GiteeTree = response
            .json()
            .await
            .map_err(|err| AppError::Forge(format!("failed to parse Gitee tree: {err}")))?;

        Ok(tree
            .tree
            .into_iter()
            .map(|entry| TreeEntry { path: entry.path })
            .collect())
    }

    async fn get_file_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> AppResult<Option<RepoContent>> {
        let url = self.repo_endpoint(org, repo, &format!("contents/{path}"));
        let result = self
            .http
            .get(url)
            .query(&[("access_token", self.token.as_str()), ("ref", git_ref)])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Forge(format!("failed to call Gitee: {err}")))?;

        let status = result.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Forge(format!(
                "Gitee responded with {status} for {org}/{repo}/{path}"
            )));
        }

        // Gitee answers a missing file with `[]` rather than 404 in some cases.
        let payload: serde_json::Value = result
            .json()
            .await
            .map_err(|err| AppError::Forge(format!("failed to parse Gitee content: {err}")))?;
        if payload.is_array() {
            return Ok(None);
        }
        let content: GiteeContent = serde_json::from_value(payload)
            .map_err(|err| AppError::Forge(format!("failed to parse Gitee content: {err}")))?;

        Ok(Some(RepoContent {
            path: content.path,
            content: content.content,
        }))
    }

    async fn list_collaborators(&self, org: &str, repo: &str) -> AppResult<Vec<Collaborator>> {
        let mut collaborators = Vec::new();
        let mut page = 1;
        loop {
            let url = self.repo_endpoint(org, repo, "collaborators");
            let response = self
                .send(
                    self.http
                        .get(url)
                        .query(&[("page", page), ("per_page", COLLABORATORS_PER_PAGE)]),
                )
                .await?;
            let batch: Vec<Collaborator> = response.json().await.map_err(|err| {
                AppError::Forge(format!("failed to parse Gitee collaborators: {err}"))
            })?;

            let done = batch.len() < COLLABORATORS_PER_PAGE;
            collaborators.extend(batch);
            if done {
                return Ok(collaborators);
            }
            page += 1;
        }
    }

    async fn get_repo_labels(&self, org: &str, repo: &str) -> AppResult<Vec<RepoLabel>> {
        let labels: Vec<GiteeLabel> = self.get_json(self.repo_endpoint(org, repo, "labels")).await?;
        Ok(labels
            .into_iter()
            .map(|label| RepoLabel { name: label.name })
            .collect())
    }

    async fn create_repo_label(
        &self,
        org: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> AppResult<()> {
        let body = GiteeCreateLabel {
            name,
            color: color.trim_start_matches('#'),
        };
        self.send(
            self.http
                .post(self.repo_endpoint(org, repo, "labels"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn add_label(&self, org: &str, repo: &str, item: &ItemRef, label: &str) -> AppResult<()> {
        self.send(
            self.http
                .post(self.item_endpoint(org, repo, item, "labels"))
                .json(&[label]),
        )
        .await?;
        Ok(())
    }

    async fn post_comment(
        &self,
        org: &str,
        repo: &str,
        item: &ItemRef,
        body: &str,
    ) -> AppResult<()> {
        self.send(
            self.http
                .post(self.item_endpoint(org, repo, item, "comments"))
                .json(&GiteeComment { body }),
        )
        .await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct GiteePullRequestFile {
    filename: String,
    patch: Option<GiteePatch>,
}

#[derive(Deserialize)]
struct GiteePatch {
    #[serde(default)]
    diff: String,
}

#[derive(Deserialize)]
struct GiteeBranch {
    commit: GiteeCommit,
}

#[derive(Deserialize)]
struct GiteeCommit {
    sha: String,
}

#[derive(Deserialize)]
struct GiteeTree {
    #[serde(default)]
    tree: Vec<GiteeTreeEntry>,
}

#[derive(Deserialize)]
struct GiteeTreeEntry {
    path: String,
}

#[derive(Deserialize)]
struct GiteeContent {
    #[serde(default)]
    path: String,
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct GiteeLabel {
    name: String,
}

#[derive(Serialize)]
struct GiteeCreateLabel<'a> {
    name: &'a str,
    color: &'a str,
}

#[derive(Serialize)]
struct GiteeComment<'a> {
    body: &'a str,
}
