//! SIG membership facts and the parsers that produce them.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::intercept::{intercept, intercept_nearest};
use crate::error::{AppError, AppResult};

const KEY_OF_NAME: &str = "- name: ";
const KEY_OF_REPOS: &str = "repositories:";

/// Owning SIG of a repository and its roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigRecord {
    pub name: String,
    pub maintainers: BTreeSet<String>,
    pub committers: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collaborator {
    pub login: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Collaborator {
    pub fn is_maintainer(&self) -> bool {
        self.permissions.admin || self.permissions.push
    }
}

pub fn maintainers_from_collaborators(collaborators: &[Collaborator]) -> BTreeSet<String> {
    collaborators
        .iter()
        .filter(|c| c.is_maintainer())
        .map(|c| c.login.clone())
        .collect()
}

/// Finds the name of the SIG whose entry lists `repo_path` in a sig
/// membership document. Returns an empty string when unresolved.
///
/// The document is a YAML list of `- name: <sig>` entries each followed by
/// a `repositories:` list. The entry is found textually: the nearest
/// `repositories:` before the first line ending in `repo_path`, and the
/// nearest `- name: ` before that.
pub fn resolve_sig_name(document: &str, repo_path: &str) -> String {
    let Some(anchor_end) = find_line_end_anchor(document, repo_path) else {
        return String::new();
    };
    let head = &document[..anchor_end];
    if intercept(head, KEY_OF_NAME, repo_path).is_empty() {
        return String::new();
    }

    let block = intercept_nearest(head, KEY_OF_NAME, KEY_OF_REPOS);
    if block.is_empty() {
        return String::new();
    }

    block
        .trim_start_matches(KEY_OF_NAME)
        .trim_end_matches(KEY_OF_REPOS)
        .trim()
        .replace("\r\n", "")
}

/// End offset of the first `needle` that is followed by a line end or the
/// end of `haystack`, so `org/repo` never matches inside `org/repository`.
fn find_line_end_anchor(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(idx, _)| idx + needle.len())
        .find(|&end| matches!(haystack[end..].chars().next(), None | Some('\r' | '\n')))
}

#[derive(Debug, Default, Deserialize)]
struct SigInfoDocument {
    #[serde(default)]
    maintainers: Vec<SigInfoPerson>,
    #[serde(default)]
    repositories: Vec<SigInfoRepositories>,
}

#[derive(Debug, Deserialize)]
struct SigInfoRepositories {
    #[serde(default)]
    committers: Vec<SigInfoPerson>,
}

#[derive(Debug, Deserialize)]
struct SigInfoPerson {
    gitee_id: String,
}

/// Maintainers and committers declared by a `sig-info.yaml` document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigInfo {
    pub maintainers: BTreeSet<String>,
    pub committers: BTreeSet<String>,
}

impl SigInfo {
    pub fn parse(content: &str) -> AppResult<Self> {
        let doc: SigInfoDocument = serde_yaml::from_str(content)
            .map_err(|err| AppError::Decode(format!("invalid sig-info.yaml: {err}")))?;

        let maintainers = doc
            .maintainers
            .into_iter()
            .map(|person| person.gitee_id)
            .collect();
        let committers = doc
            .repositories
            .into_iter()
            .flat_map(|repos| repos.committers)
            .map(|person| person.gitee_id)
            .collect();

        Ok(Self {
            maintainers,
            committers,
        })
    }
}
