use std::fmt;

/// The issue or pull request an event is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRef {
    /// Gitee issue numbers are opaque strings such as `I4ZK3T`.
    Issue(String),
    PullRequest(i32),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemRef::Issue(number) => write!(f, "issue {number}"),
            ItemRef::PullRequest(number) => write!(f, "pull request !{number}"),
        }
    }
}

/// Coordinates shared by every event handler.
#[derive(Debug, Clone)]
pub struct EventTarget {
    pub org: String,
    pub repo: String,
    pub author: String,
    pub item: ItemRef,
}

impl EventTarget {
    pub fn repo_path(&self) -> String {
        format!("{}/{}", self.org, self.repo)
    }
}
