use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub path: String,
}

/// All paths of a remote tree at one reference.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    paths: HashSet<String>,
}

impl DirectorySnapshot {
    pub fn from_entries(entries: Vec<TreeEntry>) -> Self {
        Self {
            paths: entries.into_iter().map(|entry| entry.path).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Exact membership of every name. An empty `names` is never "all exist";
    /// callers skip the check before getting here.
    pub fn all_exist(&self, names: &[String]) -> bool {
        !names.is_empty() && names.iter().all(|name| self.paths.contains(name))
    }
}
