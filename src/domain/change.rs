/// One file of a pull request change list.
#[derive(Debug, Clone)]
pub struct ChangedFile {
    pub filename: String,
    pub diff: String,
}

/// Marker of a diff line that adds a `- name: X` YAML list item, once
/// whitespace is removed.
const ADDED_NAME_MARKER: &str = "+-name:";

/// Extracts the project names added by a unified-diff patch body.
///
/// This is a textual heuristic over one YAML shape, not a diff parser: only
/// lines that are both additions and `- name:` entries are recognised.
pub fn extract_added_project_names(diff: &str) -> Vec<String> {
    diff.lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter_map(|line| line.strip_prefix(ADDED_NAME_MARKER).map(str::to_string))
        .filter(|name| !name.is_empty())
        .collect()
}
