use tracing::instrument;

use crate::config::BotConfig;
use crate::context::AppContext;
use crate::domain::change::{ChangedFile, extract_added_project_names};
use crate::domain::item::EventTarget;
use crate::domain::notification::obs_meta_message;
use crate::domain::tree::DirectorySnapshot;
use crate::error::AppResult;

/// Tree depth of the OBS meta repository that holds project directories.
const PROJECT_TREE_DEPTH: u32 = 1;

/// Tells the author when a pull request adds OBS projects the meta
/// repository does not have yet. Posts at most one comment, never a label.
#[instrument(skip_all, fields(org = %target.org, repo = %target.repo, item = %target.item))]
pub async fn on_obs_meta_check(
    ctx: &AppContext,
    cfg: &BotConfig,
    target: &EventTarget,
    changes: &[ChangedFile],
) -> AppResult<()> {
    if !cfg.check_obs_meta_origin_file {
        return Ok(());
    }

    let Some(file) = changes
        .iter()
        .find(|file| file.filename.contains(&cfg.obs_meta_origin_file))
    else {
        tracing::debug!(file = %cfg.obs_meta_origin_file, "obs meta file not changed");
        return Ok(());
    };

    let names = extract_added_project_names(&file.diff);
    if names.is_empty() {
        tracing::debug!(file = %file.filename, "no project names added");
        return Ok(());
    }

    let meta = &cfg.obs_meta_config;
    let sha = ctx.forge.get_ref(&meta.owner, &meta.repo, &meta.branch).await?;
    let entries = ctx
        .forge
        .get_directory_tree(&meta.owner, &meta.repo, &sha, PROJECT_TREE_DEPTH)
        .await?;
    let tree = DirectorySnapshot::from_entries(entries);

    if tree.all_exist(&names) {
        tracing::debug!(projects = ?names, "all projects already exist");
        return Ok(());
    }

    tracing::info!(projects = ?names, paths = tree.len(), "new obs projects introduced");
    let body = obs_meta_message(&cfg.obs_meta_origin_file, &cfg.community_name, &cfg.guide_url);
    ctx.forge
        .post_comment(&target.org, &target.repo, &target.item, &body)
        .await
}
