//! Resolves the SIG that owns a repository and the people to mention.

use base64::prelude::{BASE64_STANDARD, Engine as _};

use crate::config::RepoFile;
use crate::context::AppContext;
use crate::domain::ownership::{self, SigInfo, SigRecord, maintainers_from_collaborators};
use crate::error::{AppError, AppResult};
use crate::services::{CacheBranch, CachedFile, RepoContent};

const SIG_INFO_FILE: &str = "sig-info.yaml";

/// Name of the SIG whose entry in the membership document lists
/// `repo_path`. Empty when the document or the entry is missing.
pub async fn resolve_sig_name(
    ctx: &AppContext,
    sig_file: &RepoFile,
    repo_path: &str,
) -> AppResult<String> {
    let content = ctx
        .forge
        .get_file_content(&sig_file.org, &sig_file.repo, &sig_file.path, &sig_file.branch)
        .await?;
    let Some(content) = content else {
        tracing::warn!(path = %sig_file.path, "sig membership document not found");
        return Ok(String::new());
    };

    let document = decode_content(&content)?;
    Ok(ownership::resolve_sig_name(&document, repo_path))
}

/// Maintainers and committers of `sig_name` for `org/repo`.
///
/// Collaborators with push or admin access are always fetched. A legacy
/// `sig/<name>/OWNERS` file keeps them as the answer; otherwise a matching
/// `sig-info.yaml` from the file cache replaces them.
pub async fn resolve_members(
    ctx: &AppContext,
    sig_file: &RepoFile,
    org: &str,
    repo: &str,
    sig_name: &str,
) -> AppResult<SigRecord> {
    let collaborators = ctx.forge.list_collaborators(org, repo).await?;
    let from_collaborators = SigRecord {
        name: sig_name.to_string(),
        maintainers: maintainers_from_collaborators(&collaborators),
        committers: Default::default(),
    };

    let owners_path = format!("sig/{sig_name}/OWNERS");
    let owners = ctx
        .forge
        .get_file_content(&sig_file.org, &sig_file.repo, &owners_path, &sig_file.branch)
        .await?;
    if let Some(owners) = owners {
        if !decode_content(&owners)?.trim().is_empty() {
            tracing::debug!(sig = sig_name, "legacy OWNERS file found");
            return Ok(from_collaborators);
        }
    }

    let branch = CacheBranch {
        platform: ctx.platform.clone(),
        org: sig_file.org.clone(),
        repo: sig_file.repo.clone(),
        branch: sig_file.branch.clone(),
    };
    let files = ctx
        .file_cache
        .lookup_files(&branch, SIG_INFO_FILE, true)
        .await?;

    let Some(file) = find_sig_info(&files, sig_name) else {
        tracing::debug!(sig = sig_name, "no sig-info.yaml for sig");
        return Ok(from_collaborators);
    };
    if file.content.trim().is_empty() {
        return Ok(from_collaborators);
    }

    let info = SigInfo::parse(&file.content)?;
    Ok(SigRecord {
        name: sig_name.to_string(),
        maintainers: info.maintainers,
        committers: info.committers,
    })
}

/// Prefers a file under a `<sig_name>/` directory, then any path containing
/// the name.
fn find_sig_info<'a>(files: &'a [CachedFile], sig_name: &str) -> Option<&'a CachedFile> {
    let segment = format!("/{sig_name}/");
    files
        .iter()
        .find(|file| format!("/{}", file.path).contains(&segment))
        .or_else(|| files.iter().find(|file| file.path.contains(sig_name)))
}

fn decode_content(content: &RepoContent) -> AppResult<String> {
    let encoded: String = content
        .content
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = BASE64_STANDARD
        .decode(encoded)
        .map_err(|err| AppError::Decode(format!("{} is not valid base64: {err}", content.path)))?;
    String::from_utf8(bytes)
        .map_err(|err| AppError::Decode(format!("{} is not valid UTF-8: {err}", content.path)))
}
