//! Decoding of Gitee webhook deliveries and routing to the handlers.

use serde::Deserialize;

use crate::config::{BotConfig, PluginConfig};
use crate::context::AppContext;
use crate::domain::item::{EventTarget, ItemRef};
use crate::error::{AppError, AppResult};
use crate::workflow::obs_meta::on_obs_meta_check;
use crate::workflow::welcome::{on_issue_opened, on_pull_request_opened};

pub const ISSUE_HOOK: &str = "Issue Hook";
pub const PULL_REQUEST_HOOK: &str = "Merge Request Hook";

const ACTION_OPEN: &str = "open";
const ACTION_UPDATE: &str = "update";
const SOURCE_BRANCH_CHANGED: &str = "source_branch_changed";

#[derive(Debug)]
pub enum WebhookEvent {
    Issue(IssueHook),
    PullRequest(PullRequestHook),
    /// Any event type this bot does not handle.
    Other(String),
}

impl WebhookEvent {
    pub fn parse(event_type: &str, payload: &[u8]) -> AppResult<Self> {
        let decode_err = |err: serde_json::Error| {
            AppError::Decode(format!("invalid {event_type} payload: {err}"))
        };
        match event_type {
            ISSUE_HOOK => Ok(Self::Issue(serde_json::from_slice(payload).map_err(decode_err)?)),
            PULL_REQUEST_HOOK => Ok(Self::PullRequest(
                serde_json::from_slice(payload).map_err(decode_err)?,
            )),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueHook {
    #[serde(default)]
    pub action: String,
    pub issue: HookIssue,
    pub repository: HookRepository,
}

#[derive(Debug, Deserialize)]
pub struct HookIssue {
    pub number: String,
    pub user: HookUser,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestHook {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub action_desc: Option<String>,
    pub pull_request: HookPullRequest,
    pub repository: HookRepository,
}

#[derive(Debug, Deserialize)]
pub struct HookPullRequest {
    pub number: i32,
    pub user: HookUser,
}

#[derive(Debug, Deserialize)]
pub struct HookUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct HookRepository {
    pub full_name: String,
}

impl HookRepository {
    fn split(&self) -> AppResult<(String, String)> {
        match self.full_name.split_once('/') {
            Some((org, repo)) if !org.is_empty() && !repo.is_empty() => {
                Ok((org.to_string(), repo.to_string()))
            }
            _ => Err(AppError::Decode(format!(
                "invalid repository name: {}",
                self.full_name
            ))),
        }
    }
}

impl IssueHook {
    fn target(&self) -> AppResult<EventTarget> {
        let (org, repo) = self.repository.split()?;
        Ok(EventTarget {
            org,
            repo,
            author: self.issue.user.login.clone(),
            item: ItemRef::Issue(self.issue.number.clone()),
        })
    }
}

impl PullRequestHook {
    fn target(&self) -> AppResult<EventTarget> {
        let (org, repo) = self.repository.split()?;
        Ok(EventTarget {
            org,
            repo,
            author: self.pull_request.user.login.clone(),
            item: ItemRef::PullRequest(self.pull_request.number),
        })
    }
}

/// Routes one delivery to the matching handler. Unhandled events and
/// actions succeed without doing anything.
pub async fn dispatch(
    ctx: &AppContext,
    config: &PluginConfig,
    event: WebhookEvent,
) -> AppResult<()> {
    match event {
        WebhookEvent::Issue(hook) if hook.action == ACTION_OPEN => {
            let target = hook.target()?;
            let cfg = config_for(config, &target)?;
            on_issue_opened(ctx, cfg, &target).await
        }
        WebhookEvent::PullRequest(hook) => {
            let target = hook.target()?;
            match (hook.action.as_str(), hook.action_desc.as_deref()) {
                (ACTION_OPEN, _) => {
                    let cfg = config_for(config, &target)?;
                    let welcomed = on_pull_request_opened(ctx, cfg, &target).await;
                    let checked = check_obs_meta(ctx, cfg, &target).await;
                    if let (Err(_), Err(err)) = (&welcomed, &checked) {
                        tracing::error!(error = %err, "obs meta check failed");
                    }
                    welcomed.and(checked)
                }
                (ACTION_UPDATE, Some(SOURCE_BRANCH_CHANGED)) => {
                    let cfg = config_for(config, &target)?;
                    check_obs_meta(ctx, cfg, &target).await
                }
                (action, _) => {
                    tracing::debug!(action, "ignoring pull request action");
                    Ok(())
                }
            }
        }
        WebhookEvent::Issue(hook) => {
            tracing::debug!(action = %hook.action, "ignoring issue action");
            Ok(())
        }
        WebhookEvent::Other(event_type) => {
            tracing::debug!(%event_type, "ignoring event");
            Ok(())
        }
    }
}

fn config_for<'a>(config: &'a PluginConfig, target: &EventTarget) -> AppResult<&'a BotConfig> {
    config.config_for(&target.org, &target.repo).ok_or_else(|| {
        AppError::Configuration(format!("no config for this repo: {}", target.repo_path()))
    })
}

async fn check_obs_meta(ctx: &AppContext, cfg: &BotConfig, target: &EventTarget) -> AppResult<()> {
    let ItemRef::PullRequest(number) = target.item else {
        return Ok(());
    };
    if !cfg.check_obs_meta_origin_file {
        return Ok(());
    }

    let changes = ctx
        .forge
        .get_changed_files(&target.org, &target.repo, number)
        .await?;
    on_obs_meta_check(ctx, cfg, target, &changes).await
}
