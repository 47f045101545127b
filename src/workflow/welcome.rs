//! Welcomes the author of a new issue or pull request: resolve the owning
//! SIG, compose the comment, make sure the SIG label exists, then attach the
//! label and post the comment.
//!
//! Nothing is mutated when the SIG cannot be resolved. Once mutation starts
//! every effect is attempted and the failures are returned together.

use tracing::instrument;

use crate::config::BotConfig;
use crate::context::AppContext;
use crate::domain::item::EventTarget;
use crate::domain::notification::{NotificationOutcome, Roster, WelcomeContext, sig_label};
use crate::error::{AppError, AppResult, Effect, EffectFailures};
use crate::workflow::ownership::{resolve_members, resolve_sig_name};

#[instrument(skip_all, fields(org = %target.org, repo = %target.repo, item = %target.item))]
pub async fn on_issue_opened(
    ctx: &AppContext,
    cfg: &BotConfig,
    target: &EventTarget,
) -> AppResult<()> {
    welcome(ctx, cfg, target).await
}

#[instrument(skip_all, fields(org = %target.org, repo = %target.repo, item = %target.item))]
pub async fn on_pull_request_opened(
    ctx: &AppContext,
    cfg: &BotConfig,
    target: &EventTarget,
) -> AppResult<()> {
    welcome(ctx, cfg, target).await
}

async fn welcome(ctx: &AppContext, cfg: &BotConfig, target: &EventTarget) -> AppResult<()> {
    let outcome = notify(ctx, cfg, target).await?;
    for failure in outcome.errors.iter() {
        tracing::error!(effect = %failure.effect, error = %failure.error, "effect failed");
    }
    tracing::debug!(comment = %outcome.comment_body, "welcome comment composed");
    tracing::info!(
        label = %outcome.label_name,
        failures = outcome.errors.len(),
        "welcome handled"
    );
    outcome.errors.into_result()
}

/// Runs one welcome pass and reports what happened. Fails before any
/// mutation when ownership cannot be resolved.
pub async fn notify(
    ctx: &AppContext,
    cfg: &BotConfig,
    target: &EventTarget,
) -> AppResult<NotificationOutcome> {
    let sig_file = cfg.sig_file()?;
    let repo_path = target.repo_path();

    let sig_name = resolve_sig_name(ctx, &sig_file, &repo_path).await?;
    if sig_name.is_empty() {
        return Err(AppError::Resolution(format!(
            "cannot get sig name by {repo_path}"
        )));
    }
    let record = resolve_members(ctx, &sig_file, &target.org, &target.repo, &sig_name).await?;

    let sig_url = sig_file.tree_url(&format!("sig/{}", record.name));
    let comment_body = Roster::from_record(&record).render(&WelcomeContext {
        author: &target.author,
        community_name: &cfg.community_name,
        command_link: &cfg.command_link,
        sig_name: &record.name,
        sig_url: &sig_url,
    });

    let label_name = sig_label(&record.name);
    ensure_label(ctx, target, &label_name, &cfg.label_color).await;

    let mut errors = EffectFailures::new();
    errors.collect(
        Effect::AttachLabel {
            label: label_name.clone(),
        },
        ctx.forge
            .add_label(&target.org, &target.repo, &target.item, &label_name)
            .await,
    );
    errors.collect(
        Effect::PostComment,
        ctx.forge
            .post_comment(&target.org, &target.repo, &target.item, &comment_body)
            .await,
    );

    Ok(NotificationOutcome {
        label_name,
        comment_body,
        errors,
    })
}

/// Creates `label` on the repository unless it is already there. Failures
/// are logged only: a concurrent event may have created it.
async fn ensure_label(ctx: &AppContext, target: &EventTarget, label: &str, color: &str) {
    match ctx.forge.get_repo_labels(&target.org, &target.repo).await {
        Ok(labels) if labels.iter().any(|l| l.name == label) => return,
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "failed to list repository labels"),
    }

    if let Err(err) = ctx
        .forge
        .create_repo_label(&target.org, &target.repo, label, color)
        .await
    {
        tracing::warn!(label, error = %err, "failed to create label");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::tests::sample;
    use crate::domain::item::ItemRef;
    use crate::infra::fakes::{FakeFileCache, FakeForge};

    const SIGS: &str = "- name: Kernel\n  repositories:\n  - name: openeuler/kernel\n- name: infrastructure-services\n  repositories:\n  - name: openeuler/infra\n";

    fn forge() -> FakeForge {
        FakeForge::new()
            .with_file("openeuler", "community", "sig/sigs.yaml", SIGS)
            .with_collaborator("alice", true, true)
    }

    fn target(repo: &str, item: ItemRef) -> EventTarget {
        EventTarget {
            org: "openeuler".to_string(),
            repo: repo.to_string(),
            author: "dave".to_string(),
            item,
        }
    }

    fn context(forge: FakeForge, cache: FakeFileCache) -> (AppContext, Arc<FakeForge>) {
        let forge = Arc::new(forge);
        (AppContext::new(forge.clone(), Arc::new(cache)), forge)
    }

    #[tokio::test]
    async fn welcomes_issue_author() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let (ctx, forge) = context(forge(), FakeFileCache::new());
        let issue = ItemRef::Issue("I4ZK3T".to_string());

        on_issue_opened(&ctx, cfg, &target("kernel", issue.clone()))
            .await
            .unwrap();

        assert_eq!(forge.attached(), vec![(issue.clone(), "sig/Kernel".to_string())]);
        let comments = forge.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].0, issue);
        assert!(comments[0].1.starts_with("Hi ***dave***, welcome to the openEuler Community."));
        assert!(comments[0].1.contains(
            "[Kernel](https://gitee.com/openeuler/community/tree/master/sig/Kernel)"
        ));
        assert!(comments[0].1.ends_with("any of the maintainers: **@alice**"));
    }

    #[tokio::test]
    async fn label_is_created_before_it_is_attached() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let (ctx, forge) = context(forge(), FakeFileCache::new());

        on_pull_request_opened(&ctx, cfg, &target("kernel", ItemRef::PullRequest(7)))
            .await
            .unwrap();

        let calls = forge.calls();
        let create = calls
            .iter()
            .position(|c| c == "create_repo_label openeuler/kernel sig/Kernel #0075ca")
            .expect("label created");
        let attach = calls
            .iter()
            .position(|c| c.starts_with("add_label"))
            .expect("label attached");
        assert!(create < attach);
    }

    #[tokio::test]
    async fn existing_label_is_not_recreated() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let (ctx, forge) = context(forge().with_label("sig/Kernel"), FakeFileCache::new());

        on_pull_request_opened(&ctx, cfg, &target("kernel", ItemRef::PullRequest(7)))
            .await
            .unwrap();

        assert!(!forge.calls().iter().any(|c| c.starts_with("create_repo_label")));
        assert_eq!(forge.attached().len(), 1);
    }

    #[tokio::test]
    async fn label_listing_failure_still_creates_label() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let mut forge = forge();
        forge.fail_labels = true;
        let (ctx, forge) = context(forge, FakeFileCache::new());

        let outcome = notify(&ctx, cfg, &target("kernel", ItemRef::PullRequest(7)))
            .await
            .unwrap();

        assert!(outcome.errors.is_empty());
        let calls = forge.calls();
        let listed = calls
            .iter()
            .position(|c| c == "get_repo_labels openeuler/kernel")
            .expect("labels listed");
        let created = calls
            .iter()
            .position(|c| c.starts_with("create_repo_label openeuler/kernel sig/Kernel"))
            .expect("label created");
        assert!(listed < created);
        assert_eq!(forge.attached().len(), 1);
        assert_eq!(forge.comments().len(), 1);
    }

    #[tokio::test]
    async fn unresolved_sig_mutates_nothing() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let (ctx, forge) = context(forge(), FakeFileCache::new());

        let err = on_issue_opened(&ctx, cfg, &target("unknown", ItemRef::Issue("I1".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Resolution(_)));
        assert!(forge.comments().is_empty());
        assert!(forge.attached().is_empty());
        assert!(!forge.calls().iter().any(|c| c.starts_with("create_repo_label")));
    }

    #[tokio::test]
    async fn attach_failure_still_posts_comment() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let mut forge = forge();
        forge.fail_add_label = true;
        forge.fail_create_label = true;
        let (ctx, forge) = context(forge, FakeFileCache::new());

        let outcome = notify(&ctx, cfg, &target("kernel", ItemRef::PullRequest(3)))
            .await
            .unwrap();

        assert!(forge.calls().iter().any(|c| c.starts_with("create_repo_label")));
        assert_eq!(forge.comments().len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        let failure = outcome.errors.iter().next().unwrap();
        assert_eq!(
            failure.effect,
            Effect::AttachLabel {
                label: "sig/Kernel".to_string()
            }
        );
        assert!(matches!(outcome.errors.into_result(), Err(AppError::Effects(_))));
    }

    #[tokio::test]
    async fn both_effect_failures_are_reported() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let mut forge = forge();
        forge.fail_add_label = true;
        forge.fail_comment = true;
        let (ctx, _) = context(forge, FakeFileCache::new());

        let err = on_pull_request_opened(&ctx, cfg, &target("kernel", ItemRef::PullRequest(3)))
            .await
            .unwrap_err();

        let failures = match err {
            AppError::Effects(failures) => failures,
            other => panic!("expected aggregated failure, got {other}"),
        };
        let effects: Vec<Effect> = failures.iter().map(|f| f.effect.clone()).collect();
        assert_eq!(
            effects,
            vec![
                Effect::AttachLabel {
                    label: "sig/Kernel".to_string()
                },
                Effect::PostComment
            ]
        );
    }

    #[tokio::test]
    async fn long_sig_label_is_truncated_before_any_label_call() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let (ctx, forge) = context(forge(), FakeFileCache::new());

        let outcome = notify(&ctx, cfg, &target("infra", ItemRef::PullRequest(9)))
            .await
            .unwrap();

        assert_eq!(outcome.label_name, "sig/infrastructure-s");
        assert!(outcome.comment_body.contains("[infrastructure-services]"));
        for call in forge.calls().iter().filter(|c| c.contains("label")) {
            assert!(!call.contains("infrastructure-services"), "{call}");
        }
    }

    #[tokio::test]
    async fn committers_switch_message_variant() {
        let config = sample();
        let cfg = config.config_for("openeuler", "community").unwrap();
        let cache = FakeFileCache::new().with_file(
            "sig-info.yaml",
            "sig/Kernel/sig-info.yaml",
            "maintainers:\n- gitee_id: bob\n- gitee_id: erin\nrepositories:\n- repo: [openeuler/kernel]\n  committers:\n  - gitee_id: carol\n",
        );
        let (ctx, _) = context(forge(), cache);

        let outcome = notify(&ctx, cfg, &target("kernel", ItemRef::PullRequest(1)))
            .await
            .unwrap();

        assert!(outcome.comment_body.ends_with(
            "any of the maintainers: **@bob**, **@erin**, any of the committers: **@carol**"
        ));
        assert!(!outcome.comment_body.contains("@alice"));
    }
}
