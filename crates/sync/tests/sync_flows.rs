//! Integration tests for projection, bulk sync and onboarding import.

mod support;

use skillhub_sync::{
    catalog::{visible_skills, SortBy},
    Confirmed, HubConfig, HubError, OnboardingGroup, OnboardingPlan, OnboardingVariant,
    Requested, SkillHub, ToggleOutcome,
};
use support::{standard_tools, tool, Call, FakeBackend};

async fn ready(backend: &FakeBackend) -> SkillHub<FakeBackend> {
    let mut hub = SkillHub::new(backend.clone(), HubConfig::default());
    hub.refresh_tool_status().await.unwrap();
    hub.refresh_managed_skills().await.unwrap();
    hub
}

fn skill_id(hub: &SkillHub<FakeBackend>, name: &str) -> String {
    hub.managed_skills()
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.id.clone())
        .unwrap()
}

// =============================================================================
// Bulk sync
// =============================================================================

#[tokio::test]
async fn vanished_tool_is_skipped_silently_in_bulk_sync() {
    let tools = vec![tool("tool1", "/t1", "Tool 1"), tool("tool2", "/t2", "Tool 2")];
    let backend = FakeBackend::new(tools, &["tool1", "tool2"])
        .with_skill("one", None)
        .with_skill("two", None)
        .fail_sync("tool2", "TOOL_NOT_INSTALLED|tool2|/t2");
    let mut hub = ready(&backend).await;

    let report = hub
        .batch_sync_all_managed_skills(&["tool1".into(), "tool2".into()])
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 0);
    assert_eq!(report.synced, 2);
    let pairs: Vec<(String, String)> = backend
        .sync_calls()
        .into_iter()
        .map(|r| (r.name, r.tool_id))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("one".into(), "tool1".into()),
            ("one".into(), "tool2".into()),
            ("two".into(), "tool1".into()),
            ("two".into(), "tool2".into()),
        ]
    );
}

#[tokio::test]
async fn bulk_sync_skips_aliases_and_uninstalled_tools() {
    let backend = FakeBackend::new(standard_tools(), &["claude_code", "claude_alias"])
        .with_skill("one", None);
    let mut hub = ready(&backend).await;

    let ids: Vec<String> = standard_tools().into_iter().map(|t| t.id).collect();
    let report = hub.batch_sync_all_managed_skills(&ids).await.unwrap();

    assert_eq!(report.synced, 1);
    let tools: Vec<String> = backend.sync_calls().into_iter().map(|r| r.tool_id).collect();
    assert_eq!(tools, vec!["claude_code"]);
}

#[tokio::test]
async fn target_exists_carries_the_occupied_path() {
    let backend = FakeBackend::new(standard_tools(), &["codex"])
        .with_skill("one", None)
        .fail_sync("codex", "TARGET_EXISTS|/a/b");
    let mut hub = ready(&backend).await;

    let report = hub
        .batch_sync_all_managed_skills(&["codex".into()])
        .await
        .unwrap();

    let head = report.errors.head().unwrap();
    assert_eq!(head.error, HubError::TargetExists { path: "/a/b".into() });
    assert_eq!(head.title, "Failed to sync one to Codex");
    assert_eq!(
        report.error_summary().unwrap(),
        "Failed to sync one to Codex\ntarget already exists: /a/b"
    );
}

#[tokio::test]
async fn adopted_skill_overwrites_its_shared_origin() {
    let backend = FakeBackend::new(standard_tools(), &["claude_code", "codex"])
        .with_skill("adopted", Some("claude_alias"));
    let mut hub = ready(&backend).await;
    let id = skill_id(&hub, "adopted");

    hub.sync_to_tool(&id, "claude_code").await.unwrap();
    hub.sync_to_tool(&id, "codex").await.unwrap();

    let requests = backend.sync_calls();
    assert_eq!(requests[0].tool_id, "claude_code");
    assert!(requests[0].overwrite);
    assert_eq!(requests[1].tool_id, "codex");
    assert!(!requests[1].overwrite);
}

#[tokio::test]
async fn new_tools_are_adopted_as_targets() {
    let backend = FakeBackend::new(standard_tools(), &["claude_code", "claude_alias", "codex"])
        .with_skill("one", None);
    backend.state().status.newly_installed = vec!["codex".into()];
    let mut config = HubConfig::default();
    config.sync.default_targets = Some(vec!["claude_code".into()]);
    let mut hub = SkillHub::new(backend.clone(), config);

    let newly = hub.refresh_tool_status().await.unwrap();
    hub.refresh_managed_skills().await.unwrap();
    assert_eq!(newly, vec!["codex".to_string()]);
    assert!(!hub.sync_targets().is_checked("codex"));

    let report = hub.sync_all_new_tools().await.unwrap();

    assert!(report.is_clean());
    assert!(hub.sync_targets().is_checked("codex"));
    assert!(hub.managed_skills()[0].is_synced_to("codex"));
}

// =============================================================================
// Single toggles
// =============================================================================

#[tokio::test]
async fn toggle_on_shared_directory_waits_for_confirmation() {
    let backend = FakeBackend::new(standard_tools(), &["claude_code", "claude_alias", "codex"])
        .with_skill("one", None);
    let mut hub = ready(&backend).await;
    let id = skill_id(&hub, "one");

    let Requested::NeedsConfirmation(pending) =
        hub.request_toggle(&id, "claude_code").await.unwrap()
    else {
        panic!("shared tool must ask first");
    };
    assert_eq!(pending.shared_with, vec!["Claude Alias".to_string()]);
    assert!(backend.calls().is_empty());

    let confirmed = hub.confirm(pending.token).await.unwrap();
    assert_eq!(confirmed, Confirmed::Toggled(ToggleOutcome::Synced));
    assert_eq!(backend.sync_calls().len(), 1);
    assert!(hub.managed_skills()[0].is_synced_to("claude_code"));

    let Requested::NeedsConfirmation(pending) =
        hub.request_toggle(&id, "claude_code").await.unwrap()
    else {
        panic!("shared tool must ask first");
    };
    let confirmed = hub.confirm(pending.token).await.unwrap();
    assert_eq!(confirmed, Confirmed::Toggled(ToggleOutcome::Unsynced));
    assert_eq!(
        backend.calls().last().unwrap(),
        &Call::Unsync {
            skill_id: id.clone(),
            tool_id: "claude_code".into()
        }
    );
}

#[tokio::test]
async fn toggle_surfaces_vanished_tool() {
    let backend = FakeBackend::new(standard_tools(), &["codex"])
        .with_skill("one", None)
        .fail_sync("codex", "TOOL_NOT_INSTALLED|codex");
    let mut hub = ready(&backend).await;
    let id = skill_id(&hub, "one");

    let err = hub.request_toggle(&id, "codex").await.unwrap_err();

    assert_eq!(err, HubError::ToolNotInstalled { tool_id: "codex".into() });
}

// =============================================================================
// Onboarding
// =============================================================================

fn plan() -> OnboardingPlan {
    OnboardingPlan {
        groups: vec![
            OnboardingGroup {
                name: "writer".into(),
                variants: vec![
                    OnboardingVariant {
                        path: "/home/u/.claude/skills/writer".into(),
                        tool: "claude_alias".into(),
                    },
                    OnboardingVariant {
                        path: "/home/u/.codex/skills/writer".into(),
                        tool: "codex".into(),
                    },
                ],
            },
            OnboardingGroup {
                name: "broken".into(),
                variants: vec![OnboardingVariant {
                    path: "/home/u/.codex/skills/broken".into(),
                    tool: "codex".into(),
                }],
            },
            OnboardingGroup {
                name: "skipped".into(),
                variants: vec![OnboardingVariant {
                    path: "/home/u/.codex/skills/skipped".into(),
                    tool: "codex".into(),
                }],
            },
        ],
    }
}

#[tokio::test]
async fn onboarding_import_adopts_in_place_and_refetches() {
    let backend = FakeBackend::new(standard_tools(), &["claude_code", "claude_alias", "codex"])
        .with_plan(plan())
        .fail_install("/home/u/.codex/skills/broken", "unreadable SKILL.md");
    let mut hub = ready(&backend).await;

    hub.load_onboarding_plan().await.unwrap();
    hub.onboarding_mut().unwrap().toggle_group("skipped", false);

    let report = hub.import_onboarding_selection().await.unwrap();

    let imports: Vec<Call> = backend
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Import { .. }))
        .collect();
    assert_eq!(imports.len(), 2);
    assert_eq!(report.installed.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors.head().unwrap().title, "Failed to import broken");

    let requests = backend.sync_calls();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tool_id, "claude_code");
    assert!(requests[0].overwrite);
    assert_eq!(requests[1].tool_id, "codex");
    assert!(!requests[1].overwrite);

    let remaining: Vec<String> = hub
        .onboarding()
        .unwrap()
        .plan()
        .groups
        .iter()
        .map(|g| g.name.clone())
        .collect();
    assert_eq!(remaining, vec!["broken", "skipped"]);
    assert!(hub.onboarding().unwrap().is_included("skipped"));
    assert_eq!(backend.skill_names(), vec!["writer"]);
}

// =============================================================================
// Maintenance and settings
// =============================================================================

#[tokio::test]
async fn delete_and_update_refresh_the_list() {
    let backend = FakeBackend::new(standard_tools(), &["codex"])
        .with_skill("keep", None)
        .with_skill("drop", None);
    let mut hub = ready(&backend).await;
    let keep = skill_id(&hub, "keep");
    let dropped = skill_id(&hub, "drop");

    let updated = hub.update_managed_skill(&keep).await.unwrap();
    assert!(updated.content_changed);
    let newest = visible_skills(hub.managed_skills(), "", SortBy::Updated);
    assert_eq!(newest[0].name, "keep");

    hub.delete_managed_skill(&dropped).await.unwrap();
    assert_eq!(hub.managed_skills().len(), 1);
    assert_eq!(
        hub.delete_managed_skill(&dropped).await.unwrap_err(),
        HubError::UnknownSkill(dropped.clone())
    );
}

#[tokio::test]
async fn settings_pass_through_with_clamping() {
    let backend = FakeBackend::new(standard_tools(), &[]);
    backend.state().cache_entries = 3;
    let mut hub = ready(&backend).await;

    assert_eq!(hub.set_git_cache_cleanup_days(-1).await.unwrap(), 0);
    assert_eq!(hub.git_cache_cleanup_days().await.unwrap(), 0);
    assert_eq!(hub.set_git_cache_ttl_secs(86_400).await.unwrap(), 3600);
    assert_eq!(hub.git_cache_ttl_secs().await.unwrap(), 3600);
    assert_eq!(hub.apply_configured_cache_settings().await.unwrap(), (30, 60));
    assert_eq!(hub.clear_git_cache().await.unwrap(), 3);
    assert_eq!(hub.clear_git_cache().await.unwrap(), 0);

    hub.set_central_repo_path("/data/hub").await.unwrap();
    assert_eq!(hub.central_repo_path().await.unwrap(), "/data/hub");
}
