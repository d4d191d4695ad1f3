use super::delivery_harness::{
    Harness, MIXED_CATALOG, Scripted, ScriptedPresenter, USER, WELCOME_CATALOG, read,
};
use std::path::Path;
use upgrade_herald::delivery::Phase;
use upgrade_herald::ledger::AckLedger;
use upgrade_herald::presenter::DialogOutcome;

#[tokio::test]
async fn bumped_version_is_shown_once() {
    let harness = Harness::new();
    let mut ledger = AckLedger::default();
    ledger.record(USER, "welcome", 1);
    ledger.save(&harness.prefs).unwrap();
    harness.set_last_committed("13.6");

    let presenter = ScriptedPresenter::accepting();
    let first = harness
        .run(&presenter, &harness.local_options("14.2", WELCOME_CATALOG))
        .await
        .unwrap();

    assert_eq!(first.outcome_of("welcome"), Some(DialogOutcome::Success));
    assert!(first.committed);
    assert_eq!(harness.ledger().acknowledged_version(USER, "welcome"), Some(2));
    assert_eq!(harness.last_committed().as_deref(), Some("14.2"));

    let second = harness
        .run(&presenter, &harness.local_options("14.3", WELCOME_CATALOG))
        .await
        .unwrap();

    assert_eq!(second.phase, Phase::Commit);
    assert!(second.messages.is_empty());
    assert!(second.committed);
    assert_eq!(presenter.shown().len(), 1);
    assert_eq!(harness.last_committed().as_deref(), Some("14.3"));
}

#[tokio::test]
async fn payload_points_at_rendered_content() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::accepting();

    harness
        .run(&presenter, &harness.local_options("14.2", WELCOME_CATALOG))
        .await
        .unwrap();

    let shown = presenter.shown();
    let payload = &shown[0];
    let content = Path::new(&payload.message);
    assert!(content.is_absolute());
    assert!(content.ends_with("welcome.md"));
    assert_eq!(read(content), "# Welcome to welcome");
    assert_eq!(payload.title.as_deref(), Some("Welcome"));
    assert_eq!(payload.timer, Some(300));

    let infobox = payload.infobox.as_deref().unwrap();
    assert!(infobox.contains("Last OS: 12"));
    assert!(infobox.contains("Current OS: 14.2"));
    assert!(infobox.contains("Message Version: 2"));
    assert!(infobox.contains("**DEBUG MODE**"));
}

#[tokio::test]
async fn always_required_is_shown_every_run_without_ledger_entry() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::accepting();

    let first = harness
        .run(&presenter, &harness.local_options("14.2", MIXED_CATALOG))
        .await
        .unwrap();
    assert_eq!(first.outcome_of("welcome"), Some(DialogOutcome::Success));
    assert_eq!(
        first.outcome_of("policy"),
        Some(DialogOutcome::AlwaysRequiredNoop)
    );
    assert_eq!(first.outcome_of("legacy"), None);
    assert!(first.committed);

    let second = harness
        .run(&presenter, &harness.local_options("15.0", MIXED_CATALOG))
        .await
        .unwrap();
    let shown: Vec<_> = second
        .messages
        .iter()
        .map(|report| report.message_id.as_str())
        .collect();
    assert_eq!(shown, ["policy"]);

    let ledger = harness.ledger();
    assert_eq!(ledger.acknowledged_version(USER, "policy"), None);
    assert_eq!(ledger.acknowledged_version(USER, "welcome"), Some(2));
    assert_eq!(presenter.shown()[1].timer, Some(600));
}

#[tokio::test]
async fn timer_expiry_blocks_commit_but_later_messages_still_show() {
    let harness = Harness::new();
    harness.set_last_committed("13.6");
    let presenter = ScriptedPresenter::new([Scripted::Exit(4)]);

    let report = harness
        .run(&presenter, &harness.local_options("14.2", MIXED_CATALOG))
        .await
        .unwrap();

    assert_eq!(report.phase, Phase::PartialFailure);
    assert!(!report.committed);
    assert_eq!(
        report.outcome_of("welcome"),
        Some(DialogOutcome::TimerExpired)
    );
    assert_eq!(
        report.outcome_of("policy"),
        Some(DialogOutcome::AlwaysRequiredNoop)
    );
    assert_eq!(presenter.shown().len(), 2);
    assert_eq!(harness.last_committed().as_deref(), Some("13.6"));
    assert_eq!(harness.ledger().acknowledged_version(USER, "welcome"), None);
}

#[tokio::test]
async fn quit_blocks_commit() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::new([Scripted::Exit(10)]);

    let report = harness
        .run(&presenter, &harness.local_options("14.2", WELCOME_CATALOG))
        .await
        .unwrap();

    assert_eq!(report.phase, Phase::PartialFailure);
    assert_eq!(report.outcome_of("welcome"), Some(DialogOutcome::UserQuit));
    assert!(harness.last_committed().is_none());
}

#[tokio::test]
async fn presenter_failures_are_other_failure() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::new([Scripted::SpawnFailure, Scripted::Killed]);

    let report = harness
        .run(&presenter, &harness.local_options("14.2", MIXED_CATALOG))
        .await
        .unwrap();

    assert_eq!(
        report.outcome_of("welcome"),
        Some(DialogOutcome::OtherFailure)
    );
    assert_eq!(
        report.outcome_of("policy"),
        Some(DialogOutcome::OtherFailure)
    );
    assert!(!report.committed);
    assert!(harness.ledger().messages_for(USER).is_none());
}

#[tokio::test]
async fn always_required_timer_blocks_commit() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::new([Scripted::Exit(0), Scripted::Exit(4)]);

    let report = harness
        .run(&presenter, &harness.local_options("14.2", MIXED_CATALOG))
        .await
        .unwrap();

    assert_eq!(report.outcome_of("policy"), Some(DialogOutcome::TimerExpired));
    assert_eq!(report.phase, Phase::PartialFailure);
    assert!(harness.last_committed().is_none());
    assert_eq!(harness.ledger().acknowledged_version(USER, "welcome"), Some(2));
}

#[tokio::test]
async fn no_applicable_messages_still_commits() {
    let harness = Harness::new();
    let catalog = r#"
- messageID: legacy
  messageVersion: 1
  osRequirements: "<13.0"
  dialogProperties:
    message: "Old systems only"
"#;
    let presenter = ScriptedPresenter::accepting();

    let report = harness
        .run(&presenter, &harness.local_options("14.2", catalog))
        .await
        .unwrap();

    assert_eq!(report.phase, Phase::Commit);
    assert!(report.messages.is_empty());
    assert!(report.committed);
    assert_eq!(harness.last_committed().as_deref(), Some("14.2"));
}

#[tokio::test]
async fn unparsable_catalog_aborts_without_commit() {
    let harness = Harness::new();
    let presenter = ScriptedPresenter::accepting();

    let result = harness
        .run(
            &presenter,
            &harness.local_options("14.2", "- messageID: [unterminated"),
        )
        .await;

    assert!(matches!(
        result,
        Err(upgrade_herald::HeraldError::Catalog(
            upgrade_herald::error::CatalogError::Parse { .. }
        ))
    ));
    assert!(presenter.shown().is_empty());
    assert!(harness.last_committed().is_none());
}

#[tokio::test]
async fn empty_catalog_aborts_without_commit() {
    for body in ["", "---\n", "\n\n"] {
        let harness = Harness::new();
        harness.set_last_committed("13.6");
        let presenter = ScriptedPresenter::accepting();

        let result = harness
            .run(&presenter, &harness.local_options("14.2", body))
            .await;

        assert!(
            matches!(
                result,
                Err(upgrade_herald::HeraldError::Catalog(
                    upgrade_herald::error::CatalogError::Parse { .. }
                ))
            ),
            "{body:?}: {result:?}"
        );
        assert_eq!(harness.last_committed().as_deref(), Some("13.6"));
    }
}
