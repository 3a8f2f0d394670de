use phasegate::core::store::Store;
use phasegate::governance::engine::Engine;
use phasegate::governance::kind::ArtifactKind;
use phasegate::governance::phase::Phase;
use tempfile::{TempDir, tempdir};

fn engine(tmp: &TempDir, kind: ArtifactKind) -> Engine {
    let store = Store::new(&tmp.path().join(".phasegate"));
    Engine::new(&store, kind)
}

#[test]
fn test_create_on_empty_store_is_plain_dev_advisory() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);

    let decision = eng.check_create(
        "Send Slack Alert",
        "posts a message to slack when disk is full",
    );
    assert!(decision.allow);
    let msg = decision.message.unwrap();
    assert!(msg.contains("No similar workflows found"));
    assert!(msg.contains("DEV"));
    assert!(!msg.contains("match"));
}

#[test]
fn test_create_strong_match_recommends_cloning() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact(
        "wf_1",
        "Send Slack Alert",
        "posts a message to slack when disk is full",
        Phase::Dev,
    );

    let decision = eng.check_create(
        "Send Slack Alert Copy",
        "posts a message to slack when disk is full",
    );
    assert!(decision.allow, "creation is never blocked by similarity");
    let msg = decision.message.unwrap();
    assert!(msg.contains("very similar"));
    assert!(msg.contains("Send Slack Alert"));
    assert!(msg.contains("wf_1"));
    assert!(msg.contains("Consider cloning"));
}

#[test]
fn test_create_moderate_match_lists_top_matches() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact(
        "wf_1",
        "Send Slack Alert",
        "posts a message to slack when disk is full",
        Phase::Ga,
    );

    let decision = eng.check_create("send slack message alert", "");
    assert!(decision.allow);
    let msg = decision.message.unwrap();
    assert!(msg.contains("Found similar workflows"));
    assert!(msg.contains("  - \"Send Slack Alert\""));
    assert!(msg.contains("GA"));
    assert!(msg.contains("DEV"));
}

#[test]
fn test_moderate_listing_caps_at_three() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    for i in 1..=5 {
        eng.register_artifact(&format!("wf_{i}"), "send slack message alert", "", Phase::Dev);
    }

    let decision = eng.check_create("slack message notifier", "");
    assert!(decision.allow);
    let msg = decision.message.unwrap();
    let listed = msg.matches("  - \"").count();
    assert!(listed <= 3, "listing should cap at 3, got {listed}");
}

#[test]
fn test_update_allowed_only_in_dev() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_1", "Send Slack Alert", "", Phase::Dev);

    let decision = eng.check_update(Some("wf_1"), "Send Slack Alert");
    assert!(decision.allow);
    assert!(decision.message.unwrap().contains("DEV"));

    for phase in [Phase::Alpha, Phase::Beta, Phase::Ga, Phase::Prod] {
        eng.set_phase("wf_1", phase).unwrap();
        let decision = eng.check_update(Some("wf_1"), "Send Slack Alert");
        assert!(!decision.allow, "update must be blocked in {phase}");
        let msg = decision.message.unwrap();
        assert!(msg.contains(&phase.to_string()));
        assert!(msg.contains("CLONED"));
        assert!(msg.contains("promote"));
    }
}

#[test]
fn test_update_blocked_when_archived() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_1", "Send Slack Alert", "", Phase::Dev);
    eng.set_phase("wf_1", Phase::Archived).unwrap();

    let decision = eng.check_update(Some("wf_1"), "Send Slack Alert");
    assert!(!decision.allow);
    let msg = decision.message.unwrap();
    assert!(msg.contains("ARCHIVED"));
    assert!(msg.contains("new DEV"));
}

#[test]
fn test_update_untracked_is_allowed_with_advisory() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);

    let decision = eng.check_update(Some("wf_ghost"), "Some New Flow");
    assert!(decision.allow);
    assert!(decision.message.unwrap().contains("not tracked"));
}

#[test]
fn test_update_falls_back_to_first_name_match() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_a", "Send Slack Alert", "", Phase::Dev);
    eng.register_artifact("wf_b", "Send Slack Alert", "", Phase::Dev);
    eng.set_phase("wf_a", Phase::Prod).unwrap();

    // Unknown id, colliding names: lowest id wins, and it is protected.
    let decision = eng.check_update(Some("wf_unknown"), "Send Slack Alert");
    assert!(!decision.allow);
    assert!(decision.message.unwrap().contains("PROD"));
}

#[test]
fn test_delete_always_blocked() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_1", "Send Slack Alert", "", Phase::Dev);
    eng.register_artifact("wf_2", "Old Flow", "", Phase::Dev);
    eng.set_phase("wf_2", Phase::Archived).unwrap();

    for id in [Some("wf_1"), Some("wf_2"), Some("wf_missing"), None] {
        let decision = eng.check_delete(id);
        assert!(!decision.allow, "deletion must be blocked for {id:?}");
        let msg = decision.message.unwrap();
        assert!(msg.contains("ARCHIVE"));
        assert!(msg.contains("[DEPRECATED]"));
    }
}

#[test]
fn test_register_twice_is_a_noop() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);

    assert!(eng.register_artifact("wf_1", "Send Slack Alert", "snippet one", Phase::Dev));
    let first = eng.registry().load().artifacts["wf_1"].clone();

    assert!(eng.register_artifact("wf_1", "Renamed Alert", "snippet two", Phase::Prod));
    let second = eng.registry().load().artifacts["wf_1"].clone();

    assert_eq!(second.name, first.name);
    assert_eq!(second.created, first.created);
    assert_eq!(second.phase, Phase::Dev);
    assert_eq!(second.history.len(), 1);
    assert_eq!(second.history[0].action, "created");
}

#[test]
fn test_set_phase_appends_history() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_1", "Send Slack Alert", "", Phase::Dev);

    eng.set_phase("wf_1", Phase::Alpha).unwrap();
    eng.set_phase("wf_1", Phase::Beta).unwrap();

    let record = eng.registry().load().artifacts["wf_1"].clone();
    assert_eq!(record.phase, Phase::Beta);
    assert_eq!(record.history.len(), 3);
    assert_eq!(record.history[0].action, "created");
    assert_eq!(record.history[1].action, "phase_change");
    assert_eq!(record.history[1].phase, Phase::Alpha);
    assert_eq!(record.history[2].phase, Phase::Beta);
}

#[test]
fn test_set_phase_on_untracked_id_errors() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    assert!(eng.set_phase("wf_missing", Phase::Prod).is_err());
}

#[test]
fn test_check_create_is_idempotent_against_unchanged_store() {
    let tmp = tempdir().unwrap();
    let eng = engine(&tmp, ArtifactKind::Workflow);
    eng.register_artifact("wf_1", "Send Slack Alert", "disk alerts", Phase::Dev);

    let first = eng.check_create("Send Slack Alert Copy", "disk alerts");
    let second = eng.check_create("Send Slack Alert Copy", "disk alerts");
    assert_eq!(first, second);
}

#[test]
fn test_kinds_are_governed_separately() {
    let tmp = tempdir().unwrap();
    let workflows = engine(&tmp, ArtifactKind::Workflow);
    let agents = engine(&tmp, ArtifactKind::Agent);

    workflows.register_artifact("wf_1", "Support Triage", "triage inbound tickets", Phase::Dev);

    let decision = agents.check_create("Support Triage", "triage inbound tickets");
    assert!(decision.allow);
    let msg = decision.message.unwrap();
    assert!(msg.contains("No similar agents found"));
    assert!(msg.contains("AGENT GOVERNANCE"));
}
