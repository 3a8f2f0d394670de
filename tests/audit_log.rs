use phasegate::core::audit::{DeployEvent, DeployLog};
use phasegate::core::store::Store;
use phasegate::core::time;
use tempfile::tempdir;

fn event(action: &str, name: &str, id: Option<&str>, success: bool) -> DeployEvent {
    DeployEvent {
        ts: time::now_epoch_z(),
        action: action.to_string(),
        name: name.to_string(),
        id: id.map(|s| s.to_string()),
        success,
    }
}

#[test]
fn test_append_accumulates_one_line_per_event() {
    let tmp = tempdir().unwrap();
    let store = Store::new(&tmp.path().join(".phasegate"));
    let log = DeployLog::new(&store);

    log.append(&event("create", "Send Slack Alert", Some("wf_1"), true));
    log.append(&event("update", "Send Slack Alert", Some("wf_1"), true));
    log.append(&event("create", "unnamed", None, false));

    let raw = std::fs::read_to_string(store.deploy_log_path()).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 3);

    let first: DeployEvent = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.action, "create");
    assert_eq!(first.id.as_deref(), Some("wf_1"));
    assert!(first.success);

    let last: DeployEvent = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(last.id, None);
    assert!(!last.success);
}

#[test]
fn test_append_never_rewrites_existing_lines() {
    let tmp = tempdir().unwrap();
    let store = Store::new(&tmp.path().join(".phasegate"));
    let log = DeployLog::new(&store);

    log.append(&event("create", "First Flow", Some("wf_1"), true));
    let before = std::fs::read_to_string(store.deploy_log_path()).unwrap();

    log.append(&event("create", "Second Flow", Some("wf_2"), true));
    let after = std::fs::read_to_string(store.deploy_log_path()).unwrap();

    assert!(after.starts_with(&before));
}

#[test]
fn test_observed_success_policy() {
    // Updates need no id in the output to count as successful.
    let update = DeployEvent::observed("update", "Send Slack Alert", None, false);
    assert!(update.success);

    // A create whose output hands back no id produced nothing trackable.
    let create = DeployEvent::observed("create", "Send Slack Alert", None, false);
    assert!(!create.success);
    let created = DeployEvent::observed("create", "Send Slack Alert", Some("wf_1".into()), false);
    assert!(created.success);

    // An errored output is never a success, id or not.
    let errored = DeployEvent::observed("update", "Send Slack Alert", Some("wf_1".into()), true);
    assert!(!errored.success);
}

#[test]
fn test_observed_names_the_unnamed() {
    let ev = DeployEvent::observed("create", "", None, false);
    assert_eq!(ev.name, "unnamed");
}

#[test]
fn test_append_creates_missing_parents() {
    let tmp = tempdir().unwrap();
    let store = Store::new(&tmp.path().join(".phasegate"));
    assert!(!store.data_dir().exists());

    DeployLog::new(&store).append(&event("create", "Flow", Some("wf_1"), true));
    assert!(store.deploy_log_path().exists());
}
