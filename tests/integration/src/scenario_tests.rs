//! End-to-end scenarios across several upstream releases
//!
//! These tests drive the engine the way the CLI does: versions resolved from
//! a releases directory, state loaded and saved through the state store.

use pretty_assertions::assert_eq;
use upsync_core::diff::DiffStatus;
use upsync_core::sync::{ConflictStrategy, SyncOptions};
use upsync_core::{SyncEngine, SyncOutcome, UpstreamSource};
use upsync_fs::compute_content_checksum;
use upsync_test_utils::TreePair;

fn sync_version(engine: &SyncEngine, version: &str, strategy: ConflictStrategy) -> SyncOutcome {
    let store = engine.state_store();
    let mut state = store.load().state;
    let upstream = engine.resolve_version(version).unwrap();
    let options = SyncOptions {
        conflict_strategy: strategy,
        ..SyncOptions::default()
    };
    let outcome = engine.sync(&upstream, version, &mut state, &options).unwrap();
    if outcome.state_updated {
        store.save(&state).unwrap();
    }
    outcome
}

/// Release history used by most scenarios:
/// - 1.0.0 ships tools/a.cfg and tools/b.cfg
/// - 1.1.0 adds tools/new.cfg and changes tools/a.cfg
/// - 1.2.0 changes tools/b.cfg
fn three_releases(pair: &TreePair) {
    pair.add_release("1.0.0", &[("tools/a.cfg", "a1"), ("tools/b.cfg", "b1")]);
    pair.add_release(
        "1.1.0",
        &[("tools/a.cfg", "a2"), ("tools/b.cfg", "b1"), ("tools/new.cfg", "n1")],
    );
    pair.add_release(
        "1.2.0",
        &[("tools/a.cfg", "a2"), ("tools/b.cfg", "b2"), ("tools/new.cfg", "n1")],
    );
}

fn installed_from_first_release() -> (TreePair, SyncEngine) {
    let pair = TreePair::new();
    pair.configure_releases("");
    three_releases(&pair);
    pair.write_local("tools/a.cfg", "a1");
    pair.write_local("tools/b.cfg", "b1");

    let engine = SyncEngine::open(pair.local()).unwrap();
    let upstream = engine.resolve_version("1.0.0").unwrap();
    let report = engine.bootstrap(&upstream, "1.0.0").unwrap();
    engine.state_store().save(&report.state).unwrap();
    (pair, engine)
}

#[test]
fn releases_are_listed_in_version_order() {
    let pair = TreePair::new();
    pair.configure_releases("");
    three_releases(&pair);

    let engine = SyncEngine::open(pair.local()).unwrap();
    assert_eq!(
        engine.source().unwrap().versions().unwrap(),
        vec!["1.0.0", "1.1.0", "1.2.0"]
    );
}

#[test]
fn local_edit_survives_an_upstream_release() {
    let (pair, engine) = installed_from_first_release();
    pair.write_local("tools/b.cfg", "b-mine");

    let outcome = sync_version(&engine, "1.1.0", ConflictStrategy::Skip);
    assert_eq!(outcome.sync.synced_paths(), vec!["tools/a.cfg", "tools/new.cfg"]);
    assert_eq!(
        outcome.diff.get("tools/b.cfg").unwrap().status,
        DiffStatus::LocallyModified
    );
    assert!(outcome.state_updated);

    pair.assert_local_eq("tools/new.cfg", "n1");
    pair.assert_local_eq("tools/a.cfg", "a2");
    pair.assert_local_eq("tools/b.cfg", "b-mine");
}

#[test]
fn conflict_surfaces_when_upstream_catches_up_with_a_local_edit() {
    let (pair, engine) = installed_from_first_release();
    pair.write_local("tools/b.cfg", "b-mine");
    sync_version(&engine, "1.1.0", ConflictStrategy::Skip);

    let outcome = sync_version(&engine, "1.2.0", ConflictStrategy::Skip);
    assert_eq!(outcome.sync.conflicts, vec!["tools/b.cfg"]);
    assert!(outcome.sync.synced.is_empty());
    pair.assert_local_eq("tools/b.cfg", "b-mine");

    // The conflict stays until a strategy resolves it
    let again = sync_version(&engine, "1.2.0", ConflictStrategy::Skip);
    assert_eq!(again.sync.conflicts, vec!["tools/b.cfg"]);

    let resolved = sync_version(&engine, "1.2.0", ConflictStrategy::TakeUpstream);
    assert_eq!(resolved.sync.synced_paths(), vec!["tools/b.cfg"]);
    pair.assert_local_eq("tools/b.cfg", "b2");

    let state = engine.state_store().load().state;
    assert_eq!(
        state.baseline_hash("tools/b.cfg"),
        Some(compute_content_checksum("b2").as_str())
    );
    assert_eq!(state.last_synced_version.as_deref(), Some("1.2.0"));
}

#[test]
fn keep_local_leaves_conflict_reported_next_time() {
    let (pair, engine) = installed_from_first_release();
    sync_version(&engine, "1.1.0", ConflictStrategy::Skip);
    pair.write_local("tools/b.cfg", "b-mine");

    let kept = sync_version(&engine, "1.2.0", ConflictStrategy::KeepLocal);
    assert_eq!(kept.sync.skipped_paths(), vec!["tools/b.cfg"]);
    assert!(kept.state_updated);

    // Baseline was not moved for the kept file
    let next = engine
        .diff(
            &engine.resolve_version("1.2.0").unwrap(),
            &engine.state_store().load().state,
        )
        .unwrap();
    assert_eq!(next.get("tools/b.cfg").unwrap().status, DiffStatus::Conflict);
}

#[test]
fn version_history_is_an_audit_trail() {
    let (_pair, engine) = installed_from_first_release();
    sync_version(&engine, "1.1.0", ConflictStrategy::Skip);
    sync_version(&engine, "1.2.0", ConflictStrategy::Skip);

    let state = engine.state_store().load().state;
    let versions: Vec<&str> = state
        .version_history
        .iter()
        .map(|r| r.version.as_str())
        .collect();
    assert_eq!(versions, vec!["1.0.0", "1.1.0", "1.2.0"]);
    assert!(state.version_history.iter().all(|r| r.synced_at.is_some()));
}

#[test]
fn protected_paths_are_reported_but_never_written() {
    let pair = TreePair::new();
    pair.configure_releases("protected = [\"memory/**\"]\n");
    pair.add_release("1.0.0", &[("memory/notes.md", "upstream notes")]);
    pair.write_local("memory/notes.md", "my notes");

    let engine = SyncEngine::open(pair.local()).unwrap();
    for strategy in [
        ConflictStrategy::Skip,
        ConflictStrategy::KeepLocal,
        ConflictStrategy::TakeUpstream,
    ] {
        let outcome = sync_version(&engine, "1.0.0", strategy);
        let entry = outcome.diff.get("memory/notes.md").unwrap();
        assert!(entry.protected);
        assert_eq!(outcome.sync.skipped_paths(), vec!["memory/notes.md"]);
        pair.assert_local_eq("memory/notes.md", "my notes");
    }
}

#[test]
fn broken_release_is_applied_but_not_recorded() {
    let pair = TreePair::new();
    pair.configure_releases("");
    pair.add_release("1.0.0", &[("hooks/check.py", "print('ok')\n")]);
    pair.add_release("1.1.0", &[("hooks/check.py", "def broken(:\n")]);

    let engine = SyncEngine::open(pair.local()).unwrap();
    let first = sync_version(&engine, "1.0.0", ConflictStrategy::Skip);
    assert!(first.state_updated);

    let second = sync_version(&engine, "1.1.0", ConflictStrategy::Skip);
    assert!(!second.state_updated);
    let verify = second.verify.unwrap();
    assert!(!verify.passed);
    assert!(verify.failures().any(|c| c.check.as_str() == "syntax"));

    let state = engine.state_store().load().state;
    assert_eq!(state.last_synced_version.as_deref(), Some("1.0.0"));

    // The broken copy is on disk; the backup holds the working one
    pair.assert_local_eq("hooks/check.py", "def broken(:\n");
    let backups = engine.backup_manager().list_backups().unwrap();
    assert_eq!(backups.len(), 1);
    engine.backup_manager().restore_backup(&backups[0].id).unwrap();
    pair.assert_local_eq("hooks/check.py", "print('ok')\n");
}

#[test]
fn outcome_serializes_for_collaborators() {
    let (_pair, engine) = installed_from_first_release();
    let outcome = sync_version(&engine, "1.1.0", ConflictStrategy::Skip);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["version"], "1.1.0");
    assert_eq!(json["sync"]["synced"][0]["action"], "sync");
    assert_eq!(json["sync"]["synced"][1]["action"], "add");
    assert_eq!(json["verify"]["passed"], true);
}
