//! Tests for baseline persistence, bootstrap and state-update gating

use std::fs;
use upsync_core::state::{Resolution, bootstrap};
use upsync_core::sync::{ConflictStrategy, SyncOptions};
use upsync_core::{DiffStatus, SyncEngine, SyncState, TreeRoots};
use upsync_fs::{DiscoveryFilter, compute_content_checksum};
use upsync_test_utils::TreePair;

mod bootstrap_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_only_paths_present_in_both_trees() {
        let pair = TreePair::new();
        pair.write_upstream("shared.cfg", "upstream");
        pair.write_local("shared.cfg", "local");
        pair.write_upstream("upstream-only.cfg", "u");
        pair.write_local("local-only.cfg", "l");

        let roots = TreeRoots::new(pair.upstream(), pair.local()).unwrap();
        let report = bootstrap(&roots, "1.0.0", &DiscoveryFilter::default()).unwrap();

        assert_eq!(report.recorded, 1);
        assert_eq!(report.upstream_only, vec!["upstream-only.cfg"]);
        let record = &report.state.files["shared.cfg"];
        assert_eq!(record.hash, compute_content_checksum("local"));
        assert_eq!(record.resolution, Resolution::Local);
        assert!(!report.state.files.contains_key("upstream-only.cfg"));
        assert!(!report.state.files.contains_key("local-only.cfg"));
        assert_eq!(report.state.last_synced_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn upstream_only_paths_stay_added_after_bootstrap() {
        let pair = TreePair::new();
        pair.write_both("a.cfg", "same");
        pair.write_upstream("new.cfg", "new");

        let engine = SyncEngine::open(pair.local()).unwrap();
        let report = engine.bootstrap(&pair.upstream(), "1.0.0").unwrap();
        let diff = engine.diff(&pair.upstream(), &report.state).unwrap();

        assert_eq!(diff.get("new.cfg").unwrap().status, DiffStatus::Added);
        assert_eq!(diff.get("a.cfg").unwrap().status, DiffStatus::Unchanged);
    }

    #[test]
    fn local_edits_after_bootstrap_are_detected() {
        let pair = TreePair::new();
        pair.write_both("a.cfg", "v1");

        let engine = SyncEngine::open(pair.local()).unwrap();
        let state = engine.bootstrap(&pair.upstream(), "1.0.0").unwrap().state;
        pair.write_local("a.cfg", "mine");
        pair.write_upstream("a.cfg", "v2");

        let diff = engine.diff(&pair.upstream(), &state).unwrap();
        assert_eq!(diff.get("a.cfg").unwrap().status, DiffStatus::Conflict);
    }
}

mod store_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn engine_store_lives_in_the_engine_directory() {
        let pair = TreePair::new();
        let engine = SyncEngine::open(pair.local()).unwrap();
        let store = engine.state_store();

        let mut state = SyncState::new();
        state.apply_sync("1.2.0", [("tools/a.cfg", "sha256:abc")]);
        state.record_detected("1.3.0");
        store.save(&state).unwrap();

        assert!(pair.local().join(".upsync/state.toml").is_file());
        let loaded = store.load();
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn corrupt_state_file_reads_as_first_run() {
        let pair = TreePair::new();
        pair.write_both("a.cfg", "v1");
        pair.write_upstream("a.cfg", "v2");
        pair.write_local(".upsync/state.toml", "files = [this is not toml");

        let engine = SyncEngine::open(pair.local()).unwrap();
        let loaded = engine.state_store().load();
        assert!(loaded.warning.is_some());

        let diff = engine.diff(&pair.upstream(), &loaded.state).unwrap();
        assert_eq!(diff.get("a.cfg").unwrap().status, DiffStatus::Modified);
    }
}

mod gating_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failed_copy_blocks_state_update() {
        let pair = TreePair::new();
        pair.write_upstream("x/y.cfg", "new");
        pair.write_upstream("z.cfg", "z");
        // A file where the upstream directory must go
        pair.write_local("x", "in the way");

        let engine = SyncEngine::open(pair.local()).unwrap();
        let mut state = SyncState::new();
        let outcome = engine
            .sync(&pair.upstream(), "2.0.0", &mut state, &SyncOptions::default())
            .unwrap();

        assert_eq!(outcome.sync.synced_paths(), vec!["x/y.cfg", "z.cfg"]);
        assert_eq!(outcome.sync.errors.len(), 1);
        assert_eq!(outcome.sync.errors[0].path, "x/y.cfg");
        assert!(!outcome.verify.as_ref().unwrap().passed);
        assert!(!outcome.state_updated);
        assert!(state.is_empty());
        pair.assert_local_eq("z.cfg", "z");
    }

    #[test]
    fn dangling_reference_blocks_state_update() {
        let pair = TreePair::new();
        pair.write_upstream(
            "settings.json",
            r#"{"hooks": {"stop": {"command": "sh hooks/notify.sh"}}}"#,
        );

        let engine = SyncEngine::open(pair.local()).unwrap();
        let mut state = SyncState::new();
        let outcome = engine
            .sync(&pair.upstream(), "2.0.0", &mut state, &SyncOptions::default())
            .unwrap();

        assert!(outcome.sync.is_success());
        assert!(!outcome.state_updated);
        assert!(state.is_empty());
    }

    #[test]
    fn verified_sync_updates_state_with_upstream_hashes() {
        let pair = TreePair::new();
        pair.write_upstream("hooks/notify.sh", "#!/bin/sh\n");
        pair.write_upstream(
            "settings.json",
            r#"{"hooks": {"stop": {"command": "sh hooks/notify.sh"}}}"#,
        );

        let engine = SyncEngine::open(pair.local()).unwrap();
        let mut state = SyncState::new();
        let options = SyncOptions {
            conflict_strategy: ConflictStrategy::Skip,
            ..SyncOptions::default()
        };
        let outcome = engine
            .sync(&pair.upstream(), "2.0.0", &mut state, &options)
            .unwrap();

        assert!(outcome.state_updated);
        assert_eq!(state.last_synced_version.as_deref(), Some("2.0.0"));
        let record = &state.files["hooks/notify.sh"];
        assert_eq!(record.resolution, Resolution::Upstream);
        assert_eq!(record.hash, compute_content_checksum("#!/bin/sh\n"));
    }

    #[test]
    fn restore_brings_back_overwritten_files() {
        let pair = TreePair::new();
        pair.write_upstream("a.cfg", "theirs");
        pair.write_local("a.cfg", "mine");

        let engine = SyncEngine::open(pair.local()).unwrap();
        let mut state = SyncState::new();
        let outcome = engine
            .sync(&pair.upstream(), "2.0.0", &mut state, &SyncOptions::default())
            .unwrap();
        pair.assert_local_eq("a.cfg", "theirs");

        let manager = engine.backup_manager();
        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].metadata.version.as_deref(), Some("2.0.0"));
        assert!(outcome.sync.backup_dir.unwrap().ends_with(&backups[0].id));

        let restored = manager.restore_backup(&backups[0].id).unwrap();
        assert_eq!(restored, vec!["a.cfg"]);
        assert_eq!(fs::read_to_string(pair.local().join("a.cfg")).unwrap(), "mine");
    }
}
