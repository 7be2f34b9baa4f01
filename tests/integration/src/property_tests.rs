//! Properties that must hold for arbitrary tree contents

use proptest::prelude::*;
use upsync_core::sync::{ConflictStrategy, SyncOptions};
use upsync_core::{SyncEngine, SyncResult, SyncState};
use upsync_test_utils::TreePair;

const PATHS: &[&str] = &["a.cfg", "tools/b.cfg", "tools/c.cfg", "keep/d.cfg"];

/// Per path: upstream content and local content, each maybe absent
type Layout = Vec<(Option<u8>, Option<u8>)>;

fn layout() -> impl Strategy<Value = Layout> {
    proptest::collection::vec(
        (proptest::option::of(0u8..3), proptest::option::of(0u8..3)),
        PATHS.len(),
    )
}

fn strategy() -> impl Strategy<Value = ConflictStrategy> {
    prop_oneof![
        Just(ConflictStrategy::Skip),
        Just(ConflictStrategy::KeepLocal),
        Just(ConflictStrategy::TakeUpstream),
    ]
}

fn build(layout: &Layout) -> TreePair {
    let pair = TreePair::new();
    pair.configure("protected = [\"keep/**\"]\n\n[verify]\nreferences = []\n");
    for (path, (upstream, local)) in PATHS.iter().zip(layout) {
        if let Some(v) = upstream {
            pair.write_upstream(path, &format!("v{}", v));
        }
        if let Some(v) = local {
            pair.write_local(path, &format!("v{}", v));
        }
    }
    pair
}

fn run(
    pair: &TreePair,
    state: &mut SyncState,
    strategy: ConflictStrategy,
    dry_run: bool,
) -> SyncResult {
    let engine = SyncEngine::open(pair.local()).unwrap();
    let options = SyncOptions {
        conflict_strategy: strategy,
        dry_run,
        ..SyncOptions::default()
    };
    engine
        .sync(&pair.upstream(), "1.0.0", state, &options)
        .unwrap()
        .sync
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn dry_run_plans_what_a_real_run_does(layout in layout(), strategy in strategy()) {
        let pair = build(&layout);
        let mut state = SyncState::new();

        let preview = run(&pair, &mut state, strategy, true);
        prop_assert!(state.is_empty());

        let real = run(&pair, &mut state, strategy, false);
        prop_assert_eq!(preview.synced, real.synced);
        prop_assert_eq!(preview.skipped, real.skipped);
        prop_assert_eq!(preview.conflicts, real.conflicts);
    }

    #[test]
    fn second_sync_is_a_no_op(layout in layout(), strategy in strategy()) {
        let pair = build(&layout);
        let mut state = SyncState::new();

        let first = run(&pair, &mut state, strategy, false);
        prop_assert!(first.is_success());

        let second = run(&pair, &mut state, strategy, false);
        prop_assert!(second.synced.is_empty());
        prop_assert!(second.conflicts.is_empty());
    }

    #[test]
    fn protected_paths_are_never_written(layout in layout(), strategy in strategy()) {
        let pair = build(&layout);
        let before = layout[3].1;
        let mut state = SyncState::new();

        let result = run(&pair, &mut state, strategy, false);
        prop_assert!(!result.synced_paths().contains(&"keep/d.cfg"));
        match before {
            Some(v) => prop_assert_eq!(pair.read_local("keep/d.cfg"), format!("v{}", v)),
            None => prop_assert!(!pair.local().join("keep/d.cfg").exists()),
        }
    }
}
