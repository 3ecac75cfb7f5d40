// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::*;

fn bootstrap() -> BootstrapInfo {
    BootstrapInfo {
        url: "repo://x".to_string(),
        rev: "abc".to_string(),
        options: String::new(),
    }
}

fn project(files: &[&str]) -> BuildProject {
    BuildProject::new(bootstrap(), files.iter().map(|f| f.to_string()))
}

#[test]
fn pop_takes_from_the_back() {
    let project = project(&["a.cc", "b.cc", "c.cc"]);

    assert_eq!(project.pop_pending().as_deref(), Some("c.cc"));
    assert_eq!(project.pop_pending().as_deref(), Some("b.cc"));
    assert_eq!(project.pop_pending().as_deref(), Some("a.cc"));
    assert_eq!(project.pop_pending(), None);
}

#[test]
fn retried_unit_is_revisited_after_the_rest_of_the_queue() {
    let project = project(&["a.cc", "b.cc", "c.cc"]);

    let first = project.pop_pending().unwrap();
    assert_eq!(first, "c.cc");
    project.push_pending(first);

    // The retried unit comes back only after a.cc and b.cc drain.
    assert_eq!(project.pop_pending().as_deref(), Some("b.cc"));
    assert_eq!(project.pop_pending().as_deref(), Some("a.cc"));
    assert_eq!(project.pop_pending().as_deref(), Some("c.cc"));
    assert_eq!(project.pop_pending(), None);
}

#[test]
fn record_artifact_upserts_last_write_wins() {
    let project = project(&[]);

    project.record_artifact("a.cc.o", vec![1]);
    project.record_artifact("a.cc.o", vec![2, 3]);

    assert_eq!(project.artifact("a.cc.o"), Some(vec![2, 3]));
    assert_eq!(project.progress().artifacts, 1);
}

#[test]
fn progress_counts_both_collections() {
    let project = project(&["a.cc", "b.cc"]);
    assert_eq!(
        project.progress(),
        BuildProgress { artifacts: 0, pending: 2 }
    );

    let file = project.pop_pending().unwrap();
    project.record_artifact(file, vec![0xAA]);
    assert_eq!(
        project.progress(),
        BuildProgress { artifacts: 1, pending: 1 }
    );
}

#[test]
fn separate_instances_are_independent() {
    let first = project(&["a.cc", "b.cc"]);
    let second = project(&["a.cc", "b.cc"]);

    while let Some(file) = first.pop_pending() {
        first.record_artifact(file, vec![1]);
    }

    assert_eq!(first.progress(), BuildProgress { artifacts: 2, pending: 0 });
    assert_eq!(second.progress(), BuildProgress { artifacts: 0, pending: 2 });
}

/// Mutual exclusion: N simulated workers drain one queue concurrently,
/// each unit failing once before it succeeds. Every unit must end up in
/// the artifact map exactly once — nothing lost, nothing duplicated.
#[test]
fn concurrent_workers_never_lose_or_duplicate_units() {
    const WORKERS: usize = 8;
    const UNITS: usize = 200;

    let files: Vec<String> = (0..UNITS).map(|i| format!("src/file{i}.cc")).collect();
    let expected: HashSet<String> = files.iter().cloned().collect();

    let project = Arc::new(BuildProject::new(bootstrap(), files));
    let failed_once: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let project = Arc::clone(&project);
            let failed_once = Arc::clone(&failed_once);
            std::thread::spawn(move || {
                while let Some(file) = project.pop_pending() {
                    let fresh = failed_once.lock().insert(file.clone());
                    if fresh {
                        // First attempt fails; requeue for retry.
                        project.push_pending(file);
                    } else {
                        project.record_artifact(file, vec![0xAB]);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let progress = project.progress();
    assert_eq!(progress.pending, 0);
    assert_eq!(progress.artifacts, UNITS);
    for file in &expected {
        assert!(project.artifact(file).is_some(), "lost unit {file}");
    }
}
