//! Property-Based Tests for the Refresh Protocol
//!
//! **Property 1: Checked namespaces cost one list**
//!
//! Once a namespace is checked, a round is exactly one list and no direct
//! gets, whatever the list contains.
//!
//! **Property 2: Populated lists are trusted**
//!
//! A list whose items all carry a status is returned as-is after one list
//! call, and marks the namespace checked.
//!
//! **Property 3: Rounds converge on the authoritative view**
//!
//! For any mix of stale and current items, a round returns the
//! authoritative list exactly when some pending item has already started
//! authoritatively, scanning no further than the first such item.
//!
//! **Property 4: The memo only grows**
//!
//! Across any sequence of successful and failed rounds, a namespace once
//! checked stays checked.
//!
//! **Property 5: Verification errors short-circuit**
//!
//! A failed direct read stops the scan after one get and forces exactly
//! one cache-bypassing re-list.

use std::sync::Arc;

use proptest::prelude::*;
use relist_test_utils::{
    assertions, fetch_or_refresh_list, fixtures, generators, init_test_tracing, CheckedNamespaces,
    InMemoryRunStore, ListOptions, RefreshConfig, RefreshingLister, ResourceObject, ScriptedLister,
    TaskRun, TaskRunLister, WriteTarget,
};
use tokio::runtime::Runtime;

// ============================================================================
// TEST CONFIGURATION
// ============================================================================

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn pending_or_started(namespace: &str, name: &str, started: bool) -> TaskRun {
    if started {
        fixtures::started_task_run(namespace, name)
    } else {
        fixtures::pending_task_run(namespace, name)
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Checked namespaces cost one list**
    #[test]
    fn prop_checked_namespace_is_a_single_list(
        namespace in generators::arb_namespace(),
        layout in generators::arb_run_layout(6),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let listed: Vec<TaskRun> = layout
                .iter()
                .map(|(name, cached, _)| pending_or_started(&namespace, name, *cached))
                .collect();
            let lister = ScriptedLister::new(listed.clone()).with_get_responses(
                layout
                    .iter()
                    .map(|(name, _, auth)| Ok(pending_or_started(&namespace, name, *auth))),
            );
            let checked = CheckedNamespaces::with_checked([namespace.clone()]);

            let list = fetch_or_refresh_list(
                &lister,
                &namespace,
                &fixtures::cached_list_options(),
                &checked,
            )
            .await
            .map_err(|e| TestCaseError::fail(format!("list failed: {}", e)))?;

            prop_assert_eq!(list.items, listed);
            prop_assert_eq!(lister.list_count(), 1);
            prop_assert_eq!(lister.get_count(), 0);
            Ok(())
        })?;
    }

    /// **Property 2: Populated lists are trusted**
    #[test]
    fn prop_populated_list_needs_no_gets(
        (namespace, runs) in generators::arb_namespace().prop_flat_map(|ns| {
            (Just(ns.clone()), generators::arb_started_task_runs(ns, 8))
        }),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let lister = ScriptedLister::new(runs.clone());
            let checked = CheckedNamespaces::new();

            let list = fetch_or_refresh_list(
                &lister,
                &namespace,
                &fixtures::cached_list_options(),
                &checked,
            )
            .await
            .map_err(|e| TestCaseError::fail(format!("list failed: {}", e)))?;

            prop_assert_eq!(list.items, runs);
            prop_assert_eq!(lister.list_count(), 1);
            prop_assert_eq!(lister.get_count(), 0);
            prop_assert!(checked.is_checked(&namespace).await);
            Ok(())
        })?;
    }

    /// **Property 3: Rounds converge on the authoritative view**
    #[test]
    fn prop_round_matches_first_divergence(
        namespace in generators::arb_namespace(),
        layout in generators::arb_run_layout(6),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = Arc::new(InMemoryRunStore::new());
            for (name, cached, auth) in &layout {
                store
                    .write_task_run(pending_or_started(&namespace, name, *cached), WriteTarget::CacheOnly)
                    .await;
                store
                    .write_task_run(
                        pending_or_started(&namespace, name, *auth),
                        WriteTarget::AuthoritativeOnly,
                    )
                    .await;
            }

            // Layout is name-ordered, as is the store's list order.
            let pending: Vec<&(String, bool, bool)> =
                layout.iter().filter(|(_, cached, _)| !cached).collect();
            let hit = pending.iter().position(|(_, _, auth)| *auth);
            let expected_gets = hit.map_or(pending.len(), |index| index + 1);

            let lister = RefreshingLister::new(
                Arc::new(TaskRunLister::new(Arc::clone(&store))),
                fixtures::quiet_config(),
            )
            .map_err(|e| TestCaseError::fail(format!("invalid config: {}", e)))?;
            let list = lister
                .list(&namespace, &fixtures::cached_list_options())
                .await
                .map_err(|e| TestCaseError::fail(format!("list failed: {}", e)))?;

            let observed: Vec<(String, bool)> = list
                .items
                .iter()
                .map(|run| (run.name().to_string(), run.has_started()))
                .collect();
            let expected: Vec<(String, bool)> = layout
                .iter()
                .map(|(name, cached, auth)| {
                    (name.clone(), if hit.is_some() { *auth } else { *cached })
                })
                .collect();

            prop_assert_eq!(observed, expected);
            prop_assert_eq!(store.get_calls(), expected_gets as u64);
            prop_assert_eq!(store.list_calls(), if hit.is_some() { 2 } else { 1 });
            prop_assert_eq!(store.bypassed_list_calls(), if hit.is_some() { 1 } else { 0 });
            prop_assert!(lister.checked().is_checked(&namespace).await);
            Ok(())
        })?;
    }

    /// **Property 4: The memo only grows**
    #[test]
    fn prop_memo_is_monotonic(
        rounds in prop::collection::vec((generators::arb_namespace(), any::<bool>()), 1..12),
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let store = Arc::new(InMemoryRunStore::new());
            let lister = RefreshingLister::new(
                Arc::new(TaskRunLister::new(Arc::clone(&store))),
                fixtures::quiet_config(),
            )
            .map_err(|e| TestCaseError::fail(format!("invalid config: {}", e)))?;
            let mut previous: Vec<String> = Vec::new();

            for (namespace, fail) in rounds {
                if fail {
                    store
                        .fail_next_list(fixtures::task_run_not_found(&namespace, "list"))
                        .await;
                }
                let result = lister.list(&namespace, &fixtures::cached_list_options()).await;
                prop_assert_eq!(result.is_ok(), !fail);

                let current = lister.checked().namespaces().await;
                for ns in &previous {
                    prop_assert!(current.contains(ns), "memo lost {}", ns);
                }
                if !fail {
                    prop_assert!(current.contains(&namespace));
                }
                previous = current;
            }
            Ok(())
        })?;
    }

    /// **Property 5: Verification errors short-circuit**
    #[test]
    fn prop_verification_error_short_circuits(
        namespace in generators::arb_namespace(),
        pending in 1usize..6,
    ) {
        let rt = test_runtime()?;
        rt.block_on(async {
            let listed: Vec<TaskRun> = (0..pending)
                .map(|i| fixtures::pending_task_run(&namespace, &format!("run-{}", i)))
                .collect();
            let lister = ScriptedLister::new(listed.clone())
                .with_get_responses(vec![Err(fixtures::task_run_not_found(&namespace, "run-0"))]);
            let checked = CheckedNamespaces::new();

            let result = fetch_or_refresh_list(
                &lister,
                &namespace,
                &fixtures::cached_list_options(),
                &checked,
            )
            .await;

            assertions::assert_ok(&result);
            prop_assert_eq!(lister.get_count(), 1);
            prop_assert_eq!(lister.list_count(), 2);
            prop_assert!(lister.list_options()[1].is_cache_bypassed());
            prop_assert!(checked.is_checked(&namespace).await);
            Ok(())
        })?;
    }
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_scenario_checked_namespace() {
    init_test_tracing();
    let lister = ScriptedLister::new(vec![fixtures::pending_task_run("ns", "taskrun1")]);
    let checked = CheckedNamespaces::with_checked(["ns"]);

    let result = fetch_or_refresh_list(&lister, "ns", &ListOptions::new(), &checked).await;

    assertions::assert_ok(&result);
    assert_eq!(lister.list_count(), 1);
    assert_eq!(lister.get_count(), 0);
}

#[tokio::test]
async fn test_scenario_all_statuses_populated() {
    init_test_tracing();
    let lister = ScriptedLister::new(vec![
        fixtures::started_task_run("ns", "taskrun1"),
        fixtures::started_task_run("ns", "taskrun2"),
    ]);
    let checked = CheckedNamespaces::new();

    let result = fetch_or_refresh_list(&lister, "ns", &ListOptions::new(), &checked).await;

    assertions::assert_ok(&result);
    assert_eq!(lister.list_count(), 1);
    assert_eq!(lister.get_count(), 0);
    assert!(checked.is_checked("ns").await);
}

#[tokio::test]
async fn test_scenario_second_item_diverges() {
    init_test_tracing();
    let lister = ScriptedLister::new(vec![
        fixtures::pending_task_run("ns", "taskrun1"),
        fixtures::pending_task_run("ns", "taskrun2"),
    ])
    .with_get_responses(vec![
        Ok(fixtures::pending_task_run("ns", "taskrun1")),
        Ok(fixtures::started_task_run("ns", "taskrun2")),
    ]);
    let checked = CheckedNamespaces::new();

    let result = fetch_or_refresh_list(&lister, "ns", &ListOptions::new(), &checked).await;

    assertions::assert_ok(&result);
    assert_eq!(lister.get_count(), 2);
    assert_eq!(lister.list_count(), 2);
    assert!(checked.is_checked("ns").await);
}

#[tokio::test]
async fn test_scenario_single_stale_item() {
    init_test_tracing();
    let lister = ScriptedLister::new(vec![fixtures::pending_task_run("ns", "taskrun1")])
        .with_refreshed(vec![fixtures::started_task_run("ns", "taskrun1")])
        .with_get_responses(vec![Ok(fixtures::started_task_run("ns", "taskrun1"))]);
    let checked = CheckedNamespaces::new();

    let list = fetch_or_refresh_list(
        &lister,
        "ns",
        &fixtures::cached_list_options(),
        &checked,
    )
    .await
    .unwrap();

    assertions::assert_all_started(&list);
    assert_eq!(lister.get_count(), 1);
    assert_eq!(lister.list_count(), 2);
    assert_eq!(
        lister.list_options()[1],
        fixtures::cached_list_options().bypass_cache()
    );
    assert!(checked.is_checked("ns").await);
}

#[tokio::test]
async fn test_scenario_config_from_env_drives_lister() {
    init_test_tracing();
    let config = RefreshConfig::from_lookup(|key| match key {
        "RELIST_REFRESH_ENABLED" => Some("false".to_string()),
        _ => None,
    });
    let store = Arc::new(InMemoryRunStore::new());
    fixtures::seed_stale_task_runs(&store, "ns", &["taskrun1"]).await;
    let lister =
        RefreshingLister::new(Arc::new(TaskRunLister::new(Arc::clone(&store))), config).unwrap();

    let list = lister
        .list("ns", &fixtures::cached_list_options())
        .await
        .unwrap();

    assert!(!list.items[0].has_started());
    assert_eq!(store.get_calls(), 0);
    assert!(lister.checked().is_empty().await);
}
