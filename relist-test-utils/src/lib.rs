//! RELIST Test Utilities
//!
//! Centralized test infrastructure for the relist workspace:
//! - A scripted lister double for driving the refresh protocol
//! - Proptest generators for run resources
//! - Test fixtures for common scenarios
//! - Custom assertions for refresh outcomes
//! - Test-scoped tracing setup

// Re-export the in-memory store from its source crate
pub use relist_storage::{InMemoryRunStore, WriteTarget};

// Re-export core types for convenience
pub use relist_core::{
    ClientError, ConfigError, GetOptions, ListMeta, ListOptions, ObjectMeta, ObjectRef,
    PipelineRun, PipelineRunList, RefreshConfig, RelistError, RelistResult, ResourceKind,
    ResourceObject, TaskRun, TaskRunList, Timestamp,
};

// Re-export the refresh protocol surface
pub use relist_storage::{
    fetch_or_refresh_list, needs_refresh, CheckedNamespaces, PipelineRunLister, RefreshLister,
    RefreshMetricsSnapshot, RefreshVerdict, RefreshingLister, TaskRunLister,
};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

// ============================================================================
// SCRIPTED LISTER
// ============================================================================

/// Counting task run lister with scripted responses.
///
/// Cache-served lists return `listed`; lists with the resource version
/// cleared return `refreshed` (or `listed` when no refreshed list was
/// given). Direct gets pop the next scripted response in order, regardless
/// of the name asked for, and report "not found" once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedLister {
    listed: Vec<TaskRun>,
    refreshed: Option<Vec<TaskRun>>,
    get_responses: Mutex<VecDeque<RelistResult<TaskRun>>>,
    list_errors: Mutex<VecDeque<RelistError>>,
    list_calls: Mutex<Vec<ListOptions>>,
    get_calls: AtomicUsize,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedLister {
    /// Lister serving `listed` from every list call.
    pub fn new(listed: Vec<TaskRun>) -> Self {
        Self {
            listed,
            ..Default::default()
        }
    }

    /// Serve `refreshed` from lists that bypass the cache.
    pub fn with_refreshed(mut self, refreshed: Vec<TaskRun>) -> Self {
        self.refreshed = Some(refreshed);
        self
    }

    /// Script the direct get responses, in call order.
    pub fn with_get_responses<I>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = RelistResult<TaskRun>>,
    {
        locked(&self.get_responses).extend(responses);
        self
    }

    /// Fail the next list calls with these errors, in order.
    pub fn with_list_errors<I>(self, errors: I) -> Self
    where
        I: IntoIterator<Item = RelistError>,
    {
        locked(&self.list_errors).extend(errors);
        self
    }

    /// Number of list calls so far.
    pub fn list_count(&self) -> usize {
        locked(&self.list_calls).len()
    }

    /// Options passed to each list call so far.
    pub fn list_options(&self) -> Vec<ListOptions> {
        locked(&self.list_calls).clone()
    }

    /// Number of direct gets so far.
    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshLister for ScriptedLister {
    type Item = TaskRun;
    type List = TaskRunList;

    async fn list(&self, _namespace: &str, options: &ListOptions) -> RelistResult<TaskRunList> {
        locked(&self.list_calls).push(options.clone());
        if let Some(err) = locked(&self.list_errors).pop_front() {
            return Err(err);
        }

        let items = match (&self.refreshed, options.is_cache_bypassed()) {
            (Some(refreshed), true) => refreshed.clone(),
            _ => self.listed.clone(),
        };
        Ok(TaskRunList::new(items))
    }

    async fn get(&self, namespace: &str, name: &str, _options: &GetOptions) -> RelistResult<TaskRun> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        locked(&self.get_responses).pop_front().unwrap_or_else(|| {
            Err(ClientError::NotFound {
                kind: ResourceKind::TaskRun,
                namespace: namespace.to_string(),
                name: name.to_string(),
            }
            .into())
        })
    }

    fn items<'a>(&self, list: Option<&'a TaskRunList>) -> &'a [TaskRun] {
        list.map(|l| l.items.as_slice()).unwrap_or_default()
    }

    fn status_is_empty(&self, item: Option<&TaskRun>) -> bool {
        item.map_or(true, |run| !run.has_started())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating run resources.

    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    /// Generate a DNS-label style namespace.
    pub fn arb_namespace() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,14}[a-z0-9]"
    }

    /// Generate a DNS-label style object name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}[a-z0-9]"
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // Generate timestamps within a reasonable range (2020-2030)
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate a task run with a recorded start time.
    pub fn arb_task_run_with_status() -> impl Strategy<Value = TaskRun> {
        (arb_namespace(), arb_name(), arb_timestamp())
            .prop_map(|(ns, name, start)| TaskRun::new(ns, name).with_start_time(start))
    }

    /// Generate a task run with an empty status.
    pub fn arb_task_run_without_status() -> impl Strategy<Value = TaskRun> {
        (arb_namespace(), arb_name()).prop_map(|(ns, name)| TaskRun::new(ns, name))
    }

    /// Generate a task run list in one namespace with unique names and
    /// populated statuses.
    pub fn arb_started_task_runs(
        namespace: String,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<TaskRun>> {
        (
            prop::collection::btree_set(arb_name(), 0..=max_len),
            arb_timestamp(),
        )
            .prop_map(move |(names, start)| {
                names
                    .into_iter()
                    .map(|name| TaskRun::new(namespace.clone(), name).with_start_time(start))
                    .collect()
            })
    }

    /// Generate a namespace layout as `(name, cached_started, authoritative_started)`
    /// triples with unique names.
    pub fn arb_run_layout(max_len: usize) -> impl Strategy<Value = Vec<(String, bool, bool)>> {
        prop::collection::btree_map(arb_name(), (any::<bool>(), any::<bool>()), 0..=max_len)
            .prop_map(|runs| {
                runs.into_iter()
                    .map(|(name, (cached, authoritative))| (name, cached, authoritative))
                    .collect()
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use chrono::{TimeZone, Utc};

    /// Start time used by started fixtures.
    pub fn fixed_start_time() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Task run with an empty status.
    pub fn pending_task_run(namespace: &str, name: &str) -> TaskRun {
        TaskRun::new(namespace, name)
    }

    /// Task run with a recorded start time.
    pub fn started_task_run(namespace: &str, name: &str) -> TaskRun {
        TaskRun::new(namespace, name).with_start_time(fixed_start_time())
    }

    /// Pipeline run with an empty status.
    pub fn pending_pipeline_run(namespace: &str, name: &str) -> PipelineRun {
        PipelineRun::new(namespace, name)
    }

    /// Pipeline run with a recorded start time.
    pub fn started_pipeline_run(namespace: &str, name: &str) -> PipelineRun {
        PipelineRun::new(namespace, name).with_start_time(fixed_start_time())
    }

    /// List options that allow a cache-served answer.
    pub fn cached_list_options() -> ListOptions {
        ListOptions::new().with_resource_version("0")
    }

    /// Config with detection on and events logged at debug.
    pub fn quiet_config() -> RefreshConfig {
        RefreshConfig::default().with_log_refreshes(false)
    }

    /// Not-found error for a task run.
    pub fn task_run_not_found(namespace: &str, name: &str) -> RelistError {
        ClientError::NotFound {
            kind: ResourceKind::TaskRun,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
        .into()
    }

    /// Seed task runs whose authoritative copies have started while the
    /// cache still shows them pending.
    pub async fn seed_stale_task_runs(store: &InMemoryRunStore, namespace: &str, names: &[&str]) {
        for name in names {
            store
                .write_task_run(pending_task_run(namespace, name), WriteTarget::CacheOnly)
                .await;
            store
                .write_task_run(
                    started_task_run(namespace, name),
                    WriteTarget::AuthoritativeOnly,
                )
                .await;
        }
    }

    /// Seed pipeline runs whose authoritative copies have started while
    /// the cache still shows them pending.
    pub async fn seed_stale_pipeline_runs(
        store: &InMemoryRunStore,
        namespace: &str,
        names: &[&str],
    ) {
        for name in names {
            store
                .write_pipeline_run(pending_pipeline_run(namespace, name), WriteTarget::CacheOnly)
                .await;
            store
                .write_pipeline_run(
                    started_pipeline_run(namespace, name),
                    WriteTarget::AuthoritativeOnly,
                )
                .await;
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for refresh outcomes.

    use super::*;

    /// Assert that a RelistResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &RelistResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a RelistResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &RelistResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that a RelistResult is a NotFound client error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &RelistResult<T>, kind: ResourceKind) {
        match result {
            Err(RelistError::Client(ClientError::NotFound { kind: k, .. })) => {
                assert_eq!(*k, kind, "Wrong kind in NotFound error");
            }
            other => panic!("Expected NotFound error for {}, got: {:?}", kind, other),
        }
    }

    /// Assert that a RelistResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &RelistResult<T>) {
        match result {
            Err(RelistError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that every task run in the list has a recorded start time.
    #[track_caller]
    pub fn assert_all_started(list: &TaskRunList) {
        for run in &list.items {
            assert!(
                run.has_started(),
                "Expected {} to have started",
                run.object_ref()
            );
        }
    }

    /// Assert the item names of a task run list, in order.
    #[track_caller]
    pub fn assert_names(list: &TaskRunList, expected: &[&str]) {
        let names: Vec<&str> = list.items.iter().map(|run| run.name()).collect();
        assert_eq!(names, expected, "Unexpected list contents");
    }
}

// ============================================================================
// TRACING
// ============================================================================

/// Install a test-writer tracing subscriber once per process.
///
/// Honours `RUST_LOG`; defaults to debug for the refresh crate.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relist_storage=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
    tracing::debug!("test tracing initialised");
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_scripted_lister_pops_gets_in_order() {
        let lister = ScriptedLister::new(vec![]).with_get_responses(vec![
            Ok(fixtures::pending_task_run("ns", "a")),
            Ok(fixtures::started_task_run("ns", "b")),
        ]);

        let first = lister.get("ns", "x", &GetOptions::new()).await.unwrap();
        let second = lister.get("ns", "y", &GetOptions::new()).await.unwrap();
        let exhausted = lister.get("ns", "z", &GetOptions::new()).await;

        assert_eq!(first.name(), "a");
        assert!(second.has_started());
        assertions::assert_not_found(&exhausted, ResourceKind::TaskRun);
        assert_eq!(lister.get_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_lister_serves_refreshed_on_bypass() {
        let lister = ScriptedLister::new(vec![fixtures::pending_task_run("ns", "a")])
            .with_refreshed(vec![fixtures::started_task_run("ns", "a")]);

        let cached = lister
            .list("ns", &fixtures::cached_list_options())
            .await
            .unwrap();
        let fresh = lister.list("ns", &ListOptions::new()).await.unwrap();

        assert!(!cached.items[0].has_started());
        assertions::assert_all_started(&fresh);
        assert_eq!(lister.list_count(), 2);
        assert!(lister.list_options()[1].is_cache_bypassed());
    }

    #[tokio::test]
    async fn test_scripted_lister_list_errors() {
        let lister = ScriptedLister::new(vec![])
            .with_list_errors(vec![RelistError::from(ClientError::Unavailable {
                reason: "down".to_string(),
            })]);

        assertions::assert_err(&lister.list("ns", &ListOptions::new()).await);
        assertions::assert_ok(&lister.list("ns", &ListOptions::new()).await);
    }

    #[tokio::test]
    async fn test_seed_stale_task_runs() {
        let store = InMemoryRunStore::new();
        fixtures::seed_stale_task_runs(&store, "ns", &["a", "b"]).await;

        let lister = TaskRunLister::new(std::sync::Arc::new(store));
        let cached = lister
            .list("ns", &fixtures::cached_list_options())
            .await
            .unwrap();
        assertions::assert_names(&cached, &["a", "b"]);
        assert!(cached.items.iter().all(|run| !run.has_started()));
    }

    #[test]
    fn test_config_error_assertion() {
        let config = RefreshConfig::default().with_memo_warn_threshold(0);
        assertions::assert_config_error(&config.validate());
    }

    #[test]
    fn test_init_test_tracing_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_started_runs_have_status(run in generators::arb_task_run_with_status()) {
            prop_assert!(run.has_started());
            prop_assert!(!run.namespace().is_empty());
        }

        #[test]
        fn prop_generated_pending_runs_are_empty(run in generators::arb_task_run_without_status()) {
            prop_assert!(!run.has_started());
        }

        #[test]
        fn prop_run_layout_names_unique(layout in generators::arb_run_layout(8)) {
            let mut names: Vec<&String> = layout.iter().map(|(name, _, _)| name).collect();
            let len = names.len();
            names.dedup();
            prop_assert_eq!(names.len(), len);
        }
    }
}
