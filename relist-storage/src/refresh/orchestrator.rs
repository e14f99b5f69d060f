//! List orchestration: list, scan once per namespace, refresh on divergence.
//!
//! One round is:
//!
//! 1. List through the cache with the caller's options.
//! 2. If the namespace is already checked, return that list.
//! 3. Otherwise ask the detector about each item in order, stopping at the
//!    first item that needs a refresh or cannot be verified.
//! 4. On a hit, re-list with the resource version cleared so the read
//!    bypasses the cache. That result replaces the first list.
//! 5. If the final list succeeded, mark the namespace checked.
//!
//! A failed list leaves the namespace unchecked so the next call scans
//! again. Verification errors are logged and never returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use relist_core::{ListOptions, RefreshConfig, RelistResult, ResourceObject};

use super::detector::check_item;
use super::memo::CheckedNamespaces;
use super::metrics::{RefreshMetrics, RefreshMetricsSnapshot};
use super::traits::RefreshLister;

macro_rules! refresh_event {
    ($info:expr, $($arg:tt)+) => {
        if $info {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Fetch a namespace's list, refreshing it once if the cache is stale.
///
/// `checked` is the per-namespace memo. It must outlive individual calls;
/// a fresh memo on every call rescans every time.
pub async fn fetch_or_refresh_list<R>(
    lister: &R,
    namespace: &str,
    options: &ListOptions,
    checked: &CheckedNamespaces,
) -> RelistResult<R::List>
where
    R: RefreshLister + ?Sized,
{
    let metrics = RefreshMetrics::new();
    run_round(lister, namespace, options, checked, &metrics, true).await
}

async fn run_round<R>(
    lister: &R,
    namespace: &str,
    options: &ListOptions,
    checked: &CheckedNamespaces,
    metrics: &RefreshMetrics,
    log_at_info: bool,
) -> RelistResult<R::List>
where
    R: RefreshLister + ?Sized,
{
    RefreshMetrics::incr(&metrics.rounds);

    let list = match lister.list(namespace, options).await {
        Ok(list) => list,
        Err(err) => {
            RefreshMetrics::incr(&metrics.list_failures);
            return Err(err);
        }
    };

    if checked.is_checked(namespace).await {
        RefreshMetrics::incr(&metrics.skipped_scans);
        return Ok(list);
    }
    RefreshMetrics::incr(&metrics.scans);

    let mut refresh_needed = false;
    for item in lister.items(Some(&list)) {
        let verdict = check_item(lister, item, Some(metrics)).await;
        if !verdict.is_refresh_needed() {
            continue;
        }

        match verdict.error() {
            Some(_) => RefreshMetrics::incr(&metrics.verification_errors),
            None => RefreshMetrics::incr(&metrics.divergences_detected),
        }
        let kind = <R::Item as ResourceObject>::kind();
        let gvk = kind.group_version_kind();
        refresh_event!(
            log_at_info,
            namespace,
            options = ?options,
            kind = kind.as_str(),
            gvk = gvk.as_str(),
            name = item.name(),
            error = ?verdict.error(),
            "Detected a need to refresh cache"
        );
        refresh_needed = true;
        break;
    }

    let result = if refresh_needed {
        let bypass = options.bypass_cache();
        let started = Instant::now();
        let refreshed = lister.list(namespace, &bypass).await;
        RefreshMetrics::incr(&metrics.refreshes);
        if refreshed.is_err() {
            RefreshMetrics::incr(&metrics.refresh_failures);
        }
        refresh_event!(
            log_at_info,
            namespace,
            duration_ms = started.elapsed().as_millis() as u64,
            error = ?refreshed.as_ref().err(),
            "Refreshed the cache"
        );
        refreshed
    } else {
        Ok(list)
    };

    if result.is_ok() {
        checked.mark_checked(namespace).await;
    }

    result
}

/// Long-lived orchestrator for one resource kind.
///
/// Owns the lister, the per-namespace memo and the round counters. Clones
/// share all three, so a single instance can be handed to every
/// reconciler in the process.
///
/// # Example
///
/// ```ignore
/// let lister = RefreshingLister::new(Arc::new(TaskRunLister::new(client)), RefreshConfig::from_env())?;
/// let runs = lister.list("ci", &ListOptions::new().with_resource_version("0")).await?;
/// ```
pub struct RefreshingLister<R>
where
    R: RefreshLister,
{
    lister: Arc<R>,
    checked: Arc<CheckedNamespaces>,
    config: RefreshConfig,
    metrics: Arc<RefreshMetrics>,
    memo_size_reported: Arc<AtomicBool>,
}

impl<R> RefreshingLister<R>
where
    R: RefreshLister,
{
    /// Create an orchestrator with an empty memo.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(lister: Arc<R>, config: RefreshConfig) -> RelistResult<Self> {
        Self::with_memo(lister, Arc::new(CheckedNamespaces::new()), config)
    }

    /// Create an orchestrator with default configuration.
    pub fn with_defaults(lister: Arc<R>) -> Self {
        Self::assemble(lister, Arc::new(CheckedNamespaces::new()), RefreshConfig::default())
    }

    /// Create an orchestrator around an existing memo.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_memo(
        lister: Arc<R>,
        checked: Arc<CheckedNamespaces>,
        config: RefreshConfig,
    ) -> RelistResult<Self> {
        config.validate()?;
        Ok(Self::assemble(lister, checked, config))
    }

    fn assemble(lister: Arc<R>, checked: Arc<CheckedNamespaces>, config: RefreshConfig) -> Self {
        Self {
            lister,
            checked,
            config,
            metrics: Arc::new(RefreshMetrics::new()),
            memo_size_reported: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one list-or-refresh round for a namespace.
    ///
    /// With detection disabled this is a plain list and the memo is left
    /// alone.
    pub async fn list(&self, namespace: &str, options: &ListOptions) -> RelistResult<R::List> {
        if !self.config.enabled {
            return self.lister.list(namespace, options).await;
        }

        let result = run_round(
            self.lister.as_ref(),
            namespace,
            options,
            &self.checked,
            &self.metrics,
            self.config.log_refreshes,
        )
        .await;

        if result.is_ok() {
            self.report_memo_size().await;
        }
        result
    }

    async fn report_memo_size(&self) {
        if self.memo_size_reported.load(Ordering::Relaxed) {
            return;
        }
        let size = self.checked.len().await;
        if size > self.config.memo_warn_threshold
            && !self.memo_size_reported.swap(true, Ordering::Relaxed)
        {
            tracing::warn!(
                checked_namespaces = size,
                threshold = self.config.memo_warn_threshold,
                "Checked-namespace memo exceeds warning threshold"
            );
        }
    }

    /// The shared per-namespace memo.
    pub fn checked(&self) -> &Arc<CheckedNamespaces> {
        &self.checked
    }

    /// Get a reference to the underlying lister.
    pub fn lister(&self) -> &R {
        &self.lister
    }

    /// Get the configuration.
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Current round counters.
    pub fn metrics(&self) -> RefreshMetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<R> Clone for RefreshingLister<R>
where
    R: RefreshLister,
{
    fn clone(&self) -> Self {
        Self {
            lister: Arc::clone(&self.lister),
            checked: Arc::clone(&self.checked),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
            memo_size_reported: Arc::clone(&self.memo_size_reported),
        }
    }
}
