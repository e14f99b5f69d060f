//! RELIST Storage - Refreshing Listers and In-Memory Run Store
//!
//! Implements the stale-status refresh protocol over a generic lister,
//! the per-kind listers for task and pipeline runs, and a two-layer
//! in-memory store used to reproduce a lagging cache.

pub mod client;
pub mod memory_store;
pub mod refresh;

pub use client::RunClient;
pub use memory_store::{InMemoryRunStore, WriteTarget};

// Re-export refresh types for controller integration
pub use refresh::{
    fetch_or_refresh_list, needs_refresh, CheckedNamespaces, PipelineRunLister, RefreshLister,
    RefreshMetrics, RefreshMetricsSnapshot, RefreshVerdict, RefreshingLister, TaskRunLister,
};
