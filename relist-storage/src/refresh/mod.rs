//! Stale-status detection and cache refresh for namespaced listers.
//!
//! A cache-backed list can return objects whose status has not caught up
//! with the authoritative store. Readers that act on an empty status can
//! then duplicate work that was already done.
//!
//! # Protocol
//!
//! The first list for a namespace is scanned. Each item whose status looks
//! empty is fetched directly; if the direct copy has a status, or the fetch
//! fails, the cache is considered stale and the namespace is re-listed with
//! the resource version cleared. Once a list for a namespace succeeds, the
//! namespace is remembered in [`CheckedNamespaces`] and never scanned again.
//!
//! # Example
//!
//! ```ignore
//! let client = Arc::new(my_client);
//! let lister = RefreshingLister::new(
//!     Arc::new(TaskRunLister::new(client)),
//!     RefreshConfig::from_env(),
//! )?;
//!
//! // First call may refresh; later calls for "ci" are plain lists.
//! let runs = lister.list("ci", &ListOptions::new().with_resource_version("0")).await?;
//! ```

pub mod detector;
pub mod listers;
pub mod memo;
pub mod metrics;
pub mod orchestrator;
pub mod traits;

pub use detector::{needs_refresh, RefreshVerdict};
pub use listers::{PipelineRunLister, TaskRunLister};
pub use memo::CheckedNamespaces;
pub use metrics::{RefreshMetrics, RefreshMetricsSnapshot};
pub use orchestrator::{fetch_or_refresh_list, RefreshingLister};
pub use traits::RefreshLister;
