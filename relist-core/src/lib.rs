//! relist Core - Resource and Protocol Types
//!
//! Pure data structures shared by the cache-refresh protocol. All other
//! crates depend on this. This crate contains ONLY data types, options,
//! errors and configuration - no I/O.

pub mod config;
pub mod error;
pub mod identity;
pub mod options;
pub mod resource;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::RefreshConfig;
pub use error::{ClientError, ConfigError, RelistError, RelistResult};
pub use identity::{new_uid, ObjectRef, Timestamp};
pub use options::{GetOptions, ListOptions};
pub use resource::{
    ListMeta, ObjectMeta, PipelineRun, PipelineRunList, PipelineRunSpec, PipelineRunStatus,
    ResourceKind, ResourceObject, TaskRun, TaskRunList, TaskRunSpec, TaskRunStatus,
    TEKTON_API_GROUP, TEKTON_API_VERSION,
};
