//! Run resources and their list envelopes
//!
//! These mirror the JSON shape of the Tekton `v1` run resources closely
//! enough for the refresh protocol: identity, a resource version, and a
//! status whose "emptiness" is decided by whether a start time has been
//! recorded.

use crate::identity::{ObjectRef, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// API group for run resources.
pub const TEKTON_API_GROUP: &str = "tekton.dev";

/// API version for run resources.
pub const TEKTON_API_VERSION: &str = "v1";

// ============================================================================
// KIND
// ============================================================================

/// Resource kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    TaskRun,
    PipelineRun,
}

impl ResourceKind {
    /// Kind name as it appears in `kind:` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskRun => "TaskRun",
            Self::PipelineRun => "PipelineRun",
        }
    }

    /// Lowercase plural resource name used in API paths.
    pub fn plural(&self) -> &'static str {
        match self {
            Self::TaskRun => "taskruns",
            Self::PipelineRun => "pipelineruns",
        }
    }

    /// Fully qualified group/version/kind, e.g. `tekton.dev/v1, Kind=TaskRun`.
    pub fn group_version_kind(&self) -> String {
        format!(
            "{}/{}, Kind={}",
            TEKTON_API_GROUP,
            TEKTON_API_VERSION,
            self.as_str()
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Per-object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<Timestamp>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }
}

/// Metadata carried by a list envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Version of the collection at the time it was read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

/// Common accessors for namespaced resources.
///
/// The refresh protocol is generic over any type implementing this trait;
/// it never inspects kind-specific fields.
pub trait ResourceObject: Clone + Send + Sync + 'static {
    /// The kind of this resource type.
    fn kind() -> ResourceKind;

    /// Object metadata.
    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    fn namespace(&self) -> &str {
        &self.metadata().namespace
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    fn resource_version(&self) -> Option<&str> {
        self.metadata().resource_version.as_deref()
    }

    /// Namespace/name identity of this object.
    fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.namespace(), self.name())
    }
}

// ============================================================================
// TASK RUNS
// ============================================================================

/// Desired state of a task run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
}

/// Observed state of a task run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
}

/// A single execution of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TaskRunSpec,
    #[serde(default)]
    pub status: TaskRunStatus,
}

impl TaskRun {
    /// Create a task run with no recorded status.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            ..Default::default()
        }
    }

    /// Set the recorded start time.
    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.status.start_time = Some(start_time);
        self
    }

    /// True once the controller has recorded a start time.
    pub fn has_started(&self) -> bool {
        self.status.start_time.is_some()
    }
}

impl ResourceObject for TaskRun {
    fn kind() -> ResourceKind {
        ResourceKind::TaskRun
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// List envelope for task runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunList {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<TaskRun>,
}

impl TaskRunList {
    pub fn new(items: Vec<TaskRun>) -> Self {
        Self {
            metadata: ListMeta::default(),
            items,
        }
    }

    pub fn with_resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.metadata.resource_version = Some(resource_version.into());
        self
    }
}

// ============================================================================
// PIPELINE RUNS
// ============================================================================

/// Desired state of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_ref: Option<String>,
}

/// Observed state of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<Timestamp>,
    /// Names of the child task runs created so far.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_references: Vec<String>,
}

/// A single execution of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PipelineRunSpec,
    #[serde(default)]
    pub status: PipelineRunStatus,
}

impl PipelineRun {
    /// Create a pipeline run with no recorded status.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            ..Default::default()
        }
    }

    /// Set the recorded start time.
    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.status.start_time = Some(start_time);
        self
    }

    /// True once the controller has recorded a start time.
    pub fn has_started(&self) -> bool {
        self.status.start_time.is_some()
    }
}

impl ResourceObject for PipelineRun {
    fn kind() -> ResourceKind {
        ResourceKind::PipelineRun
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// List envelope for pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunList {
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<PipelineRun>,
}

impl PipelineRunList {
    pub fn new(items: Vec<PipelineRun>) -> Self {
        Self {
            metadata: ListMeta::default(),
            items,
        }
    }

    pub fn with_resource_version(mut self, resource_version: impl Into<String>) -> Self {
        self.metadata.resource_version = Some(resource_version.into());
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================
