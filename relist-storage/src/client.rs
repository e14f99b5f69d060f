//! Transport trait for namespaced run resources.

use async_trait::async_trait;
use relist_core::{
    GetOptions, ListOptions, PipelineRun, PipelineRunList, RelistResult, TaskRun, TaskRunList,
};

/// Namespaced list/get client for run resources.
///
/// This abstracts over the actual API client, allowing the per-kind
/// listers to work with any transport. Lists honour the resource version
/// in their options; gets always read the authoritative source.
#[async_trait]
pub trait RunClient: Send + Sync {
    /// List task runs in a namespace.
    async fn list_task_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
    ) -> RelistResult<TaskRunList>;

    /// Get one task run.
    async fn get_task_run(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> RelistResult<TaskRun>;

    /// List pipeline runs in a namespace.
    async fn list_pipeline_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
    ) -> RelistResult<PipelineRunList>;

    /// Get one pipeline run.
    async fn get_pipeline_run(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> RelistResult<PipelineRun>;
}
