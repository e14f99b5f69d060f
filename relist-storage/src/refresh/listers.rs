//! Per-kind [`RefreshLister`] adapters over a [`RunClient`].
//!
//! Status is "empty" while no start time has been recorded.

use std::sync::Arc;

use async_trait::async_trait;
use relist_core::{
    GetOptions, ListOptions, PipelineRun, PipelineRunList, RelistResult, TaskRun, TaskRunList,
};

use super::traits::RefreshLister;
use crate::client::RunClient;

/// Task run lister.
pub struct TaskRunLister<C: RunClient> {
    client: Arc<C>,
}

impl<C: RunClient> TaskRunLister<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: RunClient> RefreshLister for TaskRunLister<C> {
    type Item = TaskRun;
    type List = TaskRunList;

    async fn list(&self, namespace: &str, options: &ListOptions) -> RelistResult<TaskRunList> {
        self.client.list_task_runs(namespace, options).await
    }

    async fn get(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> RelistResult<TaskRun> {
        self.client.get_task_run(namespace, name, options).await
    }

    fn items<'a>(&self, list: Option<&'a TaskRunList>) -> &'a [TaskRun] {
        list.map(|l| l.items.as_slice()).unwrap_or_default()
    }

    fn status_is_empty(&self, item: Option<&TaskRun>) -> bool {
        item.map_or(true, |run| !run.has_started())
    }
}

/// Pipeline run lister.
pub struct PipelineRunLister<C: RunClient> {
    client: Arc<C>,
}

impl<C: RunClient> PipelineRunLister<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: RunClient> RefreshLister for PipelineRunLister<C> {
    type Item = PipelineRun;
    type List = PipelineRunList;

    async fn list(&self, namespace: &str, options: &ListOptions) -> RelistResult<PipelineRunList> {
        self.client.list_pipeline_runs(namespace, options).await
    }

    async fn get(
        &self,
        namespace: &str,
        name: &str,
        options: &GetOptions,
    ) -> RelistResult<PipelineRun> {
        self.client.get_pipeline_run(namespace, name, options).await
    }

    fn items<'a>(&self, list: Option<&'a PipelineRunList>) -> &'a [PipelineRun] {
        list.map(|l| l.items.as_slice()).unwrap_or_default()
    }

    fn status_is_empty(&self, item: Option<&PipelineRun>) -> bool {
        item.map_or(true, |run| !run.has_started())
    }
}
