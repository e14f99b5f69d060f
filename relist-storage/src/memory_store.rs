//! Two-layer in-memory run store.
//!
//! Each resource kind keeps an authoritative layer and a fast-path layer
//! that can lag behind it. Lists carrying a resource version are answered
//! by the fast path; lists with the token cleared are answered by the
//! authoritative layer and resynchronise the fast path for that namespace.
//! Gets always read the authoritative layer.
//!
//! Selectors and limits in [`ListOptions`] are ignored.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use relist_core::{
    new_uid, ClientError, GetOptions, ListMeta, ListOptions, ObjectRef, PipelineRun,
    PipelineRunList, RelistError, RelistResult, ResourceObject, TaskRun, TaskRunList,
};
use tokio::sync::{Mutex, RwLock};

use crate::client::RunClient;

/// Which layers a write lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteTarget {
    /// Authoritative layer and fast path.
    #[default]
    Both,
    /// Authoritative layer only; the fast path keeps its old copy.
    AuthoritativeOnly,
    /// Fast path only; the authoritative layer is untouched.
    CacheOnly,
}

#[derive(Debug)]
struct Layers<T> {
    authoritative: BTreeMap<ObjectRef, T>,
    cached: BTreeMap<ObjectRef, T>,
    /// Store revision the fast path last observed.
    cached_revision: u64,
}

impl<T> Default for Layers<T> {
    fn default() -> Self {
        Self {
            authoritative: BTreeMap::new(),
            cached: BTreeMap::new(),
            cached_revision: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    next_list: Option<RelistError>,
    failing_gets: HashSet<ObjectRef>,
}

/// In-memory [`RunClient`] with a lagging cache layer.
///
/// Uses tokio::sync locks for safe async access.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    revision: AtomicU64,
    task_runs: RwLock<Layers<TaskRun>>,
    pipeline_runs: RwLock<Layers<PipelineRun>>,
    faults: Mutex<Faults>,
    list_calls: AtomicU64,
    bypassed_list_calls: AtomicU64,
    get_calls: AtomicU64,
}

impl InMemoryRunStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current store revision.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Write a task run to both layers.
    pub async fn put_task_run(&self, run: TaskRun) -> TaskRun {
        self.write_task_run(run, WriteTarget::Both).await
    }

    /// Write a task run to the chosen layers.
    ///
    /// Returns the stored copy, stamped with a new resource version.
    pub async fn write_task_run(&self, run: TaskRun, target: WriteTarget) -> TaskRun {
        self.write(&self.task_runs, run, target).await
    }

    /// Write a pipeline run to both layers.
    pub async fn put_pipeline_run(&self, run: PipelineRun) -> PipelineRun {
        self.write_pipeline_run(run, WriteTarget::Both).await
    }

    /// Write a pipeline run to the chosen layers.
    pub async fn write_pipeline_run(&self, run: PipelineRun, target: WriteTarget) -> PipelineRun {
        self.write(&self.pipeline_runs, run, target).await
    }

    /// Make the next list call fail with `err`.
    pub async fn fail_next_list(&self, err: RelistError) {
        self.faults.lock().await.next_list = Some(err);
    }

    /// Make every get for this object fail as unavailable.
    pub async fn fail_gets_for(&self, namespace: &str, name: &str) {
        self.faults
            .lock()
            .await
            .failing_gets
            .insert(ObjectRef::new(namespace, name));
    }

    /// Remove all injected failures.
    pub async fn clear_faults(&self) {
        *self.faults.lock().await = Faults::default();
    }

    /// Total list calls served or failed.
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// List calls that bypassed the fast path.
    pub fn bypassed_list_calls(&self) -> u64 {
        self.bypassed_list_calls.load(Ordering::SeqCst)
    }

    /// Total get calls served or failed.
    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn write<T: ResourceObject>(
        &self,
        layers: &RwLock<Layers<T>>,
        mut item: T,
        target: WriteTarget,
    ) -> T {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let meta = item.metadata_mut();
        meta.resource_version = Some(revision.to_string());
        meta.uid.get_or_insert_with(new_uid);
        meta.creation_timestamp.get_or_insert_with(Utc::now);

        let key = item.object_ref();
        let mut layers = layers.write().await;
        if target != WriteTarget::CacheOnly {
            layers.authoritative.insert(key.clone(), item.clone());
        }
        if target != WriteTarget::AuthoritativeOnly {
            layers.cached.insert(key, item.clone());
            layers.cached_revision = revision;
        }
        item
    }

    async fn read_list<T: ResourceObject>(
        &self,
        layers: &RwLock<Layers<T>>,
        namespace: &str,
        options: &ListOptions,
    ) -> RelistResult<(Vec<T>, ListMeta)> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults.lock().await.next_list.take() {
            return Err(err);
        }

        if !options.is_cache_bypassed() {
            let layers = layers.read().await;
            let items = in_namespace(&layers.cached, namespace);
            return Ok((items, list_meta(layers.cached_revision)));
        }

        self.bypassed_list_calls.fetch_add(1, Ordering::SeqCst);
        let revision = self.revision();
        let mut layers = layers.write().await;
        let items = in_namespace(&layers.authoritative, namespace);

        layers.cached.retain(|key, _| key.namespace != namespace);
        for item in &items {
            layers.cached.insert(item.object_ref(), item.clone());
        }
        layers.cached_revision = layers.cached_revision.max(revision);

        Ok((items, list_meta(revision)))
    }

    async fn read_one<T: ResourceObject>(
        &self,
        layers: &RwLock<Layers<T>>,
        namespace: &str,
        name: &str,
    ) -> RelistResult<T> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let key = ObjectRef::new(namespace, name);
        if self.faults.lock().await.failing_gets.contains(&key) {
            return Err(ClientError::Unavailable {
                reason: format!("injected get failure for {}", key),
            }
            .into());
        }

        layers
            .read()
            .await
            .authoritative
            .get(&key)
            .cloned()
            .ok_or_else(|| {
                ClientError::NotFound {
                    kind: T::kind(),
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                }
                .into()
            })
    }
}

fn in_namespace<T: Clone>(layer: &BTreeMap<ObjectRef, T>, namespace: &str) -> Vec<T> {
    layer
        .iter()
        .filter(|(key, _)| key.namespace == namespace)
        .map(|(_, item)| item.clone())
        .collect()
}

fn list_meta(revision: u64) -> ListMeta {
    ListMeta {
        resource_version: Some(revision.to_string()),
    }
}

#[async_trait]
impl RunClient for InMemoryRunStore {
    async fn list_task_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
    ) -> RelistResult<TaskRunList> {
        let (items, metadata) = self.read_list(&self.task_runs, namespace, options).await?;
        Ok(TaskRunList { metadata, items })
    }

    async fn get_task_run(
        &self,
        namespace: &str,
        name: &str,
        _options: &GetOptions,
    ) -> RelistResult<TaskRun> {
        self.read_one(&self.task_runs, namespace, name).await
    }

    async fn list_pipeline_runs(
        &self,
        namespace: &str,
        options: &ListOptions,
    ) -> RelistResult<PipelineRunList> {
        let (items, metadata) = self
            .read_list(&self.pipeline_runs, namespace, options)
            .await?;
        Ok(PipelineRunList { metadata, items })
    }

    async fn get_pipeline_run(
        &self,
        namespace: &str,
        name: &str,
        _options: &GetOptions,
    ) -> RelistResult<PipelineRun> {
        self.read_one(&self.pipeline_runs, namespace, name).await
    }
}
