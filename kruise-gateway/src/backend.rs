//! Writes to the authoritative API server.

use crate::crd::{CloneSet, SidecarSet};
use crate::error::ApiResult;
use crate::workload::{Workload, WorkloadKind};
use async_trait::async_trait;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};

/// Create, update and delete against the authoritative store.
///
/// Implementations are trusted to enforce optimistic concurrency through
/// `metadata.resourceVersion`; conflicts surface as errors.
#[async_trait]
pub trait WorkloadBackend: Send + Sync {
    /// Create `obj` in `namespace` (ignored for cluster-scoped kinds).
    async fn create(&self, namespace: &str, obj: Workload) -> ApiResult<Workload>;

    /// Replace the object `name` with `obj`.
    async fn update(&self, namespace: &str, name: &str, obj: Workload) -> ApiResult<Workload>;

    /// Delete the object `name` of `kind`.
    async fn delete(&self, namespace: &str, kind: WorkloadKind, name: &str) -> ApiResult<()>;
}

/// [`WorkloadBackend`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeBackend {
    client: Client,
}

impl KubeBackend {
    /// Create a backend using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn clonesets(&self, namespace: &str) -> Api<CloneSet> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn sidecarsets(&self) -> Api<SidecarSet> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl WorkloadBackend for KubeBackend {
    async fn create(&self, namespace: &str, obj: Workload) -> ApiResult<Workload> {
        let params = PostParams::default();
        let created = match obj {
            Workload::CloneSet(cs) => self.clonesets(namespace).create(&params, &cs).await?.into(),
            Workload::SidecarSet(ss) => self.sidecarsets().create(&params, &ss).await?.into(),
        };
        Ok(created)
    }

    async fn update(&self, namespace: &str, name: &str, obj: Workload) -> ApiResult<Workload> {
        let params = PostParams::default();
        let replaced = match obj {
            Workload::CloneSet(cs) => self
                .clonesets(namespace)
                .replace(name, &params, &cs)
                .await?
                .into(),
            Workload::SidecarSet(ss) => self.sidecarsets().replace(name, &params, &ss).await?.into(),
        };
        Ok(replaced)
    }

    async fn delete(&self, namespace: &str, kind: WorkloadKind, name: &str) -> ApiResult<()> {
        let params = DeleteParams::default();
        match kind {
            WorkloadKind::CloneSet => {
                self.clonesets(namespace).delete(name, &params).await?;
            }
            WorkloadKind::SidecarSet => {
                self.sidecarsets().delete(name, &params).await?;
            }
        }
        Ok(())
    }
}
