//! CRUD dispatch over the closed set of workload kinds.
//!
//! Reads are served from the [`ResourceRegistry`]; writes are forwarded to a
//! [`WorkloadBackend`]. The operator holds no per-request state.

use crate::backend::WorkloadBackend;
use crate::error::{ApiError, ApiResult};
use crate::pipeline::ListResult;
use crate::query::Query;
use crate::resource::{CacheProvider, ResourceRegistry};
use crate::selector::label_selector_as_map;
use crate::workload::{Scope, Workload, WorkloadKind};
use k8s_openapi::api::core::v1::Pod;
use kube::core::Selector;
use std::sync::Arc;

/// Entry point of the access layer.
#[derive(Clone)]
pub struct Operator {
    registry: Arc<ResourceRegistry>,
    backend: Arc<dyn WorkloadBackend>,
    pods: Arc<dyn CacheProvider<Pod>>,
}

impl Operator {
    /// Create an operator over a frozen registry, a write backend and a pod
    /// cache.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        backend: Arc<dyn WorkloadBackend>,
        pods: Arc<dyn CacheProvider<Pod>>,
    ) -> Self {
        Self {
            registry,
            backend,
            pods,
        }
    }

    /// List objects of `resource`. An empty namespace lists across namespaces.
    pub fn list(&self, namespace: &str, resource: &str, query: &Query) -> ApiResult<ListResult<Workload>> {
        self.registry.list(resource, namespace, query)
    }

    /// Fetch one object from the watch cache.
    pub fn get(&self, namespace: &str, resource: &str, name: &str) -> ApiResult<Workload> {
        self.registry.get(resource, namespace, name)
    }

    /// Create `obj`, which must be of the kind named by `resource`.
    pub async fn create(&self, namespace: &str, resource: &str, obj: Workload) -> ApiResult<Workload> {
        let kind = writable_kind(namespace, resource)?;
        obj.expect_kind(kind)?;

        tracing::info!(
            resource,
            namespace,
            name = obj.meta().name.as_deref().unwrap_or_default(),
            "Creating workload"
        );
        self.backend.create(namespace, obj).await
    }

    /// Replace the object `name` with `obj`.
    ///
    /// The resource version of the cached object is copied onto `obj` so a
    /// concurrent write is detected by the backend.
    pub async fn update(
        &self,
        namespace: &str,
        resource: &str,
        name: &str,
        mut obj: Workload,
    ) -> ApiResult<Workload> {
        writable_kind(namespace, resource)?;
        let existing = self.get(namespace, resource, name)?;
        obj.expect_kind(existing.kind())?;

        let version = existing.meta().resource_version.clone();
        tracing::info!(
            resource,
            namespace,
            name,
            resource_version = version.as_deref().unwrap_or_default(),
            "Updating workload"
        );
        obj.meta_mut().resource_version = version;
        self.backend.update(namespace, name, obj).await
    }

    /// Delete the object `name`. No existence check is made.
    pub async fn delete(&self, namespace: &str, resource: &str, name: &str) -> ApiResult<()> {
        let kind = writable_kind(namespace, resource)?;
        tracing::info!(resource, namespace, name, "Deleting workload");
        self.backend.delete(namespace, kind, name).await
    }

    /// Pods in `namespace` selected by the workload `name`.
    ///
    /// Cluster-scoped workloads are looked up without a namespace; pods are
    /// still restricted to `namespace` when it is set.
    pub fn list_pods(&self, namespace: &str, resource: &str, name: &str) -> ApiResult<ListResult<Pod>> {
        let kind = known_kind(resource)?;
        let lookup_namespace = match kind.scope() {
            Scope::Cluster => "",
            Scope::Namespaced => namespace,
        };
        let workload = self.get(lookup_namespace, resource, name)?;

        let labels = match &workload {
            Workload::CloneSet(cs) => label_selector_as_map(&cs.spec.selector)?,
            Workload::SidecarSet(ss) => match &ss.spec.selector {
                Some(selector) => label_selector_as_map(selector)?,
                None => Default::default(),
            },
        };
        let selector: Selector = labels.into_iter().collect();
        let scope = (!namespace.is_empty()).then_some(namespace);

        let mut pods: Vec<Pod> = self
            .pods
            .select(scope, &selector)
            .into_iter()
            .map(|pod| Pod::clone(&pod))
            .collect();
        pods.sort_by(|a, b| {
            a.metadata
                .namespace
                .cmp(&b.metadata.namespace)
                .then_with(|| a.metadata.name.cmp(&b.metadata.name))
        });

        tracing::debug!(resource, namespace, name, %selector, matched = pods.len(), "Listed workload pods");
        let total = pods.len();
        Ok(ListResult::new(pods, total))
    }

    /// True if `resource` names a known kind.
    pub fn is_known_resource(&self, resource: &str) -> bool {
        WorkloadKind::from_resource(resource).is_some()
    }

    /// Empty object of the kind named by `resource`, or `None` if unknown.
    pub fn get_object(&self, resource: &str) -> Option<Workload> {
        WorkloadKind::from_resource(resource).map(Workload::empty)
    }

    /// Decode a request body into an object of the kind named by `resource`.
    pub fn decode_object(&self, resource: &str, body: &[u8]) -> ApiResult<Workload> {
        Workload::decode(known_kind(resource)?, body)
    }
}

fn known_kind(resource: &str) -> ApiResult<WorkloadKind> {
    WorkloadKind::from_resource(resource)
        .ok_or_else(|| ApiError::ResourceNotSupported(resource.to_string()))
}

/// Kind named by `resource`; namespaced kinds must be written within a
/// namespace.
fn writable_kind(namespace: &str, resource: &str) -> ApiResult<WorkloadKind> {
    let kind = known_kind(resource)?;
    if kind.scope() == Scope::Namespaced && namespace.is_empty() {
        return Err(ApiError::NamespaceRequired(kind.kind_name().to_string()));
    }
    Ok(kind)
}
