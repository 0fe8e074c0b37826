//! Resource name to accessor registry.

use super::Accessor;
use crate::error::{ApiError, ApiResult};
use crate::pipeline::ListResult;
use crate::query::Query;
use crate::workload::{Scope, Workload, WorkloadKind};
use std::collections::HashMap;
use std::fmt;

/// Structured identity of a registered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    /// API group.
    pub group: &'static str,
    /// API version.
    pub version: &'static str,
    /// Plural resource name.
    pub resource: &'static str,
    /// Scope of the resource.
    pub scope: Scope,
}

impl From<WorkloadKind> for ResourceKey {
    fn from(kind: WorkloadKind) -> Self {
        Self {
            group: kind.group(),
            version: kind.version(),
            resource: kind.resource(),
            scope: kind.scope(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{}", self.resource, self.group, self.version)
    }
}

/// Builder collecting accessors before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<(ResourceKey, Box<dyn Accessor>)>,
}

impl RegistryBuilder {
    /// Register an accessor under its kind's key.
    ///
    /// Fails with [`ApiError::DuplicateResource`] when the resource name is
    /// already taken, whatever the group or scope of the earlier entry.
    pub fn register<A>(mut self, accessor: A) -> ApiResult<Self>
    where
        A: Accessor + 'static,
    {
        let key = ResourceKey::from(accessor.kind());
        if self.entries.iter().any(|(k, _)| k.resource == key.resource) {
            return Err(ApiError::DuplicateResource(key.to_string()));
        }
        tracing::debug!(resource = %key, scope = ?key.scope, "Registered accessor");
        self.entries.push((key, Box::new(accessor)));
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> ResourceRegistry {
        let mut cluster = HashMap::new();
        let mut namespaced = HashMap::new();
        for (key, accessor) in self.entries {
            let table = match key.scope {
                Scope::Cluster => &mut cluster,
                Scope::Namespaced => &mut namespaced,
            };
            table.insert(key.resource, (key, accessor));
        }
        ResourceRegistry { cluster, namespaced }
    }
}

type Table = HashMap<&'static str, (ResourceKey, Box<dyn Accessor>)>;

/// Read-only lookup from resource name to accessor, split by scope.
pub struct ResourceRegistry {
    cluster: Table,
    namespaced: Table,
}

impl ResourceRegistry {
    /// Start a new registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Find the accessor for `resource`.
    ///
    /// With `cluster_scope` the cluster table is searched first; the
    /// namespaced table is always searched. Cluster-scoped resources are not
    /// reachable without `cluster_scope`.
    pub fn resolve(&self, cluster_scope: bool, resource: &str) -> Option<&dyn Accessor> {
        let cluster = cluster_scope.then(|| self.cluster.get(resource)).flatten();
        cluster
            .or_else(|| self.namespaced.get(resource))
            .map(|(_, accessor)| accessor.as_ref())
    }

    /// Keys of every registered resource.
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.cluster.values().chain(self.namespaced.values()).map(|(key, _)| key)
    }

    /// Fetch one object.
    pub fn get(&self, resource: &str, namespace: &str, name: &str) -> ApiResult<Workload> {
        self.accessor(resource, namespace)?.get(namespace, name)
    }

    /// List objects; an empty namespace lists across namespaces.
    pub fn list(
        &self,
        resource: &str,
        namespace: &str,
        query: &Query,
    ) -> ApiResult<ListResult<Workload>> {
        self.accessor(resource, namespace)?.list(namespace, query)
    }

    fn accessor(&self, resource: &str, namespace: &str) -> ApiResult<&dyn Accessor> {
        self.resolve(namespace.is_empty(), resource)
            .ok_or_else(|| ApiError::ResourceNotSupported(resource.to_string()))
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("cluster", &self.cluster.keys().collect::<Vec<_>>())
            .field("namespaced", &self.namespaced.keys().collect::<Vec<_>>())
            .finish()
    }
}
