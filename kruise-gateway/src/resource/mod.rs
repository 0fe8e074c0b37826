//! Typed accessors over the watch cache.
//!
//! - [`CacheProvider`]: the minimal read capability of a watch cache,
//!   implemented for reflector [`Store`]s
//! - [`Accessor`]: kind-erased `get`/`list`, stored in the [`ResourceRegistry`]
//! - [`TypedAccessor`]: the one generic implementation, parameterized by a
//!   cache and a [`ListStrategy`](crate::pipeline::ListStrategy)
//!
//! # Usage
//!
//! ```ignore
//! use kruise_gateway::resource::{ResourceRegistry, cloneset_accessor, sidecarset_accessor};
//!
//! let registry = ResourceRegistry::builder()
//!     .register(cloneset_accessor(caches.clonesets.clone()))?
//!     .register(sidecarset_accessor(caches.sidecarsets.clone()))?
//!     .build();
//! let page = registry.list("clonesets", "default", &query)?;
//! ```

mod cloneset;
mod registry;
mod sidecarset;

pub use cloneset::{CloneSetStrategy, cloneset_accessor, cloneset_strategy};
pub use registry::{RegistryBuilder, ResourceKey, ResourceRegistry};
pub use sidecarset::{SidecarSetStrategy, sidecarset_accessor, sidecarset_strategy};

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{ListResult, ListStrategy, default_list};
use crate::query::Query;
use crate::selector::matches_labels;
use crate::workload::{Scope, Workload, WorkloadKind};
use kube::Resource;
use kube::core::Selector;
use kube::runtime::reflector::{ObjectRef, Store};
use std::marker::PhantomData;
use std::sync::Arc;

/// Read access to a local mirror of cluster state.
///
/// Results may lag the API server; no freshness guarantee is assumed.
pub trait CacheProvider<K>: Send + Sync {
    /// Objects in `namespace` (all namespaces when `None`) whose labels match
    /// `selector`.
    fn select(&self, namespace: Option<&str>, selector: &Selector) -> Vec<Arc<K>>;

    /// A single object by name.
    fn lookup(&self, namespace: Option<&str>, name: &str) -> Option<Arc<K>>;
}

impl<K> CacheProvider<K> for Store<K>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    fn select(&self, namespace: Option<&str>, selector: &Selector) -> Vec<Arc<K>> {
        self.state()
            .into_iter()
            .filter(|obj| namespace.is_none_or(|ns| obj.meta().namespace.as_deref() == Some(ns)))
            .filter(|obj| matches_labels(selector, obj.meta().labels.as_ref()))
            .collect()
    }

    fn lookup(&self, namespace: Option<&str>, name: &str) -> Option<Arc<K>> {
        let key = match namespace {
            Some(ns) => ObjectRef::new(name).within(ns),
            None => ObjectRef::new(name),
        };
        self.get(&key)
    }
}

/// Kind-erased read access for one resource kind.
pub trait Accessor: Send + Sync {
    /// Kind served by this accessor.
    fn kind(&self) -> WorkloadKind;

    /// Fetch one object. Cluster-scoped kinds ignore `namespace`.
    fn get(&self, namespace: &str, name: &str) -> ApiResult<Workload>;

    /// List objects in `namespace` (all namespaces when empty).
    fn list(&self, namespace: &str, query: &Query) -> ApiResult<ListResult<Workload>>;
}

/// Accessor for objects of type `K` read through cache `C` and listed with
/// strategy `S`.
pub struct TypedAccessor<K, C, S> {
    kind: WorkloadKind,
    cache: C,
    strategy: S,
    _object: PhantomData<fn() -> K>,
}

impl<K, C, S> TypedAccessor<K, C, S> {
    /// Create an accessor for `kind`.
    pub fn new(kind: WorkloadKind, cache: C, strategy: S) -> Self {
        Self {
            kind,
            cache,
            strategy,
            _object: PhantomData,
        }
    }

    fn scoped<'a>(&self, namespace: &'a str) -> Option<&'a str> {
        match self.kind.scope() {
            Scope::Cluster => None,
            Scope::Namespaced if namespace.is_empty() => None,
            Scope::Namespaced => Some(namespace),
        }
    }
}

impl<K, C, S> Accessor for TypedAccessor<K, C, S>
where
    K: Resource + Clone + Into<Workload> + 'static,
    C: CacheProvider<K>,
    S: ListStrategy<K> + Send + Sync,
{
    fn kind(&self) -> WorkloadKind {
        self.kind
    }

    fn get(&self, namespace: &str, name: &str) -> ApiResult<Workload> {
        let namespace = self.scoped(namespace);
        self.cache
            .lookup(namespace, name)
            .map(|obj| K::clone(&obj).into())
            .ok_or_else(|| ApiError::NotFound {
                kind: self.kind.kind_name().to_string(),
                name: name.to_string(),
                namespace: namespace.unwrap_or_default().to_string(),
            })
    }

    fn list(&self, namespace: &str, query: &Query) -> ApiResult<ListResult<Workload>> {
        let namespace = self.scoped(namespace);
        let selector = query.selector()?;
        let snapshot = self.cache.select(namespace, &selector);

        tracing::debug!(
            kind = %self.kind,
            namespace = namespace.unwrap_or("*"),
            selector = %selector,
            cached = snapshot.len(),
            "Listing from watch cache"
        );

        let page = default_list(snapshot, query, &self.strategy);
        Ok(page.map(|obj| K::clone(&obj).into()))
    }
}
