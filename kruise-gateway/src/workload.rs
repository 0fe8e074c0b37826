//! The closed set of workload kinds served by the gateway.
//!
//! Dispatch over kinds is a `match` on [`WorkloadKind`] or [`Workload`]; there
//! is no runtime type assertion anywhere in the access layer.

use crate::crd::{CloneSet, CloneSetSpec, SidecarSet, SidecarSetSpec};
use crate::error::{ApiError, ApiResult};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use serde::Serialize;
use std::fmt;

/// Whether objects of a kind live in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Cluster-scoped; namespaces are ignored.
    Cluster,
    /// Namespaced.
    Namespaced,
}

/// A workload kind known to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    /// `apps.kruise.io/v1alpha1` CloneSet.
    CloneSet,
    /// `apps.kruise.io/v1alpha1` SidecarSet.
    SidecarSet,
}

impl WorkloadKind {
    /// Every known kind.
    pub const ALL: [WorkloadKind; 2] = [WorkloadKind::CloneSet, WorkloadKind::SidecarSet];

    /// Look up a kind by its plural resource name (`clonesets`, `sidecarsets`).
    pub fn from_resource(resource: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.resource() == resource)
    }

    /// Plural resource name used in URLs.
    pub fn resource(self) -> &'static str {
        match self {
            WorkloadKind::CloneSet => "clonesets",
            WorkloadKind::SidecarSet => "sidecarsets",
        }
    }

    /// API group.
    pub fn group(self) -> &'static str {
        "apps.kruise.io"
    }

    /// API version.
    pub fn version(self) -> &'static str {
        "v1alpha1"
    }

    /// Scope of the kind.
    pub fn scope(self) -> Scope {
        match self {
            WorkloadKind::CloneSet => Scope::Namespaced,
            WorkloadKind::SidecarSet => Scope::Cluster,
        }
    }

    /// Kind name as it appears in an object's `kind` field.
    pub fn kind_name(self) -> &'static str {
        match self {
            WorkloadKind::CloneSet => "CloneSet",
            WorkloadKind::SidecarSet => "SidecarSet",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// A workload object of any known kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Workload {
    /// A CloneSet.
    CloneSet(CloneSet),
    /// A SidecarSet.
    SidecarSet(SidecarSet),
}

impl Workload {
    /// Empty object of the given kind, used as a decode target.
    pub fn empty(kind: WorkloadKind) -> Self {
        match kind {
            WorkloadKind::CloneSet => Workload::CloneSet(CloneSet::new("", CloneSetSpec::default())),
            WorkloadKind::SidecarSet => {
                Workload::SidecarSet(SidecarSet::new("", SidecarSetSpec::default()))
            }
        }
    }

    /// Decode a JSON body as an object of `kind`.
    ///
    /// A body whose `kind` field names another kind is rejected with
    /// [`ApiError::TypeMismatch`]; a body without `kind` is accepted.
    pub fn decode(kind: WorkloadKind, body: &[u8]) -> ApiResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if let Some(declared) = value.get("kind").and_then(|k| k.as_str()) {
            if declared != kind.kind_name() {
                return Err(ApiError::TypeMismatch {
                    expected: kind.kind_name().to_string(),
                    actual: declared.to_string(),
                });
            }
        }

        let workload = match kind {
            WorkloadKind::CloneSet => Workload::CloneSet(serde_json::from_value(value)?),
            WorkloadKind::SidecarSet => Workload::SidecarSet(serde_json::from_value(value)?),
        };
        Ok(workload)
    }

    /// Kind of this object.
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Workload::CloneSet(_) => WorkloadKind::CloneSet,
            Workload::SidecarSet(_) => WorkloadKind::SidecarSet,
        }
    }

    /// Object metadata.
    pub fn meta(&self) -> &ObjectMeta {
        match self {
            Workload::CloneSet(cs) => cs.meta(),
            Workload::SidecarSet(ss) => ss.meta(),
        }
    }

    /// Mutable object metadata.
    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Workload::CloneSet(cs) => cs.meta_mut(),
            Workload::SidecarSet(ss) => ss.meta_mut(),
        }
    }

    /// Ensure this object is of `expected` kind.
    pub fn expect_kind(&self, expected: WorkloadKind) -> ApiResult<()> {
        if self.kind() == expected {
            Ok(())
        } else {
            Err(ApiError::TypeMismatch {
                expected: expected.kind_name().to_string(),
                actual: self.kind().kind_name().to_string(),
            })
        }
    }
}

impl From<CloneSet> for Workload {
    fn from(cs: CloneSet) -> Self {
        Workload::CloneSet(cs)
    }
}

impl From<SidecarSet> for Workload {
    fn from(ss: SidecarSet) -> Self {
        Workload::SidecarSet(ss)
    }
}
