//! Kruise workload gateway
//!
//! A read/write access layer for OpenKruise workloads. Reads are served from
//! a local watch cache through a registry of typed accessors and a generic
//! filter, sort and paginate pipeline; writes go to the API server.
//!
//! # Workload kinds
//!
//! - **CloneSet** (`apps.kruise.io/v1alpha1`, namespaced)
//! - **SidecarSet** (`apps.kruise.io/v1alpha1`, cluster-scoped)
//!
//! # Layers
//!
//! - [`query`] and [`selector`]: listing criteria
//! - [`pipeline`]: [`default_list`](pipeline::default_list) and the
//!   [`ListStrategy`](pipeline::ListStrategy) trait
//! - [`resource`]: typed accessors and the [`ResourceRegistry`]
//! - [`operator`]: CRUD dispatch by resource name
//! - [`server`]: HTTP routes under `/kapis/v1alpha1`
//!
//! # Example
//!
//! ```text
//! GET /kapis/v1alpha1/namespaces/shop/clonesets?status=running&sortBy=name&ascending=true&limit=10
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cache;
pub mod config;
pub mod crd;
pub mod error;
pub mod operator;
pub mod pipeline;
pub mod query;
pub mod resource;
pub mod selector;
pub mod server;
pub mod status;
pub mod workload;

pub use crd::{CloneSet, CloneSetSpec, SidecarSet, SidecarSetSpec};
pub use error::{ApiError, ApiResult};
pub use operator::Operator;
pub use resource::ResourceRegistry;
pub use workload::{Workload, WorkloadKind};
