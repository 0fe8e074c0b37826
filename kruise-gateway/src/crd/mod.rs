//! Custom Resource Definitions served by the gateway.
//!
//! - [`CloneSet`]: namespaced workload of identical pods
//! - [`SidecarSet`]: cluster-scoped sidecar injection policy

mod cloneset;
mod sidecarset;

pub use cloneset::{
    CloneSet, CloneSetScaleStrategy, CloneSetSpec, CloneSetStatus, CloneSetUpdateStrategy,
};
pub use sidecarset::{SidecarSet, SidecarSetSpec, SidecarSetStatus, SidecarSetUpdateStrategy};
