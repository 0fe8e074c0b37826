//! SidecarSet accessor: status derived from matched and ready pods.

use super::{CacheProvider, TypedAccessor};
use crate::crd::SidecarSet;
use crate::pipeline::StatusStrategy;
use crate::status::sidecarset_status;
use crate::workload::WorkloadKind;

/// Strategy for SidecarSets.
pub type SidecarSetStrategy = StatusStrategy<SidecarSet>;

/// Orders and filters SidecarSets, deriving `status` from their counters.
pub fn sidecarset_strategy() -> SidecarSetStrategy {
    StatusStrategy::new(|obj: &SidecarSet| sidecarset_status(obj.status.as_ref()))
}

/// Accessor serving `sidecarsets` from `cache`.
pub fn sidecarset_accessor<C>(cache: C) -> TypedAccessor<SidecarSet, C, SidecarSetStrategy>
where
    C: CacheProvider<SidecarSet>,
{
    TypedAccessor::new(WorkloadKind::SidecarSet, cache, sidecarset_strategy())
}
