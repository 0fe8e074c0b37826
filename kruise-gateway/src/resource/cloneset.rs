//! CloneSet accessor: status-aware ordering and filtering.

use super::{CacheProvider, TypedAccessor};
use crate::crd::CloneSet;
use crate::pipeline::StatusStrategy;
use crate::status::cloneset_status;
use crate::workload::WorkloadKind;

/// Strategy for CloneSets.
pub type CloneSetStrategy = StatusStrategy<CloneSet>;

/// Orders and filters CloneSets, deriving `status` from their counters.
pub fn cloneset_strategy() -> CloneSetStrategy {
    StatusStrategy::new(|obj: &CloneSet| cloneset_status(obj.status.as_ref()))
}

/// Accessor serving `clonesets` from `cache`.
pub fn cloneset_accessor<C>(cache: C) -> TypedAccessor<CloneSet, C, CloneSetStrategy>
where
    C: CacheProvider<CloneSet>,
{
    TypedAccessor::new(WorkloadKind::CloneSet, cache, cloneset_strategy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{CloneSetSpec, CloneSetStatus};
    use crate::pipeline::default_list;
    use crate::query::{Field, Query};
    use std::sync::Arc;

    fn cloneset(name: &str, replicas: i32, ready: i32) -> Arc<CloneSet> {
        let mut cs = CloneSet::new(name, CloneSetSpec::default());
        cs.metadata.namespace = Some("shop".into());
        cs.status = Some(CloneSetStatus {
            replicas,
            ready_replicas: ready,
            ..Default::default()
        });
        Arc::new(cs)
    }

    fn fixture() -> Vec<Arc<CloneSet>> {
        vec![
            cloneset("api", 3, 3),
            cloneset("batch", 0, 0),
            cloneset("web", 3, 1),
            cloneset("cache", 2, 2),
        ]
    }

    #[test]
    fn status_filter_keeps_only_matching_objects() {
        let query = Query::new().filter(Field::Status, "running");
        let result = default_list(fixture(), &query, &cloneset_strategy());
        let mut names: Vec<_> = result
            .items
            .iter()
            .filter_map(|cs| cs.metadata.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["api", "cache"]);
        assert_eq!(result.total_items, 2);
    }

    #[test]
    fn sorts_by_status_then_name() {
        let query = Query::new().sort_by(Field::Status).ascending(true);
        let result = default_list(fixture(), &query, &cloneset_strategy());
        let names: Vec<_> = result
            .items
            .iter()
            .filter_map(|cs| cs.metadata.name.clone())
            .collect();
        assert_eq!(names, vec!["batch", "web", "api", "cache"]);
    }

    #[test]
    fn other_fields_use_metadata() {
        let query = Query::new().filter(Field::Name, "ca");
        let result = default_list(fixture(), &query, &cloneset_strategy());
        assert_eq!(result.total_items, 1);
        assert_eq!(result.items[0].metadata.name.as_deref(), Some("cache"));
    }
}
