//! Generic filter, sort and paginate pipeline.
//!
//! [`default_list`] works on a snapshot of cached objects and knows nothing
//! about their concrete kind; kind-specific behaviour comes from a
//! [`ListStrategy`]. The default strategy methods compare and filter on
//! standard object metadata.

use crate::query::{Field, Filter, Query};
use crate::status::WorkloadStatus;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One page of a listing plus the number of objects that passed filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    /// Objects of the requested page, in sort order.
    pub items: Vec<T>,
    /// Count after filtering, before pagination.
    pub total_items: usize,
}

impl<T> ListResult<T> {
    /// Build a result; `items` may be shorter than `total_items`.
    pub fn new(items: Vec<T>, total_items: usize) -> Self {
        Self { items, total_items }
    }

    /// Result with no items.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Convert every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResult<U> {
        ListResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Kind-specific ordering and filtering.
///
/// Comparators are direction-agnostic: they return the ascending order and the
/// pipeline reverses the result for descending queries.
pub trait ListStrategy<K: Resource> {
    /// Order two objects by `field`.
    fn compare(&self, left: &K, right: &K, field: Field) -> Ordering {
        compare_object_meta(left.meta(), right.meta(), field)
    }

    /// Test one filter criterion.
    fn filter(&self, obj: &K, filter: Filter<'_>) -> bool {
        filter_object_meta(obj.meta(), filter)
    }
}

/// Strategy for kinds whose `status` is derived from the object; every other
/// field uses the metadata defaults.
///
/// Status ordering ties are broken by name.
pub struct StatusStrategy<K> {
    status: fn(&K) -> WorkloadStatus,
}

impl<K> StatusStrategy<K> {
    /// Strategy deriving status with `status`.
    pub fn new(status: fn(&K) -> WorkloadStatus) -> Self {
        Self { status }
    }
}

impl<K> Clone for StatusStrategy<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for StatusStrategy<K> {}

impl<K> std::fmt::Debug for StatusStrategy<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStrategy").finish_non_exhaustive()
    }
}

impl<K: Resource> ListStrategy<K> for StatusStrategy<K> {
    fn compare(&self, left: &K, right: &K, field: Field) -> Ordering {
        match field {
            Field::Status => (self.status)(left)
                .cmp(&(self.status)(right))
                .then_with(|| left.meta().name.cmp(&right.meta().name)),
            _ => compare_object_meta(left.meta(), right.meta(), field),
        }
    }

    fn filter(&self, obj: &K, filter: Filter<'_>) -> bool {
        match filter.field {
            Field::Status => (self.status)(obj).as_str() == filter.value,
            _ => filter_object_meta(obj.meta(), filter),
        }
    }
}

/// Filter, sort and paginate a snapshot of objects.
pub fn default_list<K, S>(objects: Vec<Arc<K>>, query: &Query, strategy: &S) -> ListResult<Arc<K>>
where
    K: Resource,
    S: ListStrategy<K> + ?Sized,
{
    let mut retained: Vec<Arc<K>> = objects
        .into_iter()
        .filter(|obj| query.filters().all(|f| strategy.filter(obj, f)))
        .collect();

    let field = query.sort_field();
    retained.sort_by(|a, b| strategy.compare(a, b, field));
    if !query.is_ascending() {
        retained.reverse();
    }

    let total = retained.len();
    let range = query.page_range(total);
    let items = retained.drain(range).collect();

    ListResult::new(items, total)
}

/// Compare two objects on standard metadata.
///
/// Fields without a natural metadata ordering compare by creation timestamp.
/// Ties are broken by name so the order is total.
pub fn compare_object_meta(left: &ObjectMeta, right: &ObjectMeta, field: Field) -> Ordering {
    let by_name = || left.name.cmp(&right.name);
    let by_created = || {
        let l = left.creation_timestamp.as_ref().map(|t| t.0);
        let r = right.creation_timestamp.as_ref().map(|t| t.0);
        l.cmp(&r)
    };

    match field {
        Field::Name | Field::Names => by_name(),
        Field::Namespace => left.namespace.cmp(&right.namespace).then_with(by_name),
        _ => by_created().then_with(by_name),
    }
}

/// Test a filter against standard metadata. Unsupported fields never match.
pub fn filter_object_meta(meta: &ObjectMeta, filter: Filter<'_>) -> bool {
    let name = meta.name.as_deref().unwrap_or_default();
    match filter.field {
        Field::Name => name.contains(filter.value),
        Field::Names => filter.value.split(',').any(|n| n.trim() == name),
        Field::Uid => meta.uid.as_deref() == Some(filter.value),
        Field::Namespace => meta.namespace.as_deref().unwrap_or_default() == filter.value,
        Field::OwnerReference => owner_refs(meta).any(|o| o.uid == filter.value),
        Field::OwnerKind => owner_refs(meta).any(|o| o.kind == filter.value),
        Field::Label => map_match(meta.labels.as_ref(), filter.value),
        Field::Annotation => map_match(meta.annotations.as_ref(), filter.value),
        Field::CreationTimestamp | Field::Status => false,
    }
}

fn owner_refs(
    meta: &ObjectMeta,
) -> impl Iterator<Item = &k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference> {
    meta.owner_references.iter().flatten()
}

/// Match `key`, `key=value` or `key!=value` against a label or annotation map.
fn map_match(map: Option<&BTreeMap<String, String>>, expr: &str) -> bool {
    let Some(map) = map else {
        return false;
    };
    match expr.split_once('=') {
        Some((key, value)) => match key.strip_suffix('!') {
            Some(key) => map.get(key).is_some_and(|v| v != value),
            None => map.get(key).is_some_and(|v| v == value),
        },
        None => map.contains_key(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use k8s_openapi::api::core::v1::ConfigMap;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{OwnerReference, Time};

    struct MetaOnly;

    impl ListStrategy<ConfigMap> for MetaOnly {}

    fn object(name: &str, created_min: u32, labels: &[(&str, &str)]) -> Arc<ConfigMap> {
        Arc::new(ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                creation_timestamp: Some(Time(
                    Utc.with_ymd_and_hms(2024, 1, 1, 0, created_min, 0).unwrap(),
                )),
                labels: Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn names(result: &ListResult<Arc<ConfigMap>>) -> Vec<String> {
        result
            .items
            .iter()
            .map(|o| o.metadata.name.clone().unwrap_or_default())
            .collect()
    }

    fn fixture() -> Vec<Arc<ConfigMap>> {
        vec![
            object("b", 2, &[("app", "web")]),
            object("a", 1, &[("app", "db")]),
            object("d", 4, &[("app", "web")]),
            object("c", 3, &[]),
            object("e", 5, &[("app", "web")]),
        ]
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = default_list(Vec::<Arc<ConfigMap>>::new(), &Query::new().limit(10), &MetaOnly);
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 0);
        assert_eq!(
            serde_json::to_value(&result.map(|o| o.metadata.name.clone())).unwrap(),
            serde_json::json!({"items": [], "totalItems": 0})
        );
    }

    #[test]
    fn default_order_is_newest_first() {
        let result = default_list(fixture(), &Query::new(), &MetaOnly);
        assert_eq!(names(&result), vec!["e", "d", "c", "b", "a"]);
        assert_eq!(result.total_items, 5);
    }

    #[test]
    fn ascending_and_descending_are_exact_reversals() {
        let asc = default_list(fixture(), &Query::new().ascending(true), &MetaOnly);
        let desc = default_list(fixture(), &Query::new().ascending(false), &MetaOnly);
        let mut reversed = names(&desc);
        reversed.reverse();
        assert_eq!(names(&asc), reversed);
    }

    #[test]
    fn pagination_respects_limit_and_keeps_total() {
        for limit in 1..=6 {
            for page in 1..=7 {
                let query = Query::new().page(page).limit(limit);
                let result = default_list(fixture(), &query, &MetaOnly);
                assert!(result.items.len() <= limit);
                assert_eq!(result.total_items, 5);
            }
        }

        let second = default_list(
            fixture(),
            &Query::new().page(2).limit(2).sort_by(Field::Name).ascending(true),
            &MetaOnly,
        );
        assert_eq!(names(&second), vec!["c", "d"]);
    }

    #[test]
    fn page_beyond_data_is_empty_with_total() {
        let result = default_list(fixture(), &Query::new().page(9).limit(2), &MetaOnly);
        assert!(result.items.is_empty());
        assert_eq!(result.total_items, 5);
    }

    #[test]
    fn filters_are_conjunctive() {
        let query = Query::new()
            .filter(Field::Label, "app=web")
            .filter(Field::Name, "d")
            .ascending(true);
        let result = default_list(fixture(), &query, &MetaOnly);
        assert_eq!(names(&result), vec!["d"]);
        assert_eq!(result.total_items, 1);
    }

    #[test]
    fn metadata_filters() {
        let mut meta = object("web-1", 0, &[("app", "web")]).metadata.clone();
        meta.uid = Some("uid-1".into());
        meta.annotations = Some([("team".to_string(), "core".to_string())].into());
        meta.owner_references = Some(vec![OwnerReference {
            kind: "CloneSet".into(),
            uid: "owner-uid".into(),
            ..Default::default()
        }]);

        let check = |field: Field, value: &str| filter_object_meta(&meta, Filter { field, value });
        assert!(check(Field::Name, "web"));
        assert!(check(Field::Names, "api, web-1"));
        assert!(!check(Field::Names, "web"));
        assert!(check(Field::Uid, "uid-1"));
        assert!(check(Field::Namespace, "default"));
        assert!(check(Field::OwnerKind, "CloneSet"));
        assert!(check(Field::OwnerReference, "owner-uid"));
        assert!(check(Field::Label, "app"));
        assert!(check(Field::Label, "app!=db"));
        assert!(!check(Field::Label, "app!=web"));
        assert!(check(Field::Annotation, "team=core"));
        assert!(!check(Field::Status, "running"));
    }
}
