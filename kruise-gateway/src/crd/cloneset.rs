//! CloneSet Custom Resource Definition.
//!
//! Models the `apps.kruise.io/v1alpha1` CloneSet fields the gateway reads.
//! Every other field is kept in `extra` so a decode and re-encode is lossless.

use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CloneSet is the Schema for the clonesets API.
///
/// A CloneSet manages a set of identical pods with in-place update support.
/// It is namespaced.
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "apps.kruise.io",
    version = "v1alpha1",
    kind = "CloneSet",
    plural = "clonesets",
    shortname = "clone",
    namespaced,
    status = "CloneSetStatus",
    printcolumn = r#"{"name":"Desired", "type":"integer", "jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Updated", "type":"integer", "jsonPath":".status.updatedReplicas"}"#,
    printcolumn = r#"{"name":"Ready", "type":"integer", "jsonPath":".status.readyReplicas"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CloneSetSpec {
    /// Desired number of pods. Defaults to 1 on the API server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Label query over pods that should match the replica count.
    pub selector: LabelSelector,

    /// Pod template used to create new pods.
    pub template: PodTemplateSpec,

    /// Scale strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_strategy: Option<CloneSetScaleStrategy>,

    /// Update strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<CloneSetUpdateStrategy>,

    /// Number of old revisions to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Seconds a new pod must be ready before it counts as available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Scale strategy for a CloneSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneSetScaleStrategy {
    /// Pod names to delete when scaling down.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pods_to_delete: Vec<String>,

    /// Maximum number of pods unavailable while scaling, as a count or percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Update strategy for a CloneSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneSetUpdateStrategy {
    /// ReCreate, InPlaceIfPossible or InPlaceOnly.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,

    /// Number of pods to keep at the old revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<i32>,

    /// Pause the rollout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Observed state of a CloneSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloneSetStatus {
    /// Most recent generation observed by the controller.
    #[serde(default)]
    pub observed_generation: i64,

    /// Number of pods selected by the selector.
    #[serde(default)]
    pub replicas: i32,

    /// Number of pods with a Ready condition.
    #[serde(default)]
    pub ready_replicas: i32,

    /// Number of available pods.
    #[serde(default)]
    pub available_replicas: i32,

    /// Number of pods at the update revision.
    #[serde(default)]
    pub updated_replicas: i32,

    /// Number of ready pods at the update revision.
    #[serde(default)]
    pub updated_ready_replicas: i32,

    /// Revision the controller is rolling pods to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_revision: Option<String>,

    /// Revision of the current pods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<String>,

    /// Serialized label selector, used by the scale subresource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn cloneset_is_namespaced_kruise_kind() {
        assert_eq!(CloneSet::kind(&()), "CloneSet");
        assert_eq!(CloneSet::group(&()), "apps.kruise.io");
        assert_eq!(CloneSet::plural(&()), "clonesets");
    }

    #[test]
    fn cloneset_decodes_api_payload() {
        let json = r#"{
            "apiVersion": "apps.kruise.io/v1alpha1",
            "kind": "CloneSet",
            "metadata": {"name": "web", "namespace": "shop", "resourceVersion": "7"},
            "spec": {
                "replicas": 3,
                "selector": {"matchLabels": {"app": "web"}},
                "template": {"metadata": {"labels": {"app": "web"}}},
                "updateStrategy": {"type": "InPlaceIfPossible", "partition": 1}
            },
            "status": {"replicas": 3, "readyReplicas": 2, "observedGeneration": 4}
        }"#;

        let cs: CloneSet = serde_json::from_str(json).expect("CloneSet should decode");
        assert_eq!(cs.spec.replicas, Some(3));
        assert_eq!(
            cs.spec.update_strategy.and_then(|s| s.update_type).as_deref(),
            Some("InPlaceIfPossible")
        );
        let status = cs.status.expect("status present");
        assert_eq!(status.ready_replicas, 2);
        assert_eq!(status.updated_replicas, 0);
    }
}
