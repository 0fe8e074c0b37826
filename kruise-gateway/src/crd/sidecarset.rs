//! SidecarSet Custom Resource Definition.
//!
//! A SidecarSet injects sidecar containers into every pod matched by its
//! selector. It is cluster-scoped. Fields the gateway does not model are kept
//! in `extra`.

use k8s_openapi::api::core::v1::{Container, Volume};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// SidecarSet is the Schema for the sidecarsets API.
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "apps.kruise.io",
    version = "v1alpha1",
    kind = "SidecarSet",
    plural = "sidecarsets",
    status = "SidecarSetStatus",
    printcolumn = r#"{"name":"Matched", "type":"integer", "jsonPath":".status.matchedPods"}"#,
    printcolumn = r#"{"name":"Updated", "type":"integer", "jsonPath":".status.updatedPods"}"#,
    printcolumn = r#"{"name":"Ready", "type":"integer", "jsonPath":".status.readyPods"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct SidecarSetSpec {
    /// Label query over pods that should be injected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,

    /// Restrict injection to a single namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Restrict injection to namespaces matching this selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    /// Init containers to inject.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,

    /// Sidecar containers to inject.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<Container>,

    /// Volumes the sidecars need.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,

    /// How already-injected pods are upgraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<SidecarSetUpdateStrategy>,

    /// Number of old revisions to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_history_limit: Option<i32>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Update strategy for a SidecarSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SidecarSetUpdateStrategy {
    /// NotUpdate or RollingUpdate.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub update_type: Option<String>,

    /// Pause the upgrade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    /// Number of pods to keep on the old sidecar revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<IntOrString>,

    /// Maximum number of pods upgraded at once, as a count or percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Observed state of a SidecarSet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SidecarSetStatus {
    /// Most recent generation observed by the controller.
    #[serde(default)]
    pub observed_generation: i64,

    /// Number of pods matched by the selector.
    #[serde(default)]
    pub matched_pods: i32,

    /// Number of matched pods running the latest sidecar revision.
    #[serde(default)]
    pub updated_pods: i32,

    /// Number of matched pods that are ready.
    #[serde(default)]
    pub ready_pods: i32,

    /// Number of updated pods that are ready.
    #[serde(default)]
    pub updated_ready_pods: i32,

    /// Hash of the latest sidecar revision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_revision: Option<String>,

    /// Fields not modeled above, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
