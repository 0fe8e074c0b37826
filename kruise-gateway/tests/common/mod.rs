//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::core::ErrorResponse;
use kube::runtime::reflector::store::Writer;
use kube::runtime::reflector::{Store, store};
use kube::runtime::watcher::Event;
use kruise_gateway::backend::WorkloadBackend;
use kruise_gateway::crd::{CloneSet, CloneSetSpec, CloneSetStatus, SidecarSet, SidecarSetSpec, SidecarSetStatus};
use kruise_gateway::error::{ApiError, ApiResult};
use kruise_gateway::operator::Operator;
use kruise_gateway::resource::{ResourceRegistry, cloneset_accessor, sidecarset_accessor};
use kruise_gateway::workload::{Workload, WorkloadKind};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A write forwarded to the backend.
#[derive(Debug, Clone)]
pub enum Call {
    Create { namespace: String, obj: Workload },
    Update { namespace: String, name: String, obj: Workload },
    Delete { namespace: String, kind: WorkloadKind, name: String },
}

/// Backend that records every call and optionally fails with an API status.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    fail_with: Option<u16>,
}

impl RecordingBackend {
    pub fn failing(code: u16) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(code),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(code) => Err(ApiError::Kube(kube::Error::Api(ErrorResponse {
                status: "Failure".into(),
                message: format!("backend returned {code}"),
                reason: "Test".into(),
                code,
            }))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkloadBackend for RecordingBackend {
    async fn create(&self, namespace: &str, obj: Workload) -> ApiResult<Workload> {
        self.record(Call::Create {
            namespace: namespace.to_string(),
            obj: obj.clone(),
        })?;
        Ok(obj)
    }

    async fn update(&self, namespace: &str, name: &str, obj: Workload) -> ApiResult<Workload> {
        self.record(Call::Update {
            namespace: namespace.to_string(),
            name: name.to_string(),
            obj: obj.clone(),
        })?;
        Ok(obj)
    }

    async fn delete(&self, namespace: &str, kind: WorkloadKind, name: &str) -> ApiResult<()> {
        self.record(Call::Delete {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        })
    }
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// CloneSet selecting `app=<app>` with the given replica counters.
pub fn cloneset(namespace: &str, name: &str, app: &str, replicas: i32, ready: i32) -> CloneSet {
    let mut cs = CloneSet::new(
        name,
        CloneSetSpec {
            replicas: Some(replicas),
            selector: LabelSelector {
                match_labels: Some(labels(&[("app", app)])),
                match_expressions: None,
            },
            ..Default::default()
        },
    );
    cs.metadata.namespace = Some(namespace.to_string());
    cs.metadata.resource_version = Some("5".to_string());
    cs.status = Some(CloneSetStatus {
        replicas,
        ready_replicas: ready,
        ..Default::default()
    });
    cs
}

/// SidecarSet owned by `owner`, selecting `app=<app>`.
pub fn sidecarset(name: &str, owner: Option<&str>, app: &str) -> SidecarSet {
    let mut ss = SidecarSet::new(
        name,
        SidecarSetSpec {
            selector: Some(LabelSelector {
                match_labels: Some(labels(&[("app", app)])),
                match_expressions: None,
            }),
            ..Default::default()
        },
    );
    ss.metadata.labels = owner.map(|o| labels(&[(OWNER_LABEL, o)]));
    ss.metadata.resource_version = Some("11".to_string());
    ss.status = Some(SidecarSetStatus {
        matched_pods: 2,
        ready_pods: 2,
        ..Default::default()
    });
    ss
}

/// Pod labelled `app=<app>`.
pub fn pod(namespace: &str, name: &str, app: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels(&[("app", app)])),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Default owner label key.
pub const OWNER_LABEL: &str = "kruise-gateway.io/owner";

/// In-memory stores and the operator built on them.
pub struct Fixture {
    pub operator: Operator,
    pub backend: Arc<RecordingBackend>,
    pub clonesets: Writer<CloneSet>,
    pub sidecarsets: Writer<SidecarSet>,
    pub pods: Writer<Pod>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_backend(RecordingBackend::default())
    }

    pub fn with_backend(backend: RecordingBackend) -> Self {
        let (cs_reader, clonesets): (Store<CloneSet>, _) = store();
        let (ss_reader, sidecarsets): (Store<SidecarSet>, _) = store();
        let (pod_reader, pods): (Store<Pod>, _) = store();

        let registry = ResourceRegistry::builder()
            .register(cloneset_accessor(cs_reader))
            .and_then(|b| b.register(sidecarset_accessor(ss_reader)))
            .unwrap()
            .build();
        let backend = Arc::new(backend);
        let operator = Operator::new(Arc::new(registry), backend.clone(), Arc::new(pod_reader));

        Self {
            operator,
            backend,
            clonesets,
            sidecarsets,
            pods,
        }
    }

    pub fn add_cloneset(&mut self, cs: CloneSet) {
        self.clonesets.apply_watcher_event(&Event::Apply(cs));
    }

    pub fn add_sidecarset(&mut self, ss: SidecarSet) {
        self.sidecarsets.apply_watcher_event(&Event::Apply(ss));
    }

    pub fn add_pod(&mut self, pod: Pod) {
        self.pods.apply_watcher_event(&Event::Apply(pod));
    }
}
