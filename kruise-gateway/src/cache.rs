//! Reflector-backed watch caches for workloads and pods.

use crate::crd::{CloneSet, SidecarSet};
use crate::error::{ApiError, ApiResult};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::WatchStreamExt;
use kube::runtime::reflector::{self, Store};
use kube::runtime::watcher::{Config, watcher};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{info, warn};

/// Local, eventually consistent mirrors of CloneSets, SidecarSets and Pods.
#[derive(Clone)]
pub struct WatchCaches {
    /// CloneSets in every namespace.
    pub clonesets: Store<CloneSet>,
    /// Cluster-scoped SidecarSets.
    pub sidecarsets: Store<SidecarSet>,
    /// Pods in every namespace.
    pub pods: Store<Pod>,
}

impl WatchCaches {
    /// Start one watcher per kind on the current runtime.
    ///
    /// The returned stores are empty until the initial list completes; see
    /// [`WatchCaches::wait_until_ready`].
    pub fn start(client: Client) -> Self {
        Self {
            clonesets: spawn_reflector(Api::all(client.clone())),
            sidecarsets: spawn_reflector(Api::all(client.clone())),
            pods: spawn_reflector(Api::all(client)),
        }
    }

    /// Wait until every store has received its initial list.
    pub async fn wait_until_ready(&self) -> ApiResult<()> {
        let (clonesets, sidecarsets, pods) = tokio::join!(
            self.clonesets.wait_until_ready(),
            self.sidecarsets.wait_until_ready(),
            self.pods.wait_until_ready(),
        );
        clonesets
            .and(sidecarsets)
            .and(pods)
            .map_err(|e| ApiError::CacheUnavailable(e.to_string()))?;

        info!(
            clonesets = self.clonesets.state().len(),
            sidecarsets = self.sidecarsets.state().len(),
            pods = self.pods.state().len(),
            "Watch caches synced"
        );
        Ok(())
    }
}

fn spawn_reflector<K>(api: Api<K>) -> Store<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let kind = K::kind(&()).to_string();
    let (reader, writer) = reflector::store();
    let mut stream = reflector::reflector(writer, watcher(api, Config::default()).default_backoff())
        .applied_objects()
        .boxed();

    tokio::spawn(async move {
        info!(kind = %kind, "Watch started");
        while let Some(event) = stream.next().await {
            if let Err(e) = event {
                warn!(kind = %kind, error = %e, "Watch error");
            }
        }
        warn!(kind = %kind, "Watch stream ended");
    });

    reader
}
