//! Lifecycle labels derived from workload replica counters.

use crate::crd::{CloneSetStatus, SidecarSetStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derived lifecycle state of a workload. Never stored on the object.
///
/// Ordering is `Stopped < Updating < Running` and is used when sorting by
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadStatus {
    /// No pods desired and none ready.
    Stopped,
    /// Ready count differs from desired count.
    Updating,
    /// Every desired pod is ready.
    Running,
}

impl WorkloadStatus {
    /// Derive the state from desired and ready counters.
    pub fn derive(desired: i32, ready: i32) -> Self {
        if desired == 0 && ready == 0 {
            WorkloadStatus::Stopped
        } else if ready == desired {
            WorkloadStatus::Running
        } else {
            WorkloadStatus::Updating
        }
    }

    /// Label used in filters and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadStatus::Stopped => "stopped",
            WorkloadStatus::Updating => "updating",
            WorkloadStatus::Running => "running",
        }
    }
}

impl fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkloadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopped" => Ok(WorkloadStatus::Stopped),
            "updating" => Ok(WorkloadStatus::Updating),
            "running" => Ok(WorkloadStatus::Running),
            other => Err(format!("unknown workload status {other:?}")),
        }
    }
}

/// CloneSet state from `status.replicas` and `status.readyReplicas`.
pub fn cloneset_status(status: Option<&CloneSetStatus>) -> WorkloadStatus {
    status.map_or(WorkloadStatus::Stopped, |s| {
        WorkloadStatus::derive(s.replicas, s.ready_replicas)
    })
}

/// SidecarSet state from `status.matchedPods` and `status.readyPods`.
pub fn sidecarset_status(status: Option<&SidecarSetStatus>) -> WorkloadStatus {
    status.map_or(WorkloadStatus::Stopped, |s| {
        WorkloadStatus::derive(s.matched_pods, s.ready_pods)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_tri_state() {
        assert_eq!(WorkloadStatus::derive(0, 0), WorkloadStatus::Stopped);
        assert_eq!(WorkloadStatus::derive(3, 3), WorkloadStatus::Running);
        assert_eq!(WorkloadStatus::derive(3, 1), WorkloadStatus::Updating);
        assert_eq!(WorkloadStatus::derive(0, 2), WorkloadStatus::Updating);
    }

    #[test]
    fn missing_status_is_stopped() {
        assert_eq!(cloneset_status(None), WorkloadStatus::Stopped);
        assert_eq!(sidecarset_status(None), WorkloadStatus::Stopped);
    }

    #[test]
    fn sidecarset_uses_pod_counters() {
        let status = SidecarSetStatus {
            matched_pods: 4,
            ready_pods: 4,
            updated_pods: 1,
            ..Default::default()
        };
        assert_eq!(sidecarset_status(Some(&status)), WorkloadStatus::Running);
    }

    #[test]
    fn labels_parse_back() {
        for status in [
            WorkloadStatus::Stopped,
            WorkloadStatus::Updating,
            WorkloadStatus::Running,
        ] {
            assert_eq!(status.as_str().parse::<WorkloadStatus>(), Ok(status));
        }
        assert!("paused".parse::<WorkloadStatus>().is_err());
    }
}
