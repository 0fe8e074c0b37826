//! Path and query-string parsing.

use hyper::Method;

/// Prefix of every workload route.
pub const API_PREFIX: &str = "/kapis/v1alpha1";

/// A matched request route.
///
/// Cluster-scoped routes carry an empty namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Liveness probe.
    Healthz,
    /// Readiness probe.
    Readyz,
    /// Pods selected by a workload, named in the query string.
    Pods,
    /// List workloads.
    List {
        /// Namespace, empty for all namespaces.
        namespace: String,
        /// Plural resource name.
        resource: String,
    },
    /// Fetch one workload.
    Get {
        /// Namespace, empty for cluster-scoped kinds.
        namespace: String,
        /// Plural resource name.
        resource: String,
        /// Object name.
        name: String,
    },
    /// Create a workload from the request body.
    Create {
        /// Namespace, empty for cluster-scoped kinds.
        namespace: String,
        /// Plural resource name.
        resource: String,
    },
    /// Replace a workload with the request body.
    Update {
        /// Namespace, empty for cluster-scoped kinds.
        namespace: String,
        /// Plural resource name.
        resource: String,
        /// Object name.
        name: String,
    },
    /// Delete a workload.
    Delete {
        /// Namespace, empty for cluster-scoped kinds.
        namespace: String,
        /// Plural resource name.
        resource: String,
        /// Object name.
        name: String,
    },
}

impl Route {
    /// Match a method and path. Returns `None` for unknown routes.
    pub fn parse(method: &Method, path: &str) -> Option<Self> {
        match (method, path) {
            (&Method::GET, "/healthz") => return Some(Route::Healthz),
            (&Method::GET, "/readyz") => return Some(Route::Readyz),
            _ => {}
        }

        let rest = path.strip_prefix(API_PREFIX)?.strip_prefix('/')?;
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        let route = match (method, segments.as_slice()) {
            (&Method::GET, ["pods"]) => Route::Pods,
            (&Method::GET, ["namespaces", ns, resource]) => Route::List {
                namespace: ns.to_string(),
                resource: resource.to_string(),
            },
            (&Method::POST, ["namespaces", ns, resource]) => Route::Create {
                namespace: ns.to_string(),
                resource: resource.to_string(),
            },
            (&Method::GET, ["namespaces", ns, resource, name]) => Route::Get {
                namespace: ns.to_string(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            (&Method::PUT, ["namespaces", ns, resource, name]) => Route::Update {
                namespace: ns.to_string(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            (&Method::DELETE, ["namespaces", ns, resource, name]) => Route::Delete {
                namespace: ns.to_string(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            (&Method::GET, [resource]) => Route::List {
                namespace: String::new(),
                resource: resource.to_string(),
            },
            (&Method::POST, [resource]) => Route::Create {
                namespace: String::new(),
                resource: resource.to_string(),
            },
            (&Method::GET, [resource, name]) => Route::Get {
                namespace: String::new(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            (&Method::PUT, [resource, name]) => Route::Update {
                namespace: String::new(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            (&Method::DELETE, [resource, name]) => Route::Delete {
                namespace: String::new(),
                resource: resource.to_string(),
                name: name.to_string(),
            },
            _ => return None,
        };
        Some(route)
    }
}

/// Decode a query string into `(key, value)` pairs, in order.
///
/// `+` decodes to a space and `%XX` to the byte it encodes; malformed escapes
/// are kept verbatim.
pub fn query_pairs(query: Option<&str>) -> Vec<(String, String)> {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
