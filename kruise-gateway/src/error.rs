//! Error types for the workload gateway.

use thiserror::Error;

/// Errors produced by the resource access layer and the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource name does not map to any registered accessor.
    #[error("resource is not supported: {0}")]
    ResourceNotSupported(String),

    /// The decoded object does not match the declared resource kind.
    #[error("object is not a {expected} (got {actual})")]
    TypeMismatch {
        /// Kind required by the resource name.
        expected: String,
        /// Kind actually supplied.
        actual: String,
    },

    /// Two registrations share the same resource name.
    #[error("resource {0} is registered more than once")]
    DuplicateResource(String),

    /// Object missing from the watch cache.
    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    NotFound {
        /// Resource kind.
        kind: String,
        /// Object name.
        name: String,
        /// Object namespace, empty for cluster-scoped kinds.
        namespace: String,
    },

    /// The caller may not access the object.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A namespaced kind was addressed without a namespace.
    #[error("{0} is namespaced and requires a namespace")]
    NamespaceRequired(String),

    /// Malformed listing criteria.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Malformed or unsupported label selector.
    #[error("invalid label selector: {0}")]
    InvalidSelector(String),

    /// A watch cache stopped before its initial sync.
    #[error("watch cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Request or response body could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Kubernetes API error, passed through unchanged.
    #[error(transparent)]
    Kube(#[from] kube::Error),
}

/// Result type for gateway operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// True for cache misses and API 404 responses.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound { .. } => true,
            ApiError::Kube(err) => api_code(err) == Some(404),
            _ => false,
        }
    }

    /// True for API 409 responses (stale resource version, existing name).
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Kube(err) if api_code(err) == Some(409))
    }

    /// True when the caller lacks access, locally or per the API server.
    pub fn is_forbidden(&self) -> bool {
        match self {
            ApiError::Forbidden(_) => true,
            ApiError::Kube(err) => api_code(err) == Some(403),
            _ => false,
        }
    }
}

fn api_code(err: &kube::Error) -> Option<u16> {
    match err {
        kube::Error::Api(response) => Some(response.code),
        _ => None,
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
