//! Request handlers and error to status mapping.

use crate::config::GatewayConfig;
use crate::error::{ApiError, ApiResult};
use crate::operator::Operator;
use crate::query::Query;
use crate::workload::{Workload, WorkloadKind};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

/// Per-request inputs shared by every handler.
pub struct RequestContext<'a> {
    /// Operator serving the request.
    pub operator: &'a Operator,
    /// Gateway settings.
    pub config: &'a GatewayConfig,
    /// Value of the owner header, empty when absent.
    pub user: &'a str,
    /// Decoded query-string pairs.
    pub params: &'a [(String, String)],
}

impl RequestContext<'_> {
    fn query(&self) -> ApiResult<Query> {
        Query::from_params(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    fn param(&self, key: &str) -> &str {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    fn owner_requirement(&self) -> String {
        format!("{}={}", self.config.owner_label, self.user)
    }

    fn is_sidecarsets(resource: &str) -> bool {
        WorkloadKind::from_resource(resource) == Some(WorkloadKind::SidecarSet)
    }
}

/// List workloads. SidecarSets are narrowed to those owned by the caller.
pub fn list(ctx: &RequestContext<'_>, namespace: &str, resource: &str) -> Response<Full<Bytes>> {
    let result = ctx.query().and_then(|mut query| {
        if RequestContext::is_sidecarsets(resource) {
            query = query.with_label_requirement(&ctx.owner_requirement());
        }
        ctx.operator.list(namespace, resource, &query)
    });
    respond(result)
}

/// Fetch one workload. A SidecarSet not owned by the caller is forbidden.
pub fn get(ctx: &RequestContext<'_>, namespace: &str, resource: &str, name: &str) -> Response<Full<Bytes>> {
    if !ctx.operator.is_known_resource(resource) {
        return unknown_resource(resource);
    }
    let result = ctx
        .operator
        .get(namespace, resource, name)
        .and_then(|obj| check_owner(ctx, obj));
    respond(result)
}

/// Create a workload from a JSON body.
pub async fn create(
    ctx: &RequestContext<'_>,
    namespace: &str,
    resource: &str,
    body: &[u8],
) -> Response<Full<Bytes>> {
    if !ctx.operator.is_known_resource(resource) {
        return unknown_resource(resource);
    }
    let mut obj = match ctx.operator.decode_object(resource, body) {
        Ok(obj) => obj,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    if let Workload::SidecarSet(ss) = &mut obj {
        ss.metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(ctx.config.owner_label.clone(), ctx.user.to_string());
    }
    respond(ctx.operator.create(namespace, resource, obj).await)
}

/// Replace a workload with a JSON body.
pub async fn update(
    ctx: &RequestContext<'_>,
    namespace: &str,
    resource: &str,
    name: &str,
    body: &[u8],
) -> Response<Full<Bytes>> {
    if !ctx.operator.is_known_resource(resource) {
        return unknown_resource(resource);
    }
    let obj = match ctx.operator.decode_object(resource, body) {
        Ok(obj) => obj,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    respond(ctx.operator.update(namespace, resource, name, obj).await)
}

/// Delete a workload.
pub async fn delete(
    ctx: &RequestContext<'_>,
    namespace: &str,
    resource: &str,
    name: &str,
) -> Response<Full<Bytes>> {
    if !ctx.operator.is_known_resource(resource) {
        return unknown_resource(resource);
    }
    let result = ctx
        .operator
        .delete(namespace, resource, name)
        .await
        .map(|()| Message {
            message: "success".to_string(),
        });
    respond(result)
}

/// Pods of the workload named by the `resource`, `namespace` and `name`
/// query parameters.
pub fn pods(ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    let resource = ctx.param("resource");
    let name = ctx.param("name");
    if resource.is_empty() || name.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "query parameters resource and name are required",
        );
    }
    respond(ctx.operator.list_pods(ctx.param("namespace"), resource, name))
}

fn check_owner(ctx: &RequestContext<'_>, obj: Workload) -> ApiResult<Workload> {
    let Workload::SidecarSet(ss) = &obj else {
        return Ok(obj);
    };
    let owned = !ctx.user.is_empty()
        && ss
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(&ctx.config.owner_label))
            .is_some_and(|owner| owner == ctx.user);
    if owned {
        return Ok(obj);
    }

    let name = ss.metadata.name.clone().unwrap_or_default();
    warn!(user = ctx.user, sidecarset = %name, "Caller does not own SidecarSet");
    Err(ApiError::Forbidden(format!(
        "user {:?} can not get sidecarset {name}",
        ctx.user
    )))
}

/// HTTP status for an error.
pub fn status_for(err: &ApiError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() {
        StatusCode::CONFLICT
    } else if err.is_forbidden() {
        StatusCode::FORBIDDEN
    } else if matches!(err, ApiError::CacheUnavailable(_)) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Serialize)]
struct Message {
    message: String,
}

fn respond<T: Serialize>(result: ApiResult<T>) -> Response<Full<Bytes>> {
    match result {
        Ok(value) => json_response(StatusCode::OK, &value),
        Err(e) => {
            let status = status_for(&e);
            debug!(status = status.as_u16(), error = %e, "Request failed");
            error_response(status, &e.to_string())
        }
    }
}

fn unknown_resource(resource: &str) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("unknown resource type {resource}"),
    )
}

/// JSON `{"message": ...}` body with `status`.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(
        status,
        &Message {
            message: message.to_string(),
        },
    )
}

/// Serialize `value` as the JSON body of a response.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => build_response(status, "application/json", body),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            build_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "text/plain",
                "Failed to serialize response",
            )
        }
    }
}

/// Build a response, falling back to a bare 500 if the builder fails.
pub fn build_response(
    status: StatusCode,
    content_type: &str,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, content_type)
        .body(Full::new(body.into()))
        .unwrap_or_else(|e| {
            error!(error = %e, "Failed to build response");
            let mut response = Response::new(Full::new(Bytes::from_static(b"Internal Error")));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}
