//! Label selector parsing and matching.
//!
//! Supports the set-based grammar accepted by the Kubernetes API server:
//!
//! - `key=value`, `key==value`, `key!=value`
//! - `key in (a,b)`, `key notin (a,b)`
//! - `key` (exists), `!key` (does not exist)
//!
//! Requirements are comma separated and combined with AND. An empty selector
//! matches everything. Parsing yields a [`kube::core::Selector`]; matching is
//! [`SelectorExt::matches`].

use crate::error::{ApiError, ApiResult};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::core::{Expression, Selector, SelectorExt};
use std::collections::{BTreeMap, BTreeSet};

/// Parse a selector expression.
pub fn parse(expr: &str) -> ApiResult<Selector> {
    split_requirements(expr)?
        .into_iter()
        .map(parse_expression)
        .collect()
}

/// Test possibly-absent labels; absent labels behave as an empty set.
pub fn matches_labels(selector: &Selector, labels: Option<&BTreeMap<String, String>>) -> bool {
    match labels {
        Some(labels) => selector.matches(labels),
        None => selector.matches(&BTreeMap::new()),
    }
}

/// Convert a workload's selector into an equality label map.
///
/// `matchExpressions` are only accepted when they are `In` with exactly one
/// value; anything else cannot be expressed as a label set.
pub fn label_selector_as_map(selector: &LabelSelector) -> ApiResult<BTreeMap<String, String>> {
    let mut labels = selector.match_labels.clone().unwrap_or_default();
    for expr in selector.match_expressions.iter().flatten() {
        let values = expr.values.as_deref().unwrap_or_default();
        match (expr.operator.as_str(), values) {
            ("In", [value]) => {
                labels.insert(expr.key.clone(), value.clone());
            }
            (op, _) => {
                return Err(ApiError::InvalidSelector(format!(
                    "operator {op:?} on key {:?} cannot be converted to a label set",
                    expr.key
                )));
            }
        }
    }
    Ok(labels)
}

fn split_requirements(expr: &str) -> ApiResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in expr.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ApiError::InvalidSelector(format!("unbalanced ')' in {expr:?}"))
                })?;
            }
            ',' if depth == 0 => {
                parts.push(&expr[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ApiError::InvalidSelector(format!("unbalanced '(' in {expr:?}")));
    }
    parts.push(&expr[start..]);

    Ok(parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect())
}

fn parse_expression(part: &str) -> ApiResult<Expression> {
    if let Some((key, value)) = part.split_once("!=") {
        return Ok(Expression::NotEqual(label_key(key)?, label_value(value)?));
    }
    if let Some((key, value)) = part.split_once("==").or_else(|| part.split_once('=')) {
        return Ok(Expression::Equal(label_key(key)?, label_value(value)?));
    }
    if let Some(key) = part.strip_prefix('!') {
        return Ok(Expression::DoesNotExist(label_key(key)?));
    }

    let mut words = part.splitn(2, char::is_whitespace);
    let key = label_key(words.next().unwrap_or_default())?;
    let Some(rest) = words.next().map(str::trim_start) else {
        return Ok(Expression::Exists(key));
    };

    if let Some(set) = rest.strip_prefix("notin") {
        Ok(Expression::NotIn(key, value_set(set)?))
    } else if let Some(set) = rest.strip_prefix("in") {
        Ok(Expression::In(key, value_set(set)?))
    } else {
        Err(ApiError::InvalidSelector(format!(
            "unknown operator in requirement {part:?}"
        )))
    }
}

fn value_set(raw: &str) -> ApiResult<BTreeSet<String>> {
    let inner = raw
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ApiError::InvalidSelector(format!("expected (values), got {raw:?}")))?;
    let values = inner
        .split(',')
        .map(label_value)
        .collect::<ApiResult<BTreeSet<_>>>()?;
    if values.is_empty() || values.iter().all(String::is_empty) {
        return Err(ApiError::InvalidSelector("empty value set".into()));
    }
    Ok(values)
}

fn label_key(raw: &str) -> ApiResult<String> {
    let key = raw.trim();
    let valid = !key.is_empty()
        && key.len() <= 317
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if valid {
        Ok(key.to_string())
    } else {
        Err(ApiError::InvalidSelector(format!("invalid label key {raw:?}")))
    }
}

fn label_value(raw: &str) -> ApiResult<String> {
    let value = raw.trim();
    let valid = value.len() <= 63
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(value.to_string())
    } else {
        Err(ApiError::InvalidSelector(format!("invalid label value {raw:?}")))
    }
}
