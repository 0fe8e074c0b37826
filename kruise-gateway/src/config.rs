//! Gateway configuration from environment variables.

use crate::error::{ApiError, ApiResult};
use hyper::header::HeaderName;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Listen port variable.
pub const ENV_PORT: &str = "KRUISE_GATEWAY_PORT";
/// Listen address variable.
pub const ENV_BIND: &str = "KRUISE_GATEWAY_BIND";
/// Header carrying the requesting user.
pub const ENV_OWNER_HEADER: &str = "KRUISE_GATEWAY_OWNER_HEADER";
/// Label recording the owner of a SidecarSet.
pub const ENV_OWNER_LABEL: &str = "KRUISE_GATEWAY_OWNER_LABEL";

/// Runtime settings of the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address.
    pub bind: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Request header identifying the user (lower case).
    pub owner_header: String,
    /// Label key stamped on SidecarSets created through the gateway.
    pub owner_label: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            owner_header: "x-kruise-user".to_string(),
            owner_label: "kruise-gateway.io/owner".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    ///
    /// Reads `KRUISE_GATEWAY_PORT`, `KRUISE_GATEWAY_BIND`,
    /// `KRUISE_GATEWAY_OWNER_HEADER` and `KRUISE_GATEWAY_OWNER_LABEL`; unset
    /// variables keep their defaults.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidConfig(format!("{ENV_PORT}={port:?} is not a port")))?;
        }
        if let Some(bind) = lookup(ENV_BIND) {
            config.bind = bind
                .trim()
                .parse()
                .map_err(|_| ApiError::InvalidConfig(format!("{ENV_BIND}={bind:?} is not an IP address")))?;
        }
        if let Some(header) = lookup(ENV_OWNER_HEADER) {
            let name = HeaderName::from_bytes(header.trim().as_bytes()).map_err(|_| {
                ApiError::InvalidConfig(format!("{ENV_OWNER_HEADER}={header:?} is not a header name"))
            })?;
            config.owner_header = name.as_str().to_string();
        }
        if let Some(label) = lookup(ENV_OWNER_LABEL) {
            let label = label.trim();
            if !is_label_key(label) {
                return Err(ApiError::InvalidConfig(format!(
                    "{ENV_OWNER_LABEL}={label:?} is not a label key"
                )));
            }
            config.owner_label = label.to_string();
        }

        Ok(config)
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

fn is_label_key(key: &str) -> bool {
    let (prefix, name) = match key.rsplit_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };
    let name_ok = !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    let prefix_ok = prefix.is_none_or(|p| {
        !p.is_empty()
            && p.len() <= 253
            && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.'))
    });
    name_ok && prefix_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> ApiResult<GatewayConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (ENV_PORT, "9090"),
            (ENV_BIND, "127.0.0.1"),
            (ENV_OWNER_HEADER, "X-Remote-User"),
            (ENV_OWNER_LABEL, "example.com/user"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(config.owner_header, "x-remote-user");
        assert_eq!(config.owner_label, "example.com/user");
    }

    #[test]
    fn rejects_invalid_values() {
        for vars in [
            [(ENV_PORT, "http")],
            [(ENV_PORT, "70000")],
            [(ENV_BIND, "localhost")],
            [(ENV_OWNER_HEADER, "bad header")],
            [(ENV_OWNER_LABEL, "-owner")],
        ] {
            assert!(
                matches!(load(&vars), Err(ApiError::InvalidConfig(_))),
                "{vars:?} should be rejected"
            );
        }
    }
}
