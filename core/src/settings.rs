//! Client settings loaded from TOML or the environment.
//!
//! # Design
//! Every field is optional so settings from several sources can be layered
//! with `merge`; `ApiClientBuilder::apply_settings` copies only the fields
//! that are set.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

pub const ENV_PREFIX: &str = "API_CLIENT_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSettings {
    pub root_url: Option<String>,
    pub service_path: Option<String>,
    pub application_name: Option<String>,
    pub suppress_pattern_checks: Option<bool>,
    pub override_all_methods: Option<bool>,
}

impl ClientSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, ClientError> {
        toml::from_str(input).map_err(|e| ClientError::Settings(e.to_string()))
    }

    /// Read `API_CLIENT_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read `API_CLIENT_*` variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));
        Ok(Self {
            root_url: var("ROOT_URL"),
            service_path: var("SERVICE_PATH"),
            application_name: var("APPLICATION_NAME"),
            suppress_pattern_checks: var("SUPPRESS_PATTERN_CHECKS")
                .map(|v| parse_bool("SUPPRESS_PATTERN_CHECKS", &v))
                .transpose()?,
            override_all_methods: var("OVERRIDE_ALL_METHODS")
                .map(|v| parse_bool("OVERRIDE_ALL_METHODS", &v))
                .transpose()?,
        })
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ClientSettings) -> Self {
        Self {
            root_url: other.root_url.or(self.root_url),
            service_path: other.service_path.or(self.service_path),
            application_name: other.application_name.or(self.application_name),
            suppress_pattern_checks: other.suppress_pattern_checks.or(self.suppress_pattern_checks),
            override_all_methods: other.override_all_methods.or(self.override_all_methods),
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ClientError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ClientError::Settings(format!(
            "{ENV_PREFIX}{name} must be a boolean, got {other:?}"
        ))),
    }
}
