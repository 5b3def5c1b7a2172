use std::path::{Path, PathBuf};

use anyhow::Context;
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OperatorSettings {
    #[serde(default)]
    pub feature_gates: FeatureGates,
}

/// Operator-wide switches that change how tenancy modes shape the gateway.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureGates {
    /// Serve the gateway HTTP endpoint over TLS.
    #[serde(default)]
    pub http_encryption: bool,
    /// Scrape metrics endpoints over TLS.
    #[serde(default)]
    pub service_monitor_tls_endpoints: bool,
    #[serde(default)]
    pub openshift: OpenShiftFeatureGates,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftFeatureGates {
    /// Let the platform service-CA operator issue serving certificates.
    #[serde(default)]
    pub serving_certs_service: bool,
}

/// Per-stack gate values. A gate left out of the stack file takes the persisted value,
/// an explicit `false` stays `false`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GateOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_encryption: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_monitor_tls_endpoints: Option<bool>,
    #[serde(default)]
    pub openshift: OpenShiftGateOverrides,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftGateOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_certs_service: Option<bool>,
}

impl GateOverrides {
    pub fn resolve(&self, base: &FeatureGates) -> FeatureGates {
        FeatureGates {
            http_encryption: self.http_encryption.unwrap_or(base.http_encryption),
            service_monitor_tls_endpoints: self
                .service_monitor_tls_endpoints
                .unwrap_or(base.service_monitor_tls_endpoints),
            openshift: OpenShiftFeatureGates {
                serving_certs_service: self
                    .openshift
                    .serving_certs_service
                    .unwrap_or(base.openshift.serving_certs_service),
            },
        }
    }
}

pub fn load_settings() -> anyhow::Result<OperatorSettings> {
    let path = settings_path()?;
    if !path.exists() {
        return Ok(OperatorSettings::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("read settings {}", path.display()))?;
    serde_yaml_bw::from_str(&contents)
        .with_context(|| format!("parse settings {}", path.display()))
}

pub fn save_settings(settings: &OperatorSettings) -> anyhow::Result<()> {
    let path = settings_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create settings dir {}", parent.display()))?;
    }
    let contents = serde_yaml_bw::to_string(settings).context("encode settings")?;
    std::fs::write(&path, contents)
        .with_context(|| format!("write settings {}", path.display()))
}

/// `$LOGSTACK_OPERATOR_CONFIG_DIR/settings.yaml`, else the platform config dir.
pub fn settings_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("LOGSTACK_OPERATOR_CONFIG_DIR") {
        return Ok(Path::new(&value).join("settings.yaml"));
    }
    ProjectDirs::from("", "logstack", "operator")
        .map(|dirs| dirs.config_dir().join("settings.yaml"))
        .context("no home directory to place the operator config dir in")
}

impl FeatureGates {
    /// Serving certificates are only mounted when both the gateway speaks TLS and the
    /// platform issues the certificate.
    pub fn platform_serving_certs(&self) -> bool {
        self.http_encryption && self.openshift.serving_certs_service
    }
}
