use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};

use crate::openshift;
use crate::settings::{FeatureGates, GateOverrides};

/// How the gateway authenticates and authorizes tenant access.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TenancyMode {
    /// Tenants and their credentials are listed in the stack spec.
    Static,
    /// Tenants are authorized by an external OPA endpoint.
    Dynamic,
    /// Integrated mode: tenants authenticate through the OpenShift platform, which
    /// also provides routing and serving certificates.
    OpenshiftLogging,
}

impl fmt::Display for TenancyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TenancyMode::Static => "static",
            TenancyMode::Dynamic => "dynamic",
            TenancyMode::OpenshiftLogging => "openshift-logging",
        };
        f.write_str(label)
    }
}

/// Everything the manifest builders need to know about one stack.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub gateway_base_domain: String,
    #[serde(default)]
    pub config_sha1: String,
    /// Gate values written in the stack file.
    #[serde(default, rename = "gates")]
    pub gate_overrides: GateOverrides,
    /// Effective gates, resolved from `gate_overrides` when the stack is loaded.
    #[serde(skip)]
    pub gates: FeatureGates,
    #[serde(default)]
    pub stack: StackSpec,
    #[serde(default)]
    pub tenants: TenantsOptions,
    #[serde(default)]
    pub openshift: openshift::Options,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StackSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenants: Option<TenantsSpec>,
    #[serde(default)]
    pub gateway: GatewaySpec,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct TenantsSpec {
    pub mode: TenancyMode,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    #[serde(default = "default_gateway_replicas")]
    pub replicas: i32,
    #[serde(default = "default_gateway_image")]
    pub image: String,
}

impl Default for GatewaySpec {
    fn default() -> Self {
        Self {
            replicas: default_gateway_replicas(),
            image: default_gateway_image(),
        }
    }
}

fn default_gateway_replicas() -> i32 {
    1
}

fn default_gateway_image() -> String {
    "quay.io/observatorium/api:latest".to_string()
}

/// Per-tenant data read from the tenants secret.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TenantsOptions {
    #[serde(default)]
    pub configs: BTreeMap<String, TenantConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TenantConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openshift: Option<OpenShiftTenantConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftTenantConfig {
    #[serde(default)]
    pub cookie_secret: String,
}

impl Options {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read stack file {}", path.display()))?;
        let mut options: Options = serde_yaml_bw::from_str(&contents)
            .with_context(|| format!("parse stack file {}", path.display()))?;
        options.validate()?;
        options.gates = options.gate_overrides.resolve(&FeatureGates::default());
        Ok(options)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !resource_name::is_dns1123_label(&self.name) {
            return Err(anyhow!(
                "stack name '{}' is not a valid DNS-1123 label (try '{}')",
                self.name,
                resource_name::canonical_resource_name(&self.name)
            ));
        }
        if !resource_name::is_dns1123_label(&self.namespace) {
            return Err(anyhow!(
                "namespace '{}' is not a valid DNS-1123 label",
                self.namespace
            ));
        }
        if !self.gateway_base_domain.is_empty()
            && !resource_name::is_dns1123_subdomain(&self.gateway_base_domain)
        {
            return Err(anyhow!(
                "gateway base domain '{}' is not a valid DNS-1123 subdomain",
                self.gateway_base_domain
            ));
        }
        Ok(())
    }

    /// The configured tenancy mode, `None` when the stack has no tenants section.
    pub fn mode(&self) -> Option<TenancyMode> {
        self.stack.tenants.as_ref().map(|tenants| tenants.mode)
    }

    /// Tenant data handed to the OpenShift provider. Tenants without OpenShift
    /// settings get an empty cookie secret.
    pub fn tenant_data(&self) -> BTreeMap<String, openshift::TenantData> {
        self.tenants
            .configs
            .iter()
            .map(|(name, tenant)| {
                let cookie_secret = tenant
                    .openshift
                    .as_ref()
                    .map(|config| config.cookie_secret.clone())
                    .unwrap_or_default();
                (name.clone(), openshift::TenantData { cookie_secret })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_in_kebab_case() {
        let spec: TenantsSpec = serde_yaml_bw::from_str("mode: openshift-logging\n").unwrap();
        assert_eq!(spec.mode, TenancyMode::OpenshiftLogging);
        assert_eq!(spec.mode.to_string(), "openshift-logging");
    }

    #[test]
    fn rejects_unknown_mode() {
        let result: Result<TenantsSpec, _> = serde_yaml_bw::from_str("mode: openshift-network\n");
        assert!(result.is_err());
    }

    #[test]
    fn mode_is_none_without_tenants_section() {
        let options = Options::default();
        assert_eq!(options.mode(), None);
    }

    #[test]
    fn tenant_data_projects_cookie_secrets() {
        let mut options = Options::default();
        options.tenants.configs.insert(
            "team-a".to_string(),
            TenantConfig {
                openshift: Some(OpenShiftTenantConfig {
                    cookie_secret: "s1".to_string(),
                }),
            },
        );
        options
            .tenants
            .configs
            .insert("team-b".to_string(), TenantConfig::default());

        let data = options.tenant_data();
        assert_eq!(data["team-a"].cookie_secret, "s1");
        assert_eq!(data["team-b"].cookie_secret, "");
    }

    #[test]
    fn validate_rejects_malformed_names() {
        let options = Options {
            name: "My_Stack".to_string(),
            namespace: "logs".to_string(),
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("my-stack"));
    }
}
