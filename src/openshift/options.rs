use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_TENANTS, OPA_DEFAULT_PORT, OPA_PACKAGE, TenantData};

/// Provider options for the `openshift-logging` mode.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default)]
    pub build_opts: BuildOptions,
    #[serde(default)]
    pub authentication: Vec<AuthenticationSpec>,
    #[serde(default)]
    pub authorization: AuthorizationSpec,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    #[serde(default)]
    pub lokistack_name: String,
    #[serde(default)]
    pub lokistack_namespace: String,
    #[serde(default)]
    pub gateway_name: String,
    #[serde(default)]
    pub gateway_svc_name: String,
    #[serde(default)]
    pub gateway_svc_target_port: String,
    #[serde(default)]
    pub ca_bundle_name: String,
    #[serde(default)]
    pub route_host: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSpec {
    pub tenant_name: String,
    pub tenant_id: String,
    pub service_account: String,
    pub redirect_url: String,
    #[serde(default)]
    pub cookie_secret: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationSpec {
    #[serde(default)]
    pub opa_url: String,
}

/// Identity and naming inputs the defaults are derived from.
#[derive(Clone, Debug)]
pub struct NamingInputs<'a> {
    pub stack_name: &'a str,
    pub stack_namespace: &'a str,
    pub gateway_name: &'a str,
    pub base_domain: &'a str,
    pub gateway_svc_name: &'a str,
    pub gateway_svc_port_name: &'a str,
    pub ca_bundle_name: &'a str,
    pub labels: BTreeMap<String, String>,
    pub tenants: BTreeMap<String, TenantData>,
}

/// Compute the provider defaults. Pure: the same inputs always give the same options.
pub fn new_options(inputs: NamingInputs<'_>) -> Options {
    let route_host = if inputs.base_domain.is_empty() {
        String::new()
    } else {
        format!(
            "{}-{}.apps.{}",
            inputs.gateway_name, inputs.stack_namespace, inputs.base_domain
        )
    };

    let mut tenant_names: Vec<String> = DEFAULT_TENANTS.iter().map(|t| t.to_string()).collect();
    for name in inputs.tenants.keys() {
        if !tenant_names.contains(name) {
            tenant_names.push(name.clone());
        }
    }

    let authentication = tenant_names
        .into_iter()
        .map(|tenant| {
            let redirect_url = if route_host.is_empty() {
                String::new()
            } else {
                format!("https://{route_host}/openshift/{tenant}/callback")
            };
            let cookie_secret = inputs
                .tenants
                .get(&tenant)
                .map(|data| data.cookie_secret.clone())
                .unwrap_or_default();
            AuthenticationSpec {
                tenant_id: tenant.clone(),
                tenant_name: tenant,
                service_account: inputs.gateway_name.to_string(),
                redirect_url,
                cookie_secret,
            }
        })
        .collect();

    Options {
        build_opts: BuildOptions {
            lokistack_name: inputs.stack_name.to_string(),
            lokistack_namespace: inputs.stack_namespace.to_string(),
            gateway_name: inputs.gateway_name.to_string(),
            gateway_svc_name: inputs.gateway_svc_name.to_string(),
            gateway_svc_target_port: inputs.gateway_svc_port_name.to_string(),
            ca_bundle_name: inputs.ca_bundle_name.to_string(),
            route_host,
            labels: inputs.labels,
        },
        authentication,
        authorization: AuthorizationSpec {
            opa_url: format!("http://localhost:{OPA_DEFAULT_PORT}/v1/data/{OPA_PACKAGE}/allow"),
        },
    }
}
