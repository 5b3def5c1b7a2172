//! OpenShift integration for the `openshift-logging` tenancy mode.

mod build;
mod configure;
mod options;

use serde::{Deserialize, Serialize};

pub use build::{build_gateway_objects, build_lokistack_objects};
pub use configure::{
    ConfigureError, GatewayTls, configure_gateway_deployment, configure_gateway_service,
    configure_gateway_service_monitor,
};
pub use options::{
    AuthenticationSpec, AuthorizationSpec, BuildOptions, NamingInputs, Options, new_options,
};

pub const DEFAULT_TENANTS: &[&str] = &["application", "infrastructure", "audit"];

pub const OPA_CONTAINER_NAME: &str = "opa";
pub const OPA_IMAGE: &str = "quay.io/observatorium/opa-openshift:latest";
pub const OPA_DEFAULT_PORT: i32 = 8082;
pub const OPA_METRICS_PORT: i32 = 8083;
pub const OPA_METRICS_PORT_NAME: &str = "opa-metrics";
pub const OPA_PACKAGE: &str = "lokistack";

pub const INJECT_CA_BUNDLE_ANNOTATION: &str = "service.beta.openshift.io/inject-cabundle";
pub const OAUTH_REDIRECT_ANNOTATION_PREFIX: &str =
    "serviceaccounts.openshift.io/oauth-redirectreference";

/// Tenant specific data the provider needs, keyed by tenant name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TenantData {
    pub cookie_secret: String,
}
