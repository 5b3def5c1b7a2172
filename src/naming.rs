//! Canonical names for the gateway component, derived from the stack name.

use std::collections::BTreeMap;

pub const LABEL_GATEWAY_COMPONENT: &str = "lokistack-gateway";

pub const GATEWAY_CONTAINER_NAME: &str = "gateway";
pub const GATEWAY_HTTP_PORT_NAME: &str = "public";
pub const GATEWAY_HTTP_PORT: i32 = 8080;
pub const GATEWAY_INTERNAL_PORT_NAME: &str = "metrics";
pub const GATEWAY_INTERNAL_PORT: i32 = 8081;

pub const TLS_SECRET_VOLUME: &str = "tls-secret";
pub const HTTP_TLS_DIR: &str = "/var/run/tls/http";
pub const TLS_CERT_FILE: &str = "tls.crt";
pub const TLS_KEY_FILE: &str = "tls.key";
pub const CA_BUNDLE_DIR: &str = "/var/run/ca";
pub const CA_FILE: &str = "service-ca.crt";

pub const CONFIG_HASH_ANNOTATION: &str = "logstack.io/config-hash";

pub fn gateway_name(stack_name: &str) -> String {
    format!("{stack_name}-gateway")
}

pub fn service_name_gateway_http(stack_name: &str) -> String {
    format!("{stack_name}-gateway-http")
}

pub fn signing_ca_bundle_name(stack_name: &str) -> String {
    format!("{stack_name}-gateway-ca-bundle")
}

pub fn signing_service_secret_name(service_name: &str) -> String {
    format!("{service_name}-tls")
}

pub fn fqdn(service_name: &str, namespace: &str) -> String {
    format!("{service_name}.{namespace}.svc.cluster.local")
}

pub fn common_labels(stack_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_string(), "lokistack".to_string()),
        ("app.kubernetes.io/instance".to_string(), stack_name.to_string()),
        (
            "app.kubernetes.io/managed-by".to_string(),
            "logstack-operator".to_string(),
        ),
        ("app.kubernetes.io/created-by".to_string(), "logstack-operator".to_string()),
    ])
}

pub fn component_labels(component: &str, stack_name: &str) -> BTreeMap<String, String> {
    let mut labels = common_labels(stack_name);
    labels.insert("app.kubernetes.io/component".to_string(), component.to_string());
    labels
}
