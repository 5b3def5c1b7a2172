use std::fs;

use logstack_operator::{Options, TenancyMode};

fn write_stack(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("stack.yaml");
    fs::write(&path, contents).unwrap();
    (temp, path)
}

#[test]
fn loads_integrated_stack_with_tenant_secrets() {
    let (_temp, path) = write_stack(
        r#"name: dev
namespace: logs
gatewayBaseDomain: example.com
gates:
  httpEncryption: true
stack:
  tenants:
    mode: openshift-logging
tenants:
  configs:
    team-a:
      openshift:
        cookieSecret: s1
"#,
    );
    let opts = Options::load(&path).unwrap();
    assert_eq!(opts.mode(), Some(TenancyMode::OpenshiftLogging));
    assert!(opts.gates.http_encryption);
    assert_eq!(opts.stack.gateway.replicas, 1);
    assert_eq!(opts.tenant_data()["team-a"].cookie_secret, "s1");
}

#[test]
fn missing_tenants_section_means_no_mode() {
    let (_temp, path) = write_stack("name: dev\nnamespace: logs\n");
    let opts = Options::load(&path).unwrap();
    assert_eq!(opts.mode(), None);
}

#[test]
fn unknown_mode_fails_to_load() {
    let (_temp, path) = write_stack(
        "name: dev\nnamespace: logs\nstack:\n  tenants:\n    mode: openshift-network\n",
    );
    let err = Options::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parse stack file"));
}

#[test]
fn invalid_stack_name_suggests_canonical_name() {
    let (_temp, path) = write_stack("name: Dev_Stack\nnamespace: logs\n");
    let err = Options::load(&path).unwrap_err();
    assert!(err.to_string().contains("dev-stack"));
}

#[test]
fn explicit_false_gate_is_kept_as_override() {
    let (_temp, path) = write_stack(
        "name: dev\nnamespace: logs\ngates:\n  httpEncryption: false\n  openshift:\n    servingCertsService: true\n",
    );
    let opts = Options::load(&path).unwrap();
    assert_eq!(opts.gate_overrides.http_encryption, Some(false));
    assert_eq!(opts.gate_overrides.service_monitor_tls_endpoints, None);
    assert!(!opts.gates.http_encryption);
    assert!(opts.gates.openshift.serving_certs_service);
}
