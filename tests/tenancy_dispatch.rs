use logstack_operator::manifests::objects::{Deployment, ServiceMonitor, ServiceSpec};
use logstack_operator::manifests::{self, Artifact, ArtifactKind};
use logstack_operator::options::{OpenShiftTenantConfig, TenantConfig, TenantsSpec};
use logstack_operator::settings::FeatureGates;
use logstack_operator::{Options, TenancyError, TenancyMode, openshift, tenancy};

fn stack(mode: Option<TenancyMode>) -> Options {
    let mut opts = Options {
        name: "dev".to_string(),
        namespace: "logs".to_string(),
        gateway_base_domain: "example.com".to_string(),
        ..Default::default()
    };
    opts.stack.tenants = mode.map(|mode| TenantsSpec { mode });
    opts
}

fn kinds(objs: &[Artifact]) -> Vec<ArtifactKind> {
    objs.iter().map(Artifact::kind).collect()
}

#[test]
fn passthrough_modes_leave_everything_untouched() {
    for mode in [None, Some(TenancyMode::Static), Some(TenancyMode::Dynamic)] {
        let mut opts = stack(mode);
        let before = opts.clone();
        tenancy::apply_gateway_default_options(&mut opts).unwrap();
        assert_eq!(opts, before);
        assert_eq!(opts.openshift, openshift::Options::default());

        let mut d = manifests::new_gateway_deployment(&opts);
        let d_before = d.clone();
        tenancy::configure_deployment_for_mode(&mut d, mode, &opts.gates, "dev", "logs").unwrap();
        assert_eq!(d, d_before);

        let mut s = ServiceSpec::default();
        tenancy::configure_service_for_mode(&mut s, mode).unwrap();
        assert_eq!(s, ServiceSpec::default());

        let gates = FeatureGates {
            service_monitor_tls_endpoints: true,
            ..Default::default()
        };
        let mut sm = ServiceMonitor::default();
        tenancy::configure_service_monitor_for_mode(&mut sm, mode, &gates).unwrap();
        assert_eq!(sm, ServiceMonitor::default());

        let base = vec![
            Artifact::Deployment(Deployment::default()),
            Artifact::Ingress(manifests::new_gateway_ingress(&opts)),
        ];
        let composed = tenancy::configure_gateway_objs_for_mode(base.clone(), &opts);
        assert_eq!(kinds(&composed), kinds(&base));
        let composed = tenancy::configure_stack_objs_for_mode(base.clone(), &opts);
        assert_eq!(kinds(&composed), kinds(&base));
    }
}

#[test]
fn static_mode_keeps_provider_options_zero_valued() {
    let mut opts = stack(Some(TenancyMode::Static));
    tenancy::apply_gateway_default_options(&mut opts).unwrap();
    assert_eq!(opts.openshift, openshift::Options::default());
}

#[test]
fn integrated_mode_passes_tenant_data_and_keeps_set_fields() {
    let mut opts = stack(Some(TenancyMode::OpenshiftLogging));
    opts.tenants.configs.insert(
        "team-a".to_string(),
        TenantConfig {
            openshift: Some(OpenShiftTenantConfig {
                cookie_secret: "s1".to_string(),
            }),
        },
    );
    opts.openshift.build_opts.route_host = "logs.custom.example".to_string();
    opts.openshift.authorization.opa_url = "http://opa.local/allow".to_string();

    tenancy::apply_gateway_default_options(&mut opts).unwrap();

    assert_eq!(opts.openshift.build_opts.route_host, "logs.custom.example");
    assert_eq!(opts.openshift.authorization.opa_url, "http://opa.local/allow");
    assert_eq!(opts.openshift.build_opts.gateway_name, "dev-gateway");
    assert_eq!(opts.openshift.build_opts.gateway_svc_name, "dev-gateway-http");

    let team_a = opts
        .openshift
        .authentication
        .iter()
        .find(|spec| spec.tenant_name == "team-a")
        .expect("team-a authentication");
    assert_eq!(team_a.cookie_secret, "s1");
    assert_eq!(team_a.service_account, "dev-gateway");
    let tenants: Vec<&str> = opts
        .openshift
        .authentication
        .iter()
        .map(|spec| spec.tenant_name.as_str())
        .collect();
    assert_eq!(tenants, vec!["application", "infrastructure", "audit", "team-a"]);
}

#[test]
fn applying_defaults_twice_is_stable() {
    let mut once = stack(Some(TenancyMode::OpenshiftLogging));
    tenancy::apply_gateway_default_options(&mut once).unwrap();
    let mut twice = once.clone();
    tenancy::apply_gateway_default_options(&mut twice).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn integrated_defaults_are_deterministic() {
    let render = || {
        let mut opts = stack(Some(TenancyMode::OpenshiftLogging));
        tenancy::apply_gateway_default_options(&mut opts).unwrap();
        serde_json::to_string(&manifests::build_all(&opts).unwrap()).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn provider_failures_name_mode_and_kind() {
    let gates = FeatureGates {
        service_monitor_tls_endpoints: true,
        ..Default::default()
    };
    let mut sm = ServiceMonitor::default();
    let err = tenancy::configure_service_monitor_for_mode(
        &mut sm,
        Some(TenancyMode::OpenshiftLogging),
        &gates,
    )
    .unwrap_err();
    match &err {
        TenancyError::ProviderConfiguration { mode, kind, .. } => {
            assert_eq!(*mode, TenancyMode::OpenshiftLogging);
            assert_eq!(*kind, ArtifactKind::ServiceMonitor);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("openshift-logging"));
    assert!(std::error::Error::source(&err).is_some());
}
