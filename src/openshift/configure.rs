use thiserror::Error;

use super::{
    OPA_CONTAINER_NAME, OPA_DEFAULT_PORT, OPA_IMAGE, OPA_METRICS_PORT, OPA_METRICS_PORT_NAME,
    OPA_PACKAGE,
};
use crate::manifests::objects::{
    Container, ContainerPort, Deployment, MonitorEndpoint, ServiceMonitor, ServicePort,
    ServiceSpec, Volume, VolumeMount, VolumeSource,
};

#[derive(Debug, Error)]
pub enum ConfigureError {
    #[error("container `{container}` not found in deployment `{deployment}`")]
    MissingContainer {
        container: String,
        deployment: String,
    },
    #[error("invalid {field} `{value}`: not a DNS-1123 subdomain")]
    InvalidName { field: &'static str, value: String },
    #[error("service monitor `{0}` has no endpoint TLS settings to reuse")]
    MissingTlsConfig(String),
}

/// TLS material and naming the gateway deployment is wired up with.
#[derive(Clone, Debug)]
pub struct GatewayTls<'a> {
    pub container_name: &'a str,
    pub tls_volume_name: &'a str,
    pub tls_dir: &'a str,
    pub cert_file: &'a str,
    pub key_file: &'a str,
    pub ca_bundle_name: &'a str,
    pub ca_bundle_dir: &'a str,
    pub ca_file: &'a str,
    pub with_tls: bool,
    pub with_serving_certs_service: bool,
    pub secret_name: &'a str,
    pub server_name: &'a str,
    pub gateway_http_port: i32,
}

impl GatewayTls<'_> {
    fn serving_certs(&self) -> bool {
        self.with_tls && self.with_serving_certs_service
    }

    fn validate(&self) -> Result<(), ConfigureError> {
        for (field, value) in [
            ("CA bundle name", self.ca_bundle_name),
            ("secret name", self.secret_name),
            ("server name", self.server_name),
        ] {
            if !resource_name::is_dns1123_subdomain(value) {
                return Err(ConfigureError::InvalidName {
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Run the gateway under its own service account, trust the service CA and add the
/// OPA sidecar. Serving certificates are mounted only when both TLS gates are on.
pub fn configure_gateway_deployment(
    d: &mut Deployment,
    tls: &GatewayTls<'_>,
) -> Result<(), ConfigureError> {
    tls.validate()?;

    let deployment_name = d.metadata.name.clone();
    let pod = &mut d.spec.template.spec;
    let ca_path = format!("{}/{}", tls.ca_bundle_dir, tls.ca_file);
    let cert_path = format!("{}/{}", tls.tls_dir, tls.cert_file);
    let key_path = format!("{}/{}", tls.tls_dir, tls.key_file);

    let gateway = pod
        .container_mut(tls.container_name)
        .ok_or_else(|| ConfigureError::MissingContainer {
            container: tls.container_name.to_string(),
            deployment: deployment_name.clone(),
        })?;

    push_mount(gateway, tls.ca_bundle_name, tls.ca_bundle_dir);
    push_arg(gateway, format!("--logs.tls.ca-file={ca_path}"));

    if tls.serving_certs() {
        push_mount(gateway, tls.tls_volume_name, tls.tls_dir);
        push_arg(gateway, format!("--tls.server.cert-file={cert_path}"));
        push_arg(gateway, format!("--tls.server.key-file={key_path}"));
        push_arg(gateway, format!("--tls.healthchecks.server-ca-file={ca_path}"));
        push_arg(gateway, format!("--tls.healthchecks.server-name={}", tls.server_name));
        for probe in [&mut gateway.liveness_probe, &mut gateway.readiness_probe]
            .into_iter()
            .flatten()
        {
            probe.http_get.scheme = "HTTPS".to_string();
        }
    }

    push_volume(
        &mut pod.volumes,
        tls.ca_bundle_name,
        VolumeSource::ConfigMap {
            name: tls.ca_bundle_name.to_string(),
        },
    );
    if tls.serving_certs() {
        push_volume(
            &mut pod.volumes,
            tls.tls_volume_name,
            VolumeSource::Secret {
                secret_name: tls.secret_name.to_string(),
            },
        );
    }

    if pod.container_mut(OPA_CONTAINER_NAME).is_none() {
        pod.containers.push(opa_container(tls));
    }
    pod.service_account_name = Some(deployment_name);
    Ok(())
}

fn opa_container(tls: &GatewayTls<'_>) -> Container {
    let scheme = if tls.serving_certs() { "https" } else { "http" };
    let mut args = vec![
        format!("--web.listen=127.0.0.1:{OPA_DEFAULT_PORT}"),
        format!("--web.internal.listen=0.0.0.0:{OPA_METRICS_PORT}"),
        format!("--web.healthchecks.url=http://localhost:{OPA_DEFAULT_PORT}"),
        format!("--opa.package={OPA_PACKAGE}"),
        format!(
            "--logs.api-url={scheme}://localhost:{}",
            tls.gateway_http_port
        ),
    ];
    let mut volume_mounts = Vec::new();
    if tls.serving_certs() {
        args.push(format!(
            "--tls.internal.server.cert-file={}/{}",
            tls.tls_dir, tls.cert_file
        ));
        args.push(format!(
            "--tls.internal.server.key-file={}/{}",
            tls.tls_dir, tls.key_file
        ));
        volume_mounts.push(VolumeMount {
            name: tls.tls_volume_name.to_string(),
            mount_path: tls.tls_dir.to_string(),
            read_only: true,
        });
    }
    Container {
        name: OPA_CONTAINER_NAME.to_string(),
        image: OPA_IMAGE.to_string(),
        args,
        ports: vec![ContainerPort::tcp(OPA_METRICS_PORT_NAME, OPA_METRICS_PORT)],
        volume_mounts,
        ..Default::default()
    }
}

fn push_arg(container: &mut Container, arg: String) {
    if !container.args.contains(&arg) {
        container.args.push(arg);
    }
}

fn push_mount(container: &mut Container, name: &str, path: &str) {
    if container.volume_mounts.iter().any(|mount| mount.name == name) {
        return;
    }
    container.volume_mounts.push(VolumeMount {
        name: name.to_string(),
        mount_path: path.to_string(),
        read_only: true,
    });
}

fn push_volume(volumes: &mut Vec<Volume>, name: &str, source: VolumeSource) {
    if volumes.iter().any(|volume| volume.name == name) {
        return;
    }
    volumes.push(Volume {
        name: name.to_string(),
        source,
    });
}

/// Expose the OPA sidecar metrics port on the gateway service.
pub fn configure_gateway_service(s: &mut ServiceSpec) -> Result<(), ConfigureError> {
    if s.ports.iter().any(|port| port.name == OPA_METRICS_PORT_NAME) {
        return Ok(());
    }
    s.ports.push(ServicePort {
        name: OPA_METRICS_PORT_NAME.to_string(),
        port: OPA_METRICS_PORT,
        target_port: OPA_METRICS_PORT,
        protocol: "TCP".to_string(),
    });
    Ok(())
}

/// Scrape the OPA sidecar next to the gateway, reusing the gateway endpoint's TLS
/// settings when `with_tls` is set.
pub fn configure_gateway_service_monitor(
    sm: &mut ServiceMonitor,
    with_tls: bool,
) -> Result<(), ConfigureError> {
    if sm
        .spec
        .endpoints
        .iter()
        .any(|endpoint| endpoint.port == OPA_METRICS_PORT_NAME)
    {
        return Ok(());
    }

    let mut endpoint = MonitorEndpoint {
        port: OPA_METRICS_PORT_NAME.to_string(),
        path: "/metrics".to_string(),
        scheme: "http".to_string(),
        ..Default::default()
    };
    if with_tls {
        let template = sm
            .spec
            .endpoints
            .iter()
            .find(|endpoint| endpoint.tls_config.is_some())
            .ok_or_else(|| ConfigureError::MissingTlsConfig(sm.metadata.name.clone()))?;
        endpoint.scheme = "https".to_string();
        endpoint.tls_config = template.tls_config.clone();
        endpoint.bearer_token_file = template.bearer_token_file.clone();
    }
    sm.spec.endpoints.push(endpoint);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifests::objects::{HttpGetAction, ObjectMeta, Probe, TlsConfig};

    fn deployment() -> Deployment {
        let probe = Probe {
            http_get: HttpGetAction {
                path: "/live".to_string(),
                port: 8081,
                scheme: "HTTP".to_string(),
            },
            period_seconds: 10,
        };
        let mut d = Deployment {
            metadata: ObjectMeta::named("dev-gateway", Some("logs")),
            ..Default::default()
        };
        d.spec.template.spec.containers.push(Container {
            name: "gateway".to_string(),
            image: "gateway:latest".to_string(),
            liveness_probe: Some(probe.clone()),
            readiness_probe: Some(probe),
            ..Default::default()
        });
        d
    }

    fn tls(with_tls: bool, with_serving_certs_service: bool) -> GatewayTls<'static> {
        GatewayTls {
            container_name: "gateway",
            tls_volume_name: "tls-secret",
            tls_dir: "/var/run/tls/http",
            cert_file: "tls.crt",
            key_file: "tls.key",
            ca_bundle_name: "dev-gateway-ca-bundle",
            ca_bundle_dir: "/var/run/ca",
            ca_file: "service-ca.crt",
            with_tls,
            with_serving_certs_service,
            secret_name: "dev-gateway-http-tls",
            server_name: "dev-gateway-http.logs.svc.cluster.local",
            gateway_http_port: 8080,
        }
    }

    #[test]
    fn mounts_ca_bundle_and_adds_sidecar_without_tls() {
        let mut d = deployment();
        configure_gateway_deployment(&mut d, &tls(false, false)).unwrap();

        let pod = &d.spec.template.spec;
        assert_eq!(pod.service_account_name.as_deref(), Some("dev-gateway"));
        assert_eq!(pod.volumes.len(), 1);
        assert_eq!(pod.containers.len(), 2);
        assert_eq!(pod.containers[1].name, OPA_CONTAINER_NAME);
        let gateway = &pod.containers[0];
        assert!(
            gateway
                .args
                .contains(&"--logs.tls.ca-file=/var/run/ca/service-ca.crt".to_string())
        );
        assert_eq!(gateway.liveness_probe.as_ref().unwrap().http_get.scheme, "HTTP");
    }

    #[test]
    fn serving_certs_need_both_gates() {
        let mut d = deployment();
        configure_gateway_deployment(&mut d, &tls(true, false)).unwrap();
        assert!(
            !d.spec.template.spec.volumes.iter().any(|volume| volume.name == "tls-secret")
        );
    }

    #[test]
    fn mounts_serving_certs_and_switches_probes_to_https() {
        let mut d = deployment();
        configure_gateway_deployment(&mut d, &tls(true, true)).unwrap();

        let pod = &d.spec.template.spec;
        let secret = pod
            .volumes
            .iter()
            .find(|volume| volume.name == "tls-secret")
            .unwrap();
        assert_eq!(
            secret.source,
            VolumeSource::Secret {
                secret_name: "dev-gateway-http-tls".to_string()
            }
        );
        let gateway = &pod.containers[0];
        assert!(
            gateway
                .args
                .contains(&"--tls.server.cert-file=/var/run/tls/http/tls.crt".to_string())
        );
        assert_eq!(gateway.readiness_probe.as_ref().unwrap().http_get.scheme, "HTTPS");
        assert_eq!(pod.containers[1].volume_mounts.len(), 1);
    }

    #[test]
    fn configuring_twice_does_not_duplicate() {
        let mut once = deployment();
        configure_gateway_deployment(&mut once, &tls(true, true)).unwrap();
        let mut twice = once.clone();
        configure_gateway_deployment(&mut twice, &tls(true, true)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_container_is_an_error() {
        let mut d = deployment();
        let mut params = tls(false, false);
        params.container_name = "nope";
        let err = configure_gateway_deployment(&mut d, &params).unwrap_err();
        assert!(matches!(err, ConfigureError::MissingContainer { .. }));
    }

    #[test]
    fn malformed_server_name_is_an_error() {
        let mut d = deployment();
        let mut params = tls(true, true);
        params.server_name = "Not_A_Host";
        let err = configure_gateway_deployment(&mut d, &params).unwrap_err();
        assert!(matches!(
            err,
            ConfigureError::InvalidName {
                field: "server name",
                ..
            }
        ));
    }

    #[test]
    fn service_gets_opa_metrics_port_once() {
        let mut spec = ServiceSpec::default();
        configure_gateway_service(&mut spec).unwrap();
        configure_gateway_service(&mut spec).unwrap();
        assert_eq!(spec.ports.len(), 1);
        assert_eq!(spec.ports[0].port, OPA_METRICS_PORT);
    }

    #[test]
    fn monitor_endpoint_reuses_tls_settings() {
        let mut sm = ServiceMonitor::default();
        sm.spec.endpoints.push(MonitorEndpoint {
            port: "metrics".to_string(),
            path: "/metrics".to_string(),
            scheme: "https".to_string(),
            bearer_token_file: Some("/var/run/secrets/token".to_string()),
            tls_config: Some(TlsConfig {
                ca_file: "/etc/ca.crt".to_string(),
                server_name: "dev-gateway-http.logs.svc".to_string(),
                ..Default::default()
            }),
        });
        configure_gateway_service_monitor(&mut sm, true).unwrap();
        let opa = &sm.spec.endpoints[1];
        assert_eq!(opa.scheme, "https");
        assert_eq!(opa.tls_config, sm.spec.endpoints[0].tls_config);
    }

    #[test]
    fn monitor_with_tls_requires_template_endpoint() {
        let mut sm = ServiceMonitor::default();
        sm.metadata.name = "dev-gateway".to_string();
        let err = configure_gateway_service_monitor(&mut sm, true).unwrap_err();
        assert!(matches!(err, ConfigureError::MissingTlsConfig(_)));
    }
}
