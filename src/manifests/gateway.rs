use tracing::{debug, warn};

use super::Artifact;
use super::objects::{
    Container, ContainerPort, Deployment, DeploymentSpec, HttpGetAction, Ingress, IngressPath,
    IngressRule, IngressSpec, LabelSelector, MonitorEndpoint, ObjectMeta, PodSpec,
    PodTemplateSpec, Probe, Service, ServiceBackend, ServiceMonitor, ServiceMonitorSpec,
    ServicePort, ServiceSpec, TlsConfig,
};
use crate::TenancyError;
use crate::compose::duplicate_identities;
use crate::naming;
use crate::options::Options;
use crate::tenancy;

/// Build the gateway objects and shape them for the stack's tenancy mode.
pub fn build_gateway(opts: &Options) -> Result<Vec<Artifact>, TenancyError> {
    let mode = opts.mode();

    let mut deployment = new_gateway_deployment(opts);
    tenancy::configure_deployment_for_mode(
        &mut deployment,
        mode,
        &opts.gates,
        &opts.name,
        &opts.namespace,
    )?;

    let mut service = new_gateway_http_service(opts);
    tenancy::configure_service_for_mode(&mut service.spec, mode)?;

    let mut monitor = new_gateway_service_monitor(opts);
    tenancy::configure_service_monitor_for_mode(&mut monitor, mode, &opts.gates)?;

    let objs = vec![
        Artifact::Deployment(deployment),
        Artifact::Service(service),
        Artifact::Ingress(new_gateway_ingress(opts)),
        Artifact::ServiceMonitor(monitor),
    ];
    let objs = tenancy::configure_gateway_objs_for_mode(objs, opts);
    for (kind, name) in duplicate_identities(&objs) {
        warn!(%kind, %name, "duplicate gateway object after composition");
    }
    Ok(objs)
}

/// Build every object this crate manages for the stack.
pub fn build_all(opts: &Options) -> Result<Vec<Artifact>, TenancyError> {
    let objs = build_gateway(opts)?;
    let objs = tenancy::configure_stack_objs_for_mode(objs, opts);
    debug!(stack = %opts.name, count = objs.len(), "built stack objects");
    Ok(objs)
}

pub fn new_gateway_deployment(opts: &Options) -> Deployment {
    let name = naming::gateway_name(&opts.name);
    let labels = naming::component_labels(naming::LABEL_GATEWAY_COMPONENT, &opts.name);

    let mut template_meta = ObjectMeta::named(name.clone(), None).with_labels(labels.clone());
    if !opts.config_sha1.is_empty() {
        template_meta.annotations.insert(
            naming::CONFIG_HASH_ANNOTATION.to_string(),
            opts.config_sha1.clone(),
        );
    }

    let probe = |path: &str, period_seconds| Probe {
        http_get: HttpGetAction {
            path: path.to_string(),
            port: naming::GATEWAY_INTERNAL_PORT,
            scheme: "HTTP".to_string(),
        },
        period_seconds,
    };

    let gateway = Container {
        name: naming::GATEWAY_CONTAINER_NAME.to_string(),
        image: opts.stack.gateway.image.clone(),
        args: vec![
            format!("--web.listen=0.0.0.0:{}", naming::GATEWAY_HTTP_PORT),
            format!("--web.internal.listen=0.0.0.0:{}", naming::GATEWAY_INTERNAL_PORT),
            format!("--web.healthchecks.url=http://localhost:{}", naming::GATEWAY_HTTP_PORT),
            "--log.level=warn".to_string(),
        ],
        ports: vec![
            ContainerPort::tcp(naming::GATEWAY_HTTP_PORT_NAME, naming::GATEWAY_HTTP_PORT),
            ContainerPort::tcp(
                naming::GATEWAY_INTERNAL_PORT_NAME,
                naming::GATEWAY_INTERNAL_PORT,
            ),
        ],
        liveness_probe: Some(probe("/live", 30)),
        readiness_probe: Some(probe("/ready", 5)),
        ..Default::default()
    };

    Deployment {
        metadata: ObjectMeta::named(name, Some(opts.namespace.as_str()))
            .with_labels(labels.clone()),
        spec: DeploymentSpec {
            replicas: opts.stack.gateway.replicas,
            selector: LabelSelector {
                match_labels: labels,
            },
            template: PodTemplateSpec {
                metadata: template_meta,
                spec: PodSpec {
                    containers: vec![gateway],
                    ..Default::default()
                },
            },
        },
    }
}

pub fn new_gateway_http_service(opts: &Options) -> Service {
    let labels = naming::component_labels(naming::LABEL_GATEWAY_COMPONENT, &opts.name);
    Service {
        metadata: ObjectMeta::named(
            naming::service_name_gateway_http(&opts.name),
            Some(opts.namespace.as_str()),
        )
        .with_labels(labels.clone()),
        spec: ServiceSpec {
            selector: labels,
            ports: vec![
                ServicePort {
                    name: naming::GATEWAY_HTTP_PORT_NAME.to_string(),
                    port: naming::GATEWAY_HTTP_PORT,
                    target_port: naming::GATEWAY_HTTP_PORT,
                    protocol: "TCP".to_string(),
                },
                ServicePort {
                    name: naming::GATEWAY_INTERNAL_PORT_NAME.to_string(),
                    port: naming::GATEWAY_INTERNAL_PORT,
                    target_port: naming::GATEWAY_INTERNAL_PORT,
                    protocol: "TCP".to_string(),
                },
            ],
        },
    }
}

pub fn new_gateway_ingress(opts: &Options) -> Ingress {
    let host = (!opts.gateway_base_domain.is_empty())
        .then(|| format!("{}.{}", naming::gateway_name(&opts.name), opts.gateway_base_domain));
    Ingress {
        metadata: ObjectMeta::named(
            naming::gateway_name(&opts.name),
            Some(opts.namespace.as_str()),
        )
        .with_labels(naming::component_labels(
            naming::LABEL_GATEWAY_COMPONENT,
            &opts.name,
        )),
        spec: IngressSpec {
            rules: vec![IngressRule {
                host,
                paths: vec![IngressPath {
                    path: "/".to_string(),
                    path_type: "Prefix".to_string(),
                    backend: ServiceBackend {
                        service_name: naming::service_name_gateway_http(&opts.name),
                        port_name: naming::GATEWAY_HTTP_PORT_NAME.to_string(),
                    },
                }],
            }],
        },
    }
}

pub fn new_gateway_service_monitor(opts: &Options) -> ServiceMonitor {
    let labels = naming::component_labels(naming::LABEL_GATEWAY_COMPONENT, &opts.name);
    let service_name = naming::service_name_gateway_http(&opts.name);
    let mut endpoint = MonitorEndpoint {
        port: naming::GATEWAY_INTERNAL_PORT_NAME.to_string(),
        path: "/metrics".to_string(),
        scheme: "http".to_string(),
        ..Default::default()
    };
    if opts.gates.service_monitor_tls_endpoints {
        endpoint.scheme = "https".to_string();
        endpoint.bearer_token_file =
            Some("/var/run/secrets/kubernetes.io/serviceaccount/token".to_string());
        endpoint.tls_config = Some(TlsConfig {
            ca_file: "/etc/prometheus/configmaps/serving-certs-ca-bundle/service-ca.crt"
                .to_string(),
            server_name: naming::fqdn(&service_name, &opts.namespace),
            ..Default::default()
        });
    }
    ServiceMonitor {
        metadata: ObjectMeta::named(
            format!("{}-monitor", naming::gateway_name(&opts.name)),
            Some(opts.namespace.as_str()),
        )
        .with_labels(labels.clone()),
        spec: ServiceMonitorSpec {
            job_label: "app.kubernetes.io/component".to_string(),
            endpoints: vec![endpoint],
            selector: LabelSelector {
                match_labels: labels,
            },
            namespace_selector: vec![opts.namespace.clone()],
        },
    }
}
