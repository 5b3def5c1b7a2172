use tracing::debug;

use super::ModeHandler;
use crate::TenancyError;
use crate::compose::compose;
use crate::manifests::objects::{Deployment, ServiceMonitor, ServiceSpec};
use crate::manifests::{Artifact, ArtifactKind};
use crate::merge::{MergeStrategy, merge_defaults};
use crate::naming;
use crate::openshift::{self, ConfigureError, GatewayTls, NamingInputs};
use crate::options::{Options, TenancyMode};
use crate::settings::FeatureGates;

const MODE: TenancyMode = TenancyMode::OpenshiftLogging;

/// Ingress cannot be used as an OAuth redirect reference for the gateway service
/// account, so the provider's Route replaces it.
pub const EXCLUDED_GATEWAY_KINDS: &[ArtifactKind] = &[ArtifactKind::Ingress];

/// Integrated mode backed by the OpenShift platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenShiftLogging;

fn provider_error(
    operation: &'static str,
    kind: ArtifactKind,
) -> impl FnOnce(ConfigureError) -> TenancyError {
    move |source| TenancyError::ProviderConfiguration {
        mode: MODE,
        operation,
        kind,
        source,
    }
}

impl ModeHandler for OpenShiftLogging {
    fn apply_defaults(&self, opts: &mut Options) -> Result<(), TenancyError> {
        let gateway_name = naming::gateway_name(&opts.name);
        let service_name = naming::service_name_gateway_http(&opts.name);
        let ca_bundle_name = naming::signing_ca_bundle_name(&opts.name);
        let defaults = openshift::new_options(NamingInputs {
            stack_name: &opts.name,
            stack_namespace: &opts.namespace,
            gateway_name: &gateway_name,
            base_domain: &opts.gateway_base_domain,
            gateway_svc_name: &service_name,
            gateway_svc_port_name: naming::GATEWAY_HTTP_PORT_NAME,
            ca_bundle_name: &ca_bundle_name,
            labels: naming::component_labels(naming::LABEL_GATEWAY_COMPONENT, &opts.name),
            tenants: opts.tenant_data(),
        });

        opts.openshift = merge_defaults(&opts.openshift, &defaults, MergeStrategy::FillGaps)
            .map_err(|source| TenancyError::MergeDefaults { mode: MODE, source })?;
        debug!(
            stack = %opts.name,
            tenants = opts.openshift.authentication.len(),
            "applied openshift-logging gateway defaults"
        );
        Ok(())
    }

    fn configure_deployment(
        &self,
        d: &mut Deployment,
        gates: &FeatureGates,
        stack_name: &str,
        stack_ns: &str,
    ) -> Result<(), TenancyError> {
        let ca_bundle_name = naming::signing_ca_bundle_name(stack_name);
        let service_name = naming::service_name_gateway_http(stack_name);
        let secret_name = naming::signing_service_secret_name(&service_name);
        let server_name = naming::fqdn(&service_name, stack_ns);
        let tls = GatewayTls {
            container_name: naming::GATEWAY_CONTAINER_NAME,
            tls_volume_name: naming::TLS_SECRET_VOLUME,
            tls_dir: naming::HTTP_TLS_DIR,
            cert_file: naming::TLS_CERT_FILE,
            key_file: naming::TLS_KEY_FILE,
            ca_bundle_name: &ca_bundle_name,
            ca_bundle_dir: naming::CA_BUNDLE_DIR,
            ca_file: naming::CA_FILE,
            with_tls: gates.http_encryption,
            with_serving_certs_service: gates.platform_serving_certs(),
            secret_name: &secret_name,
            server_name: &server_name,
            gateway_http_port: naming::GATEWAY_HTTP_PORT,
        };
        openshift::configure_gateway_deployment(d, &tls)
            .map_err(provider_error("configure", ArtifactKind::Deployment))
    }

    fn configure_service(&self, s: &mut ServiceSpec) -> Result<(), TenancyError> {
        openshift::configure_gateway_service(s)
            .map_err(provider_error("configure", ArtifactKind::Service))
    }

    fn configure_service_monitor(
        &self,
        sm: &mut ServiceMonitor,
        gates: &FeatureGates,
    ) -> Result<(), TenancyError> {
        openshift::configure_gateway_service_monitor(sm, gates.service_monitor_tls_endpoints)
            .map_err(provider_error("configure", ArtifactKind::ServiceMonitor))
    }

    fn compose_stack_artifacts(&self, objs: Vec<Artifact>, opts: &Options) -> Vec<Artifact> {
        let provided = openshift::build_lokistack_objects(&opts.openshift);
        debug!(provided = provided.len(), "adding openshift stack objects");
        compose(objs, provided, &[])
    }

    fn compose_gateway_artifacts(&self, objs: Vec<Artifact>, opts: &Options) -> Vec<Artifact> {
        let provided = openshift::build_gateway_objects(&opts.openshift);
        let dropped = objs
            .iter()
            .filter(|artifact| EXCLUDED_GATEWAY_KINDS.contains(&artifact.kind()))
            .count();
        debug!(
            dropped,
            provided = provided.len(),
            "replacing excluded gateway objects with openshift objects"
        );
        compose(objs, provided, EXCLUDED_GATEWAY_KINDS)
    }
}
