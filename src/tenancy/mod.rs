//! Tenancy-mode dispatch for the gateway manifests.
//!
//! Every operation that depends on the tenancy mode is a slot on [`ModeHandler`]. The
//! default slot implementations are no-ops, which is all the `static` and `dynamic`
//! modes (and stacks without a tenants section) need. The integrated
//! `openshift-logging` mode overrides every slot and delegates to the
//! [`openshift`](crate::openshift) provider.

mod openshift_logging;

use tracing::debug;

use crate::TenancyError;
use crate::manifests::Artifact;
use crate::manifests::objects::{Deployment, ServiceMonitor, ServiceSpec};
use crate::options::{Options, TenancyMode};
use crate::settings::FeatureGates;

pub use openshift_logging::{EXCLUDED_GATEWAY_KINDS, OpenShiftLogging};

pub trait ModeHandler: Sync {
    /// Fill the provider options substructure of `opts` with provider defaults.
    fn apply_defaults(&self, _opts: &mut Options) -> Result<(), TenancyError> {
        Ok(())
    }

    fn configure_deployment(
        &self,
        _d: &mut Deployment,
        _gates: &FeatureGates,
        _stack_name: &str,
        _stack_ns: &str,
    ) -> Result<(), TenancyError> {
        Ok(())
    }

    fn configure_service(&self, _s: &mut ServiceSpec) -> Result<(), TenancyError> {
        Ok(())
    }

    fn configure_service_monitor(
        &self,
        _sm: &mut ServiceMonitor,
        _gates: &FeatureGates,
    ) -> Result<(), TenancyError> {
        Ok(())
    }

    /// Add provider objects shared by the whole stack. Never removes anything.
    fn compose_stack_artifacts(&self, objs: Vec<Artifact>, _opts: &Options) -> Vec<Artifact> {
        objs
    }

    /// Add provider objects for the gateway, dropping kinds the provider replaces.
    fn compose_gateway_artifacts(&self, objs: Vec<Artifact>, _opts: &Options) -> Vec<Artifact> {
        objs
    }
}

/// Handler for modes that keep using the user input as is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl ModeHandler for Passthrough {}

/// Select the handler for `mode` once; `None` means the stack has no tenants section.
pub fn handler(mode: Option<TenancyMode>) -> &'static dyn ModeHandler {
    let selected: &'static dyn ModeHandler = match mode {
        None | Some(TenancyMode::Static) | Some(TenancyMode::Dynamic) => &Passthrough,
        Some(TenancyMode::OpenshiftLogging) => &OpenShiftLogging,
    };
    debug!(mode = ?mode, "selected tenancy mode handler");
    selected
}

/// Apply defaults on the options depending on the selected tenancy mode.
pub fn apply_gateway_default_options(opts: &mut Options) -> Result<(), TenancyError> {
    handler(opts.mode()).apply_defaults(opts)
}

pub fn configure_deployment_for_mode(
    d: &mut Deployment,
    mode: Option<TenancyMode>,
    gates: &FeatureGates,
    stack_name: &str,
    stack_ns: &str,
) -> Result<(), TenancyError> {
    handler(mode).configure_deployment(d, gates, stack_name, stack_ns)
}

pub fn configure_service_for_mode(
    s: &mut ServiceSpec,
    mode: Option<TenancyMode>,
) -> Result<(), TenancyError> {
    handler(mode).configure_service(s)
}

pub fn configure_service_monitor_for_mode(
    sm: &mut ServiceMonitor,
    mode: Option<TenancyMode>,
    gates: &FeatureGates,
) -> Result<(), TenancyError> {
    handler(mode).configure_service_monitor(sm, gates)
}

pub fn configure_stack_objs_for_mode(objs: Vec<Artifact>, opts: &Options) -> Vec<Artifact> {
    handler(opts.mode()).compose_stack_artifacts(objs, opts)
}

pub fn configure_gateway_objs_for_mode(objs: Vec<Artifact>, opts: &Options) -> Vec<Artifact> {
    handler(opts.mode()).compose_gateway_artifacts(objs, opts)
}
