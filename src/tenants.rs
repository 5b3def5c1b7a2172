use uuid::Uuid;

use crate::openshift::DEFAULT_TENANTS;
use crate::options::{OpenShiftTenantConfig, Options};

/// Tenant names the integrated mode serves, default tenants first.
pub fn list_tenants(opts: &Options) -> Vec<String> {
    let mut tenants: Vec<String> = DEFAULT_TENANTS.iter().map(|t| t.to_string()).collect();
    for name in opts.tenants.configs.keys() {
        if !tenants.contains(name) {
            tenants.push(name.clone());
        }
    }
    tenants
}

/// Give every served tenant without a cookie secret a fresh random one.
///
/// Returns the tenants that received a secret. Existing secrets are kept.
pub fn generate_missing(opts: &mut Options) -> Vec<String> {
    let mut generated = Vec::new();
    for tenant in list_tenants(opts) {
        let config = opts.tenants.configs.entry(tenant.clone()).or_default();
        let openshift = config
            .openshift
            .get_or_insert_with(OpenShiftTenantConfig::default);
        if openshift.cookie_secret.is_empty() {
            openshift.cookie_secret = Uuid::new_v4().simple().to_string();
            generated.push(tenant);
        }
    }
    generated
}
