use thiserror::Error;

use crate::manifests::ArtifactKind;
use crate::merge::MergeShapeError;
use crate::openshift::ConfigureError;
use crate::options::TenancyMode;

/// Failures surfaced by the tenancy-mode operations. None of them are transient:
/// calling again with the same inputs fails the same way.
#[derive(Debug, Error)]
pub enum TenancyError {
    #[error("failed to merge defaults for mode {mode}")]
    MergeDefaults {
        mode: TenancyMode,
        #[source]
        source: MergeShapeError,
    },
    #[error("failed to {operation} {kind} for mode {mode}")]
    ProviderConfiguration {
        mode: TenancyMode,
        operation: &'static str,
        kind: ArtifactKind,
        #[source]
        source: ConfigureError,
    },
}
