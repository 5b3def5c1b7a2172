pub mod cli;
pub mod compose;
pub mod error;
pub mod manifests;
pub mod merge;
pub mod naming;
pub mod openshift;
pub mod operator_log;
pub mod options;
pub mod settings;
pub mod tenancy;
pub mod tenants;

pub use error::TenancyError;
pub use options::{Options, TenancyMode};
