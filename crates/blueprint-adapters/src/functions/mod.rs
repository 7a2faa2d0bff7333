//! Function providers for `!fn` fields and the expression built-ins that
//! delegate to them.
//!
//! | Domain    | Provider            |
//! |-----------|---------------------|
//! | `aws`     | [`AwsProvider`]     |
//! | `k8s`     | [`K8sProvider`]     |
//! | `os`      | [`OsProvider`]      |
//! | `version` | [`VersionProvider`] |
//!
//! Module names are matched case-insensitively.

mod aws;
mod k8s;
mod os;
mod version;

use std::sync::Arc;

use blueprint_core::{domain::DomainError, functions::FunctionRegistry};

pub use aws::{AwsCredentials, AwsProvider};
pub use k8s::K8sProvider;
pub use os::OsProvider;
pub use version::VersionProvider;

/// A registry with every built-in provider reading from the local machine.
pub fn default_registry() -> FunctionRegistry {
    FunctionRegistry::new()
        .register("aws", Arc::new(AwsProvider::from_environment()))
        .register("k8s", Arc::new(K8sProvider::from_environment()))
        .register("os", Arc::new(OsProvider::new()))
        .register("version", Arc::new(VersionProvider::new()))
}

pub(crate) fn unknown_module(domain: &str, module: &str) -> DomainError {
    DomainError::UnknownFunction {
        domain: domain.to_owned(),
        module: module.to_owned(),
    }
}

pub(crate) fn call_failed(domain: &str, module: &str, reason: impl Into<String>) -> DomainError {
    DomainError::FunctionCall {
        call: format!("{domain}.{module}"),
        reason: reason.into(),
    }
}
