//! `k8s.config(context)`: cluster, context and user of a kubeconfig entry.
//!
//! The context defaults to `current-context`. A missing or unreadable
//! kubeconfig yields empty attributes with `.IsConfigAvailable` set to
//! `false`, never an error.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use blueprint_core::{
    application::ports::FunctionProvider, error::BlueprintResult, functions::FnResult,
};

use super::unknown_module;

const DOMAIN: &str = "k8s";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeConfig {
    #[serde(default)]
    clusters: Vec<Named<Cluster>>,
    #[serde(default)]
    contexts: Vec<Named<Context>>,
    #[serde(default)]
    users: Vec<Named<User>>,
    #[serde(default)]
    current_context: String,
}

#[derive(Debug, Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "cluster", alias = "context", alias = "user")]
    item: T,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    #[serde(default)]
    server: String,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct Context {
    #[serde(default)]
    cluster: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    user: String,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct User {
    #[serde(default)]
    client_certificate_data: String,
    #[serde(default)]
    client_key_data: String,
}

fn find<'a, T>(items: &'a [Named<T>], name: &str) -> Option<&'a T> {
    items.iter().find(|n| n.name == name).map(|n| &n.item)
}

impl KubeConfig {
    fn result(&self, context: &str) -> FnResult {
        let context_name = if context.is_empty() {
            self.current_context.as_str()
        } else {
            context
        };
        let ctx = find(&self.contexts, context_name).cloned().unwrap_or_default();
        let cluster = find(&self.clusters, &ctx.cluster).cloned().unwrap_or_default();
        let user = find(&self.users, &ctx.user).cloned().unwrap_or_default();

        let available = !cluster.server.is_empty() && !user.client_certificate_data.is_empty();
        FnResult::default()
            .with_attribute("IsConfigAvailable", "true")
            .with_attribute("IsAvailable", available.to_string())
            .with_attribute("ClusterServer", cluster.server)
            .with_attribute(
                "ClusterInsecureSkipTLSVerify",
                cluster.insecure_skip_tls_verify.to_string(),
            )
            .with_attribute("ContextCluster", ctx.cluster)
            .with_attribute("ContextNamespace", ctx.namespace)
            .with_attribute("ContextUser", ctx.user)
            .with_attribute("UserClientCertificateData", user.client_certificate_data)
            .with_attribute("UserClientKeyData", user.client_key_data)
    }
}

fn unavailable() -> FnResult {
    [
        "ClusterServer",
        "ClusterInsecureSkipTLSVerify",
        "ContextCluster",
        "ContextNamespace",
        "ContextUser",
        "UserClientCertificateData",
        "UserClientKeyData",
    ]
    .into_iter()
    .fold(FnResult::default(), |r, attr| r.with_attribute(attr, ""))
    .with_attribute("IsConfigAvailable", "false")
    .with_attribute("IsAvailable", "false")
}

#[derive(Debug, Clone)]
pub struct K8sProvider {
    config_file: Option<PathBuf>,
}

impl K8sProvider {
    /// First entry of `KUBECONFIG`, else `~/.kube/config`.
    pub fn from_environment() -> Self {
        let config_file = env::var_os("KUBECONFIG")
            .and_then(|paths| env::split_paths(&paths).next())
            .or_else(|| dirs::home_dir().map(|home| home.join(".kube").join("config")));
        Self { config_file }
    }

    pub fn with_config_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    fn load(&self) -> Option<KubeConfig> {
        let path: &Path = self.config_file.as_deref()?;
        let content = fs::read_to_string(path)
            .map_err(|e| debug!(path = %path.display(), error = %e, "kubeconfig not readable"))
            .ok()?;
        serde_yaml::from_str(&content)
            .map_err(|e| debug!(path = %path.display(), error = %e, "kubeconfig not parseable"))
            .ok()
    }
}

impl FunctionProvider for K8sProvider {
    fn call(&self, module: &str, params: &[String]) -> BlueprintResult<FnResult> {
        match module.to_ascii_lowercase().as_str() {
            "config" => {
                let context = params.first().map(|s| s.trim()).unwrap_or_default();
                Ok(self
                    .load()
                    .map(|config| config.result(context))
                    .unwrap_or_else(unavailable))
            }
            _ => Err(unknown_module(DOMAIN, module).into()),
        }
    }
}
