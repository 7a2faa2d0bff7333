//! Version helpers backed by `semver`.
//!
//! - `version._showapplicableversions(current, v1, v2, ...)`: candidates not
//!   older than `current` (all of them when `current` is empty)
//! - `version.checkversion(current, target)`: `true`, or an error when
//!   `target` would be a downgrade
//! - `version.getversionfromtag(tag)`: the semantic version of an image tag
//!   such as `xebialabs/xl-deploy:9.0.2`

use semver::Version;

use blueprint_core::{
    application::ports::FunctionProvider, error::BlueprintResult, functions::FnResult,
};

use super::{call_failed, unknown_module};

const DOMAIN: &str = "version";

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionProvider;

impl VersionProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Parse the version part of an image tag. Missing minor/patch components
/// and a leading `v` are tolerated.
pub(crate) fn version_from_tag(tag: &str) -> Result<Version, String> {
    let raw = tag.rsplit(':').next().unwrap_or_default().trim();
    if raw.is_empty() {
        return Err("Version tag is missing".into());
    }
    let raw = raw.strip_prefix('v').unwrap_or(raw);

    let (core, rest) = match raw.find(['-', '+']) {
        Some(at) => raw.split_at(at),
        None => (raw, ""),
    };
    let mut parts: Vec<&str> = core.split('.').collect();
    while parts.len() < 3 {
        parts.push("0");
    }
    let normalized = format!("{}{rest}", parts.join("."));

    Version::parse(&normalized).map_err(|e| format!("Version tag {tag} is not valid: {e}"))
}

fn exactly<'p>(module: &str, params: &'p [String], n: usize) -> BlueprintResult<&'p [String]> {
    if params.len() != n {
        return Err(call_failed(
            DOMAIN,
            module,
            format!("invalid number of arguments sent in {module}"),
        )
        .into());
    }
    Ok(params)
}

impl FunctionProvider for VersionProvider {
    fn call(&self, module: &str, params: &[String]) -> BlueprintResult<FnResult> {
        let failed = |reason: String| call_failed(DOMAIN, module, reason);

        match module.to_ascii_lowercase().as_str() {
            "_showapplicableversions" => {
                let Some((current, candidates)) = params.split_first() else {
                    return Ok(FnResult::default());
                };
                if current.trim().is_empty() {
                    return Ok(FnResult::list(candidates.iter().cloned()));
                }
                let current = version_from_tag(current).map_err(failed)?;
                let mut applicable = Vec::new();
                for candidate in candidates {
                    if version_from_tag(candidate).map_err(failed)? >= current {
                        applicable.push(candidate.clone());
                    }
                }
                Ok(FnResult::list(applicable))
            }
            "checkversion" => {
                let params = exactly(module, params, 2)?;
                let current = version_from_tag(&params[0]).map_err(failed)?;
                let target = version_from_tag(&params[1])
                    .map_err(|_| failed(format!("{} is not a valid version/tag", params[1])))?;
                if target < current {
                    return Err(failed(format!(
                        "cannot downgrade from {} to {}",
                        params[0], params[1]
                    ))
                    .into());
                }
                Ok(FnResult::single("true"))
            }
            "getversionfromtag" => {
                let params = exactly(module, params, 1)?;
                let version = version_from_tag(&params[0])
                    .map_err(|_| failed(format!("{} is not a valid version/tag", params[0])))?;
                Ok(FnResult::single(version.to_string()))
            }
            _ => Err(unknown_module(DOMAIN, module).into()),
        }
    }
}
