//! `aws.credentials()` and `aws.regions(service)`.
//!
//! Credentials come from the standard environment variables first, then from
//! the profile in the shared credentials file. Missing credentials are not an
//! error: every attribute is empty and `.IsAvailable` is `false`.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use blueprint_core::{
    application::ports::FunctionProvider, error::BlueprintResult, functions::FnResult,
};

use super::{call_failed, unknown_module};

const DOMAIN: &str = "aws";

/// Commercial partition regions, sorted.
const REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ca-central-1",
    "ca-west-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub provider_name: String,
}

impl AwsCredentials {
    fn into_result(self) -> FnResult {
        FnResult::default()
            .with_attribute("IsAvailable", (!self.access_key_id.is_empty()).to_string())
            .with_attribute("AccessKeyID", self.access_key_id)
            .with_attribute("SecretAccessKey", self.secret_access_key)
            .with_attribute("SessionToken", self.session_token)
            .with_attribute("ProviderName", self.provider_name)
    }
}

#[derive(Debug, Clone)]
pub struct AwsProvider {
    read_env: bool,
    credentials_file: Option<PathBuf>,
    profile: String,
}

impl AwsProvider {
    /// Reads `AWS_*` variables and `~/.aws/credentials` (or
    /// `AWS_SHARED_CREDENTIALS_FILE`), profile `AWS_PROFILE` or `default`.
    pub fn from_environment() -> Self {
        let credentials_file = env::var_os("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".aws").join("credentials")));
        Self {
            read_env: true,
            credentials_file,
            profile: env::var("AWS_PROFILE").unwrap_or_else(|_| "default".into()),
        }
    }

    /// Only the given credentials file, ignoring the environment.
    pub fn with_credentials_file(path: impl Into<PathBuf>, profile: impl Into<String>) -> Self {
        Self {
            read_env: false,
            credentials_file: Some(path.into()),
            profile: profile.into(),
        }
    }

    pub fn credentials(&self) -> AwsCredentials {
        if self.read_env {
            if let Ok(access_key_id) = env::var("AWS_ACCESS_KEY_ID") {
                if !access_key_id.is_empty() {
                    return AwsCredentials {
                        access_key_id,
                        secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
                        session_token: env::var("AWS_SESSION_TOKEN").unwrap_or_default(),
                        provider_name: "EnvConfigCredentials".into(),
                    };
                }
            }
        }

        self.credentials_file
            .as_deref()
            .and_then(|path| read_profile(path, &self.profile))
            .unwrap_or_default()
    }
}

fn read_profile(path: &Path, profile: &str) -> Option<AwsCredentials> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "aws credentials file not readable");
            return None;
        }
    };
    let credentials = parse_profile(&content, profile)?;
    Some(AwsCredentials {
        provider_name: format!("SharedConfigCredentials: {}", path.display()),
        ..credentials
    })
}

/// Pull one `[profile]` section out of an ini-style credentials file.
fn parse_profile(content: &str, profile: &str) -> Option<AwsCredentials> {
    let mut in_profile = false;
    let mut found = false;
    let mut credentials = AwsCredentials::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            found |= in_profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().to_owned();
        match key.trim() {
            "aws_access_key_id" => credentials.access_key_id = value,
            "aws_secret_access_key" => credentials.secret_access_key = value,
            "aws_session_token" => credentials.session_token = value,
            _ => {}
        }
    }

    found.then_some(credentials)
}

impl FunctionProvider for AwsProvider {
    fn call(&self, module: &str, params: &[String]) -> BlueprintResult<FnResult> {
        match module.to_ascii_lowercase().as_str() {
            "credentials" => Ok(self.credentials().into_result()),
            "regions" => {
                let service = params.first().map(|s| s.trim()).unwrap_or_default();
                if service.is_empty() {
                    return Err(call_failed(
                        DOMAIN,
                        module,
                        "service name parameter is required for AWS regions function",
                    )
                    .into());
                }
                Ok(FnResult::list(REGIONS.iter().copied()))
            }
            _ => Err(unknown_module(DOMAIN, module).into()),
        }
    }
}
