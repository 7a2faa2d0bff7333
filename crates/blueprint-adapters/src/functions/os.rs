use std::{env, path::PathBuf};

use chrono::Local;

use blueprint_core::{
    application::ports::FunctionProvider, error::BlueprintResult, functions::FnResult,
};

use super::{call_failed, unknown_module};

const DOMAIN: &str = "os";

/// Host facts: operating system, timestamps, certificate locations.
#[derive(Debug, Clone, Default)]
pub struct OsProvider {
    working_dir: Option<PathBuf>,
}

impl OsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve certificate locations against `dir` instead of the process
    /// working directory.
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(dir.into()),
        }
    }

    fn location(&self, file: &str) -> BlueprintResult<String> {
        let dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => env::current_dir().map_err(|e| call_failed(DOMAIN, file, e.to_string()))?,
        };
        Ok(dir.join(file).display().to_string())
    }
}

/// Docker Desktop exposes the API server on the host only on these platforms.
fn default_api_server_url(os: &str) -> &'static str {
    match os {
        "windows" | "macos" => "https://host.docker.internal:6443",
        _ => "",
    }
}

impl FunctionProvider for OsProvider {
    fn call(&self, module: &str, _params: &[String]) -> BlueprintResult<FnResult> {
        let value = match module.to_ascii_lowercase().as_str() {
            "_operatingsystem" => env::consts::OS.to_owned(),
            "_defaultapiserverurl" => default_api_server_url(env::consts::OS).to_owned(),
            "_datetime" => Local::now().format("%Y%m%d-%H%M%S").to_string(),
            "getcertfilelocation" => self.location("cert.crt")?,
            "getkeyfilelocation" => self.location("cert.key")?,
            _ => return Err(unknown_module(DOMAIN, module).into()),
        };
        Ok(FnResult::single(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operating_system() {
        let result = OsProvider::new().call("_operatingsystem", &[]).unwrap();
        assert_eq!(result.values, vec![env::consts::OS.to_owned()]);
    }

    #[test]
    fn datetime_format() {
        let result = OsProvider::new().call("_DateTime", &[]).unwrap();
        let stamp = &result.values[0];
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "-");
    }

    #[test]
    fn certificate_locations() {
        let provider = OsProvider::with_working_dir("/work");
        let cert = provider.call("getcertfilelocation", &[]).unwrap();
        assert_eq!(cert.values[0], PathBuf::from("/work").join("cert.crt").display().to_string());
        let key = provider.call("getkeyfilelocation", &[]).unwrap();
        assert!(key.values[0].ends_with("cert.key"));
    }

    #[test]
    fn api_server_url_by_platform() {
        assert_eq!(default_api_server_url("linux"), "");
        assert_eq!(default_api_server_url("macos"), "https://host.docker.internal:6443");
    }
}
