//! Blueprint document parsing.
//!
//! Turns the YAML text of a `blueprint.yaml` into the canonical
//! [`BlueprintConfig`]. Both schema versions are accepted; `xl/v1` documents
//! are mapped onto the current model with a deprecation warning.
//!
//! ```yaml
//! apiVersion: xl/v2
//! kind: Blueprint
//! metadata:
//!   name: aws-basic
//! spec:
//!   parameters:
//!     - name: Region
//!       type: Select
//!       prompt: Which region?
//!       options: [!fn aws.regions(ecs)]
//!   files:
//!     - path: main.tf.tmpl
//!   includeAfter:
//!     - blueprint: common/monitoring
//! ```

mod fields;
mod v1;
mod v2;

use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use blueprint_core::domain::{ApiVersion, BlueprintConfig, DomainError};

use self::{v1::DocumentV1, v2::DocumentV2};

#[derive(Deserialize)]
struct Header {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
}

/// Parse and validate one blueprint document.
///
/// `path` is the repository path of the blueprint and is used in every
/// error raised for this document.
#[instrument(skip(content), fields(blueprint = %path))]
pub fn parse_blueprint(path: &str, content: &str) -> Result<BlueprintConfig, DomainError> {
    let yaml_error = |e: serde_yaml::Error| DomainError::validation(path, format!("malformed yaml: {e}"));

    let header: Header = serde_yaml::from_str(content).map_err(yaml_error)?;
    let api_version = ApiVersion::from_str(header.api_version.trim()).map_err(|_| {
        DomainError::validation(
            path,
            format!(
                "api version needs to be {} or {}",
                ApiVersion::V2,
                ApiVersion::V1
            ),
        )
    })?;

    let config = match api_version {
        ApiVersion::V1 => {
            warn!(
                blueprint = %path,
                "blueprint uses deprecated api version {}, please migrate to {}",
                ApiVersion::V1,
                ApiVersion::V2
            );
            serde_yaml::from_str::<DocumentV1>(content)
                .map_err(yaml_error)?
                .normalize(path)?
        }
        ApiVersion::V2 => serde_yaml::from_str::<DocumentV2>(content)
            .map_err(yaml_error)?
            .normalize(path)?,
    };

    config.validate()?;
    debug!(
        variables = config.variables.len(),
        files = config.template_configs.len(),
        includes = config.includes.len(),
        "blueprint parsed"
    );
    Ok(config)
}
