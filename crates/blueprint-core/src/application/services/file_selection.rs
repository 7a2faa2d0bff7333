//! Deciding which template files are emitted, and under which name.

use std::path::PathBuf;

use tracing::debug;

use crate::{
    application::services::field_resolver::{FieldResolver, Params},
    domain::{DomainError, FileOperation, RelativePath, TemplateConfig},
};

/// Directory holding blueprint self-test fixtures. Plain files directly
/// inside it are never output; templates there still render.
pub const TEST_DIR: &str = "__test__";

/// Suffix marking a file that must be rendered rather than copied.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// A file that will be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub source_path: RelativePath,
    /// Where the repository keeps the source.
    pub full_path: PathBuf,
    /// Output path relative to the target directory, `.tmpl` already stripped.
    pub output_path: String,
    pub render: bool,
}

/// Whether `file` is left out given the resolved data.
///
/// Pure with respect to `data`: only the file's own `writeIf` is evaluated.
pub fn should_skip(
    resolver: &FieldResolver<'_>,
    file: &TemplateConfig,
    data: &Params,
) -> Result<bool, DomainError> {
    if file.operation == FileOperation::Skip {
        return Ok(true);
    }
    match &file.depends_on {
        Some(condition) => Ok(!resolver.condition(condition, data)?),
        None => Ok(false),
    }
}

/// Apply skip and rename decisions to every file, in order.
pub fn select_files(
    resolver: &FieldResolver<'_>,
    blueprint: &str,
    files: &[TemplateConfig],
    data: &Params,
) -> Result<Vec<SelectedFile>, DomainError> {
    let mut selected = Vec::with_capacity(files.len());
    for file in files {
        let subject = || format!("file [{}]", file.source_path);
        if should_skip(resolver, file, data).map_err(|e| e.within(blueprint, subject()))? {
            debug!(file = %file.source_path, "file skipped");
            continue;
        }
        let render = file.source_path.as_str().ends_with(TEMPLATE_SUFFIX);
        if !render && file.source_path.parent_is(TEST_DIR) {
            debug!(file = %file.source_path, "skipping blueprint test file");
            continue;
        }

        let target = match &file.rename_to {
            Some(rename_to) => {
                let renamed = resolver
                    .text(rename_to, data)
                    .map_err(|e| e.within(blueprint, subject()))?;
                RelativePath::try_new(renamed, blueprint)?
            }
            None => file.source_path.clone(),
        };

        let output_path = target
            .as_str()
            .strip_suffix(TEMPLATE_SUFFIX)
            .unwrap_or(target.as_str())
            .to_owned();
        debug!(file = %file.source_path, output = %output_path, render, "file selected");
        selected.push(SelectedFile {
            source_path: file.source_path.clone(),
            full_path: file.full_path.clone(),
            output_path,
            render,
        });
    }
    Ok(selected)
}
