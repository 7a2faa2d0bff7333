//! Blueprint Service - main application orchestrator.
//!
//! This service coordinates the entire generation workflow:
//! 1. Resolve the root blueprint
//! 2. Compose it with everything it includes
//! 3. Prepare the merged data
//! 4. Select, render and write the output files
//!
//! Nothing touches the filesystem until every file has been rendered.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
};

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{BlueprintResolver, Filesystem, InputSource, TemplateRenderer},
        services::{
            composition::{Composer, Composition, PreparedComposition},
            field_resolver::FieldResolver,
            file_selection::select_files,
            pipeline::{Answers, DataPreparer, PipelineConfig},
        },
    },
    domain::{PreparedData, Value},
    error::BlueprintResult,
    functions::FunctionRegistry,
};

/// Directory, relative to the output root, that receives the values files.
pub const GENERATED_DIR: &str = "xebialabs";
pub const VALUES_FILE: &str = "values.xlvals";
pub const SECRETS_FILE: &str = "secrets.xlvals";

const VALUES_HEADER: &str = "# This file includes all non-secret values, you can add variables here and then refer them with '!value' tag in YAML files";
const SECRETS_HEADER: &str = "# This file includes all secret values, and will be excluded from GIT. You can add new values and/or edit them and then refer to them using '!value' YAML tag";

/// Everything `generate` needs besides the blueprint path.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub output_dir: PathBuf,
    pub pipeline: PipelineConfig,
    pub answers: Option<Answers>,
    /// Previously resolved data; provides the initial template data.
    pub seed: PreparedData,
    pub values_file: String,
    pub secrets_file: String,
    /// Overwrite existing output files.
    pub force: bool,
    /// Resolve and render, but write nothing.
    pub dry_run: bool,
}

impl GenerateRequest {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pipeline: PipelineConfig::default(),
            answers: None,
            seed: PreparedData::new(),
            values_file: VALUES_FILE.to_owned(),
            secrets_file: SECRETS_FILE.to_owned(),
            force: false,
            dry_run: false,
        }
    }
}

/// One file produced by a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Outcome of a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub prepared: PreparedComposition,
    pub files: Vec<GeneratedFile>,
    pub written: bool,
}

/// Main blueprint service.
pub struct BlueprintService {
    resolver: Box<dyn BlueprintResolver>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
    registry: FunctionRegistry,
}

impl BlueprintService {
    /// Create a new service with the given adapters.
    pub fn new(
        resolver: Box<dyn BlueprintResolver>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
        registry: FunctionRegistry,
    ) -> Self {
        Self {
            resolver,
            renderer,
            filesystem,
            registry,
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Resolve and compose without preparing any data.
    #[instrument(skip_all, fields(blueprint = %path))]
    pub fn inspect(&self, path: &str) -> BlueprintResult<Composition> {
        let root = self.resolver.fetch_and_normalize(path)?;
        Composer::new(self.resolver.as_ref()).compose(root)
    }

    /// Generate the blueprint at `path` into `request.output_dir`.
    #[instrument(
        skip_all,
        fields(
            blueprint = %path,
            output = %request.output_dir.display(),
            dry_run = request.dry_run
        )
    )]
    pub fn generate(
        &self,
        path: &str,
        request: &GenerateRequest,
        input: &mut dyn InputSource,
    ) -> BlueprintResult<GenerateReport> {
        info!("Generating blueprint");

        // 1. Resolve and compose
        let composition = self.inspect(path)?;
        let composer = Composer::new(self.resolver.as_ref());

        // 2. Prepare data
        let mut preparer = DataPreparer::new(&self.registry, request.pipeline);
        if let Some(answers) = &request.answers {
            preparer = preparer.with_answers(answers);
        }
        let prepared =
            composer.prepare_merged(&composition, request.seed.clone(), &preparer, input)?;

        // 3. Select and render
        let resolver = FieldResolver::new(&self.registry);
        let selected = select_files(
            &resolver,
            path,
            &prepared.config.template_configs,
            &prepared.data.template_data,
        )?;

        let mut files = Vec::with_capacity(selected.len() + 3);
        for file in &selected {
            let source = self.filesystem.read_file(&file.full_path)?;
            let content = if file.render {
                self.renderer
                    .render(file.source_path.as_str(), &source, &prepared.data)?
                    .trim()
                    .to_owned()
            } else {
                source
            };
            files.push(GeneratedFile {
                path: request.output_dir.join(&file.output_path),
                content,
            });
        }
        files.extend(values_files(
            request,
            prepared.config.metadata.suppress_generated_dir,
            &prepared.data,
        ));
        info!(files = files.len(), "Files rendered");

        // 4. Write
        if request.dry_run {
            info!("Dry run, nothing written");
            return Ok(GenerateReport {
                prepared,
                files,
                written: false,
            });
        }
        self.write_all(&files, request.force)?;

        info!("Generation completed successfully");
        Ok(GenerateReport {
            prepared,
            files,
            written: true,
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn write_all(&self, files: &[GeneratedFile], force: bool) -> BlueprintResult<()> {
        if !force {
            if let Some(existing) = files.iter().find(|f| self.filesystem.exists(&f.path)) {
                return Err(ApplicationError::OutputExists {
                    path: existing.path.clone(),
                }
                .into());
            }
        }

        for file in files {
            if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&file.path, &file.content)?;
            debug!(path = %file.path.display(), bytes = file.content.len(), "wrote file");
        }
        Ok(())
    }
}

/// `values.xlvals`, `secrets.xlvals` and a `.gitignore` hiding the secrets,
/// all under the generated directory. With `suppress`, a file is written only
/// when it has entries.
fn values_files(
    request: &GenerateRequest,
    suppress: bool,
    data: &PreparedData,
) -> Vec<GeneratedFile> {
    let dir = request.output_dir.join(GENERATED_DIR);
    let mut files = Vec::new();
    if !suppress || !data.values.is_empty() {
        files.push(GeneratedFile {
            path: dir.join(&request.values_file),
            content: to_properties(VALUES_HEADER, &data.values),
        });
    }
    if !suppress || !data.secrets.is_empty() {
        files.push(GeneratedFile {
            path: dir.join(&request.secrets_file),
            content: to_properties(SECRETS_HEADER, &data.secrets),
        });
        files.push(GeneratedFile {
            path: dir.join(".gitignore"),
            content: format!("{}\n", request.secrets_file),
        });
    }
    files
}

/// Sorted `key = value` lines under `header`.
fn to_properties(header: &str, entries: &BTreeMap<String, Value>) -> String {
    let mut out = String::from(header);
    out.push('\n');
    for (key, value) in entries {
        let _ = writeln!(
            out,
            "{} = {}",
            escape_property(key, true),
            escape_property(&value.to_string(), false)
        );
    }
    out
}

fn escape_property(raw: &str, is_key: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x0c' => escaped.push_str("\\f"),
            '=' | ':' | '#' | '!' if is_key => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' ' if is_key || i == 0 => escaped.push_str("\\ "),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Relative form of `path` for display.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
