//! Blueprint composition: include expansion, overrides and merged preparation.

use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{BlueprintResolver, InputSource},
        services::{field_resolver::FieldResolver, pipeline::DataPreparer},
    },
    domain::{
        BlueprintConfig, ComposedBlueprint, Condition, DomainError, FileOperation,
        IncludeStage, IncludedBlueprint, PreparedData,
    },
    error::BlueprintResult,
};

/// The flattened include tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Depth-first, before-stage includes ahead of their parent.
    pub entries: Vec<ComposedBlueprint>,
    /// Root metadata with every entry's variables and files, in sequence order.
    pub merged: BlueprintConfig,
}

/// Result of preparing a [`Composition`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedComposition {
    pub data: PreparedData,
    /// Variables and files of the entries that were prepared.
    pub config: BlueprintConfig,
    /// Paths of the entries skipped by an include condition.
    pub skipped: Vec<String>,
}

pub struct Composer<'a> {
    resolver: &'a dyn BlueprintResolver,
}

impl<'a> Composer<'a> {
    pub fn new(resolver: &'a dyn BlueprintResolver) -> Self {
        Self { resolver }
    }

    /// Expand `root` and everything it includes.
    #[instrument(skip_all, fields(root = %root.path))]
    pub fn compose(&self, root: BlueprintConfig) -> BlueprintResult<Composition> {
        let mut merged = BlueprintConfig::new(root.path.clone(), root.api_version);
        merged.metadata = root.metadata.clone();

        let mut in_progress = Vec::new();
        let entries = self.expand(root, Vec::new(), None, &mut in_progress)?;

        for entry in &entries {
            merged.variables.extend(entry.config.variables.iter().cloned());
            merged
                .template_configs
                .extend(entry.config.template_configs.iter().cloned());
        }

        info!(
            entries = entries.len(),
            variables = merged.variables.len(),
            files = merged.template_configs.len(),
            "blueprint composed"
        );
        Ok(Composition { entries, merged })
    }

    fn expand(
        &self,
        config: BlueprintConfig,
        conditions: Vec<Condition>,
        parent: Option<(String, IncludeStage)>,
        in_progress: &mut Vec<String>,
    ) -> BlueprintResult<Vec<ComposedBlueprint>> {
        if let Some(pos) = in_progress.iter().position(|p| p == &config.path) {
            let mut cycle = in_progress[pos..].to_vec();
            cycle.push(config.path.clone());
            return Err(DomainError::CompositionCycle { cycle }.into());
        }
        in_progress.push(config.path.clone());

        let mut before = Vec::new();
        let mut after = Vec::new();
        for include in &config.includes {
            debug!(parent = %config.path, child = %include.blueprint_path, stage = %include.stage, "expanding include");
            let mut child = self.resolver.fetch_and_normalize(&include.blueprint_path)?;
            apply_overrides(&mut child, include);

            let mut child_conditions = conditions.clone();
            if let Some(own) = &include.depends_on {
                if !child_conditions.contains(own) {
                    child_conditions.push(own.clone());
                }
            }

            let expanded = self.expand(
                child,
                child_conditions,
                Some((config.path.clone(), include.stage)),
                in_progress,
            )?;
            match include.stage {
                IncludeStage::Before => before.extend(expanded),
                IncludeStage::After => after.extend(expanded),
            }
        }

        in_progress.pop();

        let (parent, stage) = match parent {
            Some((path, stage)) => (Some(path), Some(stage)),
            None => (None, None),
        };
        let mut sequence = before;
        sequence.push(ComposedBlueprint {
            path: config.path.clone(),
            config,
            conditions,
            parent,
            stage,
        });
        sequence.extend(after);
        Ok(sequence)
    }

    /// Prepare every composed entry left to right, accumulating data.
    ///
    /// Include conditions are evaluated against the data merged so far, so a
    /// before-stage include cannot see its parent's variables.
    #[instrument(skip_all, fields(entries = composition.entries.len()))]
    pub fn prepare_merged(
        &self,
        composition: &Composition,
        seed: PreparedData,
        preparer: &DataPreparer<'_>,
        input: &mut dyn InputSource,
    ) -> BlueprintResult<PreparedComposition> {
        let resolver = FieldResolver::new(preparer.registry());
        let mut data = seed;
        let mut config = BlueprintConfig::new(
            composition.merged.path.clone(),
            composition.merged.api_version,
        );
        config.metadata = composition.merged.metadata.clone();
        let mut skipped = Vec::new();
        // Last known outcome per path; true means skipped.
        let mut outcome: HashMap<&str, bool> = HashMap::new();

        for entry in &composition.entries {
            let parent_skipped = entry
                .parent
                .as_deref()
                .and_then(|p| outcome.get(p).copied())
                .unwrap_or(false);

            let mut include = !parent_skipped;
            if include {
                for condition in &entry.conditions {
                    let holds = resolver
                        .condition(condition, &data.template_data)
                        .map_err(|e| e.within(&entry.path, format!("include condition [{condition}]")))?;
                    if !holds {
                        include = false;
                        break;
                    }
                }
            }

            outcome.insert(entry.path.as_str(), !include);
            if !include {
                debug!(blueprint = %entry.path, parent_skipped, "include skipped");
                skipped.push(entry.path.clone());
                continue;
            }

            let prepared = preparer.prepare(&entry.config, &data.template_data, input)?;
            data.merge(prepared);
            config.variables.extend(entry.config.variables.iter().cloned());
            config
                .template_configs
                .extend(entry.config.template_configs.iter().cloned());
        }

        let pipeline = preparer.config();
        if pipeline.interactive && !pipeline.skip_final_confirm && !input.confirm(&data)? {
            return Err(ApplicationError::Cancelled.into());
        }

        info!(
            prepared = composition.entries.len() - skipped.len(),
            skipped = skipped.len(),
            "composition prepared"
        );
        Ok(PreparedComposition {
            data,
            config,
            skipped,
        })
    }
}

/// Apply an include's overrides onto the included blueprint's own model.
fn apply_overrides(child: &mut BlueprintConfig, include: &IncludedBlueprint) {
    for p in &include.parameter_overrides {
        match child.variable_mut(&p.name) {
            Some(variable) => variable.value = p.value.clone(),
            None => {
                debug!(blueprint = %child.path, parameter = %p.name, "parameter override matches no variable, ignoring");
            }
        }
    }

    for f in &include.file_overrides {
        match child.template_config_mut(&f.path) {
            Some(file) => {
                if f.operation == FileOperation::Skip {
                    file.operation = FileOperation::Skip;
                }
                if let Some(rename_to) = &f.rename_to {
                    file.rename_to = Some(rename_to.clone());
                }
            }
            None => {
                debug!(blueprint = %child.path, file = %f.path, "file override matches no file, ignoring");
            }
        }
    }
}
