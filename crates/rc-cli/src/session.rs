//! Session files.
//!
//! A session records the header of the uploaded file, which of its columns
//! hold each field, and the verification rules to apply. `session init`
//! writes one with suggested columns for the user to review.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rc_core::RunSettings;
use rc_map::{
    FieldSelections, MappingState, suggest_selections, validate_plan, validate_plan_from_output,
    verify_mapping, verify_plan,
};
use rc_model::{Action, FieldMapping, RuleSelection};
use serde::{Deserialize, Serialize};

/// Everything needed to validate a file and verify its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Header of the uploaded file.
    pub columns: Vec<String>,
    /// Request detailed messages when verifying.
    #[serde(default)]
    pub verbose: bool,
    pub selections: FieldSelections,
    #[serde(default)]
    pub rules: RuleSelection,
}

impl Session {
    /// New session for a file header, with suggested selections.
    pub fn from_header(columns: Vec<String>) -> Self {
        let selections = suggest_selections(&columns);
        Self {
            columns,
            verbose: false,
            selections,
            rules: RuleSelection::All,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read session {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse session {}", path.display()))
    }

    /// Write the session; an existing file is only replaced with `force`.
    pub fn save(&self, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!("{} already exists; use --force to replace it", path.display());
        }
        let content = toml::to_string_pretty(self).context("serialize session")?;
        fs::write(path, content).with_context(|| format!("write session {}", path.display()))
    }

    pub fn mapping_state(&self) -> MappingState {
        MappingState::new(self.columns.clone(), self.selections.clone())
    }

    /// Mapping of the uploaded file.
    pub fn mapping(&self) -> Result<FieldMapping> {
        self.mapping_state().finish().context("invalid column selections")
    }

    /// Fail unless `header` is the header this session was made for.
    pub fn check_header(&self, header: &[String], input: &Path) -> Result<()> {
        if header != self.columns.as_slice() {
            bail!(
                "columns of {} do not match the session; run `session init` for this file",
                input.display()
            );
        }
        Ok(())
    }

    /// Settings for validating the uploaded file.
    pub fn validate_settings(&self) -> Result<RunSettings> {
        let mapping = self.mapping()?;
        let plan = validate_plan(&self.columns, &mapping);
        Ok(RunSettings::new(
            Action::Validate,
            mapping,
            plan,
            self.selections.sref,
            self.selections.taxon_kind,
        ))
    }

    /// Settings for verifying a validation result with `validated_header`.
    pub fn verify_settings(&self, validated_header: &[String]) -> Result<RunSettings> {
        let mapping = self.mapping()?;
        let validated = validate_plan_from_output(validated_header, &mapping)
            .context("file is not a validation result for this session")?;
        let verify = verify_mapping(&mapping, &validated).context("read validation result")?;
        Ok(RunSettings::new(
            Action::Verify,
            verify,
            verify_plan(&validated),
            self.selections.sref,
            self.selections.taxon_kind,
        )
        .with_rules(self.rules.clone(), self.verbose))
    }
}
