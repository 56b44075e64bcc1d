use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fields::{FieldRegistry, FieldSpec};
use crate::filter::{Clause, Filter, MatchMode};

/// Everything one filtering run needs. Loaded from YAML and/or filled in
/// from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Backup CSV to read.
    #[serde(default)]
    pub input: Option<PathBuf>,
    /// Directory for result chunks.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Print matches instead of writing files.
    #[serde(default)]
    pub print: bool,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Column holding the JSON document.
    #[serde(default = "default_document_column")]
    pub document_column: String,
    #[serde(default)]
    pub mode: MatchMode,
    /// Maximum rows per result file.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Result file stem; files are named `{filename}_{n}.csv`.
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Extra field labels to attach to each match.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Clause>,
    /// Replaces the built-in field table when present.
    #[serde(default)]
    pub registry: Option<Vec<FieldSpec>>,
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_document_column() -> String {
    "oasDictText".to_string()
}

fn default_chunk_size() -> usize {
    5000
}

fn default_filename() -> String {
    "filter_results".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            print: false,
            id_column: default_id_column(),
            document_column: default_document_column(),
            mode: MatchMode::default(),
            chunk_size: default_chunk_size(),
            filename: default_filename(),
            fields: Vec::new(),
            filters: Vec::new(),
            registry: None,
        }
    }
}

impl RunConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse a run config. Only the field table is checked here; the rest is
    /// checked by [`RunConfig::validate`] once command-line values are merged.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: RunConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        config.field_registry()?;
        Ok(config)
    }

    /// The configured field table, or the built-in one.
    pub fn field_registry(&self) -> Result<FieldRegistry> {
        match &self.registry {
            Some(fields) => {
                FieldRegistry::new(fields.clone()).context("Invalid field registry in config")
            }
            None => Ok(FieldRegistry::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.filters.is_empty() {
            anyhow::bail!("No filters were given");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }
        if self.id_column.is_empty() || self.document_column.is_empty() {
            anyhow::bail!("id_column and document_column must not be empty");
        }

        let input = self.input.as_ref().context("No input csv backup given")?;
        if input.extension().and_then(|e| e.to_str()) != Some("csv") {
            anyhow::bail!("Input file is not a csv file: {}", input.display());
        }
        if !input.is_file() {
            anyhow::bail!("Input csv file does not exist: {}", input.display());
        }

        match &self.output {
            Some(dir) if !dir.is_dir() => anyhow::bail!(
                "Output directory does not exist, please create it: {}",
                dir.display()
            ),
            None if !self.print => {
                anyhow::bail!("No output directory given and printing is off")
            }
            _ => {}
        }

        // Configuration errors surface before the first row is read.
        let registry = self.field_registry()?;
        Filter::compile(&registry, &self.filters, self.mode).context("Invalid filter")?;
        for label in &self.fields {
            registry
                .resolve_label(label)
                .context("Invalid extra field")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldShape;
    use std::fs::File;

    const FULL: &str = r#"
input: backup.csv
output: results
mode: or
chunk_size: 100
filename: samling
fields: [Samling, Titel]
filters:
  - { field: Samling, operator: equalTo, value: "1" }
  - { field: Titel, operator: contains, value: Havn }
"#;

    #[test]
    fn parses_full_config() {
        let config = RunConfig::from_yaml_str(FULL).unwrap();
        assert_eq!(config.mode, MatchMode::Or);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.filters[1], Clause::new("Titel", "contains", "Havn"));
        assert_eq!(config.document_column, "oasDictText");
        assert_eq!(config.fields, vec!["Samling", "Titel"]);
    }

    #[test]
    fn defaults_match_the_backup_layout() {
        let config = RunConfig::from_yaml_str("filters: []").unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(RunConfig::from_yaml_str("filtres: []").is_err());
    }

    #[test]
    fn custom_registry_replaces_builtin() {
        let yaml = r#"
registry:
  - { label: Tags, key: tags, shape: list }
"#;
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        let registry = config.field_registry().unwrap();
        assert_eq!(registry.resolve_label("Tags").unwrap().shape, FieldShape::List);
        assert!(registry.resolve_label("Samling").is_err());
    }

    #[test]
    fn duplicate_registry_labels_fail_to_parse() {
        let yaml = r#"
registry:
  - { label: Tags, key: tags, shape: list }
  - { label: Tags, key: other, shape: text }
"#;
        assert!(RunConfig::from_yaml_str(yaml).is_err());
    }

    fn valid(dir: &Path) -> RunConfig {
        let input = dir.join("backup.csv");
        File::create(&input).unwrap();
        RunConfig {
            input: Some(input),
            output: Some(dir.to_path_buf()),
            filters: vec![Clause::new("Samling", "equalTo", "1")],
            ..RunConfig::default()
        }
    }

    #[test]
    fn validate_accepts_a_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        valid(dir.path()).validate().unwrap();
    }

    #[test]
    fn validate_requires_filters_and_destination() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = valid(dir.path());
        config.filters.clear();
        assert!(config.validate().is_err());

        let mut config = valid(dir.path());
        config.output = None;
        assert!(config.validate().is_err());
        config.print = true;
        assert!(config.validate().is_ok());

        let mut config = valid(dir.path());
        config.output = Some(dir.path().join("missing"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_output_dir_is_rejected_in_print_mode() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = valid(dir.path());
        config.print = true;
        assert!(config.validate().is_ok());

        config.output = Some(dir.path().join("missing"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Output directory does not exist"), "{err}");
    }

    #[test]
    fn validate_checks_input_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = valid(dir.path());
        config.input = Some(dir.path().join("missing.csv"));
        assert!(config.validate().is_err());

        let txt = dir.path().join("backup.txt");
        File::create(&txt).unwrap();
        config.input = Some(txt);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_compiles_filters_and_fields() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = valid(dir.path());
        config.filters.push(Clause::new("Ukendt", "contains", "x"));
        assert!(config.validate().is_err());

        let mut config = valid(dir.path());
        config.fields.push("Ukendt".to_string());
        assert!(config.validate().is_err());

        let mut config = valid(dir.path());
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
