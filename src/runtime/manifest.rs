use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::filter::{Clause, MatchMode};

/// Record of one filtering run, written next to its result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub input: String,
    pub mode: MatchMode,
    pub filters: Vec<Clause>,
    pub fields: Vec<String>,
    pub rows_scanned: usize,
    pub rows_matched: usize,
    pub chunk_size: usize,
    pub files: Vec<String>,
}

impl Manifest {
    pub fn manifest_name(filename: &str) -> String {
        format!("{}_manifest.json", filename)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}
