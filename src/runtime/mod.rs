use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::document::Document;
use crate::fields::FieldSpec;
use crate::filter::Filter;
use crate::io::{self, BackupRow};

mod manifest;
pub use manifest::Manifest;

/// Matching rows in input order, each `[id, extra fields...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub scanned: usize,
}

/// Decode, filter and project every row. The first error aborts the pass.
pub fn collect_matches<I>(
    rows: I,
    filter: &Filter<'_>,
    extra_fields: &[&FieldSpec],
    mut on_row: impl FnMut(),
) -> Result<Matches>
where
    I: IntoIterator<Item = Result<BackupRow>>,
{
    let mut header = vec!["id".to_string()];
    header.extend(extra_fields.iter().map(|f| f.label.clone()));

    let mut matches = Matches {
        header,
        ..Matches::default()
    };

    for row in rows {
        let row = row?;
        matches.scanned += 1;
        on_row();

        let document = Document::parse(&row.id, &row.document)?;
        if !filter
            .matches(&document)
            .with_context(|| format!("Failed to evaluate row {}", row.id))?
        {
            continue;
        }

        let mut out = Vec::with_capacity(1 + extra_fields.len());
        out.push(row.id);
        for field in extra_fields {
            out.push(extract(&document, field)?);
        }
        matches.rows.push(out);
    }

    Ok(matches)
}

/// The field's raw JSON, or an empty JSON string when the field is missing.
fn extract(document: &Document, field: &FieldSpec) -> Result<String> {
    let text = match document.get(&field.key) {
        Some(value) => serde_json::to_string(value)?,
        None => serde_json::to_string("")?,
    };
    Ok(text)
}

/// Run a full filtering pass as described by `config`.
pub fn run_filter(config: &RunConfig) -> Result<Manifest> {
    config.validate()?;

    let registry = config.field_registry()?;
    let filter = Filter::compile(&registry, &config.filters, config.mode)?;
    let extra_fields = config
        .fields
        .iter()
        .map(|label| registry.resolve_label(label))
        .collect::<Result<Vec<_>, _>>()?;

    let input = config.input.as_ref().context("No input csv backup given")?;
    info!(
        input = %input.display(),
        clauses = filter.len(),
        mode = %filter.mode(),
        "starting filter run"
    );
    println!("Starting filtering process...");

    let reader = io::BackupReader::open(input, &config.id_column, &config.document_column)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows scanned ({per_sec})")
            .context("Invalid progress template")?,
    );
    let matches = collect_matches(reader, &filter, &extra_fields, || pb.inc(1));
    pb.finish_and_clear();
    let matches = matches?;

    println!(
        "Done: Found {} results matching the applied filter(s)",
        matches.rows.len()
    );
    info!(
        scanned = matches.scanned,
        matched = matches.rows.len(),
        "filter run finished"
    );

    let mut manifest = Manifest {
        input: input.display().to_string(),
        mode: config.mode,
        filters: config.filters.clone(),
        fields: config.fields.clone(),
        rows_scanned: matches.scanned,
        rows_matched: matches.rows.len(),
        chunk_size: config.chunk_size,
        files: Vec::new(),
    };

    if config.print {
        for line in io::format_rows(&matches.header, &matches.rows) {
            println!("{}", line);
        }
        return Ok(manifest);
    }

    let dir = config.output.as_deref().context("Output path is required")?;
    let files = io::write_chunks(
        dir,
        &config.filename,
        &matches.header,
        &matches.rows,
        config.chunk_size,
    )?;
    for file in &files {
        debug!(path = %file.display(), "wrote result chunk");
    }
    println!("  ✓ Wrote {} result files", files.len());

    manifest.files = files
        .iter()
        .map(|f| f.to_string_lossy().to_string())
        .collect();
    write_manifest(&manifest, dir, &config.filename)?;

    Ok(manifest)
}

fn write_manifest(manifest: &Manifest, dir: &Path, filename: &str) -> Result<()> {
    let path = dir.join(Manifest::manifest_name(filename));
    manifest.write_to_file(&path)?;
    println!("  ✓ Manifest written to: {}", path.display());
    Ok(())
}
