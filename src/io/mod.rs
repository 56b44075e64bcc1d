use anyhow::{Context, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One row of the backup export: its id and the raw JSON document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRow {
    pub id: String,
    pub document: String,
}

/// Streams [`BackupRow`]s out of a backup CSV, one record at a time.
pub struct BackupReader<R: Read> {
    reader: csv::Reader<R>,
    id_idx: usize,
    document_idx: usize,
    line: u64,
}

impl BackupReader<File> {
    pub fn open<P: AsRef<Path>>(path: P, id_column: &str, document_column: &str) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open backup: {:?}", path.as_ref()))?;
        Self::from_reader(file, id_column, document_column)
    }
}

impl<R: Read> BackupReader<R> {
    /// Wrap a CSV stream; the header row must name both columns.
    pub fn from_reader(input: R, id_column: &str, document_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
        let headers = reader.headers().context("Failed to read CSV header")?.clone();

        let position = |name: &str| {
            headers.iter().position(|h| h == name).with_context(|| {
                format!(
                    "Column '{}' not found in backup. Available columns: {:?}",
                    name,
                    headers.iter().collect::<Vec<_>>()
                )
            })
        };
        let id_idx = position(id_column)?;
        let document_idx = position(document_column)?;

        Ok(Self {
            reader,
            id_idx,
            document_idx,
            line: 1,
        })
    }

    fn to_row(&self, record: &StringRecord) -> Result<BackupRow> {
        let field = |idx: usize| {
            record
                .get(idx)
                .map(str::to_string)
                .with_context(|| format!("Line {}: row has only {} columns", self.line, record.len()))
        };
        Ok(BackupRow {
            id: field(self.id_idx)?,
            document: field(self.document_idx)?,
        })
    }
}

impl<R: Read> Iterator for BackupReader<R> {
    type Item = Result<BackupRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None, // EOF
            Ok(true) => {
                self.line = record.position().map_or(self.line + 1, |p| p.line());
                Some(self.to_row(&record))
            }
            Err(e) => Some(Err(anyhow::Error::from(e).context("Failed to read CSV record"))),
        }
    }
}

/// Path of result chunk `idx`: `{dir}/{filename}_{idx}.csv`.
pub fn chunk_path(dir: &Path, filename: &str, idx: usize) -> PathBuf {
    dir.join(format!("{}_{}.csv", filename, idx))
}

/// Write `rows` into consecutive CSV files of at most `chunk_size` rows,
/// each starting with `header`. Returns the files written, in order.
pub fn write_chunks(
    dir: &Path,
    filename: &str,
    header: &[String],
    rows: &[Vec<String>],
    chunk_size: usize,
) -> Result<Vec<PathBuf>> {
    if chunk_size == 0 {
        anyhow::bail!("chunk size must be at least 1");
    }

    let mut written = Vec::new();
    for (idx, chunk) in rows.chunks(chunk_size).enumerate() {
        let path = chunk_path(dir, filename, idx);
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(header)?;
        for row in chunk {
            writer.write_record(row)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Render matches for the console: the header, then one line per row.
pub fn format_rows(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    std::iter::once(header.join(", "))
        .chain(rows.iter().map(|row| row.join(", ")))
        .collect()
}
