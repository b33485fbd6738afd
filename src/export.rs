//! Tab-separated exports, one file per record list.

use crate::error::Result;
use crate::schema::Snapshot;
use csv::{QuoteStyle, WriterBuilder};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

fn cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    text.replace(['\t', '\n', '\r'], " ")
}

/// Writes `records` as TSV: a header of field names taken from the first
/// record, then one row per record. Tabs and line breaks inside values become
/// spaces. Returns the number of rows written; nothing is written for an
/// empty list.
pub fn write_tsv<T: Serialize, W: Write>(records: &[T], writer: W) -> Result<usize> {
    let rows: Vec<Value> = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<_, _>>()?;

    let Some(Value::Object(first)) = rows.first() else {
        return Ok(0);
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut tsv = WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);

    tsv.write_record(&headers)?;
    for row in &rows {
        tsv.write_record(headers.iter().map(|h| cell(row.get(h))))?;
    }
    tsv.flush()?;

    Ok(rows.len())
}

/// File stems used for each exported list.
pub const EXPORT_FILES: [&str; 5] = [
    "imoveis",
    "quartos",
    "inquilinos",
    "transacoes",
    "fornecedores",
];

fn export_list<T: Serialize>(records: &[T], dir: &Path, stem: &str) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        warn!("Skipping export of '{}': no records", stem);
        return Ok(None);
    }
    let path = dir.join(format!("{}.tsv", stem));
    let file = std::fs::File::create(&path)?;
    let rows = write_tsv(records, file)?;
    debug!("Exported {} rows to {}", rows, path.display());
    Ok(Some(path))
}

impl Snapshot {
    /// Exports every non-empty list into `dir`, returning the written paths.
    pub fn export_all_tsv(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let [properties, rooms, tenants, transactions, suppliers] = EXPORT_FILES;
        let written = [
            export_list(&self.properties, dir, properties)?,
            export_list(&self.rooms, dir, rooms)?,
            export_list(&self.tenants, dir, tenants)?,
            export_list(&self.transactions, dir, transactions)?,
            export_list(&self.suppliers, dir, suppliers)?,
        ];

        Ok(written.into_iter().flatten().collect())
    }
}
