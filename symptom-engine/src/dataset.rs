//! Tabular inputs: the disease/symptom incidence table and the disease
//! description and precaution tables.

use error_common::{DiagnosisError, ErrorContext, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub const DISEASE_COLUMN: &str = "Disease";
pub const DESCRIPTION_COLUMN: &str = "Description";
const SYMPTOM_PREFIX: &str = "Symptom_";
const PRECAUTION_PREFIX: &str = "Precaution_";

/// Precautions kept per disease
pub const MAX_PRECAUTIONS: usize = 4;

/// One row of the incidence table
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub disease: String,
    /// Symptom slots in column order, `None` where the cell was empty
    pub slots: Vec<Option<String>>,
}

impl CaseRecord {
    /// Build a record with every slot filled, in order
    pub fn new<S: Into<String>>(disease: impl Into<String>, symptoms: impl IntoIterator<Item = S>) -> Self {
        Self {
            disease: disease.into(),
            slots: symptoms.into_iter().map(|s| Some(s.into())).collect(),
        }
    }

    /// Filled slots with their 0-based slot index
    pub fn filled_slots(&self) -> impl Iterator<Item = (usize, &str)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|s| (i, s)))
    }

    pub fn symptoms(&self) -> impl Iterator<Item = &str> {
        self.filled_slots().map(|(_, s)| s)
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// The disease/symptom incidence table
#[derive(Debug, Clone, Default)]
pub struct SymptomDataset {
    records: Vec<CaseRecord>,
}

impl SymptomDataset {
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| DiagnosisError::dataset(path.display().to_string(), e.to_string()))?;
        let dataset = Self::from_reader(file, &path.display().to_string())?;
        tracing::info!(
            records = dataset.len(),
            path = %path.display(),
            "✅ Loaded medical records"
        );
        Ok(dataset)
    }

    /// Parse the table from any reader. `source` names the input in errors.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut csv_reader = table_reader(reader);
        let headers = read_headers(&mut csv_reader, source)?;

        let disease_idx = required_column(&headers, DISEASE_COLUMN, source)?;
        let slot_columns = numbered_columns(&headers, SYMPTOM_PREFIX);
        if slot_columns.is_empty() {
            return Err(DiagnosisError::dataset(
                source,
                format!("no {SYMPTOM_PREFIX}<n> columns in header"),
            ));
        }

        let mut records = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let ctx = ErrorContext::new("dataset").with_path(source).with_row(row + 1);
            let record = result.map_err(|e| DiagnosisError::dataset(source, ctx.describe(&e.to_string())))?;

            let disease = cell(&record, disease_idx).ok_or_else(|| {
                DiagnosisError::dataset(
                    source,
                    ctx.clone().add_context("column", DISEASE_COLUMN).describe("missing disease name"),
                )
            })?;

            let slots = slot_columns
                .iter()
                .map(|&idx| cell(&record, idx).map(str::to_string))
                .collect();

            records.push(CaseRecord {
                disease: disease.to_string(),
                slots,
            });
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Description and precautions of one disease
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub description: Option<String>,
    pub precautions: Vec<String>,
}

/// Disease descriptions and precautions, merged by disease name.
///
/// Entries keep the order in which a disease first appears, descriptions
/// table first.
#[derive(Debug, Clone, Default)]
pub struct DiseaseCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl DiseaseCatalog {
    pub fn load(descriptions: &Path, precautions: &Path) -> Result<Self> {
        let open = |path: &Path| {
            std::fs::File::open(path)
                .map_err(|e| DiagnosisError::dataset(path.display().to_string(), e.to_string()))
        };

        let catalog = Self::from_readers(
            open(descriptions)?,
            &descriptions.display().to_string(),
            open(precautions)?,
            &precautions.display().to_string(),
        )?;

        tracing::info!(
            diseases = catalog.len(),
            with_precautions = catalog.entries.iter().filter(|e| !e.precautions.is_empty()).count(),
            "✅ Loaded disease descriptions and precautions"
        );
        Ok(catalog)
    }

    pub fn from_readers<D: Read, P: Read>(
        descriptions: D,
        descriptions_source: &str,
        precautions: P,
        precautions_source: &str,
    ) -> Result<Self> {
        let mut catalog = Self::default();

        let mut reader = table_reader(descriptions);
        let headers = read_headers(&mut reader, descriptions_source)?;
        let disease_idx = required_column(&headers, DISEASE_COLUMN, descriptions_source)?;
        let description_idx = required_column(&headers, DESCRIPTION_COLUMN, descriptions_source)?;

        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| row_error(descriptions_source, row, &e.to_string()))?;
            let name = cell(&record, disease_idx)
                .ok_or_else(|| row_error(descriptions_source, row, "missing disease name"))?;
            catalog.entry_mut(name).description = cell(&record, description_idx).map(str::to_string);
        }

        let mut reader = table_reader(precautions);
        let headers = read_headers(&mut reader, precautions_source)?;
        let disease_idx = required_column(&headers, DISEASE_COLUMN, precautions_source)?;
        let precaution_columns = numbered_columns(&headers, PRECAUTION_PREFIX);

        for (row, result) in reader.records().enumerate() {
            let record = result.map_err(|e| row_error(precautions_source, row, &e.to_string()))?;
            let name = cell(&record, disease_idx)
                .ok_or_else(|| row_error(precautions_source, row, "missing disease name"))?;
            catalog.entry_mut(name).precautions = precaution_columns
                .iter()
                .filter_map(|&idx| cell(&record, idx).map(str::to_string))
                .take(MAX_PRECAUTIONS)
                .collect();
        }

        Ok(catalog)
    }

    fn entry_mut(&mut self, name: &str) -> &mut CatalogEntry {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.entries.push(CatalogEntry {
                    name: name.to_string(),
                    ..CatalogEntry::default()
                });
                self.index.insert(name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|e| e.description.as_deref())
    }

    pub fn precautions(&self, name: &str) -> &[String] {
        self.get(name).map_or(&[], |e| e.precautions.as_slice())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn table_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>, source: &str) -> Result<csv::StringRecord> {
    reader
        .headers()
        .cloned()
        .map_err(|e| DiagnosisError::dataset(source, format!("unreadable header: {e}")))
}

fn required_column(headers: &csv::StringRecord, name: &str, source: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DiagnosisError::dataset(source, format!("missing header {name}")))
}

/// Indices of `<prefix><n>` columns ordered by `n`
fn numbered_columns(headers: &csv::StringRecord, prefix: &str) -> Vec<usize> {
    let mut columns: Vec<(u32, usize)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| {
            h.strip_prefix(prefix)
                .and_then(|n| n.parse::<u32>().ok())
                .map(|n| (n, idx))
        })
        .collect();
    columns.sort_unstable();
    columns.into_iter().map(|(_, idx)| idx).collect()
}

/// Trimmed, non-empty cell
fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn row_error(source: &str, row: usize, message: &str) -> DiagnosisError {
    let ctx = ErrorContext::new("catalog").with_path(source).with_row(row + 1);
    DiagnosisError::dataset(source, ctx.describe(message))
}
