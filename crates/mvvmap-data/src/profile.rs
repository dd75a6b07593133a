use std::io::Read;
use std::path::Path;

use mvvmap_layout::TextFeatures;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::{clean_text, combined_mvv};

/// One raw CSV row. Every column is optional; absent columns read as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub vision: Option<String>,
    #[serde(default)]
    pub values: Option<String>,
    #[serde(default)]
    pub mission_confidence: Option<f64>,
    #[serde(default)]
    pub vision_confidence: Option<f64>,
    #[serde(default)]
    pub values_confidence: Option<f64>,
    #[serde(default)]
    pub extraction_source: Option<String>,
    #[serde(default)]
    pub extracted_from: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A decoded row plus its 1-based position in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedRecord {
    pub row: usize,
    pub record: CompanyRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub mission: f64,
    pub vision: f64,
    pub values: f64,
}

/// Cleaned, analysis-ready organization profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: String,
    pub name: String,
    pub website: String,
    pub category: String,
    pub mission: String,
    pub vision: String,
    pub values: String,
    pub combined_mvv: String,
    pub confidence_scores: ConfidenceScores,
    pub extraction_source: String,
    pub extracted_from: String,
    pub has_complete_mvv: bool,
}

impl CompanyProfile {
    pub fn from_record(row: usize, record: &CompanyRecord) -> Self {
        let mission = clean_text(record.mission.as_deref());
        let vision = clean_text(record.vision.as_deref());
        let values = clean_text(record.values.as_deref());
        let combined = combined_mvv(&mission, &vision, &values);
        let has_complete_mvv = !(mission.is_empty() || vision.is_empty() || values.is_empty());
        let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or("").to_string();

        Self {
            id: format!("company_{row}"),
            name: field(&record.company_name),
            website: field(&record.website),
            category: field(&record.category),
            mission,
            vision,
            values,
            combined_mvv: combined,
            confidence_scores: ConfidenceScores {
                mission: confidence(record.mission_confidence),
                vision: confidence(record.vision_confidence),
                values: confidence(record.values_confidence),
            },
            extraction_source: field(&record.extraction_source),
            extracted_from: field(&record.extracted_from),
            has_complete_mvv,
        }
    }

    pub fn text_features(&self) -> TextFeatures {
        TextFeatures {
            mission_len: self.mission.chars().count(),
            vision_len: self.vision.chars().count(),
            values_len: self.values.chars().count(),
        }
    }
}

fn confidence(v: Option<f64>) -> f64 {
    v.filter(|c| c.is_finite()).unwrap_or(0.0)
}

/// Path reported when reading from an unnamed source fails.
const READER_LABEL: &str = "<reader>";

/// Reads every row of a profile CSV. A leading UTF-8 BOM is ignored. Rows that fail to decode
/// are logged and skipped; their row numbers stay reserved so ids remain positional.
pub fn read_records(mut reader: impl Read) -> Result<Vec<NumberedRecord>> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| Error::io(Path::new(READER_LABEL), e))?;
    let text = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for (idx, row) in csv_reader.deserialize::<CompanyRecord>().enumerate() {
        let row_number = idx + 1;
        match row {
            Ok(record) => out.push(NumberedRecord {
                row: row_number,
                record,
            }),
            Err(err) => {
                tracing::warn!(row = row_number, error = %err, "skipping malformed profile row");
            }
        }
    }
    tracing::info!(rows = out.len(), "profile rows loaded");
    Ok(out)
}

pub fn load_records(path: &Path) -> Result<Vec<NumberedRecord>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    read_records(text.as_bytes())
}

/// Cleans every decoded row into a profile.
pub fn preprocess(records: &[NumberedRecord]) -> Vec<CompanyProfile> {
    let profiles: Vec<CompanyProfile> = records
        .iter()
        .map(|r| CompanyProfile::from_record(r.row, &r.record))
        .collect();
    tracing::info!(profiles = profiles.len(), "profiles preprocessed");
    profiles
}
