//! Bulk import validation for asset rows.
//!
//! Turns a batch of raw, already-tokenized rows into validated asset
//! creation requests. Rows are validated independently: a malformed row is
//! recorded in the error list and excluded from the valid set, and one bad
//! row never aborts the batch. Persistence of the valid requests belongs
//! to the caller, which reports back with the same row-isolation contract.

use serde::{Deserialize, Serialize};
use validator::Validate;

use mg_core::models::asset::{CreateAssetRequest, SecurityValuation};

/// One raw imported row, fields still in string form.
///
/// File parsing is out of scope; the validator accepts rows a tokenizer
/// already produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAssetRow {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub custodian: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub confidentiality: Option<String>,
    pub integrity: Option<String>,
    pub availability: Option<String>,
    pub authenticity: Option<String>,
    pub traceability: Option<String>,
    pub economic_value: Option<String>,
}

/// A rejected row with its zero-based position in the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row_index: usize,
    pub message: String,
}

/// Outcome of validating an import batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportValidation {
    pub valid_requests: Vec<CreateAssetRequest>,
    pub row_errors: Vec<RowError>,
}

/// The report shape the persisting caller must produce, mirroring the
/// row-isolation contract of the validation step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub successful: u64,
    pub failed: u64,
    pub errors: Vec<String>,
}

/// Validates a batch of raw rows with per-row error isolation.
pub fn validate_import_batch(rows: &[RawAssetRow]) -> ImportValidation {
    let mut valid_requests = Vec::new();
    let mut row_errors = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        match validate_row(row) {
            Ok(request) => valid_requests.push(request),
            Err(message) => row_errors.push(RowError { row_index, message }),
        }
    }

    ImportValidation {
        valid_requests,
        row_errors,
    }
}

fn required_text(field: &str, value: &Option<String>) -> Result<String, String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(format!("column '{field}' is required")),
    }
}

fn optional_text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn parse_number(field: &str, value: &Option<String>) -> Result<f64, String> {
    let raw = value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("column '{field}' is required"))?;
    raw.parse()
        .map_err(|_| format!("column '{field}': expected a number, got '{raw}'"))
}

fn dimension(field: &str, value: &Option<String>) -> Result<f64, String> {
    let parsed = parse_number(field, value)?;
    if !(0.0..=10.0).contains(&parsed) {
        return Err(format!(
            "column '{field}': {parsed} is outside the range 0 to 10"
        ));
    }
    Ok(parsed)
}

fn non_negative(field: &str, value: &Option<String>) -> Result<f64, String> {
    let parsed = parse_number(field, value)?;
    if parsed < 0.0 {
        return Err(format!("column '{field}': {parsed} must be non-negative"));
    }
    Ok(parsed)
}

fn validate_row(row: &RawAssetRow) -> Result<CreateAssetRequest, String> {
    let request = CreateAssetRequest {
        code: required_text("code", &row.code)?,
        name: required_text("name", &row.name)?,
        asset_type: optional_text(&row.asset_type),
        category: optional_text(&row.category),
        owner: optional_text(&row.owner),
        custodian: optional_text(&row.custodian),
        location: optional_text(&row.location),
        valuation: SecurityValuation {
            confidentiality: dimension("confidentiality", &row.confidentiality)?,
            integrity: dimension("integrity", &row.integrity)?,
            availability: dimension("availability", &row.availability)?,
            authenticity: dimension("authenticity", &row.authenticity)?,
            traceability: dimension("traceability", &row.traceability)?,
        },
        economic_value: non_negative("economic_value", &row.economic_value)?,
        dependencies: Vec::new(),
    };

    // Final gate through the same validation the direct creation path uses.
    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}
