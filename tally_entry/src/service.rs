use log::warn;

use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

use crate::config::{EntryTarget, FieldPath, FormValues, Severity, ValidationIssue, ValidationOutcome};

// ********* Wire format ***********

/// One item of the `errors` or `warnings` lists.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub fields: Vec<String>,
    pub code: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResults {
    #[serde(default)]
    pub errors: Vec<ValidationResult>,
    #[serde(default)]
    pub warnings: Vec<ValidationResult>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataEntryResponse {
    pub validation_results: ValidationResults,
}

impl From<ValidationResults> for ValidationOutcome {
    fn from(results: ValidationResults) -> ValidationOutcome {
        let convert = |items: Vec<ValidationResult>, severity: Severity| -> Vec<ValidationIssue> {
            items
                .into_iter()
                .map(|r| ValidationIssue {
                    code: r.code,
                    fields: r.fields.into_iter().map(FieldPath::new).collect(),
                    severity,
                })
                .collect()
        };
        ValidationOutcome {
            errors: convert(results.errors, Severity::Error),
            warnings: convert(results.warnings, Severity::Warning),
        }
    }
}

/// One submission to the validation service.
#[derive(PartialEq, Debug, Clone)]
pub struct DataEntryRequest {
    pub target: EntryTarget,
    pub body: JSValue,
}

impl DataEntryRequest {
    /// The path of the endpoint, relative to the server root.
    pub fn path(&self) -> String {
        format!(
            "/api/polling_stations/{}/data_entries/{}",
            self.target.polling_station_id, self.target.entry_number
        )
    }
}

/// Builds the nested request body from dotted paths.
///
/// `data.differences_counts.more_ballots_count = 3` becomes
/// `{"data": {"differences_counts": {"more_ballots_count": 3}}}`.
pub fn build_payload(values: &FormValues) -> JSValue {
    let mut root: JSMap<String, JSValue> = JSMap::new();
    for (path, value) in values.iter() {
        let segments: Vec<&str> = path.segments().collect();
        if !insert_path(&mut root, &segments, *value) {
            warn!("build_payload: {} conflicts with another field, skipped", path);
        }
    }
    JSValue::Object(root)
}

fn insert_path(map: &mut JSMap<String, JSValue>, segments: &[&str], value: u64) -> bool {
    match segments {
        [] => false,
        [last] => {
            if matches!(map.get(*last), Some(JSValue::Object(_))) {
                return false;
            }
            map.insert(last.to_string(), JSValue::from(value));
            true
        }
        [first, rest @ ..] => match map
            .entry(first.to_string())
            .or_insert_with(|| JSValue::Object(JSMap::new()))
        {
            JSValue::Object(m) => insert_path(m, rest, value),
            _ => false,
        },
    }
}

// ********* Transport ***********

/// Failures to obtain a validation response. None of these says anything
/// about the values entered.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ServiceError {
    /// The service could not be reached.
    Unreachable(String),
    /// The service answered with a non-success status.
    Status(u16, String),
    /// The body of the answer could not be understood.
    MalformedResponse(String),
}

impl Error for ServiceError {}

impl Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Unreachable(msg) => {
                write!(f, "the validation service could not be reached: {}", msg)
            }
            ServiceError::Status(code, msg) => {
                write!(f, "the validation service answered with status {}: {}", code, msg)
            }
            ServiceError::MalformedResponse(msg) => {
                write!(f, "the validation service sent an unreadable answer: {}", msg)
            }
        }
    }
}

/// The remote service that checks a data entry and reports issues.
pub trait ValidationService {
    fn validate(&mut self, request: &DataEntryRequest) -> Result<ValidationResults, ServiceError>;
}
