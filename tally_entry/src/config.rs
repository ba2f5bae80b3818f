// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The fully-qualified, dotted identifier of one numeric input.
///
/// For example `data.differences_counts.more_ballots_count`. The same path is
/// used in the request body and in the `fields` of the validation results.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> FieldPath {
        FieldPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated components of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The last component, which is the name of the field inside its section.
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> FieldPath {
        FieldPath::new(s)
    }
}

/// The current value of a set of fields.
///
/// Values are never negative. The display string of a field is always
/// derived from the integer stored here.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<FieldPath, u64>);

impl FormValues {
    pub fn new() -> FormValues {
        FormValues(BTreeMap::new())
    }

    /// All the given fields, set to zero.
    pub fn zeroed(fields: &[FieldPath]) -> FormValues {
        FormValues(fields.iter().map(|f| (f.clone(), 0)).collect())
    }

    pub fn get(&self, field: &FieldPath) -> Option<u64> {
        self.0.get(field).cloned()
    }

    /// Sets the value and returns the previous one, if any.
    pub fn set(&mut self, field: FieldPath, value: u64) -> Option<u64> {
        self.0.insert(field, value)
    }

    pub fn contains(&self, field: &FieldPath) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &u64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies all the values of `other` into this set, overriding existing ones.
    pub fn extend(&mut self, other: &FormValues) {
        for (k, v) in other.iter() {
            self.0.insert(k.clone(), *v);
        }
    }
}

impl FromIterator<(FieldPath, u64)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (FieldPath, u64)>>(iter: I) -> Self {
        FormValues(iter.into_iter().collect())
    }
}

/// The polling station and entry that a form submits to.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EntryTarget {
    pub polling_station_id: u32,
    pub entry_number: u32,
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem reported by the validation service.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ValidationIssue {
    /// Stable identifier, for example `F301` or `W301`.
    pub code: String,
    /// The fields covered by this issue, in the order reported by the service.
    pub fields: Vec<FieldPath>,
    pub severity: Severity,
}

/// The complete response to one submission attempt.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// The set of issues of an outcome, without ordering.
///
/// Two outcomes with the same signature report the same problems.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct OutcomeSignature(BTreeSet<(Severity, String, Vec<FieldPath>)>);

impl ValidationOutcome {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// All the issues, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn signature(&self) -> OutcomeSignature {
        OutcomeSignature(
            self.issues()
                .map(|i| (i.severity, i.code.clone(), i.fields.clone()))
                .collect(),
        )
    }
}

/// The state of one field after the most recent validation.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct FieldAnnotation {
    /// None when the field is not covered by any issue.
    pub severity: Option<Severity>,
    pub code: Option<String>,
    /// The rendered text of the issue covering this field, empty if valid.
    pub message: String,
    /// All the fields that share this message.
    pub fields_covered_by_issue: Vec<FieldPath>,
}

impl FieldAnnotation {
    pub fn is_valid(&self) -> bool {
        self.severity.is_none()
    }
}

/// Errors that prevent a form from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormErrors {
    EmptyForm,
    DuplicateField(FieldPath),
    InvalidMaxDigits(usize),
    ValueOutOfRange { field: FieldPath, value: u64 },
}

impl Error for FormErrors {}

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormErrors::EmptyForm => write!(f, "a form needs at least one field"),
            FormErrors::DuplicateField(field) => {
                write!(f, "field {} is declared more than once", field)
            }
            FormErrors::InvalidMaxDigits(n) => {
                write!(f, "the maximum number of digits must be between 1 and 18, got {}", n)
            }
            FormErrors::ValueOutOfRange { field, value } => {
                write!(f, "value {} for field {} has too many digits", value, field)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct EntryRules {
    /// Keystrokes beyond this number of digits are dropped.
    pub max_digits: usize,
    pub thousands_separator: char,
}

impl EntryRules {
    pub const DEFAULT_RULES: EntryRules = EntryRules {
        max_digits: 9,
        thousands_separator: '.',
    };

    /// The largest value a field can hold under these rules.
    pub fn max_value(&self) -> u64 {
        10u64.saturating_pow(self.max_digits as u32).saturating_sub(1)
    }
}

impl Default for EntryRules {
    fn default() -> Self {
        EntryRules::DEFAULT_RULES
    }
}
