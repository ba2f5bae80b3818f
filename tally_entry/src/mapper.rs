use log::debug;

use std::collections::{BTreeMap, HashSet};

use crate::config::{FieldAnnotation, FieldPath, Severity, ValidationIssue, ValidationOutcome};

/// The human-readable description of an issue code.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IssueMessage {
    pub code: String,
    pub title: &'static str,
    pub explanation: &'static str,
    pub remediation: &'static str,
}

const ERROR_REMEDIATION: &str = "Check that the numbers entered match the paper tally sheet. \
    If they do, the tally sheet itself is inconsistent: stop the entry and report it to the coordinator.";

const WARNING_REMEDIATION: &str = "Check that the numbers entered match the paper tally sheet. \
    If they do, confirm that you have checked them and continue.";

/// Looks up the text for a code. Unknown codes get a generic text so that
/// the service can add codes without breaking the operator screen.
pub fn describe(code: &str) -> IssueMessage {
    let (title, explanation, remediation) = match code {
        "F301" => (
            "Check the number of extra ballots counted",
            "The number of extra ballots counted does not match the difference between \
             the votes cast and the admitted voters.",
            ERROR_REMEDIATION,
        ),
        "F302" => (
            "Check the number of missing ballots",
            "More ballots were counted than voters were admitted, so the number of \
             missing ballots must be zero.",
            ERROR_REMEDIATION,
        ),
        "F303" => (
            "Check the number of missing ballots",
            "The number of missing ballots does not match the difference between \
             the admitted voters and the votes cast.",
            ERROR_REMEDIATION,
        ),
        "F304" => (
            "Check the number of extra ballots counted",
            "Fewer ballots were counted than voters were admitted, so the number of \
             extra ballots counted must be zero.",
            ERROR_REMEDIATION,
        ),
        "F305" => (
            "Check the explanation of differences",
            "The number of admitted voters equals the number of votes cast, so all \
             the difference fields must be zero.",
            ERROR_REMEDIATION,
        ),
        "W301" => (
            "Check the explanation of extra ballots",
            "The explanations entered do not add up to the number of extra ballots counted.",
            WARNING_REMEDIATION,
        ),
        "W302" => (
            "Check the explanation of missing ballots",
            "The explanations entered do not add up to the number of missing ballots.",
            WARNING_REMEDIATION,
        ),
        c if c.starts_with('W') => (
            "Check the numbers entered",
            "The validation service reported a warning for these fields.",
            WARNING_REMEDIATION,
        ),
        _ => (
            "Check the numbers entered",
            "The validation service reported a problem with these fields.",
            ERROR_REMEDIATION,
        ),
    };
    IssueMessage {
        code: code.to_string(),
        title,
        explanation,
        remediation,
    }
}

/// The single block of text shown for an issue: title, code, explanation and
/// remediation, one per line.
pub fn render(issue: &ValidationIssue) -> String {
    let m = describe(&issue.code);
    format!(
        "{}\n{}\n{}\n{}",
        m.title, m.code, m.explanation, m.remediation
    )
}

/// One block of the aggregate banner.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BannerBlock {
    pub code: String,
    pub fields: Vec<FieldPath>,
    pub message: String,
}

/// The feedback shown once above the form.
///
/// Only the most severe group is shown: if there are errors, the warnings are
/// left out until the errors are resolved.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FeedbackBanner {
    pub severity: Severity,
    pub blocks: Vec<BannerBlock>,
}

/// The per-field state derived from one outcome.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Annotations {
    pub fields: BTreeMap<FieldPath, FieldAnnotation>,
    pub banner: Option<FeedbackBanner>,
}

impl Annotations {
    /// Every declared field without any issue.
    pub fn clean(declared: &[FieldPath]) -> Annotations {
        Annotations {
            fields: declared
                .iter()
                .map(|f| (f.clone(), FieldAnnotation::default()))
                .collect(),
            banner: None,
        }
    }

    pub fn get(&self, field: &FieldPath) -> Option<&FieldAnnotation> {
        self.fields.get(field)
    }

    pub fn fields_with(&self, severity: Severity) -> Vec<&FieldPath> {
        self.fields
            .iter()
            .filter(|(_, a)| a.severity == Some(severity))
            .map(|(f, _)| f)
            .collect()
    }
}

/// Maps an outcome back onto the declared fields.
///
/// Errors always win over warnings on the same field. References to fields
/// that are not declared are ignored.
pub fn annotate(outcome: &ValidationOutcome, declared: &[FieldPath]) -> Annotations {
    let mut res = Annotations::clean(declared);

    for issue in outcome.errors.iter() {
        let message = render(issue);
        for f in issue.fields.iter() {
            if let Some(a) = res.fields.get_mut(f) {
                *a = annotation(issue, &message);
            } else {
                debug!("annotate: {} refers to undeclared field {}", issue.code, f);
            }
        }
    }

    for issue in outcome.warnings.iter() {
        let message = render(issue);
        for f in issue.fields.iter() {
            match res.fields.get_mut(f) {
                Some(a) if a.severity == Some(Severity::Error) => {}
                Some(a) => {
                    *a = annotation(issue, &message);
                }
                None => {
                    debug!("annotate: {} refers to undeclared field {}", issue.code, f);
                }
            }
        }
    }

    res.banner = banner(outcome);
    res
}

fn annotation(issue: &ValidationIssue, message: &str) -> FieldAnnotation {
    FieldAnnotation {
        severity: Some(issue.severity),
        code: Some(issue.code.clone()),
        message: message.to_string(),
        fields_covered_by_issue: issue.fields.clone(),
    }
}

fn banner(outcome: &ValidationOutcome) -> Option<FeedbackBanner> {
    let (severity, issues) = if outcome.has_errors() {
        (Severity::Error, &outcome.errors)
    } else if outcome.has_warnings() {
        (Severity::Warning, &outcome.warnings)
    } else {
        return None;
    };
    let mut seen: HashSet<(&str, &[FieldPath])> = HashSet::new();
    let mut blocks: Vec<BannerBlock> = Vec::new();
    for issue in issues.iter() {
        if seen.insert((issue.code.as_str(), issue.fields.as_slice())) {
            blocks.push(BannerBlock {
                code: issue.code.clone(),
                fields: issue.fields.clone(),
                message: render(issue),
            });
        }
    }
    Some(FeedbackBanner { severity, blocks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormSection;

    fn issue(severity: Severity, code: &str, fields: &[&str]) -> ValidationIssue {
        ValidationIssue {
            code: code.to_string(),
            fields: fields.iter().map(|f| FieldPath::from(*f)).collect(),
            severity,
        }
    }

    const MORE: &str = "data.differences_counts.more_ballots_count";
    const FEWER: &str = "data.differences_counts.fewer_ballots_count";
    const NO_EXPLANATION: &str = "data.differences_counts.no_explanation_count";

    #[test]
    fn single_error() {
        let declared = FormSection::Differences.fields();
        let outcome = ValidationOutcome {
            errors: vec![issue(Severity::Error, "F301", &[MORE])],
            warnings: vec![],
        };
        let res = annotate(&outcome, &declared);
        assert_eq!(res.fields.len(), 7);
        assert_eq!(res.fields_with(Severity::Error), vec![&FieldPath::from(MORE)]);
        assert_eq!(
            res.fields.values().filter(|a| a.is_valid()).count(),
            6
        );
        let a = res.get(&FieldPath::from(MORE)).unwrap();
        assert!(a.message.contains("F301"));
        let banner = res.banner.clone().unwrap();
        assert_eq!(banner.severity, Severity::Error);
        assert_eq!(banner.blocks.len(), 1);
        assert_eq!(banner.blocks[0].message, a.message);
    }

    #[test]
    fn errors_win_over_warnings() {
        let declared = FormSection::Differences.fields();
        let outcome = ValidationOutcome {
            errors: vec![issue(Severity::Error, "F304", &[MORE])],
            warnings: vec![issue(Severity::Warning, "W301", &[MORE, NO_EXPLANATION])],
        };
        let res = annotate(&outcome, &declared);
        let more = res.get(&FieldPath::from(MORE)).unwrap();
        assert_eq!(more.severity, Some(Severity::Error));
        assert_eq!(more.code.as_deref(), Some("F304"));
        let no_expl = res.get(&FieldPath::from(NO_EXPLANATION)).unwrap();
        assert_eq!(no_expl.severity, Some(Severity::Warning));
        // Warnings are not in the banner while there are errors.
        let banner = res.banner.unwrap();
        assert_eq!(banner.severity, Severity::Error);
        assert!(banner.blocks.iter().all(|b| b.code == "F304"));
    }

    #[test]
    fn multi_field_issue_shares_one_message() {
        let declared = FormSection::Differences.fields();
        let outcome = ValidationOutcome {
            errors: vec![issue(Severity::Error, "F305", &[MORE, FEWER])],
            warnings: vec![],
        };
        let res = annotate(&outcome, &declared);
        let a = res.get(&FieldPath::from(MORE)).unwrap();
        let b = res.get(&FieldPath::from(FEWER)).unwrap();
        assert_eq!(a.message, b.message);
        assert_eq!(a.fields_covered_by_issue.len(), 2);
        assert_eq!(res.banner.unwrap().blocks.len(), 1);
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let declared = FormSection::Differences.fields();
        let outcome = ValidationOutcome {
            errors: vec![issue(
                Severity::Error,
                "F201",
                &["data.votes_counts.total_votes_cast_count", MORE],
            )],
            warnings: vec![],
        };
        let res = annotate(&outcome, &declared);
        assert_eq!(res.fields.len(), 7);
        assert!(res
            .get(&FieldPath::from("data.votes_counts.total_votes_cast_count"))
            .is_none());
        assert_eq!(res.fields_with(Severity::Error).len(), 1);
    }

    #[test]
    fn empty_outcome_is_clean() {
        let declared = FormSection::Differences.fields();
        let res = annotate(&ValidationOutcome::default(), &declared);
        assert_eq!(res, Annotations::clean(&declared));
    }

    #[test]
    fn duplicate_issues_render_once() {
        let declared = FormSection::Differences.fields();
        let outcome = ValidationOutcome {
            errors: vec![],
            warnings: vec![
                issue(Severity::Warning, "W301", &[MORE]),
                issue(Severity::Warning, "W301", &[MORE]),
            ],
        };
        assert_eq!(annotate(&outcome, &declared).banner.unwrap().blocks.len(), 1);
    }

    #[test]
    fn unknown_codes_get_generic_text() {
        let m = describe("W999");
        assert_eq!(m.remediation, WARNING_REMEDIATION);
        let m = describe("X1");
        assert_eq!(m.remediation, ERROR_REMEDIATION);
        assert_eq!(m.code, "X1");
    }
}
