use log::debug;

use crate::config::{OutcomeSignature, ValidationOutcome};

/// True if the outcome has warnings and nothing else.
pub fn requires_acknowledgement(outcome: &ValidationOutcome) -> bool {
    outcome.errors.is_empty() && !outcome.warnings.is_empty()
}

/// The operator's confirmation that a warnings-only outcome was checked.
///
/// The confirmation is scoped to one set of issues: when a newer outcome
/// reports a different set, the gate closes again.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct WarningAcknowledgement {
    accepted: bool,
    scope: Option<OutcomeSignature>,
}

impl WarningAcknowledgement {
    pub fn new() -> WarningAcknowledgement {
        WarningAcknowledgement::default()
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Idempotent.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    pub fn reset(&mut self) {
        self.accepted = false;
    }

    /// Records a newly completed outcome. The acknowledgement only survives
    /// if the outcome reports the same issues as the previous one.
    pub fn observe(&mut self, outcome: &ValidationOutcome) {
        let signature = outcome.signature();
        if self.scope.as_ref() != Some(&signature) {
            if self.accepted {
                debug!("observe: issue set changed, acknowledgement withdrawn");
            }
            self.reset();
            self.scope = Some(signature);
        }
    }

    /// Whether the outcome lets the form proceed.
    pub fn permits(&self, outcome: &ValidationOutcome) -> bool {
        outcome.is_empty() || (requires_acknowledgement(outcome) && self.accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldPath, Severity, ValidationIssue};

    fn warnings(codes: &[&str]) -> ValidationOutcome {
        ValidationOutcome {
            errors: vec![],
            warnings: codes
                .iter()
                .map(|c| ValidationIssue {
                    code: c.to_string(),
                    fields: vec![FieldPath::from("data.differences_counts.no_explanation_count")],
                    severity: Severity::Warning,
                })
                .collect(),
        }
    }

    #[test]
    fn only_warnings_need_acknowledgement() {
        assert!(requires_acknowledgement(&warnings(&["W301"])));
        assert!(!requires_acknowledgement(&ValidationOutcome::default()));
        let mut both = warnings(&["W301"]);
        both.errors.push(ValidationIssue {
            code: "F301".to_string(),
            fields: vec![FieldPath::from("data.differences_counts.more_ballots_count")],
            severity: Severity::Error,
        });
        assert!(!requires_acknowledgement(&both));
    }

    #[test]
    fn accept_is_idempotent() {
        let outcome = warnings(&["W301"]);
        let mut once = WarningAcknowledgement::new();
        once.observe(&outcome);
        once.accept();
        let mut twice = WarningAcknowledgement::new();
        twice.observe(&outcome);
        twice.accept();
        twice.accept();
        assert_eq!(once, twice);
        assert!(twice.permits(&outcome));
    }

    #[test]
    fn gate() {
        let mut ack = WarningAcknowledgement::new();
        let empty = ValidationOutcome::default();
        assert!(ack.permits(&empty));

        let w = warnings(&["W301"]);
        ack.observe(&w);
        assert!(!ack.permits(&w));
        ack.accept();
        assert!(ack.permits(&w));

        let mut e = w.clone();
        e.errors.push(ValidationIssue {
            code: "F305".to_string(),
            fields: vec![],
            severity: Severity::Error,
        });
        assert!(!ack.permits(&e));
    }

    #[test]
    fn survives_same_outcome_only() {
        let mut ack = WarningAcknowledgement::new();
        ack.observe(&warnings(&["W301"]));
        ack.accept();
        ack.observe(&warnings(&["W301"]));
        assert!(ack.is_accepted());
        ack.observe(&warnings(&["W302"]));
        assert!(!ack.is_accepted());
    }

    #[test]
    fn reset_keeps_scope() {
        let mut ack = WarningAcknowledgement::new();
        ack.observe(&warnings(&["W301"]));
        ack.accept();
        ack.reset();
        ack.observe(&warnings(&["W301"]));
        assert!(!ack.is_accepted());
    }
}
