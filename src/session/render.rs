use std::fmt::Write as FmtWrite;

use tally_entry::fields::FormSection;
use tally_entry::sequencer::Focus;
use tally_entry::*;

fn marker(annotation: Option<&FieldAnnotation>) -> String {
    match annotation.map(|a| (a.severity, a.code.as_deref())) {
        Some((Some(Severity::Error), code)) => format!("  [error {}]", code.unwrap_or("")),
        Some((Some(Severity::Warning), code)) => format!("  [warning {}]", code.unwrap_or("")),
        _ => String::new(),
    }
}

fn state_line(state: &FormState) -> String {
    match state {
        FormState::Editing => "editing".to_string(),
        FormState::Submitting => "submitting".to_string(),
        FormState::Accepted => "accepted".to_string(),
        FormState::BlockedByErrors => "blocked: correct the errors and submit again".to_string(),
        FormState::AwaitingAcknowledgement => {
            "blocked: check the warnings, then accept and submit again".to_string()
        }
        FormState::TransportFailed(e) => format!("not validated: {}; submit to retry", e),
    }
}

/// The whole form: one row per field, the submit control, the banner and
/// the state.
pub fn render_form(form: &FormController, section: FormSection) -> String {
    let focus = form.focus();
    let width = form
        .fields()
        .iter()
        .map(|f| f.name().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", section.title());
    for f in form.fields() {
        let cursor = if focus == Focus::Field(f.clone()) { ">" } else { " " };
        let display = form.display(f).unwrap_or_default();
        let _ = writeln!(
            out,
            "{} {:<width$} {:>13}{}",
            cursor,
            f.name(),
            display,
            marker(form.annotation(f)),
            width = width
        );
    }
    let cursor = if focus == Focus::SubmitControl { ">" } else { " " };
    let _ = writeln!(out, "{} [submit]", cursor);

    if let Some(banner) = form.banner() {
        let heading = match banner.severity {
            Severity::Error => "-- errors --",
            Severity::Warning => "-- warnings --",
        };
        let _ = writeln!(out, "{}", heading);
        for block in banner.blocks.iter() {
            let _ = writeln!(out, "{}", block.message);
            let names: Vec<&str> = block.fields.iter().map(|f| f.name()).collect();
            let _ = writeln!(out, "(fields: {})", names.join(", "));
        }
    }
    if form.is_acknowledged() {
        let _ = writeln!(out, "warnings acknowledged");
    }
    if form.prompt() == Some(Prompt::AcknowledgementRequired) {
        let _ = writeln!(out, "! acknowledge the warnings with `accept` before submitting again");
    }
    let _ = write!(out, "state: {}", state_line(form.state()));
    out
}

/// A short line describing what an event did, if anything worth saying.
pub fn render_event(outcome: &EventOutcome) -> Option<String> {
    match outcome {
        EventOutcome::Ignored => None,
        EventOutcome::ValueChanged { field, display } => {
            Some(format!("{} = {}", field.name(), display))
        }
        EventOutcome::FocusMoved(Focus::Field(f)) => Some(format!("-> {}", f.name())),
        EventOutcome::FocusMoved(Focus::SubmitControl) => Some("-> [submit]".to_string()),
        EventOutcome::FocusMoved(Focus::Unfocused) => None,
        EventOutcome::Acknowledged => Some("Warnings acknowledged.".to_string()),
        EventOutcome::Submitted(so) => Some(match so {
            SubmitOutcome::Accepted => "Accepted.".to_string(),
            SubmitOutcome::BlockedByErrors => "The service reported errors.".to_string(),
            SubmitOutcome::AwaitingAcknowledgement => {
                "The service reported warnings.".to_string()
            }
            SubmitOutcome::AcknowledgementRequired => {
                "Please acknowledge the warnings (accept) before submitting again.".to_string()
            }
            SubmitOutcome::Busy => "A submission is already in progress.".to_string(),
            SubmitOutcome::TransportFailed(e) => format!("Submission failed: {}", e),
            SubmitOutcome::Discarded => "A late response was ignored.".to_string(),
            SubmitOutcome::Unmounted => "The form is closed.".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_entry::builder::FormBuilder;
    use tally_entry::service::{ValidationResult, ValidationResults};

    fn form() -> FormController {
        FormBuilder::new(
            &EntryRules::DEFAULT_RULES,
            EntryTarget {
                polling_station_id: 1,
                entry_number: 1,
            },
        )
        .and_then(|b| b.section(FormSection::Differences))
        .and_then(|b| b.build())
        .unwrap()
    }

    #[test]
    fn rows_and_banner() {
        let mut f = form();
        f.input_text("12345");
        let pending = f.begin_submit().unwrap();
        f.complete_submit(
            pending.ticket,
            Ok(ValidationResults {
                errors: vec![ValidationResult {
                    fields: vec!["data.differences_counts.more_ballots_count".to_string()],
                    code: "F301".to_string(),
                }],
                warnings: vec![],
            }),
        );
        let text = render_form(&f, FormSection::Differences);
        assert!(text.starts_with("== Differences"));
        let first = text.lines().nth(1).unwrap();
        assert!(first.starts_with("> more_ballots_count"));
        assert!(first.contains("12.345"));
        assert!(first.ends_with("[error F301]"));
        assert!(text.contains("-- errors --"));
        assert!(text.contains("(fields: more_ballots_count)"));
        assert!(text.ends_with("state: blocked: correct the errors and submit again"));
    }

    #[test]
    fn prompt_text() {
        let msg = render_event(&EventOutcome::Submitted(
            SubmitOutcome::AcknowledgementRequired,
        ))
        .unwrap();
        assert!(msg.contains("acknowledge"));
        assert_eq!(render_event(&EventOutcome::Ignored), None);
    }

    #[test]
    fn prompt_in_form() {
        let mut f = form();
        let pending = f.begin_submit().unwrap();
        f.complete_submit(
            pending.ticket,
            Ok(ValidationResults {
                errors: vec![],
                warnings: vec![ValidationResult {
                    fields: vec!["data.differences_counts.no_explanation_count".to_string()],
                    code: "W302".to_string(),
                }],
            }),
        );
        assert_eq!(f.begin_submit().err(), Some(SubmitOutcome::AcknowledgementRequired));
        let text = render_form(&f, FormSection::Differences);
        assert!(text.contains("[warning W302]"));
        assert!(text.contains("-- warnings --"));
        assert!(text.contains("! acknowledge the warnings"));
    }
}
