use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use tally_entry::builder::FormBuilder;
use tally_entry::fields::FormSection;
use tally_entry::service::ValidationService;
use tally_entry::*;

use crate::session::commands::{parse_command, Command};
use crate::session::config_reader::SessionSettings;
use crate::session::render::{render_event, render_form};

pub mod commands;
pub mod config_reader;
pub mod http_service;
pub mod render;

#[derive(Debug, Snafu)]
pub enum EntryError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Invalid default value for field {field}"))]
    ParsingJsonNumber { field: String },
    #[snafu(display("No validation service given: use --server or serverUrl"))]
    MissingServer {},
    #[snafu(display("No polling station given: use --station or pollingStationId"))]
    MissingStation {},
    #[snafu(display("Could not set up the form: {source}"))]
    BuildingForm { source: FormErrors },
    #[snafu(display("Error reading commands"))]
    ReadingInput { source: std::io::Error },
    #[snafu(display("Error writing output"))]
    WritingOutput { source: std::io::Error },
    #[snafu(display("Unknown command {line:?}"))]
    UnknownCommand { line: String },
    #[snafu(display("Unknown field {name}"))]
    UnknownField { name: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type EntryResult<T> = Result<T, EntryError>;

/// What happened during a session.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SessionReport {
    pub accepted_sections: Vec<FormSection>,
    /// All the values entered, accepted or not.
    pub values: FormValues,
    pub requests_sent: u64,
    /// True if every section was accepted.
    pub completed: bool,
}

/// The commands come from the script file if one is given, otherwise from
/// the standard input.
pub fn open_input(script: Option<&str>) -> EntryResult<Box<dyn BufRead>> {
    match script {
        Some(path) => {
            let f = File::open(path).context(OpeningFileSnafu { path })?;
            Ok(Box::new(BufReader::new(f)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn mount_section(
    settings: &SessionSettings,
    section: FormSection,
    entry: &FormValues,
) -> EntryResult<FormController> {
    info!("Entering section {}", section.name());
    FormBuilder::new(&settings.rules, settings.target)
        .and_then(|b| b.section(section))
        .and_then(|b| b.defaults(entry))
        .and_then(|b| b.build())
        .context(BuildingFormSnafu {})
}

/// Runs the sections of an entry in order, reading one command per line.
///
/// The session stops when every section is accepted, on `quit`, or at the
/// end of the input. Mistyped commands are reported and skipped.
pub fn run_session<R: BufRead, W: Write, S: ValidationService>(
    settings: &SessionSettings,
    input: R,
    output: &mut W,
    service: &mut S,
) -> EntryResult<SessionReport> {
    let mut section = FormSection::VotersAndVotes;
    let mut entry: FormValues = settings.defaults.clone();
    let mut form = mount_section(settings, section, &entry)?;
    let mut report = SessionReport {
        accepted_sections: Vec::new(),
        values: FormValues::new(),
        requests_sent: 0,
        completed: false,
    };
    writeln!(output, "{}", render_form(&form, section)).context(WritingOutputSnafu {})?;

    for line_r in input.lines() {
        let line = line_r.context(ReadingInputSnafu {})?;
        let cmd = match parse_command(&line, form.fields()) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                warn!("run_session: {}", e);
                writeln!(output, "! {}", e).context(WritingOutputSnafu {})?;
                continue;
            }
        };
        debug!("run_session: command {:?}", cmd);
        let event = match cmd {
            Command::Quit => break,
            Command::Show => {
                writeln!(output, "{}", render_form(&form, section))
                    .context(WritingOutputSnafu {})?;
                continue;
            }
            Command::Event(ev) => ev,
        };

        let outcome = form.handle_event(event, service);
        if let Some(msg) = render_event(&outcome) {
            writeln!(output, "{}", msg).context(WritingOutputSnafu {})?;
        }
        if let EventOutcome::Submitted(so) = &outcome {
            if *so != SubmitOutcome::Accepted {
                writeln!(output, "{}", render_form(&form, section))
                    .context(WritingOutputSnafu {})?;
                continue;
            }
            // Proceed to the next section with everything entered so far.
            entry = form.entry_values();
            report.accepted_sections.push(section);
            report.requests_sent += form.requests_sent();
            form.unmount();
            match section.next() {
                Some(next) => {
                    section = next;
                    form = mount_section(settings, section, &entry)?;
                    writeln!(output, "{}", render_form(&form, section))
                        .context(WritingOutputSnafu {})?;
                }
                None => {
                    report.completed = true;
                    writeln!(output, "Entry complete.").context(WritingOutputSnafu {})?;
                    break;
                }
            }
        }
    }

    if form.is_mounted() {
        entry = form.entry_values();
        report.requests_sent += form.requests_sent();
        form.unmount();
    }
    report.values = entry;
    info!(
        "Session finished: {} sections accepted, {} requests",
        report.accepted_sections.len(),
        report.requests_sent
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tally_entry::service::{
        DataEntryRequest, ServiceError, ValidationResult, ValidationResults,
    };

    struct ScriptedService {
        responses: VecDeque<Result<ValidationResults, ServiceError>>,
        requests: Vec<DataEntryRequest>,
    }

    impl ValidationService for ScriptedService {
        fn validate(
            &mut self,
            request: &DataEntryRequest,
        ) -> Result<ValidationResults, ServiceError> {
            self.requests.push(request.clone());
            self.responses
                .pop_front()
                .unwrap_or_else(|| Ok(ValidationResults::default()))
        }
    }

    fn service(responses: Vec<Result<ValidationResults, ServiceError>>) -> ScriptedService {
        ScriptedService {
            responses: responses.into_iter().collect(),
            requests: Vec::new(),
        }
    }

    fn settings() -> SessionSettings {
        SessionSettings {
            server_url: "http://localhost:8080".to_string(),
            target: EntryTarget {
                polling_station_id: 33,
                entry_number: 1,
            },
            rules: EntryRules::DEFAULT_RULES,
            timeout: Duration::from_secs(1),
            defaults: FormValues::new(),
        }
    }

    fn run(script: &str, svc: &mut ScriptedService) -> (SessionReport, String) {
        let mut out: Vec<u8> = Vec::new();
        let report = run_session(&settings(), script.as_bytes(), &mut out, svc).unwrap();
        (report, String::from_utf8(out).unwrap())
    }

    #[test]
    fn full_entry() {
        let mut svc = service(vec![]);
        let script = "\
type 1200
shift-enter
type 30
submit
focus no_explanation_count
type 5
submit
";
        let (report, out) = run(script, &mut svc);
        assert!(report.completed);
        assert_eq!(
            report.accepted_sections,
            vec![FormSection::VotersAndVotes, FormSection::Differences]
        );
        assert_eq!(report.requests_sent, 2);
        assert_eq!(svc.requests.len(), 2);
        // Values of the first section are sent with the second one.
        let body = &svc.requests[1].body["data"];
        assert_eq!(body["voters_counts"]["poll_card_count"], 1200);
        assert_eq!(body["voters_counts"]["proxy_certificate_count"], 30);
        assert_eq!(body["differences_counts"]["no_explanation_count"], 5);
        assert_eq!(
            report.values.get(&FieldPath::from("data.voters_counts.poll_card_count")),
            Some(1200)
        );
        assert!(out.contains("1.200"));
        assert!(out.contains("Entry complete."));
    }

    #[test]
    fn plain_enter_sends_nothing() {
        let mut svc = service(vec![]);
        let (report, _) = run("enter\nenter\nenter\nquit\nsubmit\n", &mut svc);
        assert!(svc.requests.is_empty());
        assert!(!report.completed);
        assert_eq!(report.requests_sent, 0);
    }

    #[test]
    fn errors_then_warnings() {
        let mut svc = service(vec![
            Ok(ValidationResults::default()),
            Ok(ValidationResults {
                errors: vec![ValidationResult {
                    fields: vec!["data.differences_counts.more_ballots_count".to_string()],
                    code: "F301".to_string(),
                }],
                warnings: vec![],
            }),
            Ok(ValidationResults {
                errors: vec![],
                warnings: vec![ValidationResult {
                    fields: vec!["data.differences_counts.no_explanation_count".to_string()],
                    code: "W301".to_string(),
                }],
            }),
        ]);
        let script = "\
submit
type 3
submit
type 0
submit
submit
accept
submit
";
        let (report, out) = run(script, &mut svc);
        assert!(out.contains("F301"));
        assert!(out.contains("W301"));
        assert!(out.contains("acknowledge"));
        assert!(report.completed);
        // The submit without acknowledgement sent nothing.
        assert_eq!(svc.requests.len(), 4);
    }

    #[test]
    fn mistakes_are_reported() {
        let mut svc = service(vec![]);
        let (report, out) = run("frobnicate\nfocus nothing_count\nquit\n", &mut svc);
        assert!(out.contains("! Unknown command"));
        assert!(out.contains("! Unknown field nothing_count"));
        assert!(!report.completed);
    }

    #[test]
    fn transport_failure_can_be_retried() {
        let mut svc = service(vec![Err(ServiceError::Unreachable("down".to_string()))]);
        let (report, out) = run("submit\nsubmit\n", &mut svc);
        assert!(out.contains("could not be reached"));
        assert_eq!(report.accepted_sections, vec![FormSection::VotersAndVotes]);
        assert_eq!(svc.requests.len(), 2);
    }
}
