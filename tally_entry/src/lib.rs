/*!

Form controller for re-keying election tally sheets.

Operators copy the counts of a paper tally sheet into numeric fields. This
crate holds everything between the keyboard and the validation service:

* [`formatter`] turns keystrokes into canonical numbers (`12345` is shown as `12.345`)
* [`sequencer`] moves the focus from field to field on the commit signal
* [`mapper`] maps the issues reported by the service back onto the fields
* [`acknowledgement`] holds the operator's confirmation of warnings
* [`FormController`] ties them together and decides when the form may proceed

The rules that decide whether the counts are consistent are not here: they
belong to the validation service, reached through the
[`service::ValidationService`] trait.

See the [`manual`] for the keyboard contract and the issue codes.

```
use tally_entry::builder::FormBuilder;
use tally_entry::fields::FormSection;
use tally_entry::service::{DataEntryRequest, ServiceError, ValidationResults, ValidationService};
use tally_entry::*;

struct AlwaysValid;

impl ValidationService for AlwaysValid {
    fn validate(&mut self, _: &DataEntryRequest) -> Result<ValidationResults, ServiceError> {
        Ok(ValidationResults::default())
    }
}

let target = EntryTarget { polling_station_id: 1, entry_number: 1 };
let mut form = FormBuilder::new(&EntryRules::DEFAULT_RULES, target)?
    .section(FormSection::Differences)?
    .build()?;

form.input_text("12345");
assert_eq!(form.focused_display().as_deref(), Some("12.345"));

assert_eq!(form.submit(&mut AlwaysValid), SubmitOutcome::Accepted);
# Ok::<(), FormErrors>(())
```
 */
pub mod acknowledgement;
pub mod builder;
mod config;
pub mod fields;
pub mod formatter;
pub mod manual;
pub mod mapper;
pub mod sequencer;
pub mod service;

use log::{debug, info, warn};

pub use crate::config::*;

use crate::acknowledgement::{requires_acknowledgement, WarningAcknowledgement};
use crate::formatter::NumericFormatter;
use crate::mapper::{annotate, Annotations, FeedbackBanner};
use crate::sequencer::{FieldSequencer, Focus, SequencerAction};
use crate::service::{build_payload, DataEntryRequest, ServiceError, ValidationResults, ValidationService};

/// Where the form is in its submission cycle.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FormState {
    Editing,
    /// A request is outstanding; no other submission is accepted.
    Submitting,
    /// The service reported nothing, or only acknowledged warnings.
    Accepted,
    BlockedByErrors,
    /// Warnings only, not yet acknowledged by the operator.
    AwaitingAcknowledgement,
    /// No validation response was obtained.
    TransportFailed(ServiceError),
}

impl FormState {
    /// States in which a submission completed or failed.
    pub fn is_settled(&self) -> bool {
        !matches!(self, FormState::Editing | FormState::Submitting)
    }
}

/// Transient messages for the operator, cleared by the next event.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Prompt {
    /// The operator tried to continue past warnings without confirming them.
    AcknowledgementRequired,
}

/// The input events of the form.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum InputEvent {
    /// The new raw text of the focused field, after a keystroke or a paste.
    Text(String),
    /// A line-break; `modified` is the commit signal (for example Shift+Enter).
    LineBreak { modified: bool },
    Focus(FieldPath),
    /// Explicit activation of the submit control.
    Submit,
    /// The operator confirms that the warnings were checked.
    Accept,
}

/// The result of one submission attempt.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SubmitOutcome {
    Accepted,
    BlockedByErrors,
    AwaitingAcknowledgement,
    /// No request was sent: the warnings must be acknowledged first.
    AcknowledgementRequired,
    /// No request was sent: another one is outstanding.
    Busy,
    TransportFailed(ServiceError),
    /// The response arrived for a form that was unmounted or for an older request.
    Discarded,
    /// No request was sent: the form is unmounted.
    Unmounted,
}

/// What an input event did.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum EventOutcome {
    Ignored,
    ValueChanged { field: FieldPath, display: String },
    FocusMoved(Focus),
    Submitted(SubmitOutcome),
    Acknowledged,
}

/// Identifies an outstanding request.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SubmitTicket(u64);

/// A request that was started but whose response is not applied yet.
#[derive(PartialEq, Debug, Clone)]
pub struct PendingSubmission {
    pub ticket: SubmitTicket,
    pub request: DataEntryRequest,
}

/// The state of one mounted form.
///
/// Values, focus, annotations and the acknowledgement are all owned here.
/// The annotations always come from the most recently completed submission
/// and are replaced as a whole.
#[derive(Debug, Clone)]
pub struct FormController {
    rules: EntryRules,
    formatter: NumericFormatter,
    target: EntryTarget,
    sequencer: FieldSequencer,
    defaults: FormValues,
    values: FormValues,
    // Values of other sections, sent along but not editable.
    carried: FormValues,
    state: FormState,
    outcome: Option<ValidationOutcome>,
    annotations: Annotations,
    acknowledgement: WarningAcknowledgement,
    prompt: Option<Prompt>,
    in_flight: Option<SubmitTicket>,
    next_ticket: u64,
    // Responses to tickets up to this one were started before a reset.
    reset_at: u64,
    requests_sent: u64,
    mounted: bool,
}

impl FormController {
    pub(crate) fn mount(
        rules: EntryRules,
        target: EntryTarget,
        fields: Vec<FieldPath>,
        values: FormValues,
        carried: FormValues,
    ) -> FormController {
        let annotations = Annotations::clean(&fields);
        let mut sequencer = FieldSequencer::new(fields);
        sequencer.focus_first();
        info!(
            "Mounting form for polling station {} entry {} with {} fields",
            target.polling_station_id,
            target.entry_number,
            sequencer.fields().len()
        );
        FormController {
            rules,
            formatter: NumericFormatter::new(&rules),
            target,
            sequencer,
            defaults: values.clone(),
            values,
            carried,
            state: FormState::Editing,
            outcome: None,
            annotations,
            acknowledgement: WarningAcknowledgement::new(),
            prompt: None,
            in_flight: None,
            next_ticket: 0,
            reset_at: 0,
            requests_sent: 0,
            mounted: true,
        }
    }

    // **** Accessors ****

    pub fn rules(&self) -> &EntryRules {
        &self.rules
    }

    pub fn target(&self) -> EntryTarget {
        self.target
    }

    pub fn fields(&self) -> &[FieldPath] {
        self.sequencer.fields()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &FieldPath) -> Option<u64> {
        self.values.get(field)
    }

    /// The text shown in a field.
    pub fn display(&self, field: &FieldPath) -> Option<String> {
        self.values.get(field).map(|v| self.formatter.format(v))
    }

    pub fn focused_display(&self) -> Option<String> {
        self.sequencer
            .focused_field()
            .and_then(|f| self.display(f))
    }

    pub fn focus(&self) -> Focus {
        self.sequencer.focused()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn annotation(&self, field: &FieldPath) -> Option<&FieldAnnotation> {
        self.annotations.get(field)
    }

    pub fn banner(&self) -> Option<&FeedbackBanner> {
        self.annotations.banner.as_ref()
    }

    /// The most recent validation outcome, if any submission completed.
    pub fn outcome(&self) -> Option<&ValidationOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledgement.is_accepted()
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The number of requests handed to the validation service.
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// The submit control is disabled while a request is outstanding.
    pub fn can_submit(&self) -> bool {
        self.mounted && self.in_flight.is_none()
    }

    /// All the values of the entry: the declared fields and the carried ones.
    pub fn entry_values(&self) -> FormValues {
        let mut all = self.carried.clone();
        all.extend(&self.values);
        all
    }

    /// The request body for the current values.
    pub fn payload(&self) -> serde_json::Value {
        build_payload(&self.entry_values())
    }

    // **** Events ****

    /// Dispatches one input event. Submissions are sent to the service
    /// before this returns.
    pub fn handle_event<S: ValidationService>(
        &mut self,
        event: InputEvent,
        service: &mut S,
    ) -> EventOutcome {
        self.prompt = None;
        if !self.mounted {
            debug!("handle_event: form unmounted, dropping {:?}", event);
            return EventOutcome::Ignored;
        }
        match event {
            InputEvent::Text(raw) => match self.input_text(&raw) {
                Some(display) => match self.sequencer.focused_field() {
                    Some(field) => EventOutcome::ValueChanged {
                        field: field.clone(),
                        display,
                    },
                    None => EventOutcome::Ignored,
                },
                None => EventOutcome::Ignored,
            },
            InputEvent::LineBreak { modified } => match self.sequencer.on_line_break(modified) {
                SequencerAction::Ignored => EventOutcome::Ignored,
                SequencerAction::Advanced(focus) => EventOutcome::FocusMoved(focus),
                SequencerAction::Submit => EventOutcome::Submitted(self.submit(service)),
            },
            InputEvent::Focus(field) => {
                if self.sequencer.focus(&field) {
                    EventOutcome::FocusMoved(self.sequencer.focused())
                } else {
                    debug!("handle_event: cannot focus unknown field {}", field);
                    EventOutcome::Ignored
                }
            }
            InputEvent::Submit => EventOutcome::Submitted(self.submit(service)),
            InputEvent::Accept => {
                if self.accept_warnings() {
                    EventOutcome::Acknowledged
                } else {
                    EventOutcome::Ignored
                }
            }
        }
    }

    /// Replaces the text of the focused field and returns the canonical text.
    ///
    /// Returns None if no field has the focus or a request is outstanding.
    pub fn input_text(&mut self, raw: &str) -> Option<String> {
        if self.state == FormState::Submitting {
            debug!("input_text: request outstanding, keystroke dropped");
            return None;
        }
        let field = self.sequencer.focused_field()?.clone();
        let value = self.formatter.parse(raw);
        let previous = self.values.set(field.clone(), value);
        if previous != Some(value) {
            debug!("input_text: {} {:?} -> {}", field, previous, value);
            self.acknowledgement.reset();
        }
        if self.state.is_settled() {
            // The last annotations stay visible until the next response.
            self.state = FormState::Editing;
        }
        Some(self.formatter.format(value))
    }

    /// Confirms the warnings of the current outcome. Returns false if there
    /// is nothing to confirm.
    pub fn accept_warnings(&mut self) -> bool {
        if self.state != FormState::AwaitingAcknowledgement {
            debug!("accept_warnings: nothing to acknowledge in state {:?}", self.state);
            return false;
        }
        self.acknowledgement.accept();
        self.prompt = None;
        info!("Warnings acknowledged by the operator");
        true
    }

    // **** Submission ****

    /// Sends the current values and applies the response.
    pub fn submit<S: ValidationService>(&mut self, service: &mut S) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(p) => p,
            Err(o) => return o,
        };
        let response = service.validate(&pending.request);
        self.complete_submit(pending.ticket, response)
    }

    /// Starts a submission. The caller sends the request and hands the
    /// response to [`FormController::complete_submit`].
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        if !self.mounted {
            return Err(SubmitOutcome::Unmounted);
        }
        if self.in_flight.is_some() {
            debug!("begin_submit: a request is already outstanding");
            return Err(SubmitOutcome::Busy);
        }
        if self.state == FormState::AwaitingAcknowledgement && !self.acknowledgement.is_accepted()
        {
            info!("Submission refused: warnings must be acknowledged first");
            self.prompt = Some(Prompt::AcknowledgementRequired);
            return Err(SubmitOutcome::AcknowledgementRequired);
        }
        self.next_ticket += 1;
        let ticket = SubmitTicket(self.next_ticket);
        self.in_flight = Some(ticket);
        self.state = FormState::Submitting;
        self.prompt = None;
        self.requests_sent += 1;
        let request = DataEntryRequest {
            target: self.target,
            body: self.payload(),
        };
        info!("Submitting {} ({} values)", request.path(), self.values.len());
        Ok(PendingSubmission { ticket, request })
    }

    /// Applies the response of a request started with [`FormController::begin_submit`].
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        response: Result<ValidationResults, ServiceError>,
    ) -> SubmitOutcome {
        if !self.mounted {
            debug!("complete_submit: form unmounted, response discarded");
            return SubmitOutcome::Discarded;
        }
        if self.in_flight != Some(ticket) {
            debug!("complete_submit: stale ticket {:?}, response discarded", ticket);
            return SubmitOutcome::Discarded;
        }
        self.in_flight = None;
        if ticket.0 <= self.reset_at {
            debug!("complete_submit: form was reset, response to {:?} discarded", ticket);
            return SubmitOutcome::Discarded;
        }

        let results = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("Submission failed: {}", e);
                self.state = FormState::TransportFailed(e.clone());
                return SubmitOutcome::TransportFailed(e);
            }
        };

        let outcome = ValidationOutcome::from(results);
        self.acknowledgement.observe(&outcome);
        self.annotations = annotate(&outcome, self.sequencer.fields());
        info!(
            "Validation outcome: {} errors, {} warnings",
            outcome.errors.len(),
            outcome.warnings.len()
        );

        let res = if outcome.has_errors() {
            self.state = FormState::BlockedByErrors;
            SubmitOutcome::BlockedByErrors
        } else if requires_acknowledgement(&outcome) && !self.acknowledgement.permits(&outcome) {
            self.state = FormState::AwaitingAcknowledgement;
            SubmitOutcome::AwaitingAcknowledgement
        } else {
            self.state = FormState::Accepted;
            SubmitOutcome::Accepted
        };
        self.outcome = Some(outcome);
        res
    }

    // **** Lifecycle ****

    /// Puts the form back in its mounted state: default values, no
    /// annotations, focus on the first field.
    ///
    /// A request that is still outstanding keeps the submit control disabled
    /// until its response arrives; that response is then discarded.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.state = FormState::Editing;
        self.outcome = None;
        self.annotations = Annotations::clean(self.sequencer.fields());
        self.acknowledgement = WarningAcknowledgement::new();
        self.prompt = None;
        self.reset_at = self.next_ticket;
        self.sequencer.focus_first();
    }

    /// Tears the form down. A response that arrives later is ignored.
    pub fn unmount(&mut self) {
        if self.in_flight.is_some() {
            info!("Unmounting with a request outstanding, its response will be ignored");
        }
        self.in_flight = None;
        self.mounted = false;
        self.sequencer.blur();
    }
}
