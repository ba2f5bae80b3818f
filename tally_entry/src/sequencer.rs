use log::debug;

use crate::config::FieldPath;

/// Where the keyboard focus currently is.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Focus {
    Unfocused,
    Field(FieldPath),
    /// The control that submits the form, after the last field.
    SubmitControl,
}

/// What a line-break means for the form.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SequencerAction {
    /// Plain line-breaks are swallowed.
    Ignored,
    /// The focus moved to the given position.
    Advanced(Focus),
    /// A commit signal was received on the submit control.
    Submit,
}

/// Owns the order of the fields and the focus position.
///
/// Only the commit signal (a line-break with a modifier) moves the focus. A
/// plain line-break never advances nor submits: keyboard auto-repeat or an
/// input method confirming a composition must not skip fields.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FieldSequencer {
    fields: Vec<FieldPath>,
    // `fields.len()` stands for the submit control.
    position: Option<usize>,
}

impl FieldSequencer {
    pub fn new(fields: Vec<FieldPath>) -> FieldSequencer {
        FieldSequencer {
            fields,
            position: None,
        }
    }

    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    pub fn focus_first(&mut self) -> Focus {
        self.position = Some(0);
        self.focused()
    }

    pub fn focused(&self) -> Focus {
        match self.position {
            None => Focus::Unfocused,
            Some(idx) => match self.fields.get(idx) {
                Some(f) => Focus::Field(f.clone()),
                None => Focus::SubmitControl,
            },
        }
    }

    pub fn focused_field(&self) -> Option<&FieldPath> {
        self.position.and_then(|idx| self.fields.get(idx))
    }

    /// Moves to the next field, or to the submit control after the last one.
    /// The submit control is terminal.
    pub fn advance(&mut self) -> Focus {
        let next = match self.position {
            None => 0,
            Some(idx) => (idx + 1).min(self.fields.len()),
        };
        self.position = Some(next);
        let focus = self.focused();
        debug!("advance: focus moved to {:?}", focus);
        focus
    }

    /// Puts the focus on a given field, for example after a click.
    /// Returns false if the field is not part of the sequence.
    pub fn focus(&mut self, field: &FieldPath) -> bool {
        match self.fields.iter().position(|f| f == field) {
            Some(idx) => {
                self.position = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn focus_submit(&mut self) -> Focus {
        self.position = Some(self.fields.len());
        self.focused()
    }

    pub fn blur(&mut self) {
        self.position = None;
    }

    pub fn on_line_break(&mut self, modified: bool) -> SequencerAction {
        if !modified {
            debug!("on_line_break: plain line-break at {:?} swallowed", self.position);
            return SequencerAction::Ignored;
        }
        match self.focused() {
            Focus::SubmitControl => SequencerAction::Submit,
            _ => SequencerAction::Advanced(self.advance()),
        }
    }
}
