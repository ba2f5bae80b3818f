pub use crate::config::*;

use std::collections::HashSet;

use crate::fields::FormSection;
use crate::FormController;

/// A builder for mounting a form.
///
/// ```
/// pub use tally_entry::builder::FormBuilder;
/// pub use tally_entry::fields::FormSection;
/// pub use tally_entry::{EntryRules, EntryTarget};
/// # use tally_entry::FormErrors;
///
/// let target = EntryTarget { polling_station_id: 1, entry_number: 1 };
/// let form = FormBuilder::new(&EntryRules::DEFAULT_RULES, target)?
///     .section(FormSection::Differences)?
///     .build()?;
///
/// assert_eq!(form.fields().len(), 7);
///
/// # Ok::<(), FormErrors>(())
/// ```
pub struct FormBuilder {
    pub(crate) _rules: EntryRules,
    pub(crate) _target: EntryTarget,
    pub(crate) _fields: Vec<FieldPath>,
    pub(crate) _defaults: FormValues,
}

impl FormBuilder {
    pub fn new(rules: &EntryRules, target: EntryTarget) -> Result<FormBuilder, FormErrors> {
        if !(1..=18).contains(&rules.max_digits) {
            return Err(FormErrors::InvalidMaxDigits(rules.max_digits));
        }
        Ok(FormBuilder {
            _rules: *rules,
            _target: target,
            _fields: Vec::new(),
            _defaults: FormValues::new(),
        })
    }

    /// Declares the fields of one section of the entry.
    pub fn section(self, section: FormSection) -> Result<FormBuilder, FormErrors> {
        self.fields(&section.fields())
    }

    /// Declares the fields, in focus order.
    pub fn fields(self, fields: &[FieldPath]) -> Result<FormBuilder, FormErrors> {
        let mut seen: HashSet<&FieldPath> = HashSet::new();
        for f in fields {
            if !seen.insert(f) {
                return Err(FormErrors::DuplicateField(f.clone()));
            }
        }
        Ok(FormBuilder {
            _fields: fields.to_vec(),
            ..self
        })
    }

    /// Starting values. Values for fields that are not declared are kept and
    /// sent along with every submission, but cannot be edited.
    pub fn defaults(mut self, values: &FormValues) -> Result<FormBuilder, FormErrors> {
        for (f, v) in values.iter() {
            self.default_value(f.clone(), *v)?;
        }
        Ok(self)
    }

    pub fn default_value(&mut self, field: FieldPath, value: u64) -> Result<(), FormErrors> {
        if value > self._rules.max_value() {
            return Err(FormErrors::ValueOutOfRange { field, value });
        }
        self._defaults.set(field, value);
        Ok(())
    }

    pub fn build(self) -> Result<FormController, FormErrors> {
        if self._fields.is_empty() {
            return Err(FormErrors::EmptyForm);
        }
        let mut declared = FormValues::zeroed(&self._fields);
        let mut carried = FormValues::new();
        for (f, v) in self._defaults.iter() {
            if declared.contains(f) {
                declared.set(f.clone(), *v);
            } else {
                carried.set(f.clone(), *v);
            }
        }
        Ok(FormController::mount(
            self._rules,
            self._target,
            self._fields,
            declared,
            carried,
        ))
    }
}
