//! Form state for creating and editing entities.
//!
//! A [`FormController`] holds the draft being edited, validates it with the
//! entity's rules and only then hands it to an [`EntityCache`] mutation.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::ApiError;
use crate::cache::EntityCache;
use crate::gateway::Repository;
use crate::models::Entity;

pub mod assessment;
pub mod auth;
pub mod exercise;
pub mod student;

pub use assessment::{AssessmentErrors, AssessmentField, AssessmentForm, AssessmentInput, MeasurementField};
pub use auth::{AuthFormError, SignInForm, SignUpForm};
pub use exercise::{ExerciseField, ExerciseForm, ExerciseInput};
pub use student::{StudentField, StudentForm, StudentInput};

/// A named, editable field of a form
pub trait FormField: Copy + Ord + Debug + 'static {
    /// Every field, in display order
    const ALL: &'static [Self];

    /// Wire/error key, e.g. `birth_date`
    fn key(&self) -> &'static str;

    /// Human label
    fn label(&self) -> &'static str;
}

/// Per-field validation messages
pub trait FormErrors<F>: Default + Clone + Debug + PartialEq {
    fn is_empty(&self) -> bool;

    fn message(&self, field: F) -> Option<&str>;

    /// Forget the message for `field`
    fn clear(&mut self, field: F);

    /// `(key, message)` pairs for display; nested keys are dotted
    fn entries(&self) -> Vec<(String, String)>;
}

/// Flat field → message map
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors<F: Ord>(BTreeMap<F, String>);

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: FormField> FieldErrors<F> {
    pub fn insert(&mut self, field: F, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: F) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.0.keys().copied()
    }
}

impl<F: FormField> FormErrors<F> for FieldErrors<F> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn message(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    fn clear(&mut self, field: F) {
        self.0.remove(&field);
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(field, message)| (field.key().to_string(), message.clone()))
            .collect()
    }
}

/// Entity-specific half of a form: field parsing and validation rules
pub trait FormModel {
    type Field: FormField;
    type Record: Entity;
    /// Editable state, numerics already parsed
    type Input: Clone + Debug + PartialEq;
    type Draft;
    type Patch;
    type Errors: FormErrors<Self::Field>;

    /// Draft for a new record
    fn defaults() -> Self::Input;

    /// Draft pre-filled from an existing record
    fn from_record(record: &Self::Record) -> Self::Input;

    /// Apply raw text typed into `field`
    fn set_field(input: &mut Self::Input, field: Self::Field, raw: &str);

    /// Current value of `field` as text
    fn field_text(input: &Self::Input, field: Self::Field) -> String;

    /// Check every rule; all violations are reported together
    fn validate(input: &Self::Input) -> Result<Self::Draft, Self::Errors>;

    /// Full-field patch used when saving an edit
    fn patch(draft: &Self::Draft) -> Self::Patch;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Please fix the highlighted fields")]
    Invalid,

    #[error("A save is already in progress")]
    Busy,

    #[error("The form is not open")]
    Closed,

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Modal-style form: open for a new or existing record, edit, submit, close
#[derive(Debug, Clone)]
pub struct FormController<M: FormModel> {
    input: M::Input,
    editing: Option<String>,
    errors: M::Errors,
    open: bool,
    submitting: bool,
}

impl<M: FormModel> Default for FormController<M> {
    fn default() -> Self {
        Self {
            input: M::defaults(),
            editing: None,
            errors: M::Errors::default(),
            open: false,
            submitting: false,
        }
    }
}

impl<M: FormModel> FormController<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_new(&mut self) {
        self.open_new_with(M::defaults());
    }

    /// Open for a new record with a prepared draft
    pub fn open_new_with(&mut self, input: M::Input) {
        self.input = input;
        self.editing = None;
        self.errors = M::Errors::default();
        self.open = true;
    }

    pub fn open_edit(&mut self, record: &M::Record) {
        self.input = M::from_record(record);
        self.editing = Some(record.id().to_string());
        self.errors = M::Errors::default();
        self.open = true;
    }

    /// Reset the draft and errors whether or not anything was saved
    pub fn close(&mut self) {
        self.input = M::defaults();
        self.editing = None;
        self.errors = M::Errors::default();
        self.open = false;
        self.submitting = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Id of the record being edited; `None` when creating
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn input(&self) -> &M::Input {
        &self.input
    }

    pub fn errors(&self) -> &M::Errors {
        &self.errors
    }

    pub fn field_text(&self, field: M::Field) -> String {
        M::field_text(&self.input, field)
    }

    /// Edit one field; only that field's error is cleared
    pub fn set_field(&mut self, field: M::Field, raw: &str) {
        M::set_field(&mut self.input, field, raw);
        self.errors.clear(field);
    }

    /// Run the rules, replacing the error set
    pub fn validate(&mut self) -> bool {
        match M::validate(&self.input) {
            Ok(_) => {
                self.errors = M::Errors::default();
                true
            }
            Err(errors) => {
                self.errors = errors;
                false
            }
        }
    }

    /// Validate and mark a save as in flight
    pub fn begin_submit(&mut self) -> Result<M::Draft, SubmitError> {
        if !self.open {
            return Err(SubmitError::Closed);
        }
        if self.submitting {
            return Err(SubmitError::Busy);
        }

        let draft = match M::validate(&self.input) {
            Ok(draft) => draft,
            Err(errors) => {
                self.errors = errors;
                return Err(SubmitError::Invalid);
            }
        };

        self.errors = M::Errors::default();
        self.submitting = true;
        Ok(draft)
    }

    /// Settle an in-flight save: success closes the form, failure keeps the
    /// draft for another attempt
    pub fn finish_submit<T>(&mut self, result: Result<T, ApiError>) -> Result<T, SubmitError> {
        self.submitting = false;
        match result {
            Ok(value) => {
                self.close();
                Ok(value)
            }
            Err(e) => Err(SubmitError::Remote(e)),
        }
    }

    /// Validate, then create or update through `cache`
    pub async fn submit<R>(&mut self, cache: &mut EntityCache<R>) -> Result<M::Record, SubmitError>
    where
        R: Repository<Record = M::Record, Draft = M::Draft, Patch = M::Patch>,
    {
        let draft = self.begin_submit()?;

        let result = match self.editing.clone() {
            Some(id) => cache.update(&id, &M::patch(&draft)).await,
            None => cache.create(&draft).await,
        };

        self.finish_submit(result)
    }
}

// ----------------------------------------------------------------------
// Shared field parsing
// ----------------------------------------------------------------------

/// Lenient number parsing: blanks and garbage become 0, a decimal comma is
/// accepted
pub(crate) fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "y" | "yes" | "true" | "1" | "on" | "sim" | "s"
    )
}

/// Accepts `yyyy-mm-dd` and `dd/mm/yyyy`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

pub(crate) fn number_text(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        value.to_string()
    }
}
