//! Field validation for student create/update requests
//!
//! Validation collects every field problem before failing so a client sees
//! all of them in one response.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::models::{Grade, StudentInput};

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field errors found in one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }

    fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Fully validated fields for a new record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStudent {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub grade: Grade,
    pub father_name: String,
    pub mother_name: String,
    pub contact: String,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Validated partial update
///
/// `None` leaves a column untouched. For the optional columns,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPatch {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub grade: Option<Grade>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub contact: Option<String>,
    pub photo_url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl StudentInput {
    /// Validate as a create request: every required field must be present
    pub fn validate_new(&self) -> Result<ValidStudent, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let full_name = full_name(&mut errors, self.full_name.as_deref());
        let date_of_birth = match self.date_of_birth.as_deref() {
            Some(raw) => date(&mut errors, raw),
            None => {
                errors.push("dateOfBirth", "is required");
                None
            }
        };
        let grade = match &self.grade {
            Some(input) => grade(&mut errors, input),
            None => {
                errors.push("grade", "is required");
                None
            }
        };
        let father_name = required_text(&mut errors, "fatherName", self.father_name.as_deref());
        let mother_name = required_text(&mut errors, "motherName", self.mother_name.as_deref());
        let contact = required_text(&mut errors, "contact", self.contact.as_deref());
        let photo_url = optional_text(self.photo_url.as_deref());
        let notes = optional_text(self.notes.as_deref());

        match (full_name, date_of_birth, grade, father_name, mother_name, contact) {
            (Some(full_name), Some(date_of_birth), Some(grade), Some(father_name), Some(mother_name), Some(contact))
                if errors.is_empty() =>
            {
                Ok(ValidStudent {
                    full_name,
                    date_of_birth,
                    grade,
                    father_name,
                    mother_name,
                    contact,
                    photo_url,
                    notes,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate as an update request: only supplied fields are checked
    ///
    /// A supplied required field must still be non-empty; an empty optional
    /// field clears it.
    pub fn validate_patch(&self) -> Result<ValidPatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let patch = ValidPatch {
            full_name: self
                .full_name
                .as_deref()
                .and_then(|v| full_name(&mut errors, Some(v))),
            date_of_birth: self
                .date_of_birth
                .as_deref()
                .and_then(|v| date(&mut errors, v)),
            grade: self.grade.as_ref().and_then(|v| grade(&mut errors, v)),
            father_name: self
                .father_name
                .as_deref()
                .and_then(|v| required_text(&mut errors, "fatherName", Some(v))),
            mother_name: self
                .mother_name
                .as_deref()
                .and_then(|v| required_text(&mut errors, "motherName", Some(v))),
            contact: self
                .contact
                .as_deref()
                .and_then(|v| required_text(&mut errors, "contact", Some(v))),
            photo_url: self.photo_url.as_deref().map(|v| optional_text(Some(v))),
            notes: self.notes.as_deref().map(|v| optional_text(Some(v))),
        };

        errors.into_result(patch)
    }
}

/// Full name is the only field stored trimmed
fn full_name(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    required_text(errors, "fullName", value).map(|v| v.trim().to_string())
}

/// Non-blank text, stored as given
fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v.to_string()),
        _ => {
            errors.push(field, "is required");
            None
        }
    }
}

/// Blank means absent; anything else is stored as given
fn optional_text(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part is kept)
fn date(errors: &mut ValidationErrors, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.push("dateOfBirth", "is required");
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            errors.push("dateOfBirth", format!("'{}' is not a calendar date (YYYY-MM-DD)", raw));
            None
        })
}

fn grade(errors: &mut ValidationErrors, input: &crate::models::GradeInput) -> Option<Grade> {
    input.to_grade().or_else(|| {
        let allowed: Vec<&str> = Grade::ALL.iter().map(|g| g.as_str()).collect();
        errors.push("grade", format!("must be one of {}", allowed.join(", ")));
        None
    })
}
