//! Shared types for the eVision download robot

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing strongly typed values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid student number: {0:?} (expected 8 digits)")]
    InvalidStudentNumber(String),
}

/// Strongly typed student number - always exactly 8 ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentNumber(String);

impl StudentNumber {
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(TypeError::InvalidStudentNumber(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the applicant currently shown in the application window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub student_number: StudentNumber,
    pub surname: String,
    pub preferred_name: String,
}

impl Applicant {
    pub fn new(student_number: StudentNumber, surname: impl Into<String>, preferred_name: impl Into<String>) -> Self {
        Self {
            student_number,
            surname: surname.into(),
            preferred_name: preferred_name.into(),
        }
    }
}

impl fmt::Display for Applicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Applicant {}, {} ({})", self.surname, self.preferred_name, self.student_number)
    }
}

/// Composite document id: the checkbox's `name` and `value` attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId {
    pub field: String,
    pub value: String,
}

impl DocumentId {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.field, self.value)
    }
}

/// A document offered for inclusion in the merged applicant PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub description: String,
}

/// Documents listed on the "Manage Applicant PDF" page, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet(Vec<Document>);

impl DocumentSet {
    pub fn new(documents: Vec<Document>) -> Self {
        Self(documents)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &DocumentId> {
        self.0.iter().map(|d| &d.id)
    }

    pub fn description(&self, id: &DocumentId) -> Option<&str> {
        self.0
            .iter()
            .find(|d| &d.id == id)
            .map(|d| d.description.as_str())
    }

    /// Descriptions for the given ids, skipping ids that are not in the set
    pub fn descriptions<'a>(&self, ids: impl IntoIterator<Item = &'a DocumentId>) -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| self.description(id))
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Display for DocumentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptions: Vec<&str> = self.0.iter().map(|d| d.description.as_str()).collect();
        write!(f, "{:?}", descriptions)
    }
}

/// Opaque WebDriver handle of a top-level browser window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(String);

impl WindowHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WindowHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}
