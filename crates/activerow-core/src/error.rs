//! Error types for Activerow operations.
//!
//! Validation failures are recoverable and reported through booleans plus
//! the record's error set; `Error::Validation` only occurs when the caller
//! opts into exception-style reporting. Attribute-access and coercion
//! failures are programmer errors and propagate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The primary error type for all Activerow operations.
#[derive(Debug)]
pub enum Error {
    /// Query engine errors (statement execution failed outright)
    Query(QueryError),
    /// Type coercion errors (malformed date-like raw values and the like)
    Type(TypeError),
    /// Access to a name that resolves to nothing
    Attribute(AttributeError),
    /// Validation failure, raised only under exception-style reporting
    Validation(ErrorSet),
    /// Custom error with message
    Custom(String),
}

/// Error surfaced by the external query engine.
#[derive(Debug)]
pub struct QueryError {
    pub table: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Failed conversion between a raw value and its typed form.
#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub field: Option<String>,
}

/// Access to an attribute that is neither stored, resolvable, nor declared.
#[derive(Debug)]
pub struct AttributeError {
    pub name: String,
    pub table: String,
}

/// Structured validation errors, grouped per field.
///
/// This is the shape the validation engine reports and the shape stored on
/// the record after a failed validation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSet {
    pub errors: Vec<FieldError>,
}

/// A single validation error for a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The field that failed validation
    pub field: String,
    /// The rule that was violated (e.g. `required`, `min`)
    pub rule: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorSet {
    /// Create a new empty error set.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Record an error for a field.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        });
    }

    /// Drop all recorded errors.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// First message recorded for a field, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// All messages recorded for a field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Convert to Result: `Ok(())` when empty, `Err(self)` otherwise.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Query(e) => write!(f, "Query error: {}", e),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Attribute(e) => write!(f, "Attribute error: {}", e),
            Error::Validation(e) => write!(f, "Validation failed: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{} (table '{}')", self.message, table),
            None => write!(f, "{}", self.message),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "expected {} for '{}', found '{}'",
                self.expected, field, self.actual
            ),
            None => write!(f, "expected {}, found '{}'", self.expected, self.actual),
        }
    }
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no attribute, relationship, or accessible field '{}' on '{}'",
            self.name, self.table
        )
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "no errors")
        } else if self.errors.len() == 1 {
            let err = &self.errors[0];
            write!(f, "'{}': {}", err.field, err.message)
        } else {
            writeln!(f, "{} errors:", self.errors.len())?;
            for err in &self.errors {
                writeln!(f, "  - {}: {}", err.field, err.message)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ErrorSet {}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<AttributeError> for Error {
    fn from(err: AttributeError) -> Self {
        Error::Attribute(err)
    }
}

impl From<ErrorSet> for Error {
    fn from(err: ErrorSet) -> Self {
        Error::Validation(err)
    }
}

/// Result type alias for Activerow operations.
pub type Result<T> = std::result::Result<T, Error>;
