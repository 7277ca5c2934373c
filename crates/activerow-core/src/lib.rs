//! Core types for Activerow.
//!
//! This crate provides the foundational pieces of the record lifecycle engine:
//!
//! - `Value` — dynamically-typed attribute values
//! - `DateTime` — the date-time value object and its null sentinel
//! - `Error` / `ErrorSet` — the error taxonomy and structured validation errors
//! - `ModelSchema` — per-record-type configuration (table, key, rules, accessible fields)
//! - `AttributeStore` — raw attribute storage, original snapshot, and dirty computation

pub mod attributes;
pub mod datetime;
pub mod error;
pub mod schema;
pub mod value;

pub use attributes::{AttrMap, AttributeStore};
pub use datetime::{DISPLAY_FORMAT, DateTime, STORAGE_FORMAT};
pub use error::{AttributeError, Error, ErrorSet, FieldError, QueryError, Result, TypeError};
pub use schema::{CREATED_AT, ModelSchema, RuleMap, UPDATED_AT};
pub use value::Value;
