//! Collaborator contracts: query engine, validation engine, and event bus.
//!
//! The lifecycle core owns none of these; it consumes them through traits
//! and bundles them in a `Cx` passed to every operation.

use activerow_core::{AttrMap, ErrorSet, ModelSchema, Result, RuleMap, Value};

use crate::record::Record;

/// The external query/persistence engine.
///
/// Every call is scoped by the record's key (or inserts a fresh row), which
/// is the only scoping the lifecycle core ever needs.
pub trait QueryEngine {
    /// Execute a key-scoped update with the given changed attributes.
    /// Returns the affected row count.
    fn update(&mut self, schema: &ModelSchema, key: &Value, changes: &AttrMap) -> Result<u64>;

    /// Insert a row with the given attributes, optionally consuming a
    /// key-generation sequence. Returns the generated key.
    fn insert(
        &mut self,
        schema: &ModelSchema,
        attributes: &AttrMap,
        sequence: Option<&str>,
    ) -> Result<Value>;

    /// Execute a key-scoped delete. Returns the affected row count.
    fn delete(&mut self, schema: &ModelSchema, key: &Value) -> Result<u64>;
}

/// Result of one validation engine run.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: ErrorSet,
}

impl ValidationOutcome {
    /// A passing outcome.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: ErrorSet::new(),
        }
    }

    /// A failing outcome carrying the structured errors.
    pub fn invalid(errors: ErrorSet) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// The external validation engine.
pub trait ValidationEngine {
    /// Validate `data` against `rules`, using `messages` for overrides.
    fn validate(&self, data: &AttrMap, rules: &RuleMap, messages: &RuleMap) -> ValidationOutcome;
}

/// Notifications emitted after successful persistence steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Created,
    Updated,
    Saved,
}

impl Event {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Event::Created => "created",
            Event::Updated => "updated",
            Event::Saved => "saved",
        }
    }
}

/// Fire-and-forget notification bus. Nothing the bus does feeds back into
/// the save outcome.
pub trait EventBus {
    fn emit(&mut self, event: Event, record: &Record);
}

/// The collaborator bundle handed to every lifecycle operation.
pub struct Cx<'a> {
    pub queries: &'a mut dyn QueryEngine,
    pub validator: &'a dyn ValidationEngine,
    pub events: &'a mut dyn EventBus,
}

impl<'a> Cx<'a> {
    pub fn new(
        queries: &'a mut dyn QueryEngine,
        validator: &'a dyn ValidationEngine,
        events: &'a mut dyn EventBus,
    ) -> Self {
        Self {
            queries,
            validator,
            events,
        }
    }
}
