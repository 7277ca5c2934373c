//! In-memory collaborators for tests and examples.
//!
//! `MemoryEngine` is a toy row store that records every call it receives,
//! `StubValidator` returns a programmed outcome, and `RecordingBus` keeps
//! the emitted events. None of these are meant for production use.

use std::cell::RefCell;
use std::collections::BTreeMap;

use activerow_core::{AttrMap, ErrorSet, ModelSchema, Result, RuleMap, Value};

use crate::engine::{Event, EventBus, QueryEngine, ValidationEngine, ValidationOutcome};
use crate::record::Record;

/// Toy in-memory query engine keyed by integer ids.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    next_id: i64,
    tables: BTreeMap<String, BTreeMap<i64, AttrMap>>,
    /// Recorded update calls: (table, key, changes)
    pub updates: Vec<(String, Value, AttrMap)>,
    /// Recorded insert calls: (table, attributes)
    pub inserts: Vec<(String, AttrMap)>,
    /// Recorded delete calls: (table, key)
    pub deletes: Vec<(String, Value)>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Start generated ids at `next_id`.
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }

    /// Pre-load a row so updates and deletes have something to hit.
    pub fn seed(&mut self, table: &str, id: i64, row: AttrMap) {
        self.tables.entry(table.to_string()).or_default().insert(id, row);
    }

    /// Look at a stored row.
    pub fn row(&self, table: &str, id: i64) -> Option<&AttrMap> {
        self.tables.get(table)?.get(&id)
    }
}

impl QueryEngine for MemoryEngine {
    fn update(&mut self, schema: &ModelSchema, key: &Value, changes: &AttrMap) -> Result<u64> {
        self.updates
            .push((schema.table.clone(), key.clone(), changes.clone()));

        let Some(id) = key.as_i64() else {
            return Ok(0);
        };
        match self
            .tables
            .get_mut(&schema.table)
            .and_then(|rows| rows.get_mut(&id))
        {
            Some(row) => {
                row.extend(changes.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn insert(
        &mut self,
        schema: &ModelSchema,
        attributes: &AttrMap,
        _sequence: Option<&str>,
    ) -> Result<Value> {
        self.inserts.push((schema.table.clone(), attributes.clone()));

        let id = self.next_id;
        self.next_id += 1;

        let mut row = attributes.clone();
        row.insert(schema.key.clone(), Value::Int(id));
        self.tables
            .entry(schema.table.clone())
            .or_default()
            .insert(id, row);

        Ok(Value::Int(id))
    }

    fn delete(&mut self, schema: &ModelSchema, key: &Value) -> Result<u64> {
        self.deletes.push((schema.table.clone(), key.clone()));

        let Some(id) = key.as_i64() else {
            return Ok(0);
        };
        let removed = self
            .tables
            .get_mut(&schema.table)
            .and_then(|rows| rows.remove(&id));
        Ok(u64::from(removed.is_some()))
    }
}

/// Validation engine with a programmed outcome that records its calls.
#[derive(Debug, Default)]
pub struct StubValidator {
    errors: Option<ErrorSet>,
    calls: RefCell<Vec<(AttrMap, RuleMap)>>,
}

impl StubValidator {
    /// Always passes.
    pub fn valid() -> Self {
        Self::default()
    }

    /// Always fails with one recorded field error.
    pub fn invalid_with(field: &str, rule: &str, message: &str) -> Self {
        let mut errors = ErrorSet::new();
        errors.add(field, rule, message);
        Self {
            errors: Some(errors),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Number of times `validate` was called.
    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Data and rules from the most recent call.
    pub fn last_call(&self) -> Option<(AttrMap, RuleMap)> {
        self.calls.borrow().last().cloned()
    }
}

impl ValidationEngine for StubValidator {
    fn validate(&self, data: &AttrMap, rules: &RuleMap, _messages: &RuleMap) -> ValidationOutcome {
        self.calls.borrow_mut().push((data.clone(), rules.clone()));
        match &self.errors {
            Some(errors) => ValidationOutcome::invalid(errors.clone()),
            None => ValidationOutcome::valid(),
        }
    }
}

/// Event bus that remembers everything emitted, with the record rendering
/// at emit time.
#[derive(Debug, Default)]
pub struct RecordingBus {
    pub events: Vec<(Event, String)>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Just the event names, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(|(event, _)| event.as_str()).collect()
    }
}

impl EventBus for RecordingBus {
    fn emit(&mut self, event: Event, record: &Record) {
        self.events.push((event, record.to_string()));
    }
}
