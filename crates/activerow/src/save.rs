//! The save/create/update/delete state machine.
//!
//! Hook order for a successful create is exactly: `before_validation`,
//! `after_validation`, `before_save`, `before_create`, `after_create`,
//! `after_save`; updates substitute the update pair. Success is exactly one
//! affected row (update) or a numeric generated key (insert); a mismatch is
//! a `false` return, not an error.

use std::sync::Arc;

use activerow_core::{AttrMap, CREATED_AT, DateTime, ModelSchema, Result, UPDATED_AT, Value};

use crate::engine::{Cx, Event};
use crate::hooks::{Hook, Hooks};
use crate::record::Record;
use crate::validate::OnInvalid;

/// Knobs for a single save call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Skip validation entirely.
    pub force: bool,
    /// Report validation failure as `Error::Validation` instead of `false`.
    pub raise_on_invalid: bool,
}

impl Record {
    /// Persist the record with default options.
    pub fn save(&mut self, cx: &mut Cx<'_>) -> Result<bool> {
        self.save_with(cx, SaveOptions::default())
    }

    /// Persist the record: validate, fire hooks, insert or update, emit
    /// events, and reset the dirty baseline on success.
    pub fn save_with(&mut self, cx: &mut Cx<'_>, options: SaveOptions) -> Result<bool> {
        if self.schema().timestamps {
            self.stamp_timestamps();
        }

        if !options.force {
            let on_invalid = if options.raise_on_invalid {
                OnInvalid::Raise
            } else {
                OnInvalid::Report
            };
            if !self.is_valid(&*cx, on_invalid)? {
                return Ok(false);
            }
        }

        self.invoke(Hook::BeforeSave);

        let result = if self.exists() {
            self.update_row(cx)?
        } else {
            self.insert_row(cx)?
        };

        self.invoke(Hook::AfterSave);

        if result {
            cx.events.emit(Event::Saved, self);
            self.store_mut().snapshot();
        }

        Ok(result)
    }

    /// Update path: key-scoped update with only the dirty subset; success
    /// is exactly one affected row.
    fn update_row(&mut self, cx: &mut Cx<'_>) -> Result<bool> {
        self.invoke(Hook::BeforeUpdate);

        let changes = self.dirty();
        let key = self.key();
        let affected = cx.queries.update(self.schema(), &key, &changes)?;
        let result = affected == 1;

        tracing::debug!(
            table = %self.schema().table,
            affected,
            changed = changes.len(),
            "updated record"
        );

        if result {
            cx.events.emit(Event::Updated, self);
        }
        self.invoke(Hook::AfterUpdate);

        Ok(result)
    }

    /// Create path: insert all attributes, adopt the generated key; success
    /// is a numeric key, and only then does the record start to exist.
    fn insert_row(&mut self, cx: &mut Cx<'_>) -> Result<bool> {
        self.invoke(Hook::BeforeCreate);

        let sequence = self.schema().sequence.clone();
        let id = cx
            .queries
            .insert(self.schema(), self.attributes(), sequence.as_deref())?;

        let result = id.is_numeric();
        self.set_key(id);
        self.set_exists(result);

        tracing::debug!(
            table = %self.schema().table,
            key = ?self.key(),
            created = result,
            "inserted record"
        );

        if result {
            cx.events.emit(Event::Created, self);
        }
        self.invoke(Hook::AfterCreate);

        Ok(result)
    }

    /// Remove the record's row. No validation; hooks fire around the call.
    pub fn delete(&mut self, cx: &mut Cx<'_>) -> Result<u64> {
        self.invoke(Hook::BeforeDelete);
        let key = self.key();
        let affected = cx.queries.delete(self.schema(), &key)?;
        self.invoke(Hook::AfterDelete);
        Ok(affected)
    }

    /// Stamp `updated_at` (and `created_at` for a new record).
    fn stamp_timestamps(&mut self) {
        let now = Value::DateTime(DateTime::now());
        if !self.exists() {
            self.store_mut().set(CREATED_AT, now.clone());
        }
        self.store_mut().set(UPDATED_AT, now);
    }
}

/// Build a fresh record from `attributes` and save it. Returns the record
/// on success, `None` on a validation or persistence failure — never a
/// partially-saved record.
pub fn create(
    cx: &mut Cx<'_>,
    schema: Arc<ModelSchema>,
    attributes: AttrMap,
) -> Result<Option<Record>> {
    create_with(cx, schema, attributes, SaveOptions::default())
}

/// `create` with explicit save options.
pub fn create_with(
    cx: &mut Cx<'_>,
    schema: Arc<ModelSchema>,
    attributes: AttrMap,
    options: SaveOptions,
) -> Result<Option<Record>> {
    let mut record = Record::with_attributes(schema, attributes)?;
    let saved = record.save_with(cx, options)?;
    Ok(saved.then_some(record))
}

/// Class-level bulk update: one key-scoped statement straight against
/// storage, no record loaded or mutated. Hooks, when given, fire against a
/// transient record.
pub fn update_all(
    cx: &mut Cx<'_>,
    schema: &Arc<ModelSchema>,
    key: &Value,
    mut attributes: AttrMap,
    hooks: Option<Box<dyn Hooks>>,
) -> Result<u64> {
    let mut scratch = Record::hydrated(Arc::clone(schema), AttrMap::new());
    if let Some(hooks) = hooks {
        scratch = scratch.with_hooks(hooks);
    }

    scratch.invoke(Hook::BeforeUpdate);

    if schema.timestamps {
        attributes.insert(UPDATED_AT.to_string(), Value::DateTime(DateTime::now()));
    }

    let affected = cx.queries.update(schema, key, &attributes)?;

    scratch.invoke(Hook::AfterUpdate);

    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryEngine, RecordingBus, StubValidator};
    use activerow_core::ModelSchema;

    fn attrs(pairs: &[(&str, Value)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn save_on_new_record_inserts_and_flips_exists() {
        let schema = ModelSchema::new("users").into_shared();
        let mut record = Record::with_attributes(
            Arc::clone(&schema),
            attrs(&[("name", Value::from("Ada"))]),
        )
        .unwrap();

        let mut queries = MemoryEngine::with_next_id(42);
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(record.save(&mut cx).unwrap());
        assert!(record.exists());
        assert_eq!(record.key(), Value::Int(42));
        assert!(record.dirty().is_empty());
    }

    #[test]
    fn generated_key_is_frozen_after_insert() {
        let schema = ModelSchema::new("users").into_shared();
        let mut record = Record::with_attributes(
            Arc::clone(&schema),
            attrs(&[("name", Value::from("Ada"))]),
        )
        .unwrap();

        let mut queries = MemoryEngine::with_next_id(42);
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(record.save(&mut cx).unwrap());
        assert_eq!(record.key(), Value::Int(42));

        record.set("id", 99i64).unwrap();
        assert_eq!(record.key(), Value::Int(42));

        // a later save must not touch a different row
        record.set("name", "Grace").unwrap();
        assert!(record.save(&mut cx).unwrap());
        drop(cx);

        let (_, key, _) = queries.updates.last().unwrap();
        assert_eq!(key, &Value::Int(42));
    }

    #[test]
    fn save_on_existing_record_sends_only_dirty_subset() {
        let schema = ModelSchema::new("users").into_shared();
        let mut queries = MemoryEngine::new();
        queries.seed(
            "users",
            1,
            attrs(&[("id", Value::Int(1)), ("name", Value::from("Ada")), ("age", Value::Int(36))]),
        );

        let mut record = Record::hydrated(
            Arc::clone(&schema),
            attrs(&[("id", Value::Int(1)), ("name", Value::from("Ada")), ("age", Value::Int(36))]),
        );
        record.set("name", "Grace").unwrap();

        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(record.save(&mut cx).unwrap());
        drop(cx);

        let (_, _, changes) = queries.updates.last().unwrap();
        assert_eq!(changes, &attrs(&[("name", Value::from("Grace"))]));
        assert!(record.dirty().is_empty());
        assert_eq!(
            record.store().original().get("name"),
            Some(&Value::from("Grace"))
        );
    }

    #[test]
    fn update_against_missing_row_returns_false() {
        let schema = ModelSchema::new("users").into_shared();
        let mut record = Record::hydrated(
            Arc::clone(&schema),
            attrs(&[("id", Value::Int(99)), ("name", Value::from("Ada"))]),
        );
        record.set("name", "Grace").unwrap();

        let mut queries = MemoryEngine::new();
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(!record.save(&mut cx).unwrap());
        drop(cx);

        // no events, no snapshot
        assert!(events.events.is_empty());
        assert!(!record.dirty().is_empty());
    }

    #[test]
    fn invalid_record_does_not_reach_the_engine() {
        let schema = ModelSchema::new("users")
            .rule("name", "required")
            .into_shared();
        let mut record = Record::new(Arc::clone(&schema));

        let mut queries = MemoryEngine::new();
        let validator = StubValidator::invalid_with("name", "required", "name is required");
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(!record.save(&mut cx).unwrap());
        drop(cx);

        assert!(!record.exists());
        assert!(!record.errors().is_empty());
        assert!(queries.inserts.is_empty());
        assert!(events.events.is_empty());
    }

    #[test]
    fn forced_save_skips_validation() {
        let schema = ModelSchema::new("users")
            .rule("name", "required")
            .into_shared();
        let mut record = Record::new(Arc::clone(&schema));

        let mut queries = MemoryEngine::new();
        let validator = StubValidator::invalid_with("name", "required", "name is required");
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        let options = SaveOptions {
            force: true,
            ..SaveOptions::default()
        };
        assert!(record.save_with(&mut cx, options).unwrap());
        assert!(record.exists());
        assert_eq!(validator.calls(), 0);
    }

    #[test]
    fn timestamps_are_stamped_on_create() {
        let schema = ModelSchema::new("users").timestamps(true).into_shared();
        let mut record = Record::with_attributes(
            Arc::clone(&schema),
            attrs(&[("name", Value::from("Ada"))]),
        )
        .unwrap();

        let mut queries = MemoryEngine::new();
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        assert!(record.save(&mut cx).unwrap());

        let created = record.read_attribute(CREATED_AT).unwrap();
        let updated = record.read_attribute(UPDATED_AT).unwrap();
        assert!(created.as_datetime().is_some_and(|dt| !dt.is_null()));
        assert!(updated.as_datetime().is_some_and(|dt| !dt.is_null()));
    }

    #[test]
    fn create_returns_record_on_success_and_none_on_failure() {
        let schema = ModelSchema::new("users")
            .rule("name", "required")
            .into_shared();

        let mut queries = MemoryEngine::new();
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        let record = create(
            &mut cx,
            Arc::clone(&schema),
            attrs(&[("name", Value::from("Ada"))]),
        )
        .unwrap()
        .expect("record saved");
        assert!(record.exists());

        let failing = StubValidator::invalid_with("name", "required", "name is required");
        let mut queries = MemoryEngine::new();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &failing, &mut events);
        let missing = create(&mut cx, schema, AttrMap::new()).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn update_all_issues_one_statement_and_stamps() {
        let schema = ModelSchema::new("users").timestamps(true).into_shared();

        let mut queries = MemoryEngine::new();
        queries.seed("users", 5, attrs(&[("id", Value::Int(5))]));
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        let affected = update_all(
            &mut cx,
            &schema,
            &Value::Int(5),
            attrs(&[("name", Value::from("Grace"))]),
            None,
        )
        .unwrap();
        drop(cx);

        assert_eq!(affected, 1);
        let (_, _, changes) = queries.updates.last().unwrap();
        assert!(changes.contains_key("name"));
        assert!(changes.contains_key(UPDATED_AT));
    }

    #[test]
    fn delete_fires_hooks_and_returns_count() {
        use crate::hooks::Hooks;
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Trace(Rc<RefCell<Vec<&'static str>>>);
        impl Hooks for Trace {
            fn before_delete(&mut self, _: &mut Record) {
                self.0.borrow_mut().push("before_delete");
            }
            fn after_delete(&mut self, _: &mut Record) {
                self.0.borrow_mut().push("after_delete");
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let schema = ModelSchema::new("users").into_shared();

        let mut queries = MemoryEngine::new();
        queries.seed("users", 3, attrs(&[("id", Value::Int(3))]));
        let validator = StubValidator::valid();
        let mut events = RecordingBus::new();
        let mut cx = Cx::new(&mut queries, &validator, &mut events);

        let mut record = Record::hydrated(schema, attrs(&[("id", Value::Int(3))]))
            .with_hooks(Box::new(Trace(Rc::clone(&log))));

        assert_eq!(record.delete(&mut cx).unwrap(), 1);
        assert_eq!(*log.borrow(), vec!["before_delete", "after_delete"]);
    }
}
