//! The record entity: attribute access, coercion, and hook dispatch.
//!
//! Dynamic attribute resolution is an explicit ordered chain rather than
//! reflection: cached relationship, stored attribute (with date coercion),
//! registered relationship loader (resolved once, cached), declared
//! accessible default, and finally an unknown-attribute error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use activerow_core::{
    AttrMap, AttributeError, AttributeStore, DateTime, Error, ErrorSet, ModelSchema, Result,
    RuleMap, TypeError, Value,
};

use crate::hooks::{self, Hook, Hooks};

/// Zero-argument relationship resolver, registered under the relation name.
pub type RelationLoader = Box<dyn Fn(&Record) -> Result<Value>>;

/// A domain object backed by one storage row.
pub struct Record {
    schema: Arc<ModelSchema>,
    store: AttributeStore,
    relations: BTreeMap<String, RelationLoader>,
    hooks: Option<Box<dyn Hooks>>,
    exists: bool,
    pub(crate) errors: ErrorSet,
    pub(crate) custom_rules: Option<RuleMap>,
    pub(crate) custom_messages: Option<RuleMap>,
}

/// Date-like naming convention: `_at` for points in time, `_on` for dates.
fn is_date_like(name: &str) -> bool {
    name.ends_with("_at") || name.ends_with("_on")
}

impl Record {
    /// A fresh, never-persisted record.
    pub fn new(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            store: AttributeStore::new(),
            relations: BTreeMap::new(),
            hooks: None,
            exists: false,
            errors: ErrorSet::new(),
            custom_rules: None,
            custom_messages: None,
        }
    }

    /// A fresh record with initial attributes, set through the coercing
    /// setter so date-like fields are typed from the start.
    pub fn with_attributes(schema: Arc<ModelSchema>, attributes: AttrMap) -> Result<Self> {
        let mut record = Self::new(schema);
        for (name, value) in attributes {
            record.set(&name, value)?;
        }
        Ok(record)
    }

    /// A record hydrated from storage: `exists` is true and the original
    /// snapshot matches the loaded attributes, so the record starts clean.
    pub fn hydrated(schema: Arc<ModelSchema>, attributes: AttrMap) -> Self {
        Self {
            schema,
            store: AttributeStore::hydrated(attributes),
            relations: BTreeMap::new(),
            hooks: None,
            exists: true,
            errors: ErrorSet::new(),
            custom_rules: None,
            custom_messages: None,
        }
    }

    /// Attach lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Box<dyn Hooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Register a lazily-resolved relationship under `name`.
    pub fn define_relation(&mut self, name: impl Into<String>, loader: RelationLoader) {
        self.relations.insert(name.into(), loader);
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub(crate) fn schema_handle(&self) -> Arc<ModelSchema> {
        Arc::clone(&self.schema)
    }

    /// Whether this record corresponds to a persisted row.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub(crate) fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    /// Errors from the last failed validation; empty otherwise.
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// The primary key value, `Null` until assigned.
    pub fn key(&self) -> Value {
        self.store
            .raw(&self.schema.key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Assign the generated key after insert. The key never changes once
    /// the record exists.
    pub(crate) fn set_key(&mut self, value: Value) {
        if self.exists {
            return;
        }
        let key = self.schema.key.clone();
        self.store.set_raw(&key, value);
    }

    /// Instance-level validation override; when set (and non-empty) it
    /// replaces the schema defaults outright, no merging.
    pub fn set_validation(&mut self, rules: RuleMap, messages: RuleMap) -> &mut Self {
        self.custom_rules = Some(rules);
        self.custom_messages = Some(messages);
        self
    }

    /// Resolve a name through the ordered lookup chain.
    pub fn get(&mut self, name: &str) -> Result<Value> {
        if let Some(value) = self.store.relationship(name) {
            return Ok(value.clone());
        }

        if self.store.contains(name) {
            return self.read_attribute(name);
        }

        if let Some(loader) = self.relations.remove(name) {
            match loader(self) {
                Ok(value) => {
                    self.store.cache_relationship(name, value.clone());
                    return Ok(value);
                }
                Err(err) => {
                    self.relations.insert(name.to_string(), loader);
                    return Err(err);
                }
            }
        }

        // Declared but unset fields read as Null to mimic the expected
        // record shape; anything else is a caller error.
        if self.schema.is_accessible(name) {
            return Ok(Value::Null);
        }

        Err(Error::Attribute(AttributeError {
            name: name.to_string(),
            table: self.schema.table.clone(),
        }))
    }

    /// Coercion-aware read of a stored attribute. Absent fields read as
    /// `Null` (or the null-date sentinel for date-like names).
    pub fn read_attribute(&self, name: &str) -> Result<Value> {
        let Some(raw) = self.store.raw(name) else {
            if is_date_like(name) {
                return Ok(Value::DateTime(DateTime::Null));
            }
            return Ok(Value::Null);
        };

        if is_date_like(name) {
            // already typed: pass through untouched, reformatting is for writes
            if let Value::DateTime(dt) = raw {
                return Ok(Value::DateTime(*dt));
            }
            if raw.is_empty() {
                return Ok(Value::DateTime(DateTime::Null));
            }
            return Ok(Value::DateTime(coerce_date(raw, name)?));
        }

        Ok(raw.clone())
    }

    /// Write an attribute. The write short-circuits when the coerced value
    /// equals the current one, so repeated assignment stays idempotent.
    ///
    /// An empty value written to a date-like field is discarded without
    /// touching the store; callers that want to clear a date must go through
    /// a raw write. Writes to the key column are ignored once the record is
    /// persisted: the key never changes after a successful insert.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if self.exists && name == self.schema.key {
            tracing::trace!(field = name, "ignoring key write on persisted record");
            return Ok(());
        }

        if is_date_like(name) {
            if value.is_empty() {
                tracing::trace!(field = name, "discarding empty date-like write");
                return Ok(());
            }
            let coerced = coerce_date(&value, name)?;
            self.store.set(name, Value::DateTime(coerced));
            return Ok(());
        }

        self.store.set(name, value);
        Ok(())
    }

    /// Write an attribute with no coercion and no equality check.
    pub fn set_raw(&mut self, name: &str, value: impl Into<Value>) {
        self.store.set_raw(name, value.into());
    }

    /// The full current attribute map.
    pub fn attributes(&self) -> &AttrMap {
        self.store.attributes()
    }

    /// Fields changed since the last persisted snapshot.
    pub fn dirty(&self) -> AttrMap {
        self.store.dirty()
    }

    /// Whether any field changed since the last persisted snapshot.
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub(crate) fn store(&self) -> &AttributeStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut AttributeStore {
        &mut self.store
    }

    /// Declared accessible fields mapped to their current (coerced) values,
    /// `Null` where unset. Merged into validation data alongside the
    /// attribute/dirty maps.
    pub fn accessor_values(&self) -> Result<AttrMap> {
        let mut values = AttrMap::new();
        for name in &self.schema.accessible {
            values.insert(name.clone(), self.read_attribute(name)?);
        }
        Ok(values)
    }

    /// Fire a lifecycle hook; a no-op when the record carries no hooks.
    pub(crate) fn invoke(&mut self, hook: Hook) {
        let Some(mut active) = self.hooks.take() else {
            return;
        };
        tracing::trace!(
            hook = hook.as_str(),
            table = %self.schema.table,
            "invoking lifecycle hook"
        );
        hooks::dispatch(active.as_mut(), hook, self);
        self.hooks = Some(active);
    }
}

/// Coerce a raw value into a `DateTime`.
///
/// Date-like inputs are rendered to the canonical storage text and reparsed;
/// text is parsed directly; anything else is a type error.
fn coerce_date(value: &Value, field: &str) -> Result<DateTime> {
    let parsed = match value {
        Value::DateTime(dt) => match dt.to_storage() {
            Some(text) => DateTime::parse(&text),
            None => Ok(DateTime::Null),
        },
        Value::Text(text) => DateTime::parse(text),
        Value::Null => Ok(DateTime::Null),
        other => Err(Error::Type(TypeError {
            expected: "date-time text",
            actual: other.type_name().to_string(),
            field: None,
        })),
    };

    parsed.map_err(|err| match err {
        Error::Type(mut type_err) => {
            type_err.field = Some(field.to_string());
            Error::Type(type_err)
        }
        other => other,
    })
}

/// Map records into `(key_field, value_field)` pairs, e.g. for building a
/// select-box listing.
pub fn to_collection(
    records: &[Record],
    key_field: &str,
    value_field: &str,
) -> Result<Vec<(Value, Value)>> {
    records
        .iter()
        .map(|record| {
            Ok((
                record.read_attribute(key_field)?,
                record.read_attribute(value_field)?,
            ))
        })
        .collect()
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.key();
        if key.is_null() {
            write!(f, "{} (new)", self.schema.table)
        } else {
            match key {
                Value::Int(id) => write!(f, "{} {}", self.schema.table, id),
                Value::Text(id) => write!(f, "{} {}", self.schema.table, id),
                other => write!(f, "{} {:?}", self.schema.table, other),
            }
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &self.schema.table)
            .field("key", &self.key())
            .field("exists", &self.exists)
            .field("attributes", self.store.attributes())
            .finish_non_exhaustive()
    }
}
