//! Per-record-type configuration.
//!
//! The original system kept rules, messages, and accessible fields as shared
//! mutable class-level state; here they live in an explicit `ModelSchema`
//! built once per record type and shared behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Column name stamped on every save when timestamps are enabled.
pub const UPDATED_AT: &str = "updated_at";

/// Column name stamped on first save when timestamps are enabled.
pub const CREATED_AT: &str = "created_at";

/// Field name to rule string / message text mapping.
pub type RuleMap = BTreeMap<String, String>;

/// Static configuration for one record type.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Storage table name
    pub table: String,
    /// Primary key column
    pub key: String,
    /// Key-generation sequence name, when the backend needs one
    pub sequence: Option<String>,
    /// Whether saves stamp `created_at` / `updated_at`
    pub timestamps: bool,
    /// Default validation rules (field -> rule string)
    pub rules: RuleMap,
    /// Default validation messages (`field.rule` or `field` -> text)
    pub messages: RuleMap,
    /// Declared accessible fields: readable with a `Null` default even
    /// when absent, and merged into validation data as accessor values
    pub accessible: Vec<String>,
}

impl ModelSchema {
    /// Create a schema for a table with the conventional `id` key.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: "id".to_string(),
            sequence: None,
            timestamps: false,
            rules: RuleMap::new(),
            messages: RuleMap::new(),
            accessible: Vec::new(),
        }
    }

    /// Set the primary key column.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the key-generation sequence name.
    pub fn sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    /// Enable or disable timestamp stamping.
    pub fn timestamps(mut self, on: bool) -> Self {
        self.timestamps = on;
        self
    }

    /// Add a default validation rule for a field.
    pub fn rule(mut self, field: impl Into<String>, rule: impl Into<String>) -> Self {
        self.rules.insert(field.into(), rule.into());
        self
    }

    /// Add a default validation message.
    ///
    /// Keys are looked up as `field.rule` first, then bare `field`.
    pub fn message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }

    /// Declare accessible fields.
    pub fn accessible(mut self, fields: &[&str]) -> Self {
        self.accessible = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Check whether a field is declared accessible.
    pub fn is_accessible(&self, name: &str) -> bool {
        self.accessible.iter().any(|f| f == name)
    }

    /// Finish building and wrap for sharing across record instances.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let schema = ModelSchema::new("users");
        assert_eq!(schema.table, "users");
        assert_eq!(schema.key, "id");
        assert!(schema.sequence.is_none());
        assert!(!schema.timestamps);
        assert!(schema.rules.is_empty());
        assert!(schema.accessible.is_empty());
    }

    #[test]
    fn builder_chains() {
        let schema = ModelSchema::new("posts")
            .key("post_id")
            .sequence("posts_seq")
            .timestamps(true)
            .rule("title", "required|max:255")
            .message("title.required", "every post needs a title")
            .accessible(&["title", "body"]);

        assert_eq!(schema.key, "post_id");
        assert_eq!(schema.sequence.as_deref(), Some("posts_seq"));
        assert!(schema.timestamps);
        assert_eq!(
            schema.rules.get("title").map(String::as_str),
            Some("required|max:255")
        );
        assert!(schema.is_accessible("body"));
        assert!(!schema.is_accessible("secret"));
    }
}
