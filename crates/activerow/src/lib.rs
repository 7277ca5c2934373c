//! Activerow — an active-record style persistence layer.
//!
//! A `Record` owns in-memory attribute storage with dirty tracking, typed
//! coercion for date-like fields, declarative validation, and a fixed set
//! of lifecycle hooks fired around validation and persistence. The actual
//! query engine, validation engine, and event bus are external collaborators
//! consumed through traits and bundled in a [`Cx`].
//!
//! # Quick start
//!
//! ```
//! use activerow::prelude::*;
//! use activerow::testing::{MemoryEngine, RecordingBus};
//! use activerow::RuleValidator;
//!
//! let schema = ModelSchema::new("users")
//!     .rule("name", "required")
//!     .into_shared();
//!
//! let mut queries = MemoryEngine::new();
//! let validator = RuleValidator::new();
//! let mut events = RecordingBus::new();
//! let mut cx = Cx::new(&mut queries, &validator, &mut events);
//!
//! let mut user = Record::new(schema);
//! user.set("name", "Ada").unwrap();
//! assert!(user.save(&mut cx).unwrap());
//! assert!(user.exists());
//! ```

pub mod engine;
pub mod hooks;
pub mod record;
pub mod rules;
pub mod save;
pub mod testing;
pub mod validate;

pub use engine::{Cx, Event, EventBus, QueryEngine, ValidationEngine, ValidationOutcome};
pub use hooks::{Hook, Hooks};
pub use record::{Record, RelationLoader, to_collection};
pub use rules::RuleValidator;
pub use save::{SaveOptions, create, create_with, update_all};
pub use validate::OnInvalid;

// Re-export the core types so downstream code needs one dependency.
pub use activerow_core::{
    AttrMap, AttributeError, AttributeStore, DateTime, Error, ErrorSet, FieldError, ModelSchema,
    QueryError, Result, RuleMap, TypeError, Value,
};

/// Common imports for working with records.
pub mod prelude {
    pub use crate::engine::{Cx, Event, EventBus, QueryEngine, ValidationEngine};
    pub use crate::hooks::{Hook, Hooks};
    pub use crate::record::Record;
    pub use crate::save::SaveOptions;
    pub use crate::validate::OnInvalid;
    pub use activerow_core::{AttrMap, DateTime, ErrorSet, ModelSchema, RuleMap, Value};
}
