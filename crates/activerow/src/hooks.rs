//! Lifecycle callback hooks.
//!
//! A record type may implement any subset of the ten named hooks; the
//! default methods are no-ops, so an unimplemented hook is silently
//! skipped. Hooks take the record mutably — side effects are visible to
//! every subsequent step of the same operation.

use crate::record::Record;

/// The fixed set of hook points, in no particular order; each operation
/// documents the exact order in which it fires them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    BeforeValidation,
    AfterValidation,
    BeforeSave,
    AfterSave,
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
}

impl Hook {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Hook::BeforeValidation => "before_validation",
            Hook::AfterValidation => "after_validation",
            Hook::BeforeSave => "before_save",
            Hook::AfterSave => "after_save",
            Hook::BeforeCreate => "before_create",
            Hook::AfterCreate => "after_create",
            Hook::BeforeUpdate => "before_update",
            Hook::AfterUpdate => "after_update",
            Hook::BeforeDelete => "before_delete",
            Hook::AfterDelete => "after_delete",
        }
    }
}

/// Optional lifecycle capabilities for a record type.
///
/// Implement only the hooks you care about; the rest default to no-ops.
pub trait Hooks {
    #[allow(unused_variables)]
    fn before_validation(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn after_validation(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn before_save(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn after_save(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn before_create(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn after_create(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn before_update(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn after_update(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn before_delete(&mut self, record: &mut Record) {}

    #[allow(unused_variables)]
    fn after_delete(&mut self, record: &mut Record) {}
}

/// Route a named hook to the matching trait method.
pub(crate) fn dispatch(hooks: &mut dyn Hooks, hook: Hook, record: &mut Record) {
    match hook {
        Hook::BeforeValidation => hooks.before_validation(record),
        Hook::AfterValidation => hooks.after_validation(record),
        Hook::BeforeSave => hooks.before_save(record),
        Hook::AfterSave => hooks.after_save(record),
        Hook::BeforeCreate => hooks.before_create(record),
        Hook::AfterCreate => hooks.after_create(record),
        Hook::BeforeUpdate => hooks.before_update(record),
        Hook::AfterUpdate => hooks.after_update(record),
        Hook::BeforeDelete => hooks.before_delete(record),
        Hook::AfterDelete => hooks.after_delete(record),
    }
}
