//! The validation pipeline.
//!
//! Hooks fire unconditionally on both sides of the engine call. Rule
//! selection prefers a non-empty instance override outright; an empty
//! resolved rule set succeeds without calling the engine at all. Existing
//! records only re-validate what changed.

use activerow_core::{Error, Result, RuleMap};

use crate::engine::Cx;
use crate::hooks::Hook;
use crate::record::Record;

/// How a validation failure is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInvalid {
    /// Return `false` and leave the errors on the record.
    #[default]
    Report,
    /// Return `Error::Validation` carrying the structured errors.
    Raise,
}

impl Record {
    /// Run the validation pipeline and report validity.
    ///
    /// For an existing record the validated data is the dirty set plus the
    /// accessor values, and the rules are narrowed to the keys actually
    /// present; a new record validates all attributes against the full set.
    pub fn is_valid(&mut self, cx: &Cx<'_>, on_invalid: OnInvalid) -> Result<bool> {
        self.invoke(Hook::BeforeValidation);

        let rules = match &self.custom_rules {
            Some(rules) if !rules.is_empty() => rules.clone(),
            _ => self.schema().rules.clone(),
        };
        let messages = match &self.custom_messages {
            Some(messages) if !messages.is_empty() => messages.clone(),
            _ => self.schema().messages.clone(),
        };

        let mut valid = true;

        if rules.is_empty() {
            // trivially valid, and a success still resets the error state
            self.errors.clear();
        } else {
            let (data, rules) = if self.exists() {
                let mut data = self.dirty();
                data.extend(self.accessor_values()?);
                let narrowed: RuleMap = rules
                    .into_iter()
                    .filter(|(field, _)| data.contains_key(field))
                    .collect();
                (data, narrowed)
            } else {
                let mut data = self.attributes().clone();
                data.extend(self.accessor_values()?);
                (data, rules)
            };

            let outcome = cx.validator.validate(&data, &rules, &messages);
            valid = outcome.valid;

            if valid {
                self.errors.clear();
            } else {
                tracing::debug!(
                    table = %self.schema().table,
                    errors = outcome.errors.len(),
                    "validation failed"
                );
                self.errors = outcome.errors;
                if on_invalid == OnInvalid::Raise {
                    self.invoke(Hook::AfterValidation);
                    return Err(Error::Validation(self.errors.clone()));
                }
            }
        }

        self.invoke(Hook::AfterValidation);
        Ok(valid)
    }
}
