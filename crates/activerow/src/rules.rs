//! Built-in pipe-rule validation engine.
//!
//! A small, conventional rule string implementation (`"required|min:2"`)
//! so the crate is usable without wiring an external engine. Messages are
//! looked up as `field.rule` first, then bare `field`, then a default text.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use regex::Regex;

use activerow_core::{AttrMap, ErrorSet, RuleMap, Value};

use crate::engine::{ValidationEngine, ValidationOutcome};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Thread-safe cache of compiled rule patterns.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Check if a string matches a pattern, treating an invalid pattern as a
/// non-match (with a warning) rather than panicking mid-validation.
fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "invalid regex pattern in validation rule, treating as non-match"
            );
            false
        }
    }
}

/// The bundled rule-string validation engine.
///
/// Supported rules: `required`, `min:N`, `max:N` (character count for text,
/// magnitude for numbers), `integer`, `numeric`, `email`, `in:a,b,c`,
/// `pattern:REGEX`. Rules other than `required` pass on empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationEngine for RuleValidator {
    fn validate(&self, data: &AttrMap, rules: &RuleMap, messages: &RuleMap) -> ValidationOutcome {
        let mut errors = ErrorSet::new();

        for (field, rule_string) in rules {
            let value = data.get(field).cloned().unwrap_or(Value::Null);
            for rule in rule_string.split('|').filter(|r| !r.is_empty()) {
                let (name, arg) = match rule.split_once(':') {
                    Some((name, arg)) => (name, Some(arg)),
                    None => (rule, None),
                };
                if let Some(default_message) = check(field, &value, name, arg) {
                    errors.add(field, name, lookup_message(messages, field, name, &default_message));
                }
            }
        }

        if errors.is_empty() {
            ValidationOutcome::valid()
        } else {
            ValidationOutcome::invalid(errors)
        }
    }
}

fn lookup_message(messages: &RuleMap, field: &str, rule: &str, default: &str) -> String {
    messages
        .get(&format!("{field}.{rule}"))
        .or_else(|| messages.get(field))
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Apply one rule; returns the default message on violation.
fn check(field: &str, value: &Value, rule: &str, arg: Option<&str>) -> Option<String> {
    // Only `required` looks at empty values.
    if rule != "required" && value.is_empty() {
        return None;
    }

    match rule {
        "required" => value
            .is_empty()
            .then(|| format!("{field} is required")),
        "min" => {
            let min: f64 = arg?.parse().ok()?;
            let actual = magnitude(value)?;
            (actual < min).then(|| format!("{field} must be at least {}", arg.unwrap_or_default()))
        }
        "max" => {
            let max: f64 = arg?.parse().ok()?;
            let actual = magnitude(value)?;
            (actual > max).then(|| format!("{field} must be at most {}", arg.unwrap_or_default()))
        }
        "integer" => value
            .as_i64()
            .is_none()
            .then(|| format!("{field} must be an integer")),
        "numeric" => (!value.is_numeric()).then(|| format!("{field} must be numeric")),
        "email" => {
            let text = value.as_str().unwrap_or_default();
            (!matches_pattern(text, EMAIL_PATTERN))
                .then(|| format!("{field} must be a valid email address"))
        }
        "in" => {
            let allowed: Vec<&str> = arg.unwrap_or_default().split(',').collect();
            let text = render(value);
            (!allowed.contains(&text.as_str()))
                .then(|| format!("{field} must be one of: {}", arg.unwrap_or_default()))
        }
        "pattern" => {
            let text = value.as_str().unwrap_or_default();
            (!matches_pattern(text, arg.unwrap_or_default()))
                .then(|| format!("{field} has an invalid format"))
        }
        other => {
            tracing::warn!(rule = other, field = field, "unknown validation rule, skipping");
            None
        }
    }
}

/// Size of a value for `min`/`max`: character count for text, the number
/// itself otherwise.
fn magnitude(value: &Value) -> Option<f64> {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Text(s) => Some(s.chars().count() as f64),
        other => other.as_f64(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
