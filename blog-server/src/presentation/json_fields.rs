use serde_json::{Map, Value};
use validator::ValidationErrors;

use crate::presentation::app_error::{AppError, AppResult, FieldErrorDto, collect_field_errors};

/// Reads typed fields out of a JSON object, recording every type mismatch
/// instead of stopping at the first one.
pub(crate) struct JsonFields<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldErrorDto>,
}

impl<'a> JsonFields<'a> {
    pub(crate) fn new(body: &'a Value) -> AppResult<Self> {
        match body {
            Value::Object(object) => Ok(Self {
                object,
                errors: Vec::new(),
            }),
            _ => Err(AppError::BodyShape("expected a JSON object")),
        }
    }

    /// Missing and `null` both read as absent.
    pub(crate) fn string(&mut self, key: &str) -> Option<String> {
        match self.object.get(key)? {
            Value::Null => None,
            Value::String(value) => Some(value.clone()),
            _ => {
                self.type_error(key.to_string(), "must be a string");
                None
            }
        }
    }

    /// Each bad element is reported under `key[index]`.
    pub(crate) fn string_list(&mut self, key: &str) -> Option<Vec<String>> {
        let items = match self.object.get(key)? {
            Value::Null => return None,
            Value::Array(items) => items,
            _ => {
                self.type_error(key.to_string(), "must be an array of strings");
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::String(value) => out.push(value.clone()),
                _ => {
                    self.type_error(format!("{key}[{index}]"), "must be a string");
                    valid = false;
                }
            }
        }
        valid.then_some(out)
    }

    /// Merges rule violations with the type errors already seen. A field that
    /// failed its type check is not reported again as missing.
    pub(crate) fn finish(self, rules: Result<(), ValidationErrors>) -> AppResult<()> {
        let mut errors = self.errors;
        if let Err(rule_errors) = rules {
            let rule_errors: Vec<_> = collect_field_errors(&rule_errors)
                .into_iter()
                .filter(|rule| !errors.iter().any(|seen| same_field(&seen.field, &rule.field)))
                .collect();
            errors.extend(rule_errors);
        }

        if errors.is_empty() {
            return Ok(());
        }
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        Err(AppError::Fields(errors))
    }

    fn type_error(&mut self, field: String, message: &str) {
        self.errors.push(FieldErrorDto {
            field,
            code: "invalid_type".to_string(),
            message: message.to_string(),
        });
    }
}

fn same_field(path: &str, field: &str) -> bool {
    path == field
        || path
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with('['))
}
