use serde_json::{Map, Value};

use fintools_core::ValidationError;

/// Raw named arguments of one tool call.
///
/// Numbers may arrive as JSON numbers or as numeric strings (the CLI passes
/// everything as text).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Accepts an object or `null`; anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            _ => Err(ValidationError::WrongType {
                field: "arguments",
                expected: "a JSON object",
            }),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_owned(), value.into());
        self
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    fn present(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    /// Optional string; blank and the literal `none` count as absent.
    pub fn opt_str(&self, name: &'static str) -> Result<Option<String>, ValidationError> {
        match self.present(name) {
            None => Ok(None),
            Some(Value::String(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_owned()))
                }
            }
            Some(Value::Number(number)) => Ok(Some(number.to_string())),
            Some(_) => Err(ValidationError::WrongType {
                field: name,
                expected: "a string",
            }),
        }
    }

    pub fn req_str(&self, name: &'static str) -> Result<String, ValidationError> {
        self.opt_str(name)?
            .ok_or(ValidationError::Missing { field: name })
    }

    pub fn str_or(&self, name: &'static str, default: &str) -> Result<String, ValidationError> {
        Ok(self.opt_str(name)?.unwrap_or_else(|| default.to_owned()))
    }

    pub fn opt_i64(&self, name: &'static str) -> Result<Option<i64>, ValidationError> {
        let wrong_type = || ValidationError::WrongType {
            field: name,
            expected: "an integer",
        };
        match self.present(name) {
            None => Ok(None),
            Some(Value::Number(number)) => number.as_i64().map(Some).ok_or_else(wrong_type),
            Some(Value::String(text)) => text.trim().parse().map(Some).map_err(|_| wrong_type()),
            Some(_) => Err(wrong_type()),
        }
    }

    /// Integer in `min..=max`, `default` when absent.
    pub fn int_in(
        &self,
        name: &'static str,
        default: i64,
        min: i64,
        max: i64,
    ) -> Result<u32, ValidationError> {
        let value = self.opt_i64(name)?.unwrap_or(default);
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: name,
                value,
                min,
                max,
            });
        }
        u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
            field: name,
            value,
            min,
            max,
        })
    }

    pub fn opt_f64(&self, name: &'static str) -> Result<Option<f64>, ValidationError> {
        let wrong_type = || ValidationError::WrongType {
            field: name,
            expected: "a number",
        };
        match self.present(name) {
            None => Ok(None),
            Some(Value::Number(number)) => number.as_f64().map(Some).ok_or_else(wrong_type),
            Some(Value::String(text)) => text.trim().parse().map(Some).map_err(|_| wrong_type()),
            Some(_) => Err(wrong_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_are_accepted() {
        let args = ToolArgs::default().with("limit", "25");
        assert_eq!(args.int_in("limit", 10, 1, 100), Ok(25));
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let args = ToolArgs::default().with("limit", 0);
        let err = args.int_in("limit", 10, 1, 100).expect_err("0 is below range");
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "limit",
                value: 0,
                min: 1,
                max: 100
            }
        );
    }

    #[test]
    fn none_literal_is_absent() {
        let args = ToolArgs::default().with("timestamp", "None");
        assert_eq!(args.opt_str("timestamp"), Ok(None));
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        assert!(ToolArgs::from_value(json!([1, 2])).is_err());
        assert!(ToolArgs::from_value(Value::Null).is_ok());
    }
}
