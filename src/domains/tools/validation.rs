//! Argument parsing and validation.
//!
//! Tool arguments arrive as an untyped JSON object. They are deserialized into
//! the tool's parameter struct first (shape and types), then checked by its
//! [`Validate`] implementation (ranges, dates, composite rules). Every
//! offending field is collected before failing.

use std::fmt;

use chrono::NaiveDate;
use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expected textual date layout.
pub const DATE_FORMAT: &str = "YYYY-MM-DD";

/// Default page size for paginated list tools.
pub const DEFAULT_LIMIT: u64 = 25;

/// Largest page Redmine serves.
pub const MAX_LIMIT: i64 = 100;

/// One rejected argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Arguments rejected before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation error: {}", join_errors(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    /// Names of the offending fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Checks applied after deserialization.
pub trait Validate {
    fn validate(&self, _v: &mut Validator) {}
}

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Record identifier given as a positive integer or a numeric string.
    pub fn id(&mut self, field: &str, value: &IdArg) {
        if value.parse().is_none() {
            self.error(field, "must be a positive integer");
        }
    }

    pub fn optional_id(&mut self, field: &str, value: Option<&IdArg>) {
        if let Some(value) = value {
            self.id(field, value);
        }
    }

    pub fn positive_int(&mut self, field: &str, value: Option<i64>) {
        if value.is_some_and(|v| v <= 0) {
            self.error(field, "must be a positive integer");
        }
    }

    pub fn positive(&mut self, field: &str, value: Option<f64>) {
        if value.is_some_and(|v| !(v > 0.0)) {
            self.error(field, "must be greater than 0");
        }
    }

    pub fn range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) {
        if value.is_some_and(|v| !(min..=max).contains(&v)) {
            self.error(field, format!("must be between {} and {}", min, max));
        }
    }

    pub fn date(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|v| !is_calendar_date(v)) {
            self.error(field, format!("Invalid date format ({})", DATE_FORMAT));
        }
    }

    /// Character count (not bytes) within `min..=max`.
    pub fn length(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(value) = value {
            let len = value.chars().count();
            if len < min {
                self.error(field, format!("must contain at least {} character(s)", min));
            } else if len > max {
                self.error(field, format!("must contain at most {} character(s)", max));
            }
        }
    }

    pub fn not_blank(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.error(field, "must not be empty");
        }
    }

    pub fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) {
        if value.is_some_and(|v| !allowed.contains(&v)) {
            self.error(field, format!("must be one of: {}", allowed.join(", ")));
        }
    }

    /// `limit` in `1..=100` and `offset` non-negative.
    pub fn pagination(&mut self, limit: Option<i64>, offset: Option<i64>) {
        if limit.is_some_and(|l| !(1..=MAX_LIMIT).contains(&l)) {
            self.error("limit", format!("must be between 1 and {}", MAX_LIMIT));
        }
        if offset.is_some_and(|o| o < 0) {
            self.error("offset", "must not be negative");
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

/// Argument names holding calendar dates.
const DATE_FIELDS: &[&str] = &["start_date", "due_date", "spent_on", "from", "to"];

/// Deserialize and validate tool arguments.
pub fn parse_arguments<T>(arguments: JsonObject) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let params: T = serde_path_to_error::deserialize(serde_json::Value::Object(arguments))
        .map_err(|e| shape_error(&e.path().to_string(), &e.into_inner().to_string()))?;

    let mut validator = Validator::new();
    params.validate(&mut validator);
    validator.finish()?;
    Ok(params)
}

/// Map a deserialization failure onto the field it concerns.
fn shape_error(path: &str, message: &str) -> ValidationError {
    if let Some(field) = message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
    {
        let field = match path {
            "." => field.to_string(),
            parent => format!("{}.{}", parent, field),
        };
        return ValidationError::field(field, "is required");
    }

    let field = match path {
        "." => "arguments",
        path => path,
    };
    let message = if DATE_FIELDS.contains(&field) {
        format!("Invalid date format ({})", DATE_FORMAT)
    } else if message.contains("untagged enum IdArg") {
        "must be an integer or a string".to_string()
    } else {
        message.to_string()
    };
    ValidationError::field(field, message)
}

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_calendar_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    shaped && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Identifier accepted as a JSON number or a string.
///
/// Record ids must resolve to positive integers (`"123"` is accepted);
/// project and user filters may also carry identifiers such as `"demo"` or
/// `"me"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IdArg {
    Number(i64),
    Text(String),
}

impl IdArg {
    /// Positive integer value, if this is one.
    pub fn parse(&self) -> Option<u64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        u64::try_from(value).ok().filter(|v| *v > 0)
    }

    /// Positive integer value, or a validation error naming `field`.
    pub fn require(&self, field: &str) -> Result<u64, ValidationError> {
        self.parse()
            .ok_or_else(|| ValidationError::field(field, "must be a positive integer"))
    }
}

impl fmt::Display for IdArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}
