//!
//! # Schema Validation
//!
//! A small declarative validator for untrusted JSON bodies. A [`Schema`] lists
//! fields in order; each [`Field`] has a kind, a presence policy and a list of
//! rules. [`validate`] walks the whole schema in one pass and either returns
//! the input coerced into a typed value or an `AppError::Validation` holding
//! one message per violated rule, in declaration order.
//!
//! ```ignore
//! let schema = Schema::new()
//!     .field(Field::text("title").required("Title is required.").min_length(3, "Too short."))
//!     .field(Field::date("dueDate").optional().nullable().not_in_past("Must be in the future."));
//! let input: TaskInput = validate(&body, &schema)?;
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// The type a field's value is coerced to.
#[derive(Debug, Clone)]
pub enum Kind {
    Text,
    /// RFC 3339 timestamps, `YYYY-MM-DD` dates or epoch milliseconds.
    Date,
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub enum Rule {
    MinLength(usize, String),
    MaxLength(usize, String),
    NonEmpty(String),
    Email(String),
    Pattern(Regex, String),
    NotInPast(String),
}

/// A value after type coercion, before rules run.
enum Coerced {
    Text(String),
    Date(DateTime<Utc>),
}

impl Coerced {
    fn into_value(self) -> Value {
        match self {
            Coerced::Text(text) => Value::String(text),
            Coerced::Date(date) => Value::String(date.to_rfc3339()),
        }
    }
}

impl Rule {
    /// Returns the rule's message when `value` violates it.
    fn check(&self, value: &Coerced, now: DateTime<Utc>) -> Option<&str> {
        let passed = match (self, value) {
            (Rule::MinLength(min, _), Coerced::Text(text)) => text.chars().count() >= *min,
            (Rule::MaxLength(max, _), Coerced::Text(text)) => text.chars().count() <= *max,
            (Rule::NonEmpty(_), Coerced::Text(text)) => !text.is_empty(),
            (Rule::Email(_), Coerced::Text(text)) => validator::validate_email(text.as_str()),
            (Rule::Pattern(regex, _), Coerced::Text(text)) => regex.is_match(text),
            (Rule::NotInPast(_), Coerced::Date(date)) => *date >= now,
            _ => true,
        };

        if passed {
            None
        } else {
            Some(self.message())
        }
    }

    fn message(&self) -> &str {
        match self {
            Rule::MinLength(_, msg)
            | Rule::MaxLength(_, msg)
            | Rule::NonEmpty(msg)
            | Rule::Email(msg)
            | Rule::Pattern(_, msg)
            | Rule::NotInPast(msg) => msg,
        }
    }
}

/// One entry of a [`Schema`]. Fields are required by default.
#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    kind: Kind,
    required: Option<String>,
    nullable: bool,
    type_message: Option<String>,
    rules: Vec<Rule>,
}

impl Field {
    fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: Some(format!("{} is required.", name)),
            nullable: false,
            type_message: None,
            rules: Vec::new(),
        }
    }

    pub fn text(name: &'static str) -> Self {
        Self::new(name, Kind::Text)
    }

    pub fn date(name: &'static str) -> Self {
        Self::new(name, Kind::Date)
    }

    pub fn one_of(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, Kind::OneOf(values))
    }

    /// Overrides the message reported when the field is absent.
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = None;
        self
    }

    /// Accepts an explicit JSON `null`, which skips every rule.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Overrides the message reported when the value cannot be coerced.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MinLength(min, message.into()));
        self
    }

    pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
        self.rules.push(Rule::MaxLength(max, message.into()));
        self
    }

    pub fn non_empty(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::NonEmpty(message.into()));
        self
    }

    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Email(message.into()));
        self
    }

    pub fn pattern(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.rules.push(Rule::Pattern(regex, message.into()));
        self
    }

    pub fn not_in_past(mut self, message: impl Into<String>) -> Self {
        self.rules.push(Rule::NotInPast(message.into()));
        self
    }

    fn coerce(&self, value: &Value) -> Result<Coerced, String> {
        let received = type_name(value);
        match &self.kind {
            Kind::Text => match value {
                Value::String(text) => Ok(Coerced::Text(text.clone())),
                _ => Err(format!("Expected string, received {}", received)),
            },
            Kind::Date => parse_date(value)
                .map(Coerced::Date)
                .ok_or_else(|| "Invalid date".to_string()),
            Kind::OneOf(values) => {
                let expected = values
                    .iter()
                    .map(|v| format!("'{}'", v))
                    .collect::<Vec<_>>()
                    .join(" | ");
                match value {
                    Value::String(text) if values.contains(&text.as_str()) => {
                        Ok(Coerced::Text(text.clone()))
                    }
                    Value::String(text) => Err(format!(
                        "Invalid enum value. Expected {}, received '{}'",
                        expected, text
                    )),
                    _ => Err(format!("Expected {}, received {}", expected, received)),
                }
            }
        }
    }

    /// Checks one field, pushing its issues and returning the coerced value
    /// to keep, if any.
    fn check(&self, value: Option<&Value>, now: DateTime<Utc>, issues: &mut Vec<String>) -> Option<Value> {
        let value = match value {
            None => {
                if let Some(message) = &self.required {
                    issues.push(message.clone());
                }
                return None;
            }
            Some(Value::Null) if self.nullable => return Some(Value::Null),
            Some(value) => value,
        };

        match self.coerce(value) {
            Ok(coerced) => {
                issues.extend(
                    self.rules
                        .iter()
                        .filter_map(|rule| rule.check(&coerced, now))
                        .map(str::to_string),
                );
                Some(coerced.into_value())
            }
            Err(default_message) => {
                issues.push(self.type_message.clone().unwrap_or(default_message));
                None
            }
        }
    }
}

/// A check over the whole (already coerced) object.
#[derive(Clone)]
pub struct Refinement {
    check: fn(&Map<String, Value>) -> bool,
    message: String,
}

#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a cross-field rule. Refinements only run once every field passed.
    pub fn refine(mut self, check: fn(&Map<String, Value>) -> bool, message: impl Into<String>) -> Self {
        self.refinements.push(Refinement {
            check,
            message: message.into(),
        });
        self
    }
}

/// Validates `raw` against `schema` and deserializes the coerced result.
pub fn validate<T: DeserializeOwned>(raw: &Value, schema: &Schema) -> Result<T, AppError> {
    validate_at(raw, schema, Utc::now())
}

/// Same as [`validate`], with "now" fixed for date rules.
pub fn validate_at<T: DeserializeOwned>(
    raw: &Value,
    schema: &Schema,
    now: DateTime<Utc>,
) -> Result<T, AppError> {
    let input = match raw {
        Value::Object(map) => map,
        other => {
            return Err(AppError::validation(vec![format!(
                "Expected object, received {}",
                type_name(other)
            )]))
        }
    };

    let mut issues = Vec::new();
    let mut output = Map::new();

    for field in &schema.fields {
        if let Some(value) = field.check(input.get(field.name), now, &mut issues) {
            output.insert(field.name.to_string(), value);
        }
    }

    if issues.is_empty() {
        issues.extend(
            schema
                .refinements
                .iter()
                .filter(|refinement| !(refinement.check)(&output))
                .map(|refinement| refinement.message.clone()),
        );
    }

    if !issues.is_empty() {
        return Err(AppError::validation(issues));
    }

    serde_json::from_value(Value::Object(output)).map_err(|e| {
        AppError::unexpected(format!("Validated data does not match its target type: {}", e))
    })
}

/// Largest distance from the epoch, in milliseconds, a date may have.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|date| date.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(number) => number
            .as_f64()
            .filter(|millis| millis.is_finite() && millis.abs() <= MAX_EPOCH_MILLIS)
            .and_then(|millis| Utc.timestamp_millis_opt(millis.trunc() as i64).single()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
