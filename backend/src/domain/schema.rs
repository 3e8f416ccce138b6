//! Declarative shape checks for JSON crossing a network or storage boundary.
//!
//! A [`Shape`] describes what a decoded value must look like: required and
//! optional fields, string formats, numeric lower bounds, exact literals,
//! nested objects, arrays, and string-keyed records. [`parse`] checks a
//! `serde_json::Value` against the shape declared by a [`Schema`] type and
//! only then narrows it into that type, so no other component ever sees a
//! payload whose structure was merely assumed.
//!
//! Checking never mutates its input. Object shapes are open: keys that the
//! shape does not mention are ignored rather than rejected.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use url::Url;

/// Refinement applied to string values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Any string, including the empty string.
    Any,
    /// At least one character.
    NonEmpty,
    /// An absolute URL.
    Url,
    /// A plausible e-mail address.
    Email,
}

/// Declared structure of a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Any value, including `null`.
    Any,
    /// A JSON boolean.
    Bool,
    /// A JSON string with a format refinement.
    String(StringFormat),
    /// A JSON number, optionally bounded from below (inclusive).
    Number {
        /// Smallest accepted value.
        min: Option<i32>,
    },
    /// A value that must equal this exact JSON value.
    Literal(Value),
    /// An object with the listed fields.
    Object(Vec<Field>),
    /// An array whose every element matches the inner shape.
    Array(Box<Shape>),
    /// A string-keyed map whose every value matches the inner shape.
    Record {
        /// Shape of each value.
        values: Box<Shape>,
        /// Whether an empty map is rejected.
        non_empty: bool,
    },
}

/// One named member of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: &'static str,
    shape: Shape,
    required: bool,
}

/// Declare a required object member.
#[must_use]
pub fn field(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: true,
    }
}

/// Declare an optional object member. An absent key or `null` is accepted.
#[must_use]
pub fn optional(name: &'static str, shape: Shape) -> Field {
    Field {
        name,
        shape,
        required: false,
    }
}

impl Shape {
    /// Any string.
    #[must_use]
    pub fn string() -> Self {
        Self::String(StringFormat::Any)
    }

    /// A string with at least one character.
    #[must_use]
    pub fn non_empty_string() -> Self {
        Self::String(StringFormat::NonEmpty)
    }

    /// An absolute URL string.
    #[must_use]
    pub fn url() -> Self {
        Self::String(StringFormat::Url)
    }

    /// An e-mail address string.
    #[must_use]
    pub fn email() -> Self {
        Self::String(StringFormat::Email)
    }

    /// Any number.
    #[must_use]
    pub fn number() -> Self {
        Self::Number { min: None }
    }

    /// A number no smaller than `min`.
    #[must_use]
    pub fn number_min(min: i32) -> Self {
        Self::Number { min: Some(min) }
    }

    /// A value equal to `expected`.
    #[must_use]
    pub fn literal(expected: impl Into<Value>) -> Self {
        Self::Literal(expected.into())
    }

    /// An object with the given members.
    #[must_use]
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    /// An array of `items`.
    #[must_use]
    pub fn array_of(items: Self) -> Self {
        Self::Array(Box::new(items))
    }

    /// A string-keyed record of `values`.
    #[must_use]
    pub fn record_of(values: Self) -> Self {
        Self::Record {
            values: Box::new(values),
            non_empty: false,
        }
    }

    /// A string-keyed record of `values` holding at least one entry.
    #[must_use]
    pub fn non_empty_record_of(values: Self) -> Self {
        Self::Record {
            values: Box::new(values),
            non_empty: true,
        }
    }

    /// Add members to an object shape. Members with the same name replace the
    /// existing declaration. Non-object shapes are returned unchanged.
    #[must_use]
    pub fn extend(self, extra: impl IntoIterator<Item = Field>) -> Self {
        match self {
            Self::Object(mut fields) => {
                for addition in extra {
                    fields.retain(|existing| existing.name != addition.name);
                    fields.push(addition);
                }
                Self::Object(fields)
            }
            other => other,
        }
    }

    /// Check `value` against this shape.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaViolation`] found, naming the path of the
    /// offending value and the constraint it broke.
    pub fn check(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.check_at(value, &FieldPath::root())
    }

    fn check_at(&self, value: &Value, path: &FieldPath) -> Result<(), SchemaViolation> {
        match (self, value) {
            (Self::Any, _) | (Self::Bool, Value::Bool(_)) => Ok(()),
            (Self::String(format), Value::String(text)) => check_format(*format, text, path),
            (Self::Number { min }, Value::Number(number)) => match min {
                Some(min) if below(number, *min) => Err(SchemaViolation::new(
                    path,
                    Constraint::Minimum { min: *min },
                )),
                _ => Ok(()),
            },
            (Self::Literal(expected), actual) => {
                if expected == actual {
                    Ok(())
                } else {
                    Err(SchemaViolation::new(
                        path,
                        Constraint::Literal {
                            expected: expected.to_string(),
                        },
                    ))
                }
            }
            (Self::Object(fields), Value::Object(members)) => {
                for declared in fields {
                    let child = path.child(declared.name);
                    match members.get(declared.name) {
                        None | Some(Value::Null) if declared.required => {
                            return Err(SchemaViolation::new(&child, Constraint::Required));
                        }
                        None | Some(Value::Null) => {}
                        Some(member) => declared.shape.check_at(member, &child)?,
                    }
                }
                Ok(())
            }
            (Self::Array(items), Value::Array(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    items.check_at(element, &path.index(index))?;
                }
                Ok(())
            }
            (Self::Record { values, non_empty }, Value::Object(members)) => {
                if *non_empty && members.is_empty() {
                    return Err(SchemaViolation::new(path, Constraint::NonEmpty));
                }
                for (key, member) in members {
                    values.check_at(member, &path.child(key))?;
                }
                Ok(())
            }
            (expected, actual) => Err(SchemaViolation::new(
                path,
                Constraint::Type {
                    expected: expected.type_name(),
                    found: json_type_name(actual),
                },
            )),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Bool => "boolean",
            Self::String(_) => "string",
            Self::Number { .. } => "number",
            Self::Literal(_) => "literal",
            Self::Object(_) | Self::Record { .. } => "object",
            Self::Array(_) => "array",
        }
    }
}

fn check_format(format: StringFormat, text: &str, path: &FieldPath) -> Result<(), SchemaViolation> {
    let constraint = match format {
        StringFormat::Any => return Ok(()),
        StringFormat::NonEmpty if text.is_empty() => Constraint::NonEmpty,
        StringFormat::Url if Url::parse(text).is_err() => Constraint::Url,
        StringFormat::Email if !email_pattern().is_match(text) => Constraint::Email,
        StringFormat::NonEmpty | StringFormat::Url | StringFormat::Email => return Ok(()),
    };
    Err(SchemaViolation::new(path, constraint))
}

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid e-mail pattern"))
}

fn below(number: &Number, min: i32) -> bool {
    if let Some(value) = number.as_i64() {
        value < i64::from(min)
    } else if number.as_u64().is_some() {
        false
    } else {
        number.as_f64().is_some_and(|value| value < f64::from(min))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Location of a value inside a JSON document, rendered as `$.data.status`
/// or `$[0].id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(String);

impl FieldPath {
    /// The document root, `$`.
    #[must_use]
    pub fn root() -> Self {
        Self("$".to_owned())
    }

    /// Path of member `name` below this one.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Constraint broken by a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// A required member was absent or `null`.
    Required,
    /// The value had the wrong JSON type.
    Type {
        /// Declared type.
        expected: &'static str,
        /// Type actually present.
        found: &'static str,
    },
    /// The string was empty, or the record had no entries.
    NonEmpty,
    /// The string was not an absolute URL.
    Url,
    /// The string was not an e-mail address.
    Email,
    /// The number was smaller than the declared bound.
    Minimum {
        /// Smallest accepted value.
        min: i32,
    },
    /// The value differed from the declared literal.
    Literal {
        /// Expected value in JSON notation.
        expected: String,
    },
    /// The payload was not JSON, or could not be narrowed after checking.
    Malformed {
        /// Decoder message.
        message: String,
    },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required value is missing"),
            Self::Type { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::NonEmpty => write!(f, "must not be empty"),
            Self::Url => write!(f, "must be an absolute URL"),
            Self::Email => write!(f, "must be an e-mail address"),
            Self::Minimum { min } => write!(f, "must be at least {min}"),
            Self::Literal { expected } => write!(f, "must equal {expected}"),
            Self::Malformed { message } => write!(f, "malformed payload: {message}"),
        }
    }
}

/// A decoded value did not match its declared shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema violation at {path}: {constraint}")]
pub struct SchemaViolation {
    path: FieldPath,
    constraint: Constraint,
}

impl SchemaViolation {
    fn new(path: &FieldPath, constraint: Constraint) -> Self {
        Self {
            path: path.clone(),
            constraint,
        }
    }

    /// Violation for a payload that could not be decoded at all.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(
            &FieldPath::root(),
            Constraint::Malformed {
                message: message.into(),
            },
        )
    }

    /// Violation raised at `path` for `constraint`.
    #[must_use]
    pub fn at(path: FieldPath, constraint: Constraint) -> Self {
        Self { path, constraint }
    }

    /// Path of the offending value.
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Constraint that was broken.
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

/// A type whose JSON representation is described by a [`Shape`].
pub trait Schema: DeserializeOwned {
    /// Shape every incoming value must match before narrowing.
    fn shape() -> Shape;
}

impl<T: Schema> Schema for Vec<T> {
    fn shape() -> Shape {
        Shape::array_of(T::shape())
    }
}

impl<T: Schema> Schema for BTreeMap<String, T> {
    fn shape() -> Shape {
        Shape::record_of(T::shape())
    }
}

/// Check `value` against `T::shape()` and narrow it into `T`.
///
/// # Errors
///
/// Returns a [`SchemaViolation`] when the value breaks the shape.
pub fn parse<T: Schema>(value: Value) -> Result<T, SchemaViolation> {
    parse_with(&T::shape(), value)
}

/// Check `value` against an explicit shape and narrow it into `T`.
///
/// # Errors
///
/// Returns a [`SchemaViolation`] when the value breaks the shape.
pub fn parse_with<T: DeserializeOwned>(shape: &Shape, value: Value) -> Result<T, SchemaViolation> {
    shape.check(&value)?;
    serde_json::from_value(value).map_err(|error| SchemaViolation::malformed(error.to_string()))
}

/// Decode a JSON byte payload and narrow it into `T`.
///
/// # Errors
///
/// Returns a [`SchemaViolation`] when the bytes are not JSON or the decoded
/// value breaks the shape.
pub fn parse_slice<T: Schema>(body: &[u8]) -> Result<T, SchemaViolation> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|error| SchemaViolation::malformed(error.to_string()))?;
    parse(value)
}
