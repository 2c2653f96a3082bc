//! Equality selectors used to pick an element out of a sequence.
//!
//! A selector is written `{field:value,field:value}` inside a key and matches
//! the first array element whose fields equal every listed value.

use crate::coerce::to_int;
use serde_json::Value;
use std::fmt;

/// The value side of a selector clause.
///
/// Raw values that parse as signed base-10 integers are stored as `Int`,
/// everything else as `Text`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SelectorValue {
    Int(i64),
    Text(String),
}

impl SelectorValue {
    /// Coerce a raw clause value.
    pub fn parse(raw: &str) -> Self {
        match to_int(raw) {
            Some(i) => SelectorValue::Int(i),
            None => SelectorValue::Text(raw.to_string()),
        }
    }

    /// Compare against a document value.
    ///
    /// Integers equal any JSON number with the same numeric value, so `4096`
    /// matches both `4096` and `4096.0`. Text only equals JSON strings.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (SelectorValue::Int(expected), Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    i == *expected
                } else if n.is_f64() {
                    // only integral floats inside the i64 range compare exactly
                    n.as_f64().is_some_and(|f| {
                        f.fract() == 0.0
                            && f >= i64::MIN as f64
                            && f < i64::MAX as f64
                            && f as i64 == *expected
                    })
                } else {
                    // u64 beyond i64::MAX can never equal an i64
                    false
                }
            }
            (SelectorValue::Text(expected), Value::String(s)) => s == expected,
            _ => false,
        }
    }
}

impl fmt::Display for SelectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorValue::Int(i) => write!(f, "{}", i),
            SelectorValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for SelectorValue {
    fn from(i: i64) -> Self {
        SelectorValue::Int(i)
    }
}

impl From<&str> for SelectorValue {
    fn from(s: &str) -> Self {
        SelectorValue::Text(s.to_string())
    }
}

/// A conjunction of `field == value` constraints, in the order written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    fields: Vec<(String, SelectorValue)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Selector::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SelectorValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add a constraint. A repeated field replaces the earlier value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SelectorValue>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&SelectorValue> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when `candidate` is an object carrying every field with an equal value.
    ///
    /// A field absent from the candidate is a non-match, never an error.
    pub fn matches(&self, candidate: &Value) -> bool {
        let Some(obj) = candidate.as_object() else {
            return false;
        };
        self.fields.iter().all(|(field, expected)| {
            obj.get(field)
                .map(|actual| expected.matches(actual))
                .unwrap_or(false)
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (field, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", field, value)?;
        }
        write!(f, "}}")
    }
}
