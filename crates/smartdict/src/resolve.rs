//! Read-side resolution of parsed keys.
//!
//! Resolution walks the document by reference, one step at a time. Every
//! step goes through the same single-level access; a failed access is turned
//! into the caller's default, an error, or [`Resolved::Missing`], and the walk
//! stops there.

use crate::coerce::{index_of, normalize_index, to_int};
use crate::error::value_type_name;
use crate::options::Policy;
use crate::parser::{parse, KeyPlan, Step};
use crate::{Location, Options, Seg, Selector, SmartDictError, SmartDictResult};
use serde_json::Value;
use std::borrow::Cow;

/// Result of a read.
///
/// `Value` holds either a deep copy (`Cow::Owned`) or a borrow of the stored
/// data (`Cow::Borrowed`), depending on the `copy` option.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<'a> {
    /// The key was absent and neither a default nor an error applied.
    Missing,
    /// A single resolved value.
    Value(Cow<'a, Value>),
    /// One entry per fan-out subkey, in the order written.
    Tuple(Vec<Resolved<'a>>),
}

impl<'a> Resolved<'a> {
    pub(crate) fn from_ref(value: &'a Value, copy: bool) -> Self {
        if copy {
            Resolved::Value(Cow::Owned(value.clone()))
        } else {
            Resolved::Value(Cow::Borrowed(value))
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }

    /// True when the value aliases the stored document.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Resolved::Value(Cow::Borrowed(_)))
    }

    /// The single value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    /// The fan-out entries, if this is a tuple.
    pub fn as_tuple(&self) -> Option<&[Resolved<'a>]> {
        match self {
            Resolved::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Take the single value as an owned `Value`.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(v) => Some(v.into_owned()),
            _ => None,
        }
    }

    /// Flatten into plain JSON: `Missing` becomes `null`, a tuple becomes an array.
    pub fn into_json(self) -> Value {
        match self {
            Resolved::Missing => Value::Null,
            Resolved::Value(v) => v.into_owned(),
            Resolved::Tuple(items) => {
                Value::Array(items.into_iter().map(Resolved::into_json).collect())
            }
        }
    }

    /// Detach from the document, cloning any borrowed value.
    pub fn into_owned(self) -> Resolved<'static> {
        match self {
            Resolved::Missing => Resolved::Missing,
            Resolved::Value(v) => Resolved::Value(Cow::Owned(v.into_owned())),
            Resolved::Tuple(items) => {
                Resolved::Tuple(items.into_iter().map(Resolved::into_owned).collect())
            }
        }
    }
}

impl PartialEq<Value> for Resolved<'_> {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Resolved::Value(v), other) => v.as_ref() == other,
            (Resolved::Tuple(items), Value::Array(others)) => {
                items.len() == others.len() && items.iter().zip(others).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}

/// Read the value addressed by `key`.
///
/// With no key the whole document is returned. A miss anywhere along the
/// path resolves to `default` when given, fails when `raise_on_missing` is
/// set, and yields [`Resolved::Missing`] otherwise.
///
/// # Examples
///
/// ```
/// use smartdict::{get_at, Options};
/// use serde_json::json;
///
/// let doc = json!({"db": {"tables": [
///     {"name": "logs", "size": 1},
///     {"name": "users", "size": 4096, "0": {"name": "alice", "city": "Paris"}}
/// ]}});
///
/// let opts = Options::default();
/// let found = get_at(&doc, Some("db:tables:{name:users,size:4096}:0:name/city"), None, &opts).unwrap();
/// assert_eq!(found, json!(["alice", "Paris"]));
/// ```
pub fn get_at<'a>(
    doc: &'a Value,
    key: Option<&str>,
    default: Option<&Value>,
    options: &Options,
) -> SmartDictResult<Resolved<'a>> {
    options.validate()?;
    let policy = options.policy();

    let Some(key) = key else {
        return Ok(Resolved::from_ref(doc, policy.copy));
    };

    let plan = parse(key, options.delimiters())?;
    let mut current = doc;
    let mut location = Location::root();

    for step in plan.steps() {
        let located = match step {
            Step::FanOut(subkeys) => {
                let items = subkeys
                    .iter()
                    .map(|subkey| {
                        match locate(current, subkey, &location, Access::Read)
                            .and_then(|seg| descend(current, &seg, &location))
                        {
                            Ok(value) => Ok(Resolved::from_ref(value, policy.copy)),
                            Err(err) => on_miss(err, key, default, policy),
                        }
                    })
                    .collect::<SmartDictResult<Vec<_>>>()?;
                return Ok(Resolved::Tuple(items));
            }
            Step::Selector(index) => {
                let selector = selector_for(&plan, *index, key)?;
                locate_selected(current, selector, &location)
            }
            Step::Key(k) => locate(current, k, &location, Access::Read),
        };

        match located.and_then(|seg| Ok((descend(current, &seg, &location)?, seg))) {
            Ok((next, seg)) => {
                current = next;
                location.push(seg);
            }
            Err(err) => return on_miss(err, key, default, policy),
        }
    }

    Ok(Resolved::from_ref(current, policy.copy))
}

/// Apply the miss policy to a failed access.
fn on_miss<'a>(
    err: SmartDictError,
    key: &str,
    default: Option<&Value>,
    policy: Policy,
) -> SmartDictResult<Resolved<'a>> {
    if !err.is_miss() {
        return Err(err);
    }
    if let Some(default) = default {
        tracing::debug!(key, error = %err, "key missing, using default");
        return Ok(Resolved::Value(Cow::Owned(default.clone())));
    }
    if policy.raise_on_missing {
        return Err(err);
    }
    tracing::debug!(key, error = %err, "key missing, returning absence");
    Ok(Resolved::Missing)
}

/// Whether a key must already exist in an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    /// Objects accept new keys; arrays still require an existing index.
    Write,
}

/// Work out which slot of `container` a plain key addresses.
///
/// Arrays coerce the key to an integer index (negative counts from the end);
/// objects use it verbatim; anything else is a type mismatch.
pub(crate) fn locate(
    container: &Value,
    key: &str,
    location: &Location,
    access: Access,
) -> SmartDictResult<Seg> {
    match container {
        Value::Object(map) => {
            if access == Access::Read && !map.contains_key(key) {
                return Err(SmartDictError::not_found(location.clone(), key));
            }
            Ok(Seg::key(key))
        }
        Value::Array(items) => {
            let index = to_int(key).ok_or_else(|| {
                SmartDictError::type_mismatch(location.clone(), "integer index", "array")
            })?;
            normalize_index(index, items.len())
                .map(Seg::index)
                .ok_or_else(|| SmartDictError::not_found(location.clone(), key))
        }
        other => Err(SmartDictError::type_mismatch(
            location.clone(),
            "object or array",
            value_type_name(other),
        )),
    }
}

/// Find the array element matching `selector`.
pub(crate) fn locate_selected(
    container: &Value,
    selector: &Selector,
    location: &Location,
) -> SmartDictResult<Seg> {
    match container {
        Value::Array(items) => index_of(items, selector)
            .map(Seg::index)
            .ok_or_else(|| SmartDictError::not_found(location.clone(), selector.to_string())),
        other => Err(SmartDictError::type_mismatch(
            location.clone(),
            "array",
            value_type_name(other),
        )),
    }
}

pub(crate) fn selector_for<'p>(
    plan: &'p KeyPlan,
    index: usize,
    key: &str,
) -> SmartDictResult<&'p Selector> {
    plan.selector(index)
        .ok_or_else(|| SmartDictError::unknown_selector(key, index))
}

fn descend<'a>(current: &'a Value, seg: &Seg, location: &Location) -> SmartDictResult<&'a Value> {
    let next = match seg {
        Seg::Key(k) => current.get(k.as_str()),
        Seg::Index(i) => current.get(*i),
    };
    next.ok_or_else(|| SmartDictError::not_found(location.clone(), seg.to_string()))
}

pub(crate) fn descend_mut<'a>(
    current: &'a mut Value,
    seg: &Seg,
    location: &Location,
) -> SmartDictResult<&'a mut Value> {
    let next = match seg {
        Seg::Key(k) => current.get_mut(k.as_str()),
        Seg::Index(i) => current.get_mut(*i),
    };
    next.ok_or_else(|| SmartDictError::not_found(location.clone(), seg.to_string()))
}
