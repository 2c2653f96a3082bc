//! `SmartDict`: an owned JSON object with key-path access.

use crate::{
    get_at, get_mut_at, set_at, Options, OptionsOverride, Resolved, SmartDictError,
    SmartDictResult,
};
use serde_json::{Map, Value};
use std::fmt;

/// An owned JSON object addressed with the key syntax.
///
/// Options given at construction (or through [`SmartDict::set_options`]) are
/// the defaults for every call; the `*_with` methods override them for a
/// single call without changing what is stored.
///
/// `SmartDict` has no interior locking. Share it across threads behind a
/// `Mutex` or `RwLock`.
///
/// # Examples
///
/// ```
/// use smartdict::SmartDict;
/// use serde_json::json;
///
/// let mut dict = SmartDict::try_from(json!({"items": [{"name": "x"}]})).unwrap();
/// assert_eq!(dict.get("items:0:name").unwrap(), json!("x"));
///
/// dict.set("items:0:name", json!("y")).unwrap();
/// assert_eq!(dict.get("items:0:name").unwrap(), json!("y"));
/// ```
#[derive(Clone, Debug)]
pub struct SmartDict {
    data: Value,
    options: Options,
}

impl SmartDict {
    /// Create an empty dict with default options.
    pub fn new() -> Self {
        Self {
            data: Value::Object(Map::new()),
            options: Options::default(),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            data: Value::Object(map),
            options: Options::default(),
        }
    }

    /// Replace the stored options, builder style.
    pub fn with_options(mut self, options: Options) -> SmartDictResult<Self> {
        self.set_options(options)?;
        Ok(self)
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the stored options after validating them.
    pub fn set_options(&mut self, options: Options) -> SmartDictResult<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// Reset the options and, when given, replace the whole document.
    ///
    /// The new document must be an object.
    pub fn reset(&mut self, data: Option<Value>, options: Options) -> SmartDictResult<()> {
        options.validate()?;
        if let Some(data) = data {
            self.data = Value::Object(into_object(data)?);
        }
        self.options = options;
        Ok(())
    }

    /// Merge top-level entries into the document; incoming keys win.
    pub fn update(&mut self, entries: Map<String, Value>) {
        if let Value::Object(map) = &mut self.data {
            map.extend(entries);
        }
    }

    /// True when `key` is a top-level key. The key syntax is not applied.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data
            .as_object()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }

    /// Read `key` with the stored options and no default.
    pub fn get(&self, key: &str) -> SmartDictResult<Resolved<'_>> {
        get_at(&self.data, Some(key), None, &self.options)
    }

    /// Read `key`, falling back to `default` on any miss.
    pub fn get_or(&self, key: &str, default: Value) -> SmartDictResult<Resolved<'_>> {
        get_at(&self.data, Some(key), Some(&default), &self.options)
    }

    /// Read with per-call overrides. A `None` key returns the whole document.
    pub fn get_with(
        &self,
        key: Option<&str>,
        default: Option<Value>,
        overrides: &OptionsOverride,
    ) -> SmartDictResult<Resolved<'_>> {
        let options = self.options.merged(overrides)?;
        get_at(&self.data, key, default.as_ref(), &options)
    }

    /// Borrow the value at `key` mutably.
    pub fn get_mut(&mut self, key: &str) -> SmartDictResult<Option<&mut Value>> {
        get_mut_at(&mut self.data, key, &self.options)
    }

    /// Write `value` at `key` with the stored options.
    ///
    /// See [`set_at`] for the write rules. Returns `false` when the write was
    /// skipped under `raise_on_missing = false`.
    pub fn set(&mut self, key: &str, value: Value) -> SmartDictResult<bool> {
        set_at(&mut self.data, key, value, &self.options)
    }

    pub fn set_with(
        &mut self,
        key: &str,
        value: Value,
        overrides: &OptionsOverride,
    ) -> SmartDictResult<bool> {
        let options = self.options.merged(overrides)?;
        set_at(&mut self.data, key, value, &options)
    }

    #[inline]
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    pub fn into_inner(self) -> Value {
        self.data
    }
}

fn into_object(value: Value) -> SmartDictResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SmartDictError::type_mismatch(
            crate::Location::root(),
            "object",
            crate::error::value_type_name(&other),
        )),
    }
}

impl Default for SmartDict {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Value> for SmartDict {
    type Error = SmartDictError;

    fn try_from(value: Value) -> SmartDictResult<Self> {
        into_object(value).map(SmartDict::from_map)
    }
}

impl From<Map<String, Value>> for SmartDict {
    fn from(map: Map<String, Value>) -> Self {
        SmartDict::from_map(map)
    }
}

impl fmt::Display for SmartDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

/// Documents are compared; options are ignored.
impl PartialEq for SmartDict {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl PartialEq<Value> for SmartDict {
    fn eq(&self, other: &Value) -> bool {
        &self.data == other
    }
}
