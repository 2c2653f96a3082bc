//! Access options: stored defaults and per-call overrides.

use crate::{SmartDictError, SmartDictResult};
use serde::{Deserialize, Serialize};

/// Default delimiter between nested steps.
pub const DEFAULT_NESTED_DELIMITER: &str = ":";
/// Default delimiter between sibling keys of the final step.
pub const DEFAULT_FAN_OUT_DELIMITER: &str = "/";

/// Characters reserved by the selector syntax and its `{n}` placeholders.
const RESERVED: [char; 13] = ['{', '}', ',', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Options governing how keys are parsed and how misses are handled.
///
/// Options are stored on a [`SmartDict`](crate::SmartDict) and can be
/// overridden for a single call with [`OptionsOverride`]. Both types
/// deserialize from any serde source, with missing fields taking defaults:
///
/// ```
/// use smartdict::Options;
///
/// let opts: Options = serde_json::from_str(r#"{"raise_on_missing": false}"#).unwrap();
/// assert!(opts.copy);
/// assert!(!opts.raise_on_missing);
/// assert_eq!(opts.nested_delimiter, ":");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Return deep copies from `get` (`true`) or borrow the stored data (`false`).
    pub copy: bool,
    /// Fail on missing keys when no default is given (`true`),
    /// or resolve them to an absence marker (`false`).
    pub raise_on_missing: bool,
    /// Separator between nested steps.
    pub nested_delimiter: String,
    /// Separator between sibling keys in the final step.
    pub fan_out_delimiter: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            copy: true,
            raise_on_missing: true,
            nested_delimiter: DEFAULT_NESTED_DELIMITER.to_string(),
            fan_out_delimiter: DEFAULT_FAN_OUT_DELIMITER.to_string(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    pub fn with_raise_on_missing(mut self, raise: bool) -> Self {
        self.raise_on_missing = raise;
        self
    }

    pub fn with_nested_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.nested_delimiter = delimiter.into();
        self
    }

    pub fn with_fan_out_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.fan_out_delimiter = delimiter.into();
        self
    }

    /// Check that the delimiters can be used to split keys unambiguously.
    pub fn validate(&self) -> SmartDictResult<()> {
        for (name, delimiter) in [
            ("nested_delimiter", &self.nested_delimiter),
            ("fan_out_delimiter", &self.fan_out_delimiter),
        ] {
            if delimiter.is_empty() {
                return Err(SmartDictError::invalid_options(format!(
                    "{name} must not be empty"
                )));
            }
            if delimiter.contains(&RESERVED[..]) {
                return Err(SmartDictError::invalid_options(format!(
                    "{name} `{delimiter}` uses a character reserved for selectors or digits"
                )));
            }
        }
        if self.nested_delimiter.contains(self.fan_out_delimiter.as_str())
            || self.fan_out_delimiter.contains(self.nested_delimiter.as_str())
        {
            return Err(SmartDictError::invalid_options(format!(
                "nested delimiter `{}` and fan-out delimiter `{}` overlap",
                self.nested_delimiter, self.fan_out_delimiter
            )));
        }
        Ok(())
    }

    /// Apply per-call overrides on top of these options.
    ///
    /// The stored options are left untouched; the merged set is validated.
    pub fn merged(&self, overrides: &OptionsOverride) -> SmartDictResult<Options> {
        let merged = Options {
            copy: overrides.copy.unwrap_or(self.copy),
            raise_on_missing: overrides.raise_on_missing.unwrap_or(self.raise_on_missing),
            nested_delimiter: overrides
                .nested_delimiter
                .clone()
                .unwrap_or_else(|| self.nested_delimiter.clone()),
            fan_out_delimiter: overrides
                .fan_out_delimiter
                .clone()
                .unwrap_or_else(|| self.fan_out_delimiter.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub(crate) fn delimiters(&self) -> Delimiters<'_> {
        Delimiters {
            nested: &self.nested_delimiter,
            fan_out: &self.fan_out_delimiter,
        }
    }

    pub(crate) fn policy(&self) -> Policy {
        Policy {
            copy: self.copy,
            raise_on_missing: self.raise_on_missing,
        }
    }
}

/// Per-call option overrides. Unset fields fall back to the stored options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raise_on_missing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_out_delimiter: Option<String>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(mut self, copy: bool) -> Self {
        self.copy = Some(copy);
        self
    }

    pub fn raise_on_missing(mut self, raise: bool) -> Self {
        self.raise_on_missing = Some(raise);
        self
    }

    pub fn nested_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.nested_delimiter = Some(delimiter.into());
        self
    }

    pub fn fan_out_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.fan_out_delimiter = Some(delimiter.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Delimiters used to split a key into steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters<'a> {
    pub nested: &'a str,
    pub fan_out: &'a str,
}

impl Default for Delimiters<'static> {
    fn default() -> Self {
        Self {
            nested: DEFAULT_NESTED_DELIMITER,
            fan_out: DEFAULT_FAN_OUT_DELIMITER,
        }
    }
}

/// Copy and miss handling for one resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Policy {
    pub(crate) copy: bool,
    pub(crate) raise_on_missing: bool,
}
