//! Compact key-path access for nested JSON documents.
//!
//! `smartdict` reads and writes deeply nested `serde_json::Value`s through a
//! single key string instead of chained lookups.
//!
//! # Key syntax
//!
//! | Syntax | Meaning | Equivalent |
//! |--------|---------|------------|
//! | `a:b` | nested descent | `doc["a"]["b"]` |
//! | `a/b` | fan-out, final step only | `(doc["a"], doc["b"])` |
//! | `items:0` | array index (negative counts from the end) | `doc["items"][0]` |
//! | `tables:{name:users,size:4096}` | first element matching every field | linear search |
//!
//! All four combine:
//!
//! ```
//! use smartdict::SmartDict;
//! use serde_json::json;
//!
//! let dict = SmartDict::try_from(json!({
//!     "db": {"tables": [
//!         {"name": "users", "size": 1},
//!         {"name": "users", "size": 4096, "0": {"name": "alice", "city": "Lyon"}}
//!     ]}
//! })).unwrap();
//!
//! let row = dict.get("db:tables:{name:users,size:4096}:0:name/city").unwrap();
//! assert_eq!(row, json!(["alice", "Lyon"]));
//! ```
//!
//! # Misses
//!
//! A key, index or selector that cannot be resolved is a *miss*. A miss
//! returns the caller's default when one is given; otherwise it fails with
//! [`SmartDictError::NotFound`] / [`SmartDictError::TypeMismatch`] when
//! `raise_on_missing` is on (the default), or yields [`Resolved::Missing`].
//! Malformed keys are always errors.
//!
//! # Copies
//!
//! With `copy` on (the default), reads return deep copies. With it off they
//! borrow the stored data; see [`Resolved::is_borrowed`] and
//! [`SmartDict::get_mut`].

mod coerce;
mod dict;
mod error;
mod location;
mod mutate;
mod options;
mod parser;
mod resolve;
mod selector;

pub use coerce::{index_of, to_int};
pub use dict::SmartDict;
pub use error::{value_type_name, SmartDictError, SmartDictResult};
pub use location::{Location, Seg};
pub use mutate::{get_mut_at, set_at};
pub use options::{
    Delimiters, Options, OptionsOverride, DEFAULT_FAN_OUT_DELIMITER, DEFAULT_NESTED_DELIMITER,
};
pub use parser::{extract_selectors, parse, KeyPlan, Step};
pub use resolve::{get_at, Resolved};
pub use selector::{Selector, SelectorValue};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
