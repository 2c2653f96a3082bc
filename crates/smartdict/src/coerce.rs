//! Small helpers shared by the parser and the resolver.

use crate::Selector;
use serde_json::Value;

/// Parse a signed base-10 integer.
///
/// Surrounding whitespace, floats and out-of-range values are rejected.
#[inline]
pub fn to_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok()
}

/// Index of the first element matching every field of `selector`.
pub fn index_of(items: &[Value], selector: &Selector) -> Option<usize> {
    items.iter().position(|item| selector.matches(item))
}

/// Map a possibly negative index onto `0..len`. Negative values count from the end.
#[inline]
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 {
        (len as i64).checked_add(index)?
    } else {
        index
    };
    usize::try_from(resolved).ok().filter(|i| *i < len)
}
