//! Key syntax parser.
//!
//! A key such as `db:tables:{name:users,size:4096}:0:name/city` is turned
//! into a [`KeyPlan`] in two pure phases:
//!
//! 1. every `{field:value,...}` group is extracted into a [`Selector`] and
//!    replaced by a `{n}` placeholder, `n` being its discovery index;
//! 2. the rewritten key is split on the nested delimiter, and the final
//!    step is split on the fan-out delimiter if it contains one.
//!
//! Extraction happens first so that the `:` inside selector clauses never
//! reaches the nested split.

use crate::options::Delimiters;
use crate::selector::{Selector, SelectorValue};
use crate::{SmartDictError, SmartDictResult};
use regex::Regex;
use std::sync::LazyLock;

static BRACE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").expect("valid regex"));
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(\d+)\}$").expect("valid regex"));

/// One step of a parsed key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Object key, or array index when the current value is a sequence.
    Key(String),
    /// Reference into [`KeyPlan::selectors`].
    Selector(usize),
    /// Sibling keys of the final step, resolved side by side.
    FanOut(Vec<String>),
}

/// A parsed key: ordered steps plus the selectors they reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPlan {
    steps: Vec<Step>,
    selectors: Vec<Selector>,
}

impl KeyPlan {
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[inline]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    #[inline]
    pub fn selector(&self, index: usize) -> Option<&Selector> {
        self.selectors.get(index)
    }

    /// The final step and everything before it.
    ///
    /// A plan always has at least one step, since splitting never yields
    /// an empty list.
    #[inline]
    pub fn split_last(&self) -> Option<(&Step, &[Step])> {
        self.steps.split_last()
    }
}

/// Parse `path` into steps and selectors.
///
/// # Errors
///
/// All errors are structural:
/// - [`SmartDictError::MalformedSelector`] for a clause without `:`
/// - [`SmartDictError::FanOutNotLast`] for a fan-out delimiter before the final step
/// - [`SmartDictError::UnknownSelector`] for a `{n}` with no matching selector
/// - [`SmartDictError::SelectorInFanOut`] for a selector among fan-out subkeys
///
/// # Examples
///
/// ```
/// use smartdict::{parse, Delimiters, Step};
///
/// let plan = parse("tables:{name:users}:0:name/city", Delimiters::default()).unwrap();
/// assert_eq!(plan.steps(), &[
///     Step::Key("tables".into()),
///     Step::Selector(0),
///     Step::Key("0".into()),
///     Step::FanOut(vec!["name".into(), "city".into()]),
/// ]);
/// assert_eq!(plan.selectors()[0].to_string(), "{name:users}");
/// ```
pub fn parse(path: &str, delimiters: Delimiters<'_>) -> SmartDictResult<KeyPlan> {
    let (rewritten, selectors) = extract_selectors(path)?;

    let raw_steps: Vec<&str> = rewritten.split(delimiters.nested).collect();
    let last = raw_steps.len() - 1;
    let mut steps = Vec::with_capacity(raw_steps.len());

    for (i, raw) in raw_steps.iter().enumerate() {
        if let Some(index) = placeholder_index(raw) {
            if index >= selectors.len() {
                return Err(SmartDictError::unknown_selector(path, index));
            }
            steps.push(Step::Selector(index));
        } else if raw.contains(delimiters.fan_out) {
            if i < last {
                return Err(SmartDictError::fan_out_not_last(path, delimiters.fan_out));
            }
            let subkeys: Vec<String> = raw.split(delimiters.fan_out).map(str::to_string).collect();
            if subkeys.iter().any(|k| placeholder_index(k).is_some()) {
                return Err(SmartDictError::selector_in_fan_out(path));
            }
            steps.push(Step::FanOut(subkeys));
        } else {
            steps.push(Step::Key((*raw).to_string()));
        }
    }

    tracing::trace!(
        path,
        steps = steps.len(),
        selectors = selectors.len(),
        "parsed key"
    );

    Ok(KeyPlan { steps, selectors })
}

/// Replace every selector group with `{n}` and return the rewritten key
/// together with the extracted selectors, in discovery order.
///
/// Groups whose content is only digits are existing placeholders and are
/// left in place.
pub fn extract_selectors(path: &str) -> SmartDictResult<(String, Vec<Selector>)> {
    let mut rewritten = String::with_capacity(path.len());
    let mut selectors = Vec::new();
    let mut cursor = 0;

    for caps in BRACE_GROUP.captures_iter(path) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body = body.as_str();
        if is_digits(body) {
            continue;
        }

        let selector = parse_selector(path, body)?;
        rewritten.push_str(&path[cursor..whole.start()]);
        rewritten.push_str(&format!("{{{}}}", selectors.len()));
        selectors.push(selector);
        cursor = whole.end();
    }
    rewritten.push_str(&path[cursor..]);

    Ok((rewritten, selectors))
}

fn parse_selector(path: &str, body: &str) -> SmartDictResult<Selector> {
    let mut selector = Selector::new();
    for clause in body.split(',') {
        let (field, raw) = clause
            .split_once(':')
            .ok_or_else(|| SmartDictError::malformed_selector(path, clause))?;
        selector.insert(field, SelectorValue::parse(raw));
    }
    Ok(selector)
}

fn placeholder_index(step: &str) -> Option<usize> {
    PLACEHOLDER
        .captures(step)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[inline]
fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_default(path: &str) -> SmartDictResult<KeyPlan> {
        parse(path, Delimiters::default())
    }

    fn key(k: &str) -> Step {
        Step::Key(k.to_string())
    }

    // =========================================================================
    // Plain keys
    // =========================================================================

    #[test]
    fn test_single_key() {
        let plan = parse_default("a").unwrap();
        assert_eq!(plan.steps(), &[key("a")]);
        assert!(plan.selectors().is_empty());
    }

    #[test]
    fn test_nested_keys() {
        let plan = parse_default("a:b:0:c").unwrap();
        assert_eq!(plan.steps(), &[key("a"), key("b"), key("0"), key("c")]);
    }

    #[test]
    fn test_empty_key_is_one_empty_step() {
        let plan = parse_default("").unwrap();
        assert_eq!(plan.steps(), &[key("")]);
    }

    #[test]
    fn test_custom_delimiters() {
        let delimiters = Delimiters {
            nested: ".",
            fan_out: "|",
        };
        let plan = parse("a.b.c|d", delimiters).unwrap();
        assert_eq!(
            plan.steps(),
            &[key("a"), key("b"), Step::FanOut(vec!["c".into(), "d".into()])]
        );
    }

    #[test]
    fn test_default_delimiters_are_plain_with_custom() {
        let delimiters = Delimiters {
            nested: ".",
            fan_out: "|",
        };
        let plan = parse("a:b/c", delimiters).unwrap();
        assert_eq!(plan.steps(), &[key("a:b/c")]);
    }

    // =========================================================================
    // Fan-out
    // =========================================================================

    #[test]
    fn test_fan_out_last() {
        let plan = parse_default("a/b").unwrap();
        assert_eq!(plan.steps(), &[Step::FanOut(vec!["a".into(), "b".into()])]);
    }

    #[test]
    fn test_fan_out_before_last_is_structural() {
        let err = parse_default("a/b:c").unwrap_err();
        assert!(matches!(err, SmartDictError::FanOutNotLast { .. }));
        assert!(err.is_structural());
    }

    #[test]
    fn test_selector_in_fan_out_is_structural() {
        let err = parse_default("t:{id:1}/x").unwrap_err();
        assert_eq!(err, SmartDictError::selector_in_fan_out("t:{id:1}/x"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_placeholder_checked_before_fan_out() {
        let delimiters = Delimiters {
            nested: ":",
            fan_out: "0",
        };
        let plan = parse("t:{id:1}:name", delimiters).unwrap();
        assert_eq!(plan.steps(), &[key("t"), Step::Selector(0), key("name")]);
    }

    // =========================================================================
    // Selectors
    // =========================================================================

    #[test]
    fn test_selector_extraction() {
        let (rewritten, selectors) =
            extract_selectors("db:tables:{name:users,size:4096}:0:name/city").unwrap();
        assert_eq!(rewritten, "db:tables:{0}:0:name/city");
        assert_eq!(selectors.len(), 1);
        assert_eq!(
            selectors[0].get("name"),
            Some(&SelectorValue::Text("users".into()))
        );
        assert_eq!(selectors[0].get("size"), Some(&SelectorValue::Int(4096)));
    }

    #[test]
    fn test_repeated_identical_selectors_get_distinct_indices() {
        let (rewritten, selectors) = extract_selectors("{id:1}:items:{id:1}").unwrap();
        assert_eq!(rewritten, "{0}:items:{1}");
        assert_eq!(selectors.len(), 2);
        assert_eq!(selectors[0], selectors[1]);
    }

    #[test]
    fn test_selector_steps_reference_discovery_order() {
        let plan = parse_default("a:{x:1}:b:{y:two}").unwrap();
        assert_eq!(
            plan.steps(),
            &[key("a"), Step::Selector(0), key("b"), Step::Selector(1)]
        );
        assert_eq!(plan.selector(1).unwrap().to_string(), "{y:two}");
    }

    #[test]
    fn test_selector_value_may_contain_delimiters() {
        let plan = parse_default("links:{url:http://host/x}:title").unwrap();
        assert_eq!(plan.steps().len(), 3);
        assert_eq!(
            plan.selector(0).unwrap().get("url"),
            Some(&SelectorValue::Text("http://host/x".into()))
        );
    }

    #[test]
    fn test_malformed_selector() {
        let err = parse_default("a:{name}").unwrap_err();
        assert_eq!(
            err,
            SmartDictError::malformed_selector("a:{name}", "name")
        );

        let err = parse_default("a:{}").unwrap_err();
        assert!(matches!(err, SmartDictError::MalformedSelector { .. }));
    }

    #[test]
    fn test_dangling_placeholder_is_structural() {
        let err = parse_default("a:{0}").unwrap_err();
        assert_eq!(err, SmartDictError::unknown_selector("a:{0}", 0));
    }

    #[test]
    fn test_placeholder_within_range_resolves() {
        // `{0}` written by hand aliases the first extracted selector
        let plan = parse_default("{k:v}:{0}").unwrap();
        assert_eq!(plan.steps(), &[Step::Selector(0), Step::Selector(0)]);
    }
}
