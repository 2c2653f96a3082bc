//! Write-side resolution: `set` and mutable borrows.
//!
//! Writes walk every step but the last to find the pointer container, then
//! assign the final key (or each fan-out subkey) on it. Every check happens
//! before the first assignment, so a failed write leaves the document as it
//! was.

use crate::error::value_type_name;
use crate::parser::{parse, KeyPlan, Step};
use crate::resolve::{descend_mut, locate, locate_selected, selector_for, Access};
use crate::{Location, Options, Seg, SmartDictError, SmartDictResult};
use serde_json::Value;

/// Write `value` at `key`.
///
/// Returns `Ok(true)` when the value was stored and `Ok(false)` when a miss
/// along the path was skipped because `raise_on_missing` is off.
///
/// - A final object key is inserted or replaced.
/// - A final array index must already exist; there is no implicit append.
/// - A final selector replaces the matched element.
/// - A final fan-out step needs an array `value` with exactly one element
///   per subkey. Shape and arity errors are always raised.
///
/// `value` is moved into the document, so the caller keeps no alias to it
/// whatever the `copy` option says.
///
/// # Examples
///
/// ```
/// use smartdict::{set_at, Options};
/// use serde_json::json;
///
/// let mut doc = json!({"a": 1, "b": 2});
/// set_at(&mut doc, "a/b", json!([10, 20]), &Options::default()).unwrap();
/// assert_eq!(doc, json!({"a": 10, "b": 20}));
/// ```
pub fn set_at(doc: &mut Value, key: &str, value: Value, options: &Options) -> SmartDictResult<bool> {
    options.validate()?;
    let policy = options.policy();
    let plan = parse(key, options.delimiters())?;
    let Some((last, parents)) = plan.split_last() else {
        return Err(SmartDictError::not_found(Location::root(), key));
    };

    let values = match last {
        Step::FanOut(subkeys) => split_fan_out(subkeys.len(), value)?,
        _ => vec![value],
    };

    let mut location = Location::root();
    let outcome = walk_mut(doc, parents, &plan, key, &mut location).and_then(|pointer| {
        let targets = target_slots(pointer, last, &plan, key, &location)?;
        for (seg, value) in targets.iter().zip(values) {
            assign(pointer, seg, value);
        }
        Ok(())
    });

    match outcome {
        Ok(()) => Ok(true),
        Err(err) if err.is_miss() && !policy.raise_on_missing => {
            tracing::debug!(key, error = %err, "key missing, write skipped");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Borrow the value at `key` mutably, aliasing the stored data.
///
/// Returns `Ok(None)` on a miss when `raise_on_missing` is off. Fan-out keys
/// are rejected with [`SmartDictError::FanOutBorrow`].
pub fn get_mut_at<'a>(
    doc: &'a mut Value,
    key: &str,
    options: &Options,
) -> SmartDictResult<Option<&'a mut Value>> {
    options.validate()?;
    let policy = options.policy();
    let plan = parse(key, options.delimiters())?;

    let mut location = Location::root();
    match walk_mut(doc, plan.steps(), &plan, key, &mut location) {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_miss() && !policy.raise_on_missing => {
            tracing::debug!(key, error = %err, "key missing, no mutable borrow");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn split_fan_out(keys: usize, value: Value) -> SmartDictResult<Vec<Value>> {
    match value {
        Value::Array(items) if items.len() == keys => Ok(items),
        Value::Array(items) => Err(SmartDictError::arity_mismatch(keys, items.len())),
        other => Err(SmartDictError::FanOutValueNotSequence {
            found: value_type_name(&other),
        }),
    }
}

/// Follow `steps` from `doc`, recording each resolved segment in `location`.
fn walk_mut<'a>(
    doc: &'a mut Value,
    steps: &[Step],
    plan: &KeyPlan,
    key: &str,
    location: &mut Location,
) -> SmartDictResult<&'a mut Value> {
    let mut current = doc;
    for step in steps {
        let seg = match step {
            Step::Key(k) => locate(current, k, location, Access::Read)?,
            Step::Selector(index) => {
                locate_selected(current, selector_for(plan, *index, key)?, location)?
            }
            Step::FanOut(_) => {
                return Err(SmartDictError::FanOutBorrow {
                    path: key.to_string(),
                })
            }
        };
        current = descend_mut(current, &seg, location)?;
        location.push(seg);
    }
    Ok(current)
}

/// Resolve every slot the final step writes to, without writing anything.
fn target_slots(
    pointer: &Value,
    last: &Step,
    plan: &KeyPlan,
    key: &str,
    location: &Location,
) -> SmartDictResult<Vec<Seg>> {
    match last {
        Step::Key(k) => Ok(vec![locate(pointer, k, location, Access::Write)?]),
        Step::Selector(index) => Ok(vec![locate_selected(
            pointer,
            selector_for(plan, *index, key)?,
            location,
        )?]),
        Step::FanOut(subkeys) => subkeys
            .iter()
            .map(|subkey| locate(pointer, subkey, location, Access::Write))
            .collect(),
    }
}

fn assign(pointer: &mut Value, seg: &Seg, value: Value) {
    match (pointer, seg) {
        (Value::Object(map), Seg::Key(k)) => {
            map.insert(k.clone(), value);
        }
        (Value::Array(items), Seg::Index(i)) => {
            if let Some(slot) = items.get_mut(*i) {
                *slot = value;
            }
        }
        // `target_slots` only yields keys for objects and indices for arrays
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lenient() -> Options {
        Options::default().with_raise_on_missing(false)
    }

    #[test]
    fn test_set_inserts_new_object_key() {
        let mut doc = json!({"a": {}});
        assert!(set_at(&mut doc, "a:b", json!(1), &Options::default()).unwrap());
        assert_eq!(doc, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_set_does_not_create_parents() {
        let mut doc = json!({});
        let err = set_at(&mut doc, "a:b", json!(1), &Options::default()).unwrap_err();
        assert!(matches!(err, SmartDictError::NotFound { .. }));
        assert_eq!(doc, json!({}));

        assert!(!set_at(&mut doc, "a:b", json!(1), &lenient()).unwrap());
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_set_array_index_no_append() {
        let mut doc = json!({"xs": [1, 2]});
        set_at(&mut doc, "xs:-1", json!(9), &Options::default()).unwrap();
        assert_eq!(doc, json!({"xs": [1, 9]}));

        let err = set_at(&mut doc, "xs:2", json!(3), &Options::default()).unwrap_err();
        assert!(matches!(err, SmartDictError::NotFound { .. }));
        assert_eq!(doc, json!({"xs": [1, 9]}));
    }

    #[test]
    fn test_set_final_selector_replaces_element() {
        let mut doc = json!({"t": [{"id": 1}, {"id": 2}]});
        set_at(&mut doc, "t:{id:2}", json!({"id": 2, "seen": true}), &Options::default())
            .unwrap();
        assert_eq!(doc["t"][1], json!({"id": 2, "seen": true}));
    }

    #[test]
    fn test_fan_out_arity_checked_before_walk() {
        let mut doc = json!({});
        // the walk would miss, but arity is structural and wins
        let err = set_at(&mut doc, "nope:a/b", json!([1]), &lenient()).unwrap_err();
        assert_eq!(err, SmartDictError::arity_mismatch(2, 1));

        let err = set_at(&mut doc, "a/b", json!({"a": 1}), &lenient()).unwrap_err();
        assert_eq!(err, SmartDictError::FanOutValueNotSequence { found: "object" });
    }

    #[test]
    fn test_fan_out_is_all_or_nothing() {
        let mut doc = json!({"xs": [0, 0]});
        let err = set_at(&mut doc, "xs:0/5", json!([1, 2]), &Options::default()).unwrap_err();
        assert!(matches!(err, SmartDictError::NotFound { .. }));
        assert_eq!(doc, json!({"xs": [0, 0]}));
    }

    #[test]
    fn test_get_mut_aliases_document() {
        let mut doc = json!({"a": [{"n": 1}]});
        let slot = get_mut_at(&mut doc, "a:0:n", &Options::default())
            .unwrap()
            .unwrap();
        *slot = json!(5);
        assert_eq!(doc, json!({"a": [{"n": 5}]}));
    }

    #[test]
    fn test_get_mut_rejects_fan_out() {
        let mut doc = json!({"a": 1, "b": 2});
        let err = get_mut_at(&mut doc, "a/b", &lenient()).unwrap_err();
        assert!(matches!(err, SmartDictError::FanOutBorrow { .. }));
    }

    #[test]
    fn test_get_mut_miss_policy() {
        let mut doc = json!({"a": 1});
        assert!(get_mut_at(&mut doc, "b", &lenient()).unwrap().is_none());
        assert!(get_mut_at(&mut doc, "b", &Options::default()).is_err());
    }
}
