//! Deep-merge primitive used to layer configuration fragments.
//!
//! Sources are plain [`serde_json::Value`] blobs merged in order, later
//! sources winning. Objects merge recursively; scalars replace. Arrays follow
//! an explicit [`ArrayStrategy`], and [`MergeOptions::ignore`] names top-level
//! fields that later sources may not touch.

use serde_json::{Map, Value};

/// How array-valued fields combine when two layers both define them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ArrayStrategy {
    /// Append the later layer's items to the existing array.
    #[default]
    Concat,
    /// Replace the existing array wholesale.
    Overwrite,
}

/// Options controlling a [`merge`] pass.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MergeOptions {
    /// Strategy applied to array-valued fields.
    pub arrays: ArrayStrategy,
    /// Top-level fields only the first source may supply.
    pub ignore: Vec<String>,
}

impl MergeOptions {
    /// Options that overwrite arrays instead of concatenating them.
    #[must_use]
    pub const fn overwrite() -> Self {
        Self {
            arrays: ArrayStrategy::Overwrite,
            ignore: Vec::new(),
        }
    }

    /// Add `fields` to the ignore list.
    #[must_use]
    pub fn ignoring<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore.extend(fields.into_iter().map(Into::into));
        self
    }
}

/// Merge `sources` in order and return the combined value.
///
/// The first source seeds the result. Fields listed in
/// [`MergeOptions::ignore`] are dropped from every later source before it is
/// applied, so they keep whatever the first source supplied.
///
/// # Examples
///
/// ```rust
/// use rollup_confgen::merge::{merge, MergeOptions};
/// use serde_json::json;
///
/// let merged = merge(
///     [
///         json!({"output": {"file": "a.js"}}),
///         json!({"external": ["x"], "output": {"file": "b.js"}}),
///         json!({"external": ["y"]}),
///     ],
///     &MergeOptions::overwrite().ignoring(["output"]),
/// );
/// assert_eq!(merged, json!({"output": {"file": "a.js"}, "external": ["y"]}));
/// ```
#[must_use]
pub fn merge<I>(sources: I, options: &MergeOptions) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut layers = sources.into_iter();
    let mut target = layers.next().unwrap_or_else(|| Value::Object(Map::new()));
    for source in layers {
        match source {
            Value::Object(mut map) => {
                for field in &options.ignore {
                    map.shift_remove(field);
                }
                merge_object(&mut target, map, options.arrays);
            }
            other => merge_value(&mut target, other, options.arrays),
        }
    }
    target
}

/// Overlay `layer` onto `target`, updating `target` in place.
///
/// Behaviour:
/// - Objects are merged recursively; merging an object into a non-object
///   target replaces the target with that object.
/// - Arrays concatenate onto an existing array under
///   [`ArrayStrategy::Concat`] and replace it otherwise.
/// - Scalars and `null` replace `target` wholesale.
///
/// # Examples
///
/// ```rust
/// use rollup_confgen::merge::{merge_value, ArrayStrategy};
/// use serde_json::json;
///
/// let mut acc = json!({"a": 1, "b": {"x": 1}, "list": [1]});
/// merge_value(&mut acc, json!({"b": {"y": 2}, "list": [2]}), ArrayStrategy::Concat);
/// assert_eq!(acc, json!({"a": 1, "b": {"x": 1, "y": 2}, "list": [1, 2]}));
///
/// merge_value(&mut acc, json!({"list": [3]}), ArrayStrategy::Overwrite);
/// assert_eq!(acc["list"], json!([3]));
/// ```
pub fn merge_value(target: &mut Value, layer: Value, arrays: ArrayStrategy) {
    match (target, layer) {
        (target, Value::Object(map)) => merge_object(target, map, arrays),
        (Value::Array(existing), Value::Array(items)) if arrays == ArrayStrategy::Concat => {
            existing.extend(items);
        }
        (target, layer) => *target = layer,
    }
}

/// Overlay the object `layer` onto the object `target`.
///
/// This is the map-level form of [`merge_value`], used where both sides are
/// already known to be objects.
pub fn merge_map(target: &mut Map<String, Value>, layer: Map<String, Value>, arrays: ArrayStrategy) {
    for (key, value) in layer {
        match target.get_mut(&key) {
            Some(existing) => merge_value(existing, value, arrays),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge_object(target: &mut Value, map: Map<String, Value>, arrays: ArrayStrategy) {
    if let Value::Object(target_map) = target {
        merge_map(target_map, map, arrays);
    } else {
        *target = Value::Object(map);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(ArrayStrategy::Concat, json!(["a", "b"]))]
    #[case(ArrayStrategy::Overwrite, json!(["b"]))]
    fn arrays_follow_strategy(#[case] arrays: ArrayStrategy, #[case] expected: Value) {
        let merged = merge(
            [json!({"external": ["a"]}), json!({"external": ["b"]})],
            &MergeOptions {
                arrays,
                ignore: Vec::new(),
            },
        );
        assert_eq!(merged["external"], expected);
    }

    #[test]
    fn later_sources_win_and_nested_objects_merge() {
        let merged = merge(
            [
                json!({"watch": {"chokidar": true, "include": "src/**"}}),
                json!({"watch": {"chokidar": false}, "input": "main.js"}),
            ],
            &MergeOptions::default(),
        );
        assert_eq!(
            merged,
            json!({
                "watch": {"chokidar": false, "include": "src/**"},
                "input": "main.js",
            })
        );
    }

    #[test]
    fn ignored_fields_keep_the_first_source() {
        let merged = merge(
            [
                json!({"plugins": ["first"]}),
                json!({"plugins": ["second"], "input": "a.js"}),
                json!({"plugins": ["third"]}),
            ],
            &MergeOptions::default().ignoring(["plugins"]),
        );
        assert_eq!(merged, json!({"plugins": ["first"], "input": "a.js"}));
    }

    #[test]
    fn ignore_only_applies_to_top_level_fields() {
        let merged = merge(
            [
                json!({"watch": {"output": 1}}),
                json!({"watch": {"output": 2}}),
            ],
            &MergeOptions::default().ignoring(["output"]),
        );
        assert_eq!(merged, json!({"watch": {"output": 2}}));
    }

    #[test]
    fn ignored_fields_leave_key_order_intact() {
        let merged = merge(
            [
                json!({}),
                json!({"input": "a.js", "plugins": [], "external": [], "watch": {}}),
            ],
            &MergeOptions::default().ignoring(["plugins"]),
        );
        let keys: Vec<_> = merged
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["input", "external", "watch"]);
    }

    #[test]
    fn empty_source_list_yields_empty_object() {
        assert_eq!(merge([], &MergeOptions::default()), json!({}));
    }

    #[test]
    fn object_replaces_scalar_target() {
        let mut target = json!("scalar");
        merge_value(&mut target, json!({"a": 1}), ArrayStrategy::Concat);
        assert_eq!(target, json!({"a": 1}));
    }

    #[test]
    fn null_overwrites_existing_values() {
        let mut target = json!({"target": "modern"});
        merge_value(&mut target, json!({"target": null}), ArrayStrategy::Concat);
        assert_eq!(target, json!({"target": null}));
    }
}
