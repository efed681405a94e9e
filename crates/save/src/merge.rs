//! Structural merge of a saved document over the current defaults.
//!
//! This replaces migration scripts: adding a field to the schema means
//! adding it to `SaveData::default()`, and every older document picks it up
//! on the next load. The rules are deliberately simple:
//!
//! - object vs object: recurse per key
//! - anything else saved (array, primitive, null): the saved value wins
//! - saved keys absent from defaults: retained
//!
//! Array-wholesale-replace is intentional and load-bearing for save
//! compatibility: new default entries inside an array are NOT retrofitted
//! into an existing saved array.

use bevy::prelude::*;
use serde_json::Value;

use crate::save_types::{SaveData, CURRENT_SAVE_VERSION};

/// Merges `saved` over `defaults` in place.
pub fn merge_value(defaults: &mut Value, saved: Value) {
    match (defaults, saved) {
        (Value::Object(defaults), Value::Object(saved)) => {
            for (key, saved_value) in saved {
                match defaults.get_mut(&key) {
                    Some(default_value) => merge_value(default_value, saved_value),
                    None => {
                        defaults.insert(key, saved_value);
                    }
                }
            }
        }
        (slot, saved) => *slot = saved,
    }
}

/// Parses a stored document and merges it over `SaveData::default()`.
///
/// A document that does not parse at all yields pure defaults. The version
/// field is forced to `CURRENT_SAVE_VERSION` after the merge, and serde's
/// per-field defaults catch anything the merge could not shape.
pub fn merge_save(json: &str) -> SaveData {
    let saved: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            warn!("save document did not parse, starting from defaults: {e}");
            return SaveData::default();
        }
    };

    let mut merged = serde_json::to_value(SaveData::default())
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
    merge_value(&mut merged, saved);

    if let Value::Object(map) = &mut merged {
        map.insert(
            "version".to_string(),
            Value::from(CURRENT_SAVE_VERSION),
        );
    }

    match serde_json::from_value(merged) {
        Ok(data) => data,
        Err(e) => {
            // A saved value of the wrong type survived the structural merge.
            warn!("merged document did not deserialize, starting from defaults: {e}");
            SaveData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_merge_recursively() {
        let mut defaults = json!({"a": {"x": 1, "y": 2}, "b": 3});
        merge_value(&mut defaults, json!({"a": {"y": 9}}));
        assert_eq!(defaults, json!({"a": {"x": 1, "y": 9}, "b": 3}));
    }

    #[test]
    fn test_arrays_replace_wholesale() {
        let mut defaults = json!({"list": [1, 2, 3]});
        merge_value(&mut defaults, json!({"list": [9]}));
        assert_eq!(defaults, json!({"list": [9]}));
    }

    #[test]
    fn test_unknown_saved_keys_retained() {
        let mut defaults = json!({"a": 1});
        merge_value(&mut defaults, json!({"modded_field": true}));
        assert_eq!(defaults, json!({"a": 1, "modded_field": true}));
    }

    #[test]
    fn test_garbage_yields_defaults() {
        let data = merge_save("not json at all {{{");
        assert_eq!(data, SaveData::default());
    }

    #[test]
    fn test_version_forced_to_current() {
        let data = merge_save(r#"{"version": 999}"#);
        assert_eq!(data.version, CURRENT_SAVE_VERSION);
    }

    #[test]
    fn test_partial_save_keeps_defaults_elsewhere() {
        let data = merge_save(r#"{"player": {"level": 7}, "resources": {"wood": 3.0}}"#);
        assert_eq!(data.player.level, 7);
        // Untouched sibling fields come from defaults.
        assert_eq!(data.player.max_energy, 100);
        assert_eq!(data.resources["wood"], 3.0);
        assert_eq!(data.settings.language, "en");
    }

    #[test]
    fn test_unknown_resource_keys_survive_merge() {
        let data = merge_save(r#"{"resources": {"unobtainium": 5.0}}"#);
        assert_eq!(data.resources["unobtainium"], 5.0);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let source = r#"{"player": {"level": 4, "xp": 30}, "resources": {"wood": 7.0},
                         "achievements": ["first_haul"], "portal_stage": 1}"#;
        let once = merge_save(source);
        let twice = merge_save(&once.encode().unwrap());
        assert_eq!(once, twice);
    }
}
