//! Metadata sidecar model and the edits operations apply to it.
//!
//! A metadata file is a JSON object. The keys the pipeline understands are:
//!
//! ```json
//! {
//!     "name": "Token #12",
//!     "description": "...",
//!     "image": "ipfs://<cid>/12.png",
//!     "attributes": [
//!         { "trait_type": "Background", "value": "Blue" },
//!         { "trait_type": "Hat", "value": "Cap" }
//!     ]
//! }
//! ```
//!
//! Every other key is carried through untouched and in its original position
//! (`serde_json` is built with `preserve_order`).
//!
//! ## Trait edits
//!
//! - [`update_trait`] overwrites `value` on every entry with a matching `trait_type`,
//!   in place, or appends a new entry when none matches.
//! - [`remove_trait`] drops every matching entry and keeps the others in order.
//!
//! Entries without a string `trait_type` never match.

use crate::error::ValidationError;
use crate::naming::TokenId;
use serde_json::{Map, Value};

/// Parsed metadata file, keys in file order.
pub type Metadata = Map<String, Value>;

/// Placeholder substituted with the token id in name/image/url templates.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Keys that lead a reformatted metadata object, in this order.
const LEADING_KEYS: [&str; 4] = ["name", "description", "image", "attributes"];

/// Text hook applied to a metadata file before it is parsed as JSON.
pub type MetadataPreprocessor = Box<dyn Fn(&str) -> String>;

fn attributes_mut(metadata: &mut Metadata) -> Result<&mut Vec<Value>, ValidationError> {
    metadata
        .get_mut("attributes")
        .and_then(Value::as_array_mut)
        .ok_or(ValidationError::MissingAttributes)
}

fn trait_type(attribute: &Value) -> Option<&str> {
    attribute.get("trait_type").and_then(Value::as_str)
}

/// Set `trait_type` to `value`, replacing in place or appending.
pub fn update_trait(
    metadata: &mut Metadata,
    trait_name: &str,
    value: &str,
) -> Result<(), ValidationError> {
    let attributes = attributes_mut(metadata)?;
    let mut found = false;

    for attribute in attributes.iter_mut() {
        if trait_type(attribute) != Some(trait_name) {
            continue;
        }
        if let Some(entry) = attribute.as_object_mut() {
            entry.insert("value".to_string(), Value::from(value));
            found = true;
        }
    }

    if !found {
        let mut entry = Map::new();
        entry.insert("trait_type".to_string(), Value::from(trait_name));
        entry.insert("value".to_string(), Value::from(value));
        attributes.push(Value::Object(entry));
    }
    Ok(())
}

/// Remove every attribute whose `trait_type` is `trait_name`.
pub fn remove_trait(metadata: &mut Metadata, trait_name: &str) -> Result<(), ValidationError> {
    attributes_mut(metadata)?.retain(|a| trait_type(a) != Some(trait_name));
    Ok(())
}

/// Replace every trait value with `placeholder`.
pub fn obfuscate_traits(metadata: &mut Metadata, placeholder: &str) -> Result<(), ValidationError> {
    for attribute in attributes_mut(metadata)? {
        if let Some(entry) = attribute.as_object_mut() {
            entry.insert("value".to_string(), Value::from(placeholder));
        }
    }
    Ok(())
}

/// Substitute `{id}` in `template` with `token_id`.
pub fn replace_id_placeholder(template: &str, token_id: TokenId) -> String {
    template.replace(ID_PLACEHOLDER, &token_id.to_string())
}

/// Reorder keys so `name, description, image, attributes` lead (when present), then
/// sort `attributes` by `trait_type`. Ties keep their relative order.
pub fn reformat(metadata: &Metadata) -> Metadata {
    let mut remaining = metadata.clone();
    let mut output = Metadata::new();

    for key in LEADING_KEYS {
        if let Some(value) = remaining.shift_remove(key) {
            output.insert(key.to_string(), value);
        }
    }
    output.extend(remaining);

    if let Some(Value::Array(attributes)) = output.get_mut("attributes") {
        attributes.sort_by(|a, b| trait_type(a).unwrap_or("").cmp(trait_type(b).unwrap_or("")));
    }
    output
}

/// Rewrite typographic quotes to their ASCII forms.
///
/// Collections exported from spreadsheets often carry `“Blue”` where JSON expects `"Blue"`.
pub fn normalize_smart_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("test metadata must be an object"),
        }
    }

    fn traits(metadata: &Metadata) -> Vec<(String, String)> {
        metadata["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| {
                (
                    a["trait_type"].as_str().unwrap().to_string(),
                    a["value"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    fn sample() -> Metadata {
        metadata(json!({
            "name": "Token #1",
            "attributes": [
                {"trait_type": "Background", "value": "Blue"},
                {"trait_type": "Hat", "value": "Cap"},
                {"trait_type": "Eyes", "value": "Green"}
            ]
        }))
    }

    // =========================================================================
    // update_trait / remove_trait
    // =========================================================================

    #[test]
    fn update_existing_trait_keeps_position() {
        let mut m = sample();
        update_trait(&mut m, "Hat", "Crown").unwrap();
        assert_eq!(
            traits(&m),
            vec![
                ("Background".into(), "Blue".into()),
                ("Hat".into(), "Crown".into()),
                ("Eyes".into(), "Green".into()),
            ]
        );
    }

    #[test]
    fn update_absent_trait_appends() {
        let mut m = sample();
        update_trait(&mut m, "Mouth", "Smile").unwrap();
        let t = traits(&m);
        assert_eq!(t.len(), 4);
        assert_eq!(t[3], ("Mouth".into(), "Smile".into()));
    }

    #[test]
    fn update_trait_keeps_extra_entry_keys() {
        let mut m = metadata(json!({
            "attributes": [{"trait_type": "Level", "value": "1", "display_type": "number"}]
        }));
        update_trait(&mut m, "Level", "2").unwrap();
        assert_eq!(
            m["attributes"][0],
            json!({"trait_type": "Level", "value": "2", "display_type": "number"})
        );
    }

    #[test]
    fn update_trait_without_attributes_is_error() {
        let mut m = metadata(json!({"name": "x"}));
        assert!(matches!(
            update_trait(&mut m, "Hat", "Cap"),
            Err(ValidationError::MissingAttributes)
        ));
    }

    #[test]
    fn remove_trait_drops_all_matches_in_order() {
        let mut m = metadata(json!({
            "attributes": [
                {"trait_type": "Hat", "value": "Cap"},
                {"trait_type": "Eyes", "value": "Green"},
                {"trait_type": "Hat", "value": "Crown"},
                {"trait_type": "Skin", "value": "Gold"}
            ]
        }));
        remove_trait(&mut m, "Hat").unwrap();
        assert_eq!(
            traits(&m),
            vec![("Eyes".into(), "Green".into()), ("Skin".into(), "Gold".into())]
        );
    }

    #[test]
    fn remove_absent_trait_is_noop() {
        let mut m = sample();
        remove_trait(&mut m, "Wings").unwrap();
        assert_eq!(m, sample());
    }

    #[test]
    fn obfuscate_replaces_every_value() {
        let mut m = sample();
        obfuscate_traits(&mut m, "?").unwrap();
        assert!(traits(&m).iter().all(|(_, v)| v == "?"));
        assert_eq!(m["name"], "Token #1");
    }

    // =========================================================================
    // Placeholders
    // =========================================================================

    #[test]
    fn placeholder_replaced_everywhere() {
        assert_eq!(
            replace_id_placeholder("https://x.io/{id}/{id}.png", 12),
            "https://x.io/12/12.png"
        );
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        assert_eq!(replace_id_placeholder("Mystery", 3), "Mystery");
    }

    // =========================================================================
    // reformat
    // =========================================================================

    #[test]
    fn reformat_puts_known_keys_first() {
        let m = metadata(json!({
            "dna": "abc",
            "attributes": [],
            "edition": 4,
            "name": "Token #4",
            "image": "ipfs://x/4.png"
        }));
        let reformatted = reformat(&m);
        let keys: Vec<&str> = reformatted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "image", "attributes", "dna", "edition"]);
    }

    #[test]
    fn reformat_sorts_attributes_stably() {
        let m = metadata(json!({
            "attributes": [
                {"trait_type": "Hat", "value": "first"},
                {"trait_type": "Background", "value": "Blue"},
                {"trait_type": "Hat", "value": "second"},
                {"trait_type": "Eyes", "value": "Green"}
            ]
        }));
        let t = traits(&reformat(&m));
        assert_eq!(
            t,
            vec![
                ("Background".into(), "Blue".into()),
                ("Eyes".into(), "Green".into()),
                ("Hat".into(), "first".into()),
                ("Hat".into(), "second".into()),
            ]
        );
    }

    #[test]
    fn reformat_uses_byte_order() {
        let m = metadata(json!({
            "attributes": [
                {"trait_type": "b", "value": "1"},
                {"trait_type": "B", "value": "2"},
                {"trait_type": "a", "value": "3"}
            ]
        }));
        let names: Vec<String> = traits(&reformat(&m)).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["B", "a", "b"]);
    }

    #[test]
    fn reformat_without_attributes_only_reorders() {
        let m = metadata(json!({"extra": 1, "description": "d"}));
        let reformatted = reformat(&m);
        let keys: Vec<&str> = reformatted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["description", "extra"]);
    }

    // =========================================================================
    // Preprocessing
    // =========================================================================

    #[test]
    fn smart_quotes_become_ascii() {
        let raw = "{\u{201C}name\u{201D}: \u{201C}it\u{2019}s\u{201D}}";
        let fixed = normalize_smart_quotes(raw);
        assert_eq!(fixed, "{\"name\": \"it's\"}");
        let parsed: Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(parsed["name"], "it's");
    }
}
