//! Shared test utilities for the nft-manager test suite.
//!
//! Builds throwaway projects and reads back what operations wrote.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project(3);   // input/images/{0,1,2}.png + input/metadata/{0,1,2}.json
//! let mut manager = Manager::new(ProjectConfig::new(tmp.path())).unwrap();
//! manager.try_run(&mut Renumber, raw_options(json!({"start_from_id": 10}))).unwrap();
//!
//! assert_eq!(output_file_names(tmp.path(), "metadata"), vec!["10", "11", "12"]);
//! assert_eq!(read_output_metadata(tmp.path(), 10)["name"], "N#0");
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::metadata::Metadata;
use crate::naming;
use crate::options::RawOptions;
use serde_json::{Value, json};

// =========================================================================
// Fixture setup
// =========================================================================

/// Metadata written for record `id` by [`setup_project`].
pub fn record_metadata(id: u64) -> Metadata {
    match json!({
        "name": format!("N#{id}"),
        "description": format!("Record {id}"),
        "image": format!("ipfs://cid/{id}.png"),
        "attributes": [
            {"trait_type": "Background", "value": "Blue"},
            {"trait_type": "Hat", "value": "Cap"}
        ]
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Write `<id>.png` (content `image <id>`) and `<id>.json` into the given folders.
pub fn write_record_in(images: &Path, metadata_dir: &Path, id: u64, metadata: &Metadata) {
    fs::create_dir_all(images).unwrap();
    fs::create_dir_all(metadata_dir).unwrap();
    fs::write(images.join(format!("{id}.png")), format!("image {id}")).unwrap();
    fs::write(
        metadata_dir.join(format!("{id}.json")),
        serde_json::to_string_pretty(metadata).unwrap(),
    )
    .unwrap();
}

/// Project with `count` records under the default `input/` layout.
pub fn setup_project(count: u64) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("input/images");
    let metadata = tmp.path().join("input/metadata");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&metadata).unwrap();
    for id in 0..count {
        write_record_in(&images, &metadata, id, &record_metadata(id));
    }
    tmp
}

/// Raw options from a `json!` object literal.
pub fn raw_options(value: Value) -> RawOptions {
    match value {
        Value::Object(map) => map,
        other => panic!("options must be a JSON object, got {other}"),
    }
}

// =========================================================================
// Output inspection
// =========================================================================

/// File names in `output/<kind>`, in numeric order.
pub fn output_file_names(root: &Path, kind: &str) -> Vec<String> {
    let dir = root.join("output").join(kind);
    let mut names: Vec<String> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()))
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort_by_key(|name| naming::sort_key(name));
    names
}

/// Parsed `output/metadata/<id>`. Panics if missing or not an object.
pub fn read_output_metadata(root: &Path, id: u64) -> Metadata {
    let path = root.join("output/metadata").join(id.to_string());
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    match serde_json::from_str(&content).unwrap() {
        Value::Object(map) => map,
        other => panic!("{} is not an object: {other}", path.display()),
    }
}
