//! # NFT Manager
//!
//! Batch editor for NFT collections. A collection is a folder of images plus a
//! folder of JSON metadata files, one pair per token. The crate runs an ordered
//! pipeline of operations over the whole collection: renumbering, shuffling,
//! trait obfuscation, metadata formatting and metadata rewriting.
//!
//! # Architecture: Chained Operations
//!
//! ```text
//! input/{images,metadata}  →  op #0  →  output/
//! output/ → .input-tmp/    →  op #1  →  output/
//! output/ → .input-tmp/    →  op #2  →  output/
//! ```
//!
//! Every operation rebuilds the record set from its input folder, so records never
//! carry state from one operation to the next. Output files are named by token id:
//! `output/images/<tokenId>.png` and `output/metadata/<tokenId>`.
//!
//! ```no_run
//! use nft_manager::manager::{Manager, ProjectConfig};
//! use nft_manager::operation::{FormatMetadata, Renumber};
//! use nft_manager::options::RawOptions;
//! use serde_json::json;
//!
//! let mut manager = Manager::new(ProjectConfig::new("my-collection"))?;
//! let mut renumber_options = RawOptions::new();
//! renumber_options.insert("start_from_id".into(), json!(1));
//! manager.run(&mut Renumber, renumber_options);
//! manager.run(&mut FormatMetadata, RawOptions::new());
//! # Ok::<(), nft_manager::error::AppError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manager`] | Runs operations, stages each output as the next input, loads records |
//! | [`operation`] | The operation contract and the five built-in operations |
//! | [`options`] | Option schemas, reserved options (`iteration_index`, `from_id`, `to_id`), resolution |
//! | [`nft`] | The record: an image bound to its metadata and token id |
//! | [`metadata`] | Metadata edits: trait update/removal, obfuscation, `{id}` templates, reformatting |
//! | [`naming`] | `<tokenId>.<ext>` filename parsing and numeric sort keys |
//! | [`files`] | Filesystem adapter: listing, copying, staging, JSON writing |
//! | [`config`] | `nft-manager.toml` loading, validation and merging |
//! | [`error`] | `FilesystemError`, `ValidationError`, and the `AppError` that wraps them |
//! | [`output`] | CLI output formatting for runs, checks and the operation catalog |
//!
//! # Design Decisions
//!
//! ## Options Resolve Before Any File Is Touched
//!
//! An operation's options are resolved against its schema once, before staging or
//! loading. A typo in a step fails that step without writing anything; only
//! `iteration_index` changes per record afterwards.
//!
//! ## Range Filters Use the Incoming Token Id
//!
//! `from_id`/`to_id` compare against the token id a record has when the operation
//! starts (its filename id, or the id a previous operation assigned), never the id
//! the current operation is about to assign. Skipped records are cloned unchanged.
//!
//! ## Failures Stop One Operation, Not the Pipeline
//!
//! [`manager::Manager::run`] reports a failed operation and returns. Its partial
//! output stays in `output/`. The executed operation counter only counts successes,
//! so after a failed first operation the next one reads `input/` again; otherwise
//! the next operation stages `output/`, partial output included.
//!
//! `output/` is only recreated by [`manager::Manager::new`]. Files an operation
//! writes under new ids sit beside the ids it read, and the next operation
//! processes both.

pub mod config;
pub mod error;
pub mod files;
pub mod manager;
pub mod metadata;
pub mod naming;
pub mod nft;
pub mod operation;
pub mod options;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
