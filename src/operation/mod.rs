//! The operation contract and the built-in operations.
//!
//! An operation is one named transformation applied to the whole batch. The manager
//! drives every operation through the same per-record lifecycle:
//!
//! ```text
//! configure_options  → schema (+ reserved options), resolved once per run
//! pre_execute        → whole-batch pass, may reorder (shuffle) or filter
//! for each record, in pre-pass order:
//!     in id range    → execute = handle_image, then handle_metadata
//!     out of range   → on_skip (clone image + metadata unchanged)
//! ```
//!
//! [`execute`] is a free function, not a trait method, so the image-then-metadata
//! sequencing cannot be overridden; operations customize the two steps instead. The
//! default steps clone the source files unchanged, so an operation that only edits
//! metadata overrides [`Operation::handle_metadata`] alone.
//!
//! | Operation | Overrides | Effect |
//! |---|---|---|
//! | [`Renumber`] | image, metadata | `token_id = start_from_id + iteration_index` |
//! | [`Shuffle`] | pre-pass, image, metadata | random order, `token_id = iteration_index` |
//! | [`Obfuscate`] | image, metadata | every trait value becomes a placeholder |
//! | [`FormatMetadata`] | metadata | canonical key order, traits sorted by type |
//! | [`UpdateMetadata`] | metadata | trait/name/url edits, trait and key removal |

mod format_metadata;
mod obfuscate;
mod renumber;
mod shuffle;
mod update_metadata;

pub use format_metadata::FormatMetadata;
pub use obfuscate::Obfuscate;
pub use renumber::Renumber;
pub use shuffle::Shuffle;
pub use update_metadata::UpdateMetadata;

use crate::error::{AppError, ValidationError};
use crate::manager::OperationContext;
use crate::nft::Nft;
use crate::options::{OptionsSchema, RawOptions, ResolvedOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait Operation {
    /// Identifier used in configs and progress output.
    fn name(&self) -> &'static str;

    /// Options this operation accepts. Must not declare the reserved options.
    fn configure_options(&self) -> OptionsSchema {
        OptionsSchema::new()
    }

    /// Whole-batch pass run before the per-record loop. Identity by default.
    fn pre_execute(
        &mut self,
        records: Vec<Nft>,
        _options: &ResolvedOptions,
    ) -> Result<Vec<Nft>, AppError> {
        Ok(records)
    }

    fn handle_image(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        _options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        ctx.clone_source_image(nft)
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        _options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        ctx.clone_source_metadata(nft)
    }

    /// Called instead of [`execute`] for records outside the `from_id`/`to_id` window.
    fn on_skip(&self, ctx: &OperationContext, nft: &Nft) -> Result<(), AppError> {
        ctx.clone_source_image(nft)?;
        ctx.clone_source_metadata(nft)
    }
}

/// Process one in-range record: image first, then metadata.
pub fn execute(
    operation: &dyn Operation,
    ctx: &OperationContext,
    nft: &mut Nft,
    options: &ResolvedOptions,
) -> Result<(), AppError> {
    operation.handle_image(ctx, nft, options)?;
    operation.handle_metadata(ctx, nft, options)
}

/// Compose the operation's schema with the reserved options and resolve `raw` against it.
pub fn resolve_options(
    operation: &dyn Operation,
    raw: &RawOptions,
) -> Result<ResolvedOptions, ValidationError> {
    operation
        .configure_options()
        .with_reserved()?
        .resolve(operation.name(), raw)
}

/// Built-in operations, addressable by their kebab-case identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Renumber,
    Shuffle,
    Obfuscate,
    FormatMetadata,
    UpdateMetadata,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Renumber,
        OperationKind::Shuffle,
        OperationKind::Obfuscate,
        OperationKind::FormatMetadata,
        OperationKind::UpdateMetadata,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Renumber => "renumber",
            OperationKind::Shuffle => "shuffle",
            OperationKind::Obfuscate => "obfuscate",
            OperationKind::FormatMetadata => "format-metadata",
            OperationKind::UpdateMetadata => "update-metadata",
        }
    }

    pub fn build(self) -> Box<dyn Operation> {
        match self {
            OperationKind::Renumber => Box::new(Renumber),
            OperationKind::Shuffle => Box::new(Shuffle::new()),
            OperationKind::Obfuscate => Box::new(Obfuscate),
            OperationKind::FormatMetadata => Box::new(FormatMetadata),
            OperationKind::UpdateMetadata => Box::new(UpdateMetadata),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown operation \"{s}\""))
    }
}
