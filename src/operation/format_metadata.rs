//! Format metadata: rewrite metadata in canonical form.
//!
//! Leading keys come first and traits are sorted by type. Images are cloned
//! unchanged. Takes no options of its own.

use super::Operation;
use crate::error::AppError;
use crate::manager::OperationContext;
use crate::metadata::reformat;
use crate::nft::Nft;
use crate::options::ResolvedOptions;

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatMetadata;

impl Operation for FormatMetadata {
    fn name(&self) -> &'static str {
        "format-metadata"
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        _options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        ctx.write_metadata(nft.token_id(), &reformat(nft.metadata()))
    }
}
