//! Obfuscate: hide every trait value, optionally swap in a placeholder image.

use super::Operation;
use crate::error::AppError;
use crate::manager::OperationContext;
use crate::metadata::obfuscate_traits;
use crate::nft::Nft;
use crate::options::{OptionType, OptionsSchema, ResolvedOptions};
use serde_json::Value;
use std::path::Path;

const PLACEHOLDER_IMAGE: &str = "placeholder_image_absolute_path";
const PLACEHOLDER_VALUE: &str = "placeholder_value";

#[derive(Debug, Clone, Copy, Default)]
pub struct Obfuscate;

impl Operation for Obfuscate {
    fn name(&self) -> &'static str {
        "obfuscate"
    }

    fn configure_options(&self) -> OptionsSchema {
        OptionsSchema::new()
            .optional(
                PLACEHOLDER_IMAGE,
                Value::Null,
                &[OptionType::Null, OptionType::String],
                "Image written for every record instead of its own",
            )
            .optional(
                PLACEHOLDER_VALUE,
                Value::from("?"),
                &[OptionType::String],
                "Value every trait is replaced with",
            )
    }

    fn handle_image(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        let source = match options.opt_string(PLACEHOLDER_IMAGE)? {
            Some(placeholder) => {
                log::trace!("token {}: using placeholder image", nft.token_id());
                Path::new(placeholder)
            }
            None => nft.image_path(),
        };
        ctx.write_image(nft.token_id(), source)
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        let mut metadata = nft.metadata().clone();
        obfuscate_traits(&mut metadata, options.string(PLACEHOLDER_VALUE)?)?;
        ctx.write_metadata(nft.token_id(), &metadata)
    }
}
