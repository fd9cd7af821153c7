//! Renumber: `token_id = start_from_id + iteration_index`, in input order.

use super::Operation;
use crate::error::{AppError, ValidationError};
use crate::manager::OperationContext;
use crate::metadata::replace_id_placeholder;
use crate::naming::TokenId;
use crate::nft::Nft;
use crate::options::{OptionType, OptionsSchema, ResolvedOptions};
use serde_json::Value;

const START_FROM_ID: &str = "start_from_id";
const UPDATE_IMAGE: &str = "update_metadata_image";
const UPDATE_NAME: &str = "update_metadata_name";

#[derive(Debug, Clone, Copy, Default)]
pub struct Renumber;

fn new_token_id(options: &ResolvedOptions) -> Result<TokenId, ValidationError> {
    let start = options.int(START_FROM_ID)?;
    let start = TokenId::try_from(start).map_err(|_| ValidationError::InvalidOptionValue {
        name: START_FROM_ID.to_string(),
        reason: format!("token ids cannot be negative, got {start}"),
    })?;
    Ok(start + options.iteration_index() as TokenId)
}

impl Operation for Renumber {
    fn name(&self) -> &'static str {
        "renumber"
    }

    fn configure_options(&self) -> OptionsSchema {
        OptionsSchema::new()
            .required(START_FROM_ID, &[OptionType::Int], "First token id to assign")
            .optional(
                UPDATE_IMAGE,
                Value::Null,
                &[OptionType::Null, OptionType::String],
                "New \"image\" value; {id} becomes the new token id",
            )
            .optional(
                UPDATE_NAME,
                Value::Null,
                &[OptionType::Null, OptionType::String],
                "New \"name\" value; {id} becomes the new token id",
            )
    }

    fn pre_execute(
        &mut self,
        records: Vec<Nft>,
        options: &ResolvedOptions,
    ) -> Result<Vec<Nft>, AppError> {
        // Reject a bad start before anything is written.
        new_token_id(options)?;
        Ok(records)
    }

    fn handle_image(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        nft.set_token_id(new_token_id(options)?);
        ctx.write_image(nft.token_id(), nft.image_path())
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        nft.set_token_id(new_token_id(options)?);
        let mut metadata = nft.metadata().clone();

        if let Some(image) = options.opt_string(UPDATE_IMAGE)? {
            metadata.insert("image".into(), replace_id_placeholder(image, nft.token_id()).into());
        }
        if let Some(name) = options.opt_string(UPDATE_NAME)? {
            metadata.insert("name".into(), replace_id_placeholder(name, nft.token_id()).into());
        }

        ctx.write_metadata(nft.token_id(), &metadata)
    }
}
