//! Update metadata: field edits applied in a fixed order.
//!
//! 1. `update_attributes`: set each trait (replace in place or append)
//! 2. `update_base_uri`: `image = <base_uri without trailing "/">/<image file name>`
//! 3. `update_external_url`: `external_url` from a `{id}` template
//! 4. `update_name`: `name` from a `{id}` template
//! 5. `remove_attributes`: drop traits by type
//! 6. `remove_values`: drop top-level keys
//!
//! Unset steps are skipped, so empty options reproduce the input metadata.

use super::Operation;
use crate::error::AppError;
use crate::manager::OperationContext;
use crate::metadata::{self, Metadata, replace_id_placeholder};
use crate::nft::Nft;
use crate::options::{OptionType, OptionsSchema, ResolvedOptions};
use serde_json::{Value, json};

const UPDATE_ATTRIBUTES: &str = "update_attributes";
const UPDATE_BASE_URI: &str = "update_base_uri";
const UPDATE_EXTERNAL_URL: &str = "update_external_url";
const UPDATE_NAME: &str = "update_name";
const REMOVE_ATTRIBUTES: &str = "remove_attributes";
const REMOVE_VALUES: &str = "remove_values";

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateMetadata;

fn apply(nft: &Nft, options: &ResolvedOptions) -> Result<Metadata, AppError> {
    let mut metadata = nft.metadata().clone();
    let id = nft.token_id();

    for (trait_name, value) in options.string_map(UPDATE_ATTRIBUTES)? {
        metadata::update_trait(&mut metadata, trait_name, value)?;
    }

    if let Some(base) = options.opt_string(UPDATE_BASE_URI)? {
        let image = format!("{}/{}", base.trim_end_matches('/'), nft.file_name());
        metadata.insert("image".into(), image.into());
    }

    if let Some(url) = options.opt_string(UPDATE_EXTERNAL_URL)? {
        metadata.insert("external_url".into(), replace_id_placeholder(url, id).into());
    }

    if let Some(name) = options.opt_string(UPDATE_NAME)? {
        metadata.insert("name".into(), replace_id_placeholder(name, id).into());
    }

    for trait_name in options.string_list(REMOVE_ATTRIBUTES)? {
        metadata::remove_trait(&mut metadata, trait_name)?;
    }

    for key in options.string_list(REMOVE_VALUES)? {
        metadata.shift_remove(key);
    }

    Ok(metadata)
}

impl Operation for UpdateMetadata {
    fn name(&self) -> &'static str {
        "update-metadata"
    }

    fn configure_options(&self) -> OptionsSchema {
        let nullable_string = [OptionType::Null, OptionType::String];
        let nullable_list = [OptionType::Null, OptionType::StringList];

        OptionsSchema::new()
            .optional(
                UPDATE_ATTRIBUTES,
                json!({}),
                &[OptionType::StringMap],
                "Trait type to value; existing traits are overwritten, others appended",
            )
            .optional(
                UPDATE_BASE_URI,
                Value::Null,
                &nullable_string,
                "Base URI; \"image\" becomes <base>/<image file name>",
            )
            .optional(
                UPDATE_EXTERNAL_URL,
                Value::Null,
                &nullable_string,
                "New \"external_url\"; {id} becomes the token id",
            )
            .optional(
                UPDATE_NAME,
                Value::Null,
                &nullable_string,
                "New \"name\"; {id} becomes the token id",
            )
            .optional(
                REMOVE_ATTRIBUTES,
                json!([]),
                &nullable_list,
                "Trait types to remove",
            )
            .optional(
                REMOVE_VALUES,
                Value::Null,
                &nullable_list,
                "Top-level metadata keys to remove",
            )
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        let metadata = apply(nft, options)?;
        ctx.write_metadata(nft.token_id(), &metadata)
    }
}
