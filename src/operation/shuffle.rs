//! Shuffle: random order, then `token_id = iteration_index`.

use super::Operation;
use crate::error::AppError;
use crate::manager::OperationContext;
use crate::metadata::replace_id_placeholder;
use crate::naming::TokenId;
use crate::nft::Nft;
use crate::options::{OptionType, OptionsSchema, ResolvedOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const UPDATE_IMAGE: &str = "update_metadata_image";
const UPDATE_NAME: &str = "update_metadata_name";

pub struct Shuffle {
    rng: StdRng,
}

impl Shuffle {
    /// Shuffle seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible shuffle: the same seed yields the same permutation.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Shuffle {
    fn default() -> Self {
        Self::new()
    }
}

fn position_id(options: &ResolvedOptions) -> TokenId {
    options.iteration_index() as TokenId
}

impl Operation for Shuffle {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn configure_options(&self) -> OptionsSchema {
        OptionsSchema::new()
            .required(
                UPDATE_IMAGE,
                &[OptionType::String],
                "New \"image\" value; {id} becomes the new token id",
            )
            .required(
                UPDATE_NAME,
                &[OptionType::String],
                "New \"name\" value; {id} becomes the new token id",
            )
    }

    fn pre_execute(
        &mut self,
        mut records: Vec<Nft>,
        _options: &ResolvedOptions,
    ) -> Result<Vec<Nft>, AppError> {
        records.shuffle(&mut self.rng);
        log::debug!("shuffled {} records", records.len());
        Ok(records)
    }

    fn handle_image(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        nft.set_token_id(position_id(options));
        ctx.write_image(nft.token_id(), nft.image_path())
    }

    fn handle_metadata(
        &self,
        ctx: &OperationContext,
        nft: &mut Nft,
        options: &ResolvedOptions,
    ) -> Result<(), AppError> {
        nft.set_token_id(position_id(options));
        let id = nft.token_id();

        let mut metadata = nft.metadata().clone();
        metadata.insert(
            "name".into(),
            replace_id_placeholder(options.string(UPDATE_NAME)?, id).into(),
        );
        metadata.insert(
            "image".into(),
            replace_id_placeholder(options.string(UPDATE_IMAGE)?, id).into(),
        );
        ctx.write_metadata(id, &metadata)
    }
}
