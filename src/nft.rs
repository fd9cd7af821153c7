//! The record model: one image file bound to its parsed metadata.

use crate::error::{AppError, FilesystemError};
use crate::metadata::Metadata;
use crate::naming::{self, TokenId};
use std::path::{Path, PathBuf};

/// One image + metadata pair, identified by a token id.
///
/// Built fresh for every operation from that operation's input folder. The token id
/// starts as the number in the image filename and may be reassigned by the running
/// operation (renumber, shuffle); filename and extension never change.
#[derive(Debug, Clone)]
pub struct Nft {
    image_path: PathBuf,
    metadata_path: PathBuf,
    metadata: Metadata,
    token_id: TokenId,
    file_name: String,
    file_extension: String,
}

impl Nft {
    /// Bind `image_path` to `metadata`.
    ///
    /// The image must exist as a regular file and be named `<tokenId>.<extension>`.
    /// `metadata_path` is the sidecar file the metadata was read from.
    pub fn new(
        image_path: &Path,
        metadata_path: &Path,
        metadata: Metadata,
    ) -> Result<Self, AppError> {
        let image_path = image_path
            .canonicalize()
            .map_err(|_| FilesystemError::MissingFile(image_path.to_path_buf()))?;
        if !image_path.is_file() {
            return Err(FilesystemError::MissingFile(image_path).into());
        }

        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = naming::parse_token_filename(&file_name)?;

        Ok(Self {
            image_path,
            metadata_path: metadata_path.to_path_buf(),
            metadata,
            token_id: parsed.token_id,
            file_name: parsed.file_name,
            file_extension: parsed.extension,
        })
    }

    /// Absolute, resolved path of the image.
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn set_token_id(&mut self, token_id: TokenId) {
        self.token_id = token_id;
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }
}
