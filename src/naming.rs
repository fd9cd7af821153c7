//! Filename parsing for the `<tokenId>.<extension>` convention.
//!
//! Every image in a collection is named after its token id:
//! - `0.png` → token 0, extension "png"
//! - `0042.jpg` → token 42, extension "jpg"
//! - `12` → invalid (no extension)
//! - `12.final.png` → invalid (two dots)
//! - `cat.png` → invalid (stem is not a number)
//!
//! Metadata files written by the pipeline have no extension at all (`output/metadata/12`),
//! so directory listings are ordered by [`sort_key`], which looks only at the leading digits.

use crate::error::ValidationError;

/// Token id of a record. Ids are derived from filenames, so they are never negative.
pub type TokenId = u64;

/// Result of parsing an image filename like `42.png`.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenFilename {
    pub token_id: TokenId,
    /// Full filename, e.g. `42.png`.
    pub file_name: String,
    /// Extension without the dot, e.g. `png`.
    pub extension: String,
}

/// Parse an image filename following the `<tokenId>.<extension>` convention.
pub fn parse_token_filename(file_name: &str) -> Result<TokenFilename, ValidationError> {
    let invalid = |reason| ValidationError::InvalidFilename {
        filename: file_name.to_string(),
        reason,
    };

    if file_name.matches('.').count() != 1 {
        return Err(invalid("it does not contain exactly 1 \".\""));
    }

    let (stem, extension) = file_name
        .split_once('.')
        .ok_or_else(|| invalid("it does not contain exactly 1 \".\""))?;

    if stem.is_empty() {
        return Err(invalid("unable to get token ID"));
    }
    if extension.is_empty() {
        return Err(invalid("unable to get extension"));
    }
    if !stem.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("token ID is not a number"));
    }
    let token_id = stem
        .parse::<TokenId>()
        .map_err(|_| invalid("token ID is out of range"))?;

    Ok(TokenFilename {
        token_id,
        file_name: file_name.to_string(),
        extension: extension.to_string(),
    })
}

/// Ordering key for directory listings: numeric prefix first, then the raw name.
///
/// Names without leading digits sort as `0`, mirroring a plain numeric sort.
pub fn sort_key(name: &str) -> (u64, String) {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    (digits.parse().unwrap_or(0), name.to_string())
}
