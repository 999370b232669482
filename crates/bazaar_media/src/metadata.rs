//! # Token Metadata
//!
//! The consumed convention: a JSON object with an image reference under one
//! of several field names, depending on which minting tool produced it.

use serde::Deserialize;

/// Token metadata, as loosely as it appears in the wild.
///
/// Unknown fields are ignored; every known field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    /// Display name, if any.
    pub name: Option<String>,
    /// Description, if any.
    pub description: Option<String>,
    /// The common image field.
    pub image: Option<String>,
    /// Alternate key used by some tools.
    pub image_url: Option<String>,
    /// Alternate key used by some minting services.
    pub file_url: Option<String>,
}

impl TokenMetadata {
    /// The image reference, trying the known keys in order of prevalence.
    #[must_use]
    pub fn image_source(&self) -> Option<&str> {
        self.image
            .as_deref()
            .or(self.image_url.as_deref())
            .or(self.file_url.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_image_key() {
        let meta: TokenMetadata = serde_json::from_str(
            r#"{"image": "ipfs://a", "image_url": "ipfs://b", "file_url": "ipfs://c"}"#,
        )
        .unwrap();
        assert_eq!(meta.image_source(), Some("ipfs://a"));
    }

    #[test]
    fn test_falls_back_through_alternate_keys() {
        let meta: TokenMetadata =
            serde_json::from_str(r#"{"file_url": "https://x/img.png"}"#).unwrap();
        assert_eq!(meta.image_source(), Some("https://x/img.png"));
    }

    #[test]
    fn test_empty_and_missing_are_none() {
        let meta: TokenMetadata = serde_json::from_str(r#"{"image": ""}"#).unwrap();
        assert_eq!(meta.image_source(), None);

        let meta: TokenMetadata = serde_json::from_str(r#"{"name": "No art"}"#).unwrap();
        assert_eq!(meta.image_source(), None);
    }
}
