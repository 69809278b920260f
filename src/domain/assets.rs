//! Asset references as seen by the URL decorators.
//!
//! The asset system owns file content, hashes, and renditions. Decorators only
//! read the identifiers exposed here and never mutate them.

use serde::{Deserialize, Serialize};

/// Asset class used when a reference does not name one.
pub const DEFAULT_ASSET_CLASS: &str = "File";

/// Read-only view over a stored file or one of its derived renditions.
///
/// Empty strings are treated exactly like missing values by every consumer.
pub trait AssetReference {
    /// Digest of the stored file bytes. Changes iff the content changes.
    fn content_hash(&self) -> Option<&str>;

    /// Descriptor of a derived rendition (e.g. resize parameters).
    ///
    /// Absent or empty for the original file.
    fn variant(&self) -> Option<&str>;

    /// File type used to look up the cache-busting switch.
    fn asset_class(&self) -> &str {
        DEFAULT_ASSET_CLASS
    }
}

impl<T: AssetReference + ?Sized> AssetReference for &T {
    fn content_hash(&self) -> Option<&str> {
        (**self).content_hash()
    }

    fn variant(&self) -> Option<&str> {
        (**self).variant()
    }

    fn asset_class(&self) -> &str {
        (**self).asset_class()
    }
}

/// Owned asset reference, used by the command-line tool and in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    class: String,
    #[serde(default)]
    content_hash: Option<String>,
    #[serde(default)]
    variant: Option<String>,
}

impl Default for StoredAsset {
    fn default() -> Self {
        Self::new()
    }
}

impl StoredAsset {
    /// Construct a reference of the default class with no identifiers.
    pub fn new() -> Self {
        Self {
            class: DEFAULT_ASSET_CLASS.to_string(),
            content_hash: None,
            variant: None,
        }
    }

    /// Construct a reference for the original file with the given content hash.
    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self::new().hash(hash)
    }

    /// Construct a reference for a derived rendition.
    pub fn with_variant(variant: impl Into<String>) -> Self {
        Self::new().variant_descriptor(variant)
    }

    #[must_use]
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = non_empty(hash.into());
        self
    }

    #[must_use]
    pub fn variant_descriptor(mut self, variant: impl Into<String>) -> Self {
        self.variant = non_empty(variant.into());
        self
    }

    /// Set the asset class. Blank names fall back to [`DEFAULT_ASSET_CLASS`].
    #[must_use]
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        self.class = normalize_class(class.as_ref()).to_string();
        self
    }
}

impl AssetReference for StoredAsset {
    fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    fn asset_class(&self) -> &str {
        &self.class
    }
}

/// Trim an asset class name, falling back to [`DEFAULT_ASSET_CLASS`] when blank.
pub fn normalize_class(class: &str) -> &str {
    let trimmed = class.trim();
    if trimmed.is_empty() {
        DEFAULT_ASSET_CLASS
    } else {
        trimmed
    }
}

/// Lookup key for per-class switches: normalized and ASCII-lowercased.
pub(crate) fn class_key(class: &str) -> String {
    normalize_class(class).to_ascii_lowercase()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
