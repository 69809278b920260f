//! Cache-buster token derivation.

use std::fmt;

use serde::Serialize;

use super::assets::AssetReference;

/// Maximum number of characters kept from the underlying digest.
pub const TOKEN_LENGTH: usize = 10;

/// Query parameter carrying the token.
pub const QUERY_KEY: &str = "m";

/// Which asset identifier produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    ContentHash,
    Variant,
}

impl TokenSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenSource::ContentHash => "content_hash",
            TokenSource::Variant => "variant",
        }
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short, advisory cache key appended to asset URLs.
///
/// Truncation trades collision resistance for URL brevity; the token is a
/// cache key, not an integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheBusterToken {
    value: String,
    source: TokenSource,
}

impl CacheBusterToken {
    /// Derive the token for an asset.
    ///
    /// The content hash wins when present. Otherwise the MD5 digest of the
    /// variant descriptor is used, so renditions with different manipulation
    /// parameters get different tokens. Returns `None` when neither is set.
    pub fn for_asset<A: AssetReference + ?Sized>(asset: &A) -> Option<Self> {
        if let Some(hash) = asset.content_hash().filter(|hash| !hash.is_empty()) {
            return Some(Self::from_content_hash(hash));
        }

        asset
            .variant()
            .filter(|variant| !variant.is_empty())
            .map(Self::from_variant)
    }

    /// Truncate a content hash to [`TOKEN_LENGTH`] characters.
    pub fn from_content_hash(hash: &str) -> Self {
        Self {
            value: truncate_chars(hash, TOKEN_LENGTH).to_string(),
            source: TokenSource::ContentHash,
        }
    }

    /// Hash a variant descriptor with MD5 and keep the leading hex digits.
    pub fn from_variant(variant: &str) -> Self {
        let digest = format!("{:x}", md5::compute(variant.as_bytes()));
        Self {
            value: truncate_chars(&digest, TOKEN_LENGTH).to_string(),
            source: TokenSource::Variant,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Append `m=<token>` to `url`, using `&` when a query string is present.
    pub fn append_to(&self, url: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        let mut decorated =
            String::with_capacity(url.len() + QUERY_KEY.len() + self.value.len() + 2);
        decorated.push_str(url);
        decorated.push(separator);
        decorated.push_str(QUERY_KEY);
        decorated.push('=');
        decorated.push_str(&self.value);
        decorated
    }
}

impl fmt::Display for CacheBusterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// Counts characters so multi-byte input never splits a code point.
fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => &value[..index],
        None => value,
    }
}
