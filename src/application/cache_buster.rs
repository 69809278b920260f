//! Appends cache-buster tokens to asset URLs.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{assets::AssetReference, token::CacheBusterToken};

use super::policy::{CacheBustingPolicy, global_policy};

/// Decorate `url` with `m=<token>` when busting is enabled and the asset
/// exposes a content hash or variant.
///
/// Every other case returns the input untouched; there is no error path.
pub fn bust<'a, A>(url: &'a str, asset: &A, enabled: bool) -> Cow<'a, str>
where
    A: AssetReference + ?Sized,
{
    if !enabled || url.is_empty() {
        return Cow::Borrowed(url);
    }

    match CacheBusterToken::for_asset(asset) {
        Some(token) => Cow::Owned(token.append_to(url)),
        None => Cow::Borrowed(url),
    }
}

/// Cache buster bound to a policy that is consulted on every call.
#[derive(Debug, Clone)]
pub struct CacheBuster {
    policy: Arc<CacheBustingPolicy>,
}

impl CacheBuster {
    pub fn new(policy: Arc<CacheBustingPolicy>) -> Self {
        Self { policy }
    }

    /// Bind to the process-wide policy.
    pub fn global() -> Self {
        Self::new(global_policy())
    }

    /// Resolve the switch for the asset's class, then apply [`bust`].
    pub fn bust<'a, A>(&self, url: &'a str, asset: &A) -> Cow<'a, str>
    where
        A: AssetReference + ?Sized,
    {
        let class = asset.asset_class();
        let enabled = self.policy.is_enabled(class);
        let decorated = bust(url, asset, enabled);

        match &decorated {
            Cow::Owned(decorated) => trace!(
                target = "cachebust::buster",
                class,
                url = %decorated,
                "cache buster appended"
            ),
            Cow::Borrowed(_) if enabled && !url.is_empty() => debug!(
                target = "cachebust::buster",
                class,
                url,
                "asset has neither content hash nor variant; skipping cache buster"
            ),
            Cow::Borrowed(_) => trace!(
                target = "cachebust::buster",
                class,
                enabled,
                "url left untouched"
            ),
        }

        decorated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assets::StoredAsset;

    const HASH: &str = "abcdef1234567890";

    fn md5_prefix(input: &str) -> String {
        format!("{:x}", md5::compute(input.as_bytes()))[..10].to_string()
    }

    #[test]
    fn appends_hash_prefix_with_question_mark() {
        let asset = StoredAsset::with_hash(HASH);
        assert_eq!(bust("/assets/a.png", &asset, true), "/assets/a.png?m=abcdef1234");
    }

    #[test]
    fn appends_with_ampersand_when_query_exists() {
        let asset = StoredAsset::with_hash(HASH);
        assert_eq!(
            bust("/assets/a.png?w=100", &asset, true),
            "/assets/a.png?w=100&m=abcdef1234"
        );
    }

    #[test]
    fn disabled_returns_input() {
        let asset = StoredAsset::with_hash(HASH);
        let result = bust("/assets/a.png", &asset, false);
        assert!(matches!(result, Cow::Borrowed("/assets/a.png")));
    }

    #[test]
    fn variant_fallback_hashes_descriptor() {
        let asset = StoredAsset::with_variant("Resize_100_100");
        let expected = format!("/assets/a_resized.png?m={}", md5_prefix("Resize_100_100"));
        assert_eq!(bust("/assets/a_resized.png", &asset, true), expected);
        assert_eq!(bust("/assets/a_resized.png", &asset, true), expected);
    }

    #[test]
    fn empty_url_is_untouched() {
        let asset = StoredAsset::with_hash(HASH);
        assert_eq!(bust("", &asset, true), "");
        assert_eq!(bust("", &asset, false), "");
    }

    #[test]
    fn no_identifiers_leave_url_untouched() {
        let asset = StoredAsset::new();
        assert_eq!(bust("/assets/a.png", &asset, true), "/assets/a.png");
        assert_eq!(bust("/assets/a.png", &asset, false), "/assets/a.png");
    }

    #[test]
    fn service_reads_policy_on_every_call() {
        let policy = Arc::new(CacheBustingPolicy::new(false));
        let buster = CacheBuster::new(Arc::clone(&policy));
        let asset = StoredAsset::with_hash(HASH);

        assert_eq!(buster.bust("/a.png", &asset), "/a.png");
        policy.set_enabled(true);
        assert_eq!(buster.bust("/a.png", &asset), "/a.png?m=abcdef1234");
        policy.set_enabled(false);
        assert_eq!(buster.bust("/a.png", &asset), "/a.png");
    }

    #[test]
    fn service_honours_class_overrides() {
        let policy = Arc::new(CacheBustingPolicy::new(false).with_class("Image", true));
        let buster = CacheBuster::new(policy);

        let image = StoredAsset::with_hash(HASH).class("Image");
        let document = StoredAsset::with_hash(HASH).class("Document");

        assert_eq!(buster.bust("/i.png", &image), "/i.png?m=abcdef1234");
        assert_eq!(buster.bust("/d.pdf", &document), "/d.pdf");
    }

    #[test]
    fn service_matches_pure_function() {
        let buster = CacheBuster::new(Arc::new(CacheBustingPolicy::new(true)));
        let assets = [
            StoredAsset::with_hash(HASH),
            StoredAsset::with_variant("ScaleWidth_320"),
            StoredAsset::new(),
        ];
        for url in ["", "/x.css", "/x.css?v=2"] {
            for asset in &assets {
                assert_eq!(buster.bust(url, asset), bust(url, asset, true));
            }
        }
    }
}
