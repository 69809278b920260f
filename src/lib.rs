//! Cache-busting tokens for asset URLs.
//!
//! Asset URLs are decorated with an `m=<token>` query parameter derived from
//! the file's content hash, or from the variant descriptor when the asset is a
//! derived rendition. Browsers can then cache assets indefinitely while still
//! fetching new content whenever the token changes.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::cache_buster::{CacheBuster, bust};
pub use application::hooks::{UrlHook, UrlHookChain};
pub use application::policy::{CacheBustingPolicy, global_policy};
pub use domain::assets::{AssetReference, StoredAsset};
pub use domain::token::{CacheBusterToken, TokenSource};
