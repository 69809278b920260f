//! URL-generation hooks.
//!
//! A host asset pipeline produces a base URL for an asset and then hands it to
//! every registered hook in order. Hooks return a new URL instead of mutating
//! the input.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::domain::assets::AssetReference;

use super::cache_buster::CacheBuster;

/// A step in the asset URL pipeline.
pub trait UrlHook: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn update_url<'a>(&self, url: Cow<'a, str>, asset: &dyn AssetReference) -> Cow<'a, str>;
}

impl UrlHook for CacheBuster {
    fn name(&self) -> &'static str {
        "cache_buster"
    }

    fn update_url<'a>(&self, url: Cow<'a, str>, asset: &dyn AssetReference) -> Cow<'a, str> {
        match url {
            Cow::Borrowed(borrowed) => self.bust(borrowed, asset),
            Cow::Owned(owned) => {
                let decorated = match self.bust(&owned, asset) {
                    Cow::Owned(decorated) => Some(decorated),
                    Cow::Borrowed(_) => None,
                };
                Cow::Owned(decorated.unwrap_or(owned))
            }
        }
    }
}

/// Ordered set of hooks applied to every generated asset URL.
#[derive(Clone, Default)]
pub struct UrlHookChain {
    hooks: Vec<Arc<dyn UrlHook>>,
}

impl fmt::Debug for UrlHookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| hook.name()))
            .finish()
    }
}

impl UrlHookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in registration order.
    pub fn register(&mut self, hook: Arc<dyn UrlHook>) -> &mut Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn with(mut self, hook: Arc<dyn UrlHook>) -> Self {
        self.register(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook over `url`, feeding each output into the next hook.
    pub fn apply<'a>(&self, url: &'a str, asset: &dyn AssetReference) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(url);
        for hook in &self.hooks {
            current = hook.update_url(current, asset);
            trace!(
                target = "cachebust::hooks",
                hook = hook.name(),
                url = %current,
                "url hook applied"
            );
        }
        current
    }
}
