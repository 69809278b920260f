//! Runtime switches deciding whether asset URLs receive a cache buster.

use std::collections::HashSet;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{config::CacheBustingSettings, domain::assets::class_key};

static GLOBAL_POLICY: Lazy<Arc<CacheBustingPolicy>> =
    Lazy::new(|| Arc::new(CacheBustingPolicy::new(false)));

/// Process-wide policy for call sites that cannot receive one explicitly.
///
/// Starts disabled. The policy only holds plain values, so it is never torn down.
pub fn global_policy() -> Arc<CacheBustingPolicy> {
    Arc::clone(&GLOBAL_POLICY)
}

/// Copy loaded settings into the process-wide policy.
pub fn install_global(settings: &CacheBustingSettings) {
    GLOBAL_POLICY.replace_with(settings);
}

/// Cache-busting switch with optional per-asset-class overrides.
///
/// Every read observes the latest stored value without locking; concurrent
/// toggles are eventually visible to all readers.
#[derive(Debug, Default)]
pub struct CacheBustingPolicy {
    enabled: AtomicBool,
    classes: DashMap<String, bool>,
}

impl CacheBustingPolicy {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            classes: DashMap::new(),
        }
    }

    #[must_use]
    pub fn with_class(self, class: impl AsRef<str>, enabled: bool) -> Self {
        self.classes.insert(class_key(class.as_ref()), enabled);
        self
    }

    /// Whether assets of `class` should be decorated right now.
    ///
    /// Class names match case-insensitively.
    pub fn is_enabled(&self, class: &str) -> bool {
        if let Some(enabled) = self.classes.get(&class_key(class)) {
            return *enabled;
        }
        self.enabled.load(Ordering::Relaxed)
    }

    /// Default used by classes without an override.
    pub fn default_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        debug!(
            target = "cachebust::policy",
            enabled, "cache busting default toggled"
        );
    }

    pub fn set_class_enabled(&self, class: impl AsRef<str>, enabled: bool) {
        let class = class_key(class.as_ref());
        debug!(
            target = "cachebust::policy",
            class = %class,
            enabled,
            "cache busting class override set"
        );
        self.classes.insert(class, enabled);
    }

    /// Remove a class override so the class follows the default again.
    pub fn clear_class(&self, class: &str) -> Option<bool> {
        self.classes
            .remove(&class_key(class))
            .map(|(_, enabled)| enabled)
    }

    /// Reset the policy to mirror `settings`, dropping unlisted overrides.
    ///
    /// New entries are written before stale ones are removed, so a class
    /// listed in `settings` never falls back to the default mid-update.
    pub fn replace_with(&self, settings: &CacheBustingSettings) {
        let listed: HashSet<String> = settings
            .classes
            .iter()
            .map(|(class, enabled)| {
                let key = class_key(class);
                self.classes.insert(key.clone(), *enabled);
                key
            })
            .collect();
        self.classes.retain(|class, _| listed.contains(class));
        self.enabled.store(settings.enabled, Ordering::Relaxed);
    }
}

impl From<&CacheBustingSettings> for CacheBustingPolicy {
    fn from(settings: &CacheBustingSettings) -> Self {
        let policy = Self::new(settings.enabled);
        policy.replace_with(settings);
        policy
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serial_test::serial;

    use super::*;

    #[test]
    fn class_override_wins_over_default() {
        let policy = CacheBustingPolicy::new(false).with_class("Image", true);
        assert!(policy.is_enabled("Image"));
        assert!(!policy.is_enabled("File"));

        policy.set_enabled(true);
        policy.set_class_enabled("Image", false);
        assert!(!policy.is_enabled("Image"));
        assert!(policy.is_enabled("File"));
    }

    #[test]
    fn clearing_override_restores_default() {
        let policy = CacheBustingPolicy::new(true).with_class("Image", false);
        assert!(!policy.is_enabled("image"));
        assert_eq!(policy.clear_class("IMAGE"), Some(false));
        assert!(policy.is_enabled("Image"));
        assert_eq!(policy.clear_class("Image"), None);
    }

    #[test]
    fn toggles_are_visible_across_threads() {
        let policy = Arc::new(CacheBustingPolicy::new(false));
        let writer = Arc::clone(&policy);
        std::thread::spawn(move || writer.set_enabled(true))
            .join()
            .expect("writer thread");
        assert!(policy.is_enabled("File"));
    }

    #[test]
    fn built_from_settings() {
        let settings = CacheBustingSettings {
            enabled: true,
            classes: BTreeMap::from([("Document".to_string(), false)]),
        };
        let policy = CacheBustingPolicy::from(&settings);
        assert!(policy.default_enabled());
        assert!(!policy.is_enabled("Document"));
        assert!(policy.is_enabled("Image"));
    }

    #[test]
    fn replace_drops_stale_overrides() {
        let policy = CacheBustingPolicy::new(false)
            .with_class("Image", true)
            .with_class("Document", true);
        let settings = CacheBustingSettings {
            enabled: false,
            classes: BTreeMap::from([("image".to_string(), false)]),
        };

        policy.replace_with(&settings);
        assert!(!policy.is_enabled("Image"));
        assert!(!policy.is_enabled("Document"));
        assert_eq!(policy.clear_class("Document"), None);
    }

    #[test]
    fn listed_class_keeps_override_during_replace() {
        let settings = CacheBustingSettings {
            enabled: true,
            classes: BTreeMap::from([("Image".to_string(), false)]),
        };
        let policy = Arc::new(CacheBustingPolicy::from(&settings));
        let stop = Arc::new(AtomicBool::new(false));

        let reader = {
            let policy = Arc::clone(&policy);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                let mut observed_default = false;
                while !stop.load(Ordering::Relaxed) {
                    observed_default |= policy.is_enabled("Image");
                }
                observed_default
            })
        };

        for _ in 0..2_000 {
            policy.replace_with(&settings);
        }
        stop.store(true, Ordering::Relaxed);

        let observed_default = reader.join().expect("reader thread");
        assert!(!observed_default);
    }

    #[test]
    #[serial]
    fn global_policy_is_shared_and_replaceable() {
        let settings = CacheBustingSettings {
            enabled: true,
            classes: BTreeMap::new(),
        };
        install_global(&settings);
        assert!(global_policy().is_enabled("File"));

        global_policy().set_enabled(false);
        assert!(!global_policy().is_enabled("File"));
    }
}
