//! Default parameters merged into outgoing events
//!
//! `DefaultParameterStore` keeps one attribute bucket per target. Adding a
//! set to `Target::All` updates the bucket of every declared target as well
//! as the `All` bucket itself, so defaults can be stored before a handler is
//! ever enabled and apply as soon as it is.

use super::attributes::Attributes;
use super::target::Target;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe per-target default attributes
#[derive(Debug, Default)]
pub struct DefaultParameterStore {
    buckets: RwLock<HashMap<Target, Attributes>>,
}

impl DefaultParameterStore {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
        }
    }

    /// Merge `data` into the bucket(s) for `target`.
    ///
    /// The newly added set wins on duplicate keys; keys only present in the
    /// previously stored set are kept.
    pub fn add(&self, target: Target, data: &Attributes) {
        let mut buckets = self.buckets.write();
        let affected = target
            .expand()
            .iter()
            .copied()
            .chain(target.is_all().then_some(Target::All));

        for bucket in affected {
            let mut merged = data.clone();
            if let Some(previous) = buckets.get(&bucket) {
                merged.fill_gaps(previous);
            }
            buckets.insert(bucket, merged);
        }
    }

    /// Snapshot of the defaults stored for exactly this bucket
    pub fn get(&self, target: Target) -> Option<Attributes> {
        self.buckets.read().get(&target).cloned()
    }

    /// Overlay the buckets in order (later buckets win), or `None` if none hold data
    pub fn merged(&self, targets: &[Target]) -> Option<Attributes> {
        let buckets = self.buckets.read();
        let mut merged: Option<Attributes> = None;
        for target in targets {
            if let Some(defaults) = buckets.get(target) {
                merged.get_or_insert_with(Attributes::new).overlay(defaults);
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::AttributeValue;

    #[test]
    fn test_add_to_single_target() {
        let store = DefaultParameterStore::new();
        store.add(Target::StructuredLog, &Attributes::new().with("env", "prod"));

        assert!(store.get(Target::StructuredLog).is_some());
        assert!(store.get(Target::CrashReporter).is_none());
        assert!(store.get(Target::All).is_none());
    }

    #[test]
    fn test_add_to_all_reaches_every_bucket() {
        let store = DefaultParameterStore::new();
        store.add(Target::All, &Attributes::new().with("env", "prod"));

        for target in Target::DECLARED {
            let defaults = store.get(target).expect("bucket populated");
            assert_eq!(defaults.get("env"), Some(&AttributeValue::from("prod")));
        }
        assert!(store.get(Target::All).is_some());
    }

    #[test]
    fn test_newest_set_wins() {
        let store = DefaultParameterStore::new();
        store.add(
            Target::ProductAnalytics,
            &Attributes::new().with("env", "dev").with("region", "eu"),
        );
        store.add(Target::ProductAnalytics, &Attributes::new().with("env", "prod"));

        let defaults = store.get(Target::ProductAnalytics).unwrap();
        assert_eq!(defaults.get("env"), Some(&AttributeValue::from("prod")));
        assert_eq!(defaults.get("region"), Some(&AttributeValue::from("eu")));
        assert_eq!(defaults.len(), 2);
    }

    #[test]
    fn test_merged_later_bucket_wins() {
        let store = DefaultParameterStore::new();
        store.add(Target::All, &Attributes::new().with("tier", "free"));
        store.add(Target::LogShipping, &Attributes::new().with("tier", "gold"));

        let merged = store
            .merged(&[Target::All, Target::LogShipping])
            .unwrap();
        assert_eq!(merged.get("tier"), Some(&AttributeValue::from("gold")));

        assert!(store.merged(&[]).is_none());
    }
}
