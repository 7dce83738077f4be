//! Fluent event builder
//!
//! An `AnalyticEvent` accumulates a name, an attribute payload and a target
//! set, then hands them to the router when `send` is called.

use super::analytics::Analytics;
use super::attributes::{AttributeValue, Attributes};
use super::target::Target;
use std::collections::BTreeSet;

/// Builder for one analytics event
///
/// # Example
///
/// ```
/// use rust_analytics_system::prelude::*;
///
/// let analytics = Analytics::builder().build();
///
/// analytics
///     .new_event("purchase")
///     .with(Attributes::new().with("sku", "A-113").with("quantity", 2))
///     .with_attribute("currency", "EUR")
///     .to(Target::ProductAnalytics)
///     .to(Target::StructuredLog)
///     .send();
/// ```
#[must_use = "an event does nothing until `send` is called"]
pub struct AnalyticEvent<'a> {
    analytics: &'a Analytics,
    name: String,
    data: Option<Attributes>,
    targets: BTreeSet<Target>,
}

impl<'a> AnalyticEvent<'a> {
    pub(crate) fn new(analytics: &'a Analytics, name: impl Into<String>) -> Self {
        Self {
            analytics,
            name: name.into(),
            data: None,
            targets: BTreeSet::new(),
        }
    }

    /// Merge attributes into the payload; later keys overwrite earlier ones
    pub fn with(mut self, data: Attributes) -> Self {
        match self.data {
            Some(ref mut existing) => existing.overlay(&data),
            None => self.data = Some(data),
        }
        self
    }

    /// Add a single attribute
    pub fn with_attribute<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        self.data
            .get_or_insert_with(Attributes::new)
            .insert(key, value);
        self
    }

    /// Add a target; repeated targets collapse
    pub fn to(mut self, target: Target) -> Self {
        self.targets.insert(target);
        self
    }

    /// Add several targets at once
    pub fn to_each(mut self, targets: impl IntoIterator<Item = Target>) -> Self {
        self.targets.extend(targets);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        self.data.as_ref()
    }

    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.targets.iter().copied()
    }

    /// Dispatch the event and return the number of handler deliveries.
    ///
    /// With no explicit target the event goes to `Target::All`; otherwise it
    /// is dispatched once per target. Sending twice delivers twice.
    pub fn send(&self) -> usize {
        let data = self.data.as_ref();
        if self.targets.is_empty() {
            self.analytics.dispatch(Target::All, true, &self.name, data)
        } else {
            self.targets
                .iter()
                .map(|&target| self.analytics.dispatch(target, true, &self.name, data))
                .sum()
        }
    }
}
