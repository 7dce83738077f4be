//! Property-based tests for rust_analytics_system using proptest

use parking_lot::Mutex;
use proptest::prelude::*;
use rust_analytics_system::prelude::*;
use rust_analytics_system::shipping::{partition_date, partition_id};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type Recorded = Arc<Mutex<Vec<(String, Option<Attributes>)>>>;

struct RecordingHandler {
    seen: Recorded,
}

impl Handler for RecordingHandler {
    fn initialize(&mut self, _context: &HandlerContext) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()> {
        self.seen.lock().push((name.to_string(), attributes.cloned()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn recording_analytics(targets: &[Target]) -> (Analytics, BTreeMap<Target, Recorded>) {
    let mut builder = Analytics::builder();
    let mut recorders = BTreeMap::new();
    for &target in targets {
        let seen = Recorded::default();
        let shared = Arc::clone(&seen);
        builder = builder.factory(target, move || RecordingHandler {
            seen: Arc::clone(&shared),
        });
        recorders.insert(target, seen);
    }

    let analytics = builder.build();
    for &target in targets {
        analytics.initialize(target, true);
    }
    for seen in recorders.values() {
        seen.lock().clear();
    }
    (analytics, recorders)
}

fn declared_target() -> impl Strategy<Value = Target> {
    prop_oneof![
        Just(Target::CrashReporter),
        Just(Target::ProductAnalytics),
        Just(Target::LogShipping),
        Just(Target::StructuredLog),
    ]
}

fn attributes_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-e]", any::<i64>()), 0..6)
}

fn to_attributes(pairs: &[(String, i64)]) -> Attributes {
    pairs.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

/// Last value per key, the way repeated inserts resolve
fn last_wins(pairs: &[(String, i64)]) -> BTreeMap<String, i64> {
    pairs.iter().cloned().collect()
}

proptest! {
    /// Specific defaults beat global defaults, and every key of both arrives
    #[test]
    fn test_specific_defaults_take_precedence(
        target in declared_target(),
        global in attributes_strategy(),
        specific in attributes_strategy(),
    ) {
        let (analytics, recorders) = recording_analytics(&[target]);
        analytics.add_default_parameters(Target::All, to_attributes(&global));
        analytics.add_default_parameters(target, to_attributes(&specific));

        analytics.new_event("e").to(target).send();

        let mut expected = last_wins(&global);
        expected.extend(last_wins(&specific));

        let seen = recorders[&target].lock();
        prop_assert_eq!(seen.len(), 1);
        let payload = seen[0].1.clone().unwrap_or_default();
        prop_assert_eq!(payload.len(), expected.len());
        for (key, value) in &expected {
            prop_assert_eq!(payload.get(key), Some(&AttributeValue::Int(*value)));
        }
    }

    /// `with(a).with(b)` delivers `a` overlaid by `b`
    #[test]
    fn test_with_overlays_later_data(
        a in attributes_strategy(),
        b in attributes_strategy(),
    ) {
        let (analytics, recorders) = recording_analytics(&[Target::StructuredLog]);

        analytics
            .new_event("e")
            .with(to_attributes(&a))
            .with(to_attributes(&b))
            .send();

        let mut expected = last_wins(&a);
        expected.extend(last_wins(&b));

        let seen = recorders[&Target::StructuredLog].lock();
        let payload = seen[0].1.clone().unwrap_or_default();
        prop_assert_eq!(payload.len(), expected.len());
        for (key, value) in &expected {
            prop_assert_eq!(payload.get(key), Some(&AttributeValue::Int(*value)));
        }
    }

    /// Repeating a target never dispatches to it twice
    #[test]
    fn test_targets_collapse(targets in prop::collection::vec(declared_target(), 1..12)) {
        let (analytics, recorders) = recording_analytics(&Target::DECLARED);

        let delivered = analytics.new_event("e").to_each(targets.iter().copied()).send();

        let distinct: BTreeSet<Target> = targets.iter().copied().collect();
        prop_assert_eq!(delivered, distinct.len());
        for (target, seen) in &recorders {
            let expected = usize::from(distinct.contains(target));
            prop_assert_eq!(seen.lock().len(), expected);
        }
    }

    /// Insertion order survives overwrites
    #[test]
    fn test_attributes_keep_first_insertion_order(pairs in attributes_strategy()) {
        let attrs = to_attributes(&pairs);

        let mut order: Vec<&str> = Vec::new();
        for (key, _) in &pairs {
            if !order.contains(&key.as_str()) {
                order.push(key);
            }
        }
        prop_assert_eq!(attrs.keys().collect::<Vec<_>>(), order);
    }

    /// Partition ids sort chronologically and decode to their date
    #[test]
    fn test_partition_ids_sort_by_date(a in 0i64..40_000, b in 0i64..40_000) {
        let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let day_a = epoch + chrono::Duration::days(a);
        let day_b = epoch + chrono::Duration::days(b);
        let id_a = partition_id("logstash_", day_a);
        let id_b = partition_id("logstash_", day_b);

        prop_assert_eq!(id_a.cmp(&id_b), day_a.cmp(&day_b));
        prop_assert_eq!(partition_date("logstash_", &id_a), Some(day_a));
    }

    /// Target names parse back regardless of case and separators
    #[test]
    fn test_target_parse_is_lenient(target in declared_target(), upper in any::<bool>()) {
        let name = target.to_str();
        let spelled = if upper { name.to_uppercase() } else { name.to_lowercase() };
        prop_assert_eq!(spelled.parse::<Target>().ok(), Some(target));
    }
}
