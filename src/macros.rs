//! Macros for building attributes and events.
//!
//! # Examples
//!
//! ```
//! use rust_analytics_system::prelude::*;
//! use rust_analytics_system::{attributes, event};
//!
//! let analytics = Analytics::builder().build();
//!
//! let data = attributes! { "amount" => 42, "currency" => "EUR" };
//! assert_eq!(data.len(), 2);
//!
//! event!(analytics, "checkout", { "amount" => 42 } => Target::StructuredLog);
//! ```

/// Build [`Attributes`](crate::Attributes) from `key => value` pairs,
/// keeping their order.
///
/// # Examples
///
/// ```
/// use rust_analytics_system::{attributes, AttributeValue};
///
/// let data = attributes! { "env" => "prod", "retries" => 3, "coupon" => AttributeValue::Null };
/// assert_eq!(data.keys().collect::<Vec<_>>(), vec!["env", "retries", "coupon"]);
///
/// let empty = attributes! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! attributes {
    () => {
        $crate::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Attributes::new()$(.with($key, $value))+
    };
}

/// Build and send an event in one expression, returning the number of
/// handlers that received it.
///
/// Without targets the event goes to every registered handler.
///
/// # Examples
///
/// ```
/// use rust_analytics_system::prelude::*;
/// use rust_analytics_system::event;
///
/// let analytics = Analytics::builder().build();
/// analytics.initialize(Target::StructuredLog, true);
///
/// assert_eq!(event!(analytics, "app_opened"), 1);
/// assert_eq!(event!(analytics, "checkout", { "amount" => 42 }), 1);
/// assert_eq!(event!(analytics, "sync_failed", {} => Target::CrashReporter), 0);
/// ```
#[macro_export]
macro_rules! event {
    ($analytics:expr, $name:expr) => {
        $analytics.new_event($name).send()
    };
    ($analytics:expr, $name:expr, { $($body:tt)* }) => {
        $analytics
            .new_event($name)
            .with($crate::attributes! { $($body)* })
            .send()
    };
    ($analytics:expr, $name:expr, { $($body:tt)* } => $($target:expr),+) => {
        $analytics
            .new_event($name)
            .with($crate::attributes! { $($body)* })
            $(.to($target))+
            .send()
    };
}
