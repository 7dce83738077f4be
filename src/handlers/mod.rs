//! Built-in analytics handlers

pub mod crash_reporter;
pub mod log_shipping;
pub mod product_analytics;
pub mod structured_log;

pub use crash_reporter::{CrashReporterClient, CrashReporterHandler, CustomEvent};
pub use log_shipping::{LogShippingHandler, ShippingFormat};
pub use product_analytics::{ProductAnalyticsClient, ProductAnalyticsHandler, DEFAULT_MAX_NAME_LEN};
pub use structured_log::StructuredLogHandler;
