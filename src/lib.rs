//! # Rust Analytics System
//!
//! Routes application analytics events to several backends at once and
//! ships a durable local log to a remote server.
//!
//! ## Features
//!
//! - **Multi-target fan-out**: one event reaches a crash reporter, a product
//!   analytics service, the log shipper and a structured local log
//! - **Default parameters**: global and per-target attributes merged into
//!   every event
//! - **Failure isolation**: a failing or panicking backend never affects the
//!   caller or the other backends
//! - **Offline log shipping**: day-partitioned local buffer flushed in order
//!   when the shipper switches to active

pub mod core;
pub mod handlers;
pub mod macros;
pub mod shipping;

pub mod prelude {
    pub use crate::core::{
        AnalyticEvent, Analytics, AnalyticsBuilder, AnalyticsError, AnalyticsMetrics,
        AttributeValue, Attributes, Handler, HandlerContext, InitReport, Result, Target,
    };
    pub use crate::handlers::{CrashReporterClient, ProductAnalyticsClient, ShippingFormat};
    pub use crate::shipping::{LogMode, LogShipper, RetentionPolicy, ShipperConfig};
}

pub use core::{
    AnalyticEvent, Analytics, AnalyticsBuilder, AnalyticsError, AnalyticsMetrics, AttributeValue,
    Attributes, DefaultParameterStore, Handler, HandlerContext, HandlerFactory, InitReport, Result,
    Target, INITIALIZED_EVENT, LOGOUT_EVENT,
};
pub use shipping::{LogMode, LogShipper, ShipperConfig, ShipperMetrics};
