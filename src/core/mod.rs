//! Core analytics types and traits

pub mod analytics;
pub mod attributes;
pub mod context;
pub mod defaults;
pub mod error;
pub mod event;
pub mod handler;
pub mod metrics;
pub mod target;

pub use analytics::{Analytics, AnalyticsBuilder, InitReport, INITIALIZED_EVENT, LOGOUT_EVENT};
pub use attributes::{AttributeValue, Attributes};
pub use context::HandlerContext;
pub use defaults::DefaultParameterStore;
pub use error::{AnalyticsError, Result};
pub use event::AnalyticEvent;
pub use handler::{Handler, HandlerFactory};
pub use metrics::AnalyticsMetrics;
pub use target::Target;
