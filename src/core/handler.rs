//! Handler trait for analytics backends

use super::{attributes::Attributes, context::HandlerContext, error::Result};
use std::sync::Arc;

/// Adapter between the router and one analytics backend.
///
/// `initialize` may fail; the router reports that as an inactive handler.
/// Errors returned from `record` never reach the code that sent the event.
pub trait Handler: Send {
    fn initialize(&mut self, context: &HandlerContext) -> Result<()>;
    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()>;
    fn name(&self) -> &str;
}

/// Builds a fresh, uninitialized handler for one target.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn Handler> + Send + Sync>;
