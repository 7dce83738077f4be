//! Log shipping handler
//!
//! Forwards events to the [`LogShipper`] configured in the handler context.

use crate::core::{AnalyticsError, Attributes, Handler, HandlerContext, Result, Target};
use crate::shipping::LogShipper;
use serde::Serialize;
use std::sync::Arc;

/// Shape of the line handed to the shipper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShippingFormat {
    /// The event name alone; attributes are dropped
    #[default]
    NameOnly,
    /// `{"event": name, "attributes": {...}}`
    Json,
}

#[derive(Serialize)]
struct ShippedEvent<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a Attributes>,
}

pub struct LogShippingHandler {
    shipper: Option<Arc<LogShipper>>,
    format: ShippingFormat,
}

impl LogShippingHandler {
    pub fn new() -> Self {
        Self {
            shipper: None,
            format: ShippingFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: ShippingFormat) -> Self {
        self.format = format;
        self
    }

    fn line(&self, name: &str, attributes: Option<&Attributes>) -> Result<String> {
        match self.format {
            ShippingFormat::NameOnly => Ok(name.to_string()),
            ShippingFormat::Json => Ok(serde_json::to_string(&ShippedEvent {
                event: name,
                attributes: attributes.filter(|attrs| !attrs.is_empty()),
            })?),
        }
    }
}

impl Default for LogShippingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for LogShippingHandler {
    fn initialize(&mut self, context: &HandlerContext) -> Result<()> {
        let shipper = context
            .log_shipper()
            .ok_or_else(|| AnalyticsError::missing_collaborator(Target::LogShipping, "log shipper"))?;

        if !shipper.is_running() {
            return Err(AnalyticsError::handler_init(
                Target::LogShipping,
                "log shipper is stopped",
            ));
        }

        self.shipper = Some(Arc::clone(shipper));
        Ok(())
    }

    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()> {
        let shipper = self
            .shipper
            .as_ref()
            .ok_or_else(|| AnalyticsError::record(self.name(), name, "no log shipper"))?;

        shipper.log_event(self.line(name, attributes)?)
    }

    fn name(&self) -> &str {
        "log_shipping"
    }
}
