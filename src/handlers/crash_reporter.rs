//! Crash reporter handler
//!
//! Adapts events to the custom-event API of a crash reporting SDK. The SDK
//! itself is supplied by the application through [`CrashReporterClient`].

use crate::core::{AnalyticsError, Attributes, Handler, HandlerContext, Result, Target};
use std::sync::Arc;

/// Custom event in the shape crash reporters accept: string attributes only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEvent {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl CustomEvent {
    pub fn from_event(name: &str, attributes: Option<&Attributes>) -> Self {
        let attributes = attributes
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            attributes,
        }
    }
}

/// Contract of the crash reporting SDK
pub trait CrashReporterClient: Send + Sync {
    /// Start the SDK for this application
    fn start(&self, app_name: &str) -> Result<()>;

    /// Record a custom event
    fn log_custom(&self, event: CustomEvent) -> Result<()>;
}

pub struct CrashReporterHandler {
    client: Option<Arc<dyn CrashReporterClient>>,
}

impl CrashReporterHandler {
    pub fn new() -> Self {
        Self { client: None }
    }
}

impl Default for CrashReporterHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CrashReporterHandler {
    fn initialize(&mut self, context: &HandlerContext) -> Result<()> {
        let client = context
            .crash_reporter()
            .ok_or_else(|| {
                AnalyticsError::missing_collaborator(Target::CrashReporter, "crash reporter client")
            })?;

        client
            .start(context.app_name())
            .map_err(|e| AnalyticsError::handler_init(Target::CrashReporter, e.to_string()))?;

        self.client = Some(Arc::clone(client));
        Ok(())
    }

    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AnalyticsError::record(self.name(), name, "client not started"))?;

        client.log_custom(CustomEvent::from_event(name, attributes))
    }

    fn name(&self) -> &str {
        "crash_reporter"
    }
}
