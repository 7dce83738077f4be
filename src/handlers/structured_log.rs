//! Structured local logger handler
//!
//! Writes every event to `tracing`. Whatever subscriber the application
//! installs decides where it ends up.

use crate::core::{Attributes, Handler, HandlerContext, Result};
use tracing::Level;

pub struct StructuredLogHandler {
    level: Level,
    include_values: bool,
    app_name: String,
}

impl StructuredLogHandler {
    pub fn new() -> Self {
        Self {
            level: Level::TRACE,
            include_values: false,
            app_name: String::new(),
        }
    }

    /// Set the level events are logged at
    ///
    /// # Example
    ///
    /// ```
    /// use rust_analytics_system::handlers::StructuredLogHandler;
    /// use tracing::Level;
    ///
    /// let handler = StructuredLogHandler::new().with_level(Level::INFO);
    /// ```
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Log attribute values as well as keys
    #[must_use]
    pub fn with_values(mut self, include_values: bool) -> Self {
        self.include_values = include_values;
        self
    }

    fn describe(&self, attributes: Option<&Attributes>) -> String {
        match attributes {
            None => "none".to_string(),
            Some(attrs) if self.include_values => format!("{{{}}}", attrs.format_fields()),
            Some(attrs) => format!("[{}]", attrs.keys().collect::<Vec<_>>().join(", ")),
        }
    }
}

impl Default for StructuredLogHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for StructuredLogHandler {
    fn initialize(&mut self, context: &HandlerContext) -> Result<()> {
        self.app_name = context.app_name().to_string();
        Ok(())
    }

    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()> {
        let data = self.describe(attributes);
        let app = self.app_name.as_str();

        match self.level {
            Level::ERROR => tracing::error!(app, event = name, data = %data, "analytic event"),
            Level::WARN => tracing::warn!(app, event = name, data = %data, "analytic event"),
            Level::INFO => tracing::info!(app, event = name, data = %data, "analytic event"),
            Level::DEBUG => tracing::debug!(app, event = name, data = %data, "analytic event"),
            _ => tracing::trace!(app, event = name, data = %data, "analytic event"),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "structured_log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_keys_only() {
        let handler = StructuredLogHandler::new();
        let attrs = Attributes::new().with("amount", 42).with("env", "prod");

        assert_eq!(handler.describe(None), "none");
        assert_eq!(handler.describe(Some(&attrs)), "[amount, env]");
    }

    #[test]
    fn test_describe_with_values() {
        let handler = StructuredLogHandler::new().with_values(true);
        let attrs = Attributes::new().with("amount", 42);

        assert_eq!(handler.describe(Some(&attrs)), "{amount=42}");
    }

    #[test]
    fn test_record_never_fails() {
        let mut handler = StructuredLogHandler::new().with_level(Level::INFO);
        handler.initialize(&HandlerContext::new("shop")).unwrap();

        assert!(handler.record("checkout", None).is_ok());
        assert_eq!(handler.name(), "structured_log");
    }
}
