//! Product analytics handler
//!
//! Product analytics services only accept `[A-Za-z0-9_]` in event and
//! parameter names, so names are sanitized and prefixed before sending.

use crate::core::{AnalyticsError, Attributes, Handler, HandlerContext, Result, Target};
use std::sync::Arc;
use tracing::warn;

/// Default limit above which an event name is reported as suspicious
pub const DEFAULT_MAX_NAME_LEN: usize = 500;

/// Contract of the product analytics SDK
pub trait ProductAnalyticsClient: Send + Sync {
    /// Bind the SDK to this application
    fn connect(&self, app_name: &str) -> Result<()>;

    /// Log one event with string parameters
    fn log_event(&self, name: &str, params: &[(String, String)]) -> Result<()>;
}

pub struct ProductAnalyticsHandler {
    client: Option<Arc<dyn ProductAnalyticsClient>>,
    max_name_len: usize,
}

impl ProductAnalyticsHandler {
    pub fn new() -> Self {
        Self {
            client: None,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }

    #[must_use]
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Strip everything outside `[A-Za-z0-9_]`
    pub fn sanitize(entry: &str) -> String {
        entry
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect()
    }

    pub fn event_name(name: &str) -> String {
        format!("event_{}", Self::sanitize(name))
    }

    pub fn param_name(key: &str) -> String {
        format!("attr_{}", Self::sanitize(key))
    }

    /// Sanitized parameters; null values become empty strings
    pub fn params(attributes: Option<&Attributes>) -> Vec<(String, String)> {
        attributes
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| {
                        let value = if v.is_null() {
                            String::new()
                        } else {
                            v.to_string()
                        };
                        (Self::param_name(k), value)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for ProductAnalyticsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for ProductAnalyticsHandler {
    fn initialize(&mut self, context: &HandlerContext) -> Result<()> {
        let client = context.product_analytics().ok_or_else(|| {
            AnalyticsError::missing_collaborator(Target::ProductAnalytics, "product analytics client")
        })?;

        client
            .connect(context.app_name())
            .map_err(|e| AnalyticsError::handler_init(Target::ProductAnalytics, e.to_string()))?;

        self.client = Some(Arc::clone(client));
        Ok(())
    }

    fn record(&mut self, name: &str, attributes: Option<&Attributes>) -> Result<()> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AnalyticsError::record(self.name(), name, "client not connected"))?;

        let event_name = Self::event_name(name);
        if event_name.len() > self.max_name_len {
            warn!(
                event = %event_name,
                len = event_name.len(),
                max = self.max_name_len,
                "product analytics event name exceeds limit"
            );
        }

        client.log_event(&event_name, &Self::params(attributes))
    }

    fn name(&self) -> &str {
        "product_analytics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AttributeValue;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeService {
        logged: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl ProductAnalyticsClient for FakeService {
        fn connect(&self, _app_name: &str) -> Result<()> {
            Ok(())
        }

        fn log_event(&self, name: &str, params: &[(String, String)]) -> Result<()> {
            self.logged.lock().push((name.to_string(), params.to_vec()));
            Ok(())
        }
    }

    struct RefusingService;

    impl ProductAnalyticsClient for RefusingService {
        fn connect(&self, _app_name: &str) -> Result<()> {
            Err(AnalyticsError::other("invalid api key"))
        }

        fn log_event(&self, _name: &str, _params: &[(String, String)]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(ProductAnalyticsHandler::sanitize("My event! #1"), "Myevent1");
        assert_eq!(ProductAnalyticsHandler::event_name("add to-cart"), "event_addtocart");
        assert_eq!(ProductAnalyticsHandler::param_name("A String!"), "attr_AString");
    }

    #[test]
    fn test_record_sanitizes_and_blanks_nulls() {
        let service = Arc::new(FakeService::default());
        let context = HandlerContext::new("shop").with_product_analytics(service.clone());

        let mut handler = ProductAnalyticsHandler::new();
        handler.initialize(&context).unwrap();

        let attrs = Attributes::new()
            .with("some Int", 3)
            .with("coupon", AttributeValue::Null);
        handler.record("Checkout done", Some(&attrs)).unwrap();

        let logged = service.logged.lock();
        assert_eq!(logged[0].0, "event_Checkoutdone");
        assert_eq!(
            logged[0].1,
            vec![
                ("attr_someInt".to_string(), "3".to_string()),
                ("attr_coupon".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_connect_failure_surfaces_as_init_error() {
        let context = HandlerContext::new("shop").with_product_analytics(Arc::new(RefusingService));
        let mut handler = ProductAnalyticsHandler::new();

        let err = handler.initialize(&context).unwrap_err();
        assert!(matches!(err, AnalyticsError::HandlerInit { .. }));
    }
}
