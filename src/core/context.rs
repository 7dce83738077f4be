//! Collaborators handed to handlers when they are initialized

use crate::handlers::{CrashReporterClient, ProductAnalyticsClient};
use crate::shipping::LogShipper;
use std::fmt;
use std::sync::Arc;

/// Everything a handler may need to start its backend.
///
/// Built once by application startup code and owned by [`Analytics`].
/// A handler whose collaborator is absent fails to initialize.
///
/// [`Analytics`]: crate::Analytics
#[derive(Clone, Default)]
pub struct HandlerContext {
    app_name: String,
    crash_reporter: Option<Arc<dyn CrashReporterClient>>,
    product_analytics: Option<Arc<dyn ProductAnalyticsClient>>,
    log_shipper: Option<Arc<LogShipper>>,
}

impl HandlerContext {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_crash_reporter(mut self, client: Arc<dyn CrashReporterClient>) -> Self {
        self.crash_reporter = Some(client);
        self
    }

    #[must_use]
    pub fn with_product_analytics(mut self, client: Arc<dyn ProductAnalyticsClient>) -> Self {
        self.product_analytics = Some(client);
        self
    }

    #[must_use]
    pub fn with_log_shipper(mut self, shipper: Arc<LogShipper>) -> Self {
        self.log_shipper = Some(shipper);
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn crash_reporter(&self) -> Option<&Arc<dyn CrashReporterClient>> {
        self.crash_reporter.as_ref()
    }

    pub fn product_analytics(&self) -> Option<&Arc<dyn ProductAnalyticsClient>> {
        self.product_analytics.as_ref()
    }

    pub fn log_shipper(&self) -> Option<&Arc<LogShipper>> {
        self.log_shipper.as_ref()
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("app_name", &self.app_name)
            .field("crash_reporter", &self.crash_reporter.is_some())
            .field("product_analytics", &self.product_analytics.is_some())
            .field("log_shipper", &self.log_shipper.is_some())
            .finish()
    }
}
