//! Event router: handler registry, default parameters and fan-out

use super::{
    attributes::Attributes,
    context::HandlerContext,
    defaults::DefaultParameterStore,
    error::{AnalyticsError, Result},
    event::AnalyticEvent,
    handler::{Handler, HandlerFactory},
    metrics::AnalyticsMetrics,
    target::Target,
};
use crate::handlers::{
    CrashReporterHandler, LogShippingHandler, ProductAnalyticsHandler, StructuredLogHandler,
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Name of the status event sent after every `initialize` call
pub const INITIALIZED_EVENT: &str = "Analytics initialized";

/// Event name used by [`Analytics::on_logout`]
pub const LOGOUT_EVENT: &str = "User logged out";

type SharedHandler = Arc<Mutex<Box<dyn Handler>>>;

/// Outcome of an `initialize` call: whether each attempted handler is now active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    statuses: Vec<(Target, bool)>,
}

impl InitReport {
    pub fn is_active(&self, target: Target) -> bool {
        self.statuses
            .iter()
            .any(|(t, active)| *t == target && *active)
    }

    pub fn attempted(&self) -> impl Iterator<Item = Target> + '_ {
        self.statuses.iter().map(|(t, _)| *t)
    }

    pub fn statuses(&self) -> &[(Target, bool)] {
        &self.statuses
    }

    pub fn all_active(&self) -> bool {
        self.statuses.iter().all(|(_, active)| *active)
    }

    /// One boolean attribute per attempted handler, keyed by target name
    pub fn to_attributes(&self) -> Attributes {
        self.statuses
            .iter()
            .map(|(target, active)| (target.to_str(), *active))
            .collect()
    }
}

/// Analytics facade
///
/// Owns the handler registry and the default parameter store, resolves
/// targets into handlers and fans events out to them. Every failure is
/// contained here: nothing a backend does can make `send` fail or panic.
///
/// # Example
///
/// ```
/// use rust_analytics_system::prelude::*;
///
/// let analytics = Analytics::builder().build();
/// analytics.initialize(Target::StructuredLog, true);
/// analytics.add_default_parameters(Target::All, Attributes::new().with("env", "prod"));
///
/// analytics
///     .new_event("checkout")
///     .with_attribute("amount", 42)
///     .send();
/// ```
pub struct Analytics {
    handlers: RwLock<BTreeMap<Target, SharedHandler>>,
    factories: BTreeMap<Target, HandlerFactory>,
    defaults: DefaultParameterStore,
    context: HandlerContext,
    metrics: Arc<AnalyticsMetrics>,
}

impl Analytics {
    /// Create a router with the built-in handler factories
    #[must_use]
    pub fn new(context: HandlerContext) -> Self {
        Self::builder().context(context).build()
    }

    #[must_use]
    pub fn builder() -> AnalyticsBuilder {
        AnalyticsBuilder::new()
    }

    /// Turn one handler (or every declared handler, for `Target::All`) on or off.
    ///
    /// Each attempt is isolated; a failing backend only shows up as `false`
    /// in the returned report. The report is also sent as the
    /// [`INITIALIZED_EVENT`] event through the normal dispatch path.
    pub fn initialize(&self, target: Target, enable: bool) -> InitReport {
        let statuses = target
            .expand()
            .iter()
            .map(|&t| (t, self.init_handler(t, enable)))
            .collect();
        let report = InitReport { statuses };

        self.new_event(INITIALIZED_EVENT)
            .with(report.to_attributes())
            .send();

        report
    }

    /// Enable every declared handler
    pub fn initialize_all(&self) -> InitReport {
        debug!("initializing analytics");
        self.initialize(Target::All, true)
    }

    fn init_handler(&self, target: Target, enable: bool) -> bool {
        if !enable {
            if self.handlers.write().remove(&target).is_some() {
                debug!(sink = %target, "analytics handler disabled");
            }
            return false;
        }

        match self.start_handler(target) {
            Ok(handler) => {
                self.handlers
                    .write()
                    .insert(target, Arc::new(Mutex::new(handler)));
                debug!(sink = %target, "analytics handler enabled");
                true
            }
            Err(e) => {
                self.metrics.record_init_failure();
                error!(sink = %target, error = %e, "failed to initialize analytics handler");
                false
            }
        }
    }

    fn start_handler(&self, target: Target) -> Result<Box<dyn Handler>> {
        let factory = self
            .factories
            .get(&target)
            .ok_or_else(|| AnalyticsError::handler_init(target, "no handler factory registered"))?;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut handler = factory();
            handler.initialize(&self.context).map(|()| handler)
        }));

        match outcome {
            Ok(result) => result,
            Err(panic_info) => Err(AnalyticsError::handler_init(
                target,
                format!("panicked during initialization: {}", panic_message(&*panic_info)),
            )),
        }
    }

    /// Merge default attributes for `target` (every target, for `Target::All`).
    ///
    /// The newest set wins on duplicate keys. Defaults may be added before
    /// the matching handler is enabled.
    pub fn add_default_parameters(&self, target: Target, data: Attributes) {
        self.defaults.add(target, &data);
    }

    /// Defaults currently stored for exactly this target's bucket
    pub fn default_parameters(&self, target: Target) -> Option<Attributes> {
        self.defaults.get(target)
    }

    /// Start building an event
    pub fn new_event(&self, name: impl Into<String>) -> AnalyticEvent<'_> {
        AnalyticEvent::new(self, name)
    }

    /// Record login details as defaults for every target
    pub fn on_login(&self, login: impl Into<String>, info: impl Into<String>) {
        let data = Attributes::new()
            .with("login", login.into())
            .with("info", info.into());
        self.add_default_parameters(Target::All, data);
    }

    /// Pre-named logout event, ready for extra attributes and targets
    pub fn on_logout(&self) -> AnalyticEvent<'_> {
        self.new_event(LOGOUT_EVENT)
    }

    pub fn is_enabled(&self, target: Target) -> bool {
        self.handlers.read().contains_key(&target)
    }

    pub fn registered_targets(&self) -> Vec<Target> {
        self.handlers.read().keys().copied().collect()
    }

    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    pub fn metrics(&self) -> &AnalyticsMetrics {
        &self.metrics
    }

    /// Route one event to `target`, returning how many handlers accepted it.
    ///
    /// With `Target::All`, every registered handler receives its own payload:
    /// the event data overlaid by the `All` defaults, then by that handler's
    /// defaults. A specific target with no handler is skipped.
    pub(crate) fn dispatch(
        &self,
        target: Target,
        apply_defaults: bool,
        name: &str,
        data: Option<&Attributes>,
    ) -> usize {
        self.metrics.record_dispatched();

        if target.is_all() {
            // Snapshot so handlers run without the registry lock held
            let handlers: Vec<(Target, SharedHandler)> = self
                .handlers
                .read()
                .iter()
                .map(|(t, h)| (*t, Arc::clone(h)))
                .collect();

            let mut delivered = 0;
            for (current, handler) in &handlers {
                let payload = self.payload(&[Target::All, *current], apply_defaults, data);
                if self.deliver(*current, handler, name, payload.as_ref()) {
                    delivered += 1;
                }
            }
            delivered
        } else {
            let handler = self.handlers.read().get(&target).map(Arc::clone);
            match handler {
                Some(handler) => {
                    let payload = self.payload(&[target], apply_defaults, data);
                    usize::from(self.deliver(target, &handler, name, payload.as_ref()))
                }
                None => {
                    self.metrics.record_missing_handler();
                    warn!(sink = %target, event = name, "analytics handler not initialized, skipping event");
                    0
                }
            }
        }
    }

    fn payload(
        &self,
        buckets: &[Target],
        apply_defaults: bool,
        data: Option<&Attributes>,
    ) -> Option<Attributes> {
        if !apply_defaults {
            return data.cloned();
        }
        // Defaults are merged into the event data and win on shared keys
        match (data, self.defaults.merged(buckets)) {
            (Some(data), Some(defaults)) => {
                let mut payload = data.clone();
                payload.overlay(&defaults);
                Some(payload)
            }
            (None, Some(defaults)) => Some(defaults),
            (data, None) => data.cloned(),
        }
    }

    fn deliver(
        &self,
        target: Target,
        handler: &SharedHandler,
        name: &str,
        payload: Option<&Attributes>,
    ) -> bool {
        let outcome = catch_unwind(AssertUnwindSafe(|| handler.lock().record(name, payload)));

        match outcome {
            Ok(Ok(())) => {
                self.metrics.record_delivered();
                true
            }
            Ok(Err(e)) => {
                self.metrics.record_handler_failure();
                warn!(sink = %target, event = name, error = %e, "analytics handler failed to record event");
                false
            }
            Err(panic_info) => {
                self.metrics.record_handler_failure();
                error!(
                    sink = %target,
                    event = name,
                    panic = %panic_message(&*panic_info),
                    "analytics handler panicked; other handlers continue to function"
                );
                false
            }
        }
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing [`Analytics`] with a fluent API
///
/// Starts with a factory for every built-in handler; `factory` replaces or
/// adds one, `without_factory` removes one.
///
/// # Example
/// ```
/// use rust_analytics_system::prelude::*;
///
/// let analytics = Analytics::builder()
///     .context(HandlerContext::new("shop"))
///     .default_parameters(Target::All, Attributes::new().with("env", "prod"))
///     .build();
///
/// assert!(analytics.registered_targets().is_empty());
/// ```
pub struct AnalyticsBuilder {
    context: HandlerContext,
    factories: BTreeMap<Target, HandlerFactory>,
    defaults: Vec<(Target, Attributes)>,
}

impl AnalyticsBuilder {
    pub fn new() -> Self {
        let mut factories: BTreeMap<Target, HandlerFactory> = BTreeMap::new();
        factories.insert(
            Target::CrashReporter,
            Arc::new(|| Box::new(CrashReporterHandler::new()) as Box<dyn Handler>),
        );
        factories.insert(
            Target::ProductAnalytics,
            Arc::new(|| Box::new(ProductAnalyticsHandler::new()) as Box<dyn Handler>),
        );
        factories.insert(
            Target::LogShipping,
            Arc::new(|| Box::new(LogShippingHandler::new()) as Box<dyn Handler>),
        );
        factories.insert(
            Target::StructuredLog,
            Arc::new(|| Box::new(StructuredLogHandler::new()) as Box<dyn Handler>),
        );

        Self {
            context: HandlerContext::default(),
            factories,
            defaults: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: HandlerContext) -> Self {
        self.context = context;
        self
    }

    /// Register the factory used when `target` is enabled
    ///
    /// `Target::All` is not a registry key and is ignored.
    #[must_use = "builder methods return a new value"]
    pub fn factory<F, H>(mut self, target: Target, factory: F) -> Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: Handler + 'static,
    {
        if target.is_all() {
            warn!("ignoring handler factory registered for Target::All");
            return self;
        }
        self.factories
            .insert(target, Arc::new(move || Box::new(factory()) as Box<dyn Handler>));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn without_factory(mut self, target: Target) -> Self {
        self.factories.remove(&target);
        self
    }

    /// Defaults applied in order once the router is built
    #[must_use = "builder methods return a new value"]
    pub fn default_parameters(mut self, target: Target, data: Attributes) -> Self {
        self.defaults.push((target, data));
        self
    }

    pub fn build(self) -> Analytics {
        let defaults = DefaultParameterStore::new();
        for (target, data) in &self.defaults {
            defaults.add(*target, data);
        }

        Analytics {
            handlers: RwLock::new(BTreeMap::new()),
            factories: self.factories,
            defaults,
            context: self.context,
            metrics: Arc::new(AnalyticsMetrics::new()),
        }
    }
}

impl Default for AnalyticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
