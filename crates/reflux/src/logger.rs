//! Action logging sink
//!
//! The store hands every applied action to an [`ActionLogger`] together with
//! its rendered description, after running it through the configured
//! [`LogFilter`]s. Sinks are observational: an error from a sink is logged
//! and otherwise ignored.

use crate::action::Action;

/// Receives applied actions during dispatch processing
pub trait ActionLogger<A>: Send + 'static {
    fn log(&mut self, action: &A, description: &str) -> anyhow::Result<()>;
}

/// Forwards actions to the `log` facade at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogActionLogger;

impl<A: Action> ActionLogger<A> for LogActionLogger {
    fn log(&mut self, action: &A, description: &str) -> anyhow::Result<()> {
        log::debug!("Action [{}]: {}", action.priority(), description);
        Ok(())
    }
}

/// Predicate deciding whether an action reaches the sink
pub struct LogFilter<A> {
    predicate: Box<dyn Fn(&A) -> bool + Send + Sync>,
}

impl<A: Action> LogFilter<A> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
        }
    }

    /// Passes everything in debug builds, nothing in release builds
    pub fn debug_only() -> Self {
        Self::new(|_| cfg!(debug_assertions))
    }

    pub fn errors_only() -> Self {
        Self::new(|action: &A| action.is_error())
    }

    pub fn not_silent() -> Self {
        Self::new(|action: &A| !action.is_silent())
    }

    pub fn allows(&self, action: &A) -> bool {
        (self.predicate)(action)
    }
}

impl<A> std::fmt::Debug for LogFilter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("LogFilter(..)")
    }
}

/// A sink plus its filters, as installed in the store
pub(crate) struct LoggingSink<A> {
    logger: Box<dyn ActionLogger<A>>,
    filters: Vec<LogFilter<A>>,
}

impl<A: Action> LoggingSink<A> {
    pub(crate) fn new(logger: Box<dyn ActionLogger<A>>, filters: Vec<LogFilter<A>>) -> Self {
        Self { logger, filters }
    }

    /// Silent actions never reach the sink; every filter must pass
    pub(crate) fn record(&mut self, action: &A) {
        if action.is_silent() || !self.filters.iter().all(|filter| filter.allows(action)) {
            return;
        }
        let description = action.describe();
        if let Err(e) = self.logger.log(action, &description) {
            log::warn!("Store: action logger failed: {:#}", e);
        }
    }
}
