//! Slow request detection.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipeline::{Behavior, BoxFuture, Next, Outcome};
use crate::request::RequestView;
use crate::services::{Clock, CurrentUser};

/// Default duration after which a request counts as long running.
pub const DEFAULT_SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(500);

/// Configuration for [`PerformanceBehavior`].
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Successful requests taking longer than this are logged as a warning.
    pub slow_request_threshold: Duration,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            slow_request_threshold: DEFAULT_SLOW_REQUEST_THRESHOLD,
        }
    }
}

/// Warns about successful requests slower than the configured threshold.
pub struct PerformanceBehavior {
    user: Arc<dyn CurrentUser>,
    clock: Arc<dyn Clock>,
    config: PerformanceConfig,
}

impl PerformanceBehavior {
    /// Create a behavior with the default threshold.
    pub fn new(user: Arc<dyn CurrentUser>, clock: Arc<dyn Clock>) -> Self {
        Self {
            user,
            clock,
            config: PerformanceConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PerformanceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the slow request threshold.
    pub fn slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.config.slow_request_threshold = threshold;
        self
    }

    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }
}

impl Behavior for PerformanceBehavior {
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        _cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        Box::pin(async move {
            let started = self.clock.now();
            let outcome = next.run().await?;
            let elapsed = self.clock.now().saturating_duration_since(started);

            if elapsed > self.config.slow_request_threshold {
                tracing::warn!(
                    "long running request {} ({} ms) user={:?} {:?}",
                    request.name(),
                    elapsed.as_millis(),
                    self.user.username().unwrap_or_default(),
                    request
                );
            }

            Ok(outcome)
        })
    }
}
