//! Start/end logging around every request.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipeline::{Behavior, BoxFuture, Next, Outcome};
use crate::request::RequestView;
use crate::services::{Clock, CurrentUser};

/// Logs one entry before and one after each request.
///
/// The result of the rest of the pipeline is returned unchanged.
pub struct LoggingBehavior {
    user: Arc<dyn CurrentUser>,
    clock: Arc<dyn Clock>,
}

impl LoggingBehavior {
    pub fn new(user: Arc<dyn CurrentUser>, clock: Arc<dyn Clock>) -> Self {
        Self { user, clock }
    }
}

impl Behavior for LoggingBehavior {
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        _cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        Box::pin(async move {
            let name = request.name();
            let user = self.user.username().unwrap_or_default();

            tracing::info!("handling request {} user={:?}", name, user);
            let started = self.clock.now();

            let result = next.run().await;

            let elapsed = self.clock.now().saturating_duration_since(started);
            match &result {
                Ok(_) => tracing::info!(
                    "handled request {} in {:.3} ms",
                    name,
                    elapsed.as_secs_f64() * 1000.0
                ),
                Err(e) => tracing::error!("request failed {}: {}", name, e),
            }

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::fakes::SteppingClock;
    use crate::error::MediatorError;
    use crate::handler::FnHandler;
    use crate::pipeline::{compose, ResolvedBehavior};
    use crate::request::Request;
    use crate::services::StaticUser;
    use std::time::Duration;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct Rename {
        fail: bool,
    }

    impl Request for Rename {
        type Response = &'static str;
    }

    async fn dispatch(request: Rename) -> Result<&'static str> {
        let logging = LoggingBehavior::new(
            Arc::new(StaticUser::new("alice")),
            Arc::new(SteppingClock::new(Duration::from_millis(12))),
        );
        let handler = FnHandler::new(|req: &Rename, _cancel| {
            let fail = req.fail;
            async move {
                if fail {
                    Err(MediatorError::not_found("List 4 was not found."))
                } else {
                    Ok("renamed")
                }
            }
        });
        let behaviors = vec![ResolvedBehavior::Shared(Arc::new(logging))];
        let cancel = CancellationToken::new();

        compose(&request, &cancel, &handler, &behaviors).run().await
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logs_start_and_end() {
        assert_eq!(dispatch(Rename { fail: false }).await.unwrap(), "renamed");

        assert!(logs_contain("handling request Rename user=\"alice\""));
        assert!(logs_contain("handled request Rename in 12.000 ms"));
        assert!(!logs_contain("request failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logs_failure_and_returns_it_unchanged() {
        let err = dispatch(Rename { fail: true }).await.unwrap_err();

        assert!(matches!(err, MediatorError::NotFound(_)));
        assert!(logs_contain("handling request Rename"));
        assert!(logs_contain("request failed Rename: List 4 was not found."));
        assert!(!logs_contain("handled request"));
    }
}
