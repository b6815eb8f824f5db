//! Error logging for failed requests.

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipeline::{Behavior, BoxFuture, Next, Outcome};
use crate::request::RequestView;

/// Logs every error raised further down the pipeline together with the
/// request that caused it, then returns the error unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnhandledErrorBehavior;

impl Behavior for UnhandledErrorBehavior {
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        _cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        Box::pin(async move {
            let result = next.run().await;
            if let Err(e) = &result {
                tracing::error!(
                    "Unhandled error for request {}: {} {:?}",
                    request.name(),
                    e,
                    request
                );
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediatorError;
    use crate::handler::FnHandler;
    use crate::pipeline::{compose, ResolvedBehavior};
    use crate::request::Request;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct Purge {
        list_id: u32,
    }

    impl Request for Purge {
        type Response = ();
    }

    #[tokio::test]
    #[traced_test]
    async fn test_error_is_logged_and_returned_unchanged() {
        let handler = FnHandler::new(|_: &Purge, _cancel| async {
            Err(MediatorError::unhandled("connection reset"))
        });
        let behaviors = vec![ResolvedBehavior::Shared(Arc::new(UnhandledErrorBehavior))];
        let request = Purge { list_id: 5 };
        let cancel = CancellationToken::new();

        let err = compose(&request, &cancel, &handler, &behaviors)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, MediatorError::Unhandled(_)));
        assert_eq!(err.to_string(), "connection reset");
        assert!(logs_contain(
            "Unhandled error for request Purge: connection reset Purge { list_id: 5 }"
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_success_is_silent() {
        let handler = FnHandler::new(|_: &Purge, _cancel| async { Ok(()) });
        let behaviors = vec![ResolvedBehavior::Shared(Arc::new(UnhandledErrorBehavior))];
        let request = Purge { list_id: 1 };
        let cancel = CancellationToken::new();

        compose(&request, &cancel, &handler, &behaviors)
            .run()
            .await
            .unwrap();
        assert!(!logs_contain("Unhandled error"));
    }
}
