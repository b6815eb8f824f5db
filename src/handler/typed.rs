//! Handler capabilities and closure adapters.

use std::future::Future;
use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipeline::BoxFuture;
use crate::request::{Notification, Request};

/// The single unit that performs the work for request type `R`.
pub trait RequestHandler<R: Request>: Send + Sync + 'static {
    /// Handle a request and produce its response.
    fn handle<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response>>;
}

/// One of possibly many reactions to notification type `N`.
pub trait NotificationHandler<N: Notification>: Send + Sync + 'static {
    /// React to a notification.
    fn handle<'a>(&'a self, notification: &'a N, cancel: &'a CancellationToken)
        -> BoxFuture<'a, Result<()>>;
}

/// Adapts a closure into a [`RequestHandler`].
///
/// The closure borrows the request and must return a `'static` future, so it
/// copies out whatever the future needs before the `async` block.
pub struct FnHandler<F, R, Fut> {
    handler: F,
    _phantom: PhantomData<fn(&R) -> Fut>,
}

impl<F, R, Fut> FnHandler<F, R, Fut>
where
    F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
    R: Request,
    Fut: Future<Output = Result<R::Response>> + Send + 'static,
{
    /// Create a new closure handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, R, Fut> RequestHandler<R> for FnHandler<F, R, Fut>
where
    F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
    R: Request,
    Fut: Future<Output = Result<R::Response>> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<R::Response>> {
        Box::pin((self.handler)(request, cancel.clone()))
    }
}

/// Adapts a closure into a [`NotificationHandler`].
pub struct FnNotificationHandler<F, N, Fut> {
    handler: F,
    _phantom: PhantomData<fn(&N) -> Fut>,
}

impl<F, N, Fut> FnNotificationHandler<F, N, Fut>
where
    F: Fn(&N, CancellationToken) -> Fut + Send + Sync + 'static,
    N: Notification,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    /// Create a new closure notification handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, N, Fut> NotificationHandler<N> for FnNotificationHandler<F, N, Fut>
where
    F: Fn(&N, CancellationToken) -> Fut + Send + Sync + 'static,
    N: Notification,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        notification: &'a N,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin((self.handler)(notification, cancel.clone()))
    }
}
