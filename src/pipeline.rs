//! Pipeline composition.
//!
//! A pipeline is built fresh for every [`Mediator::send`](crate::Mediator::send)
//! call by folding the resolved behaviors around the terminal handler step:
//!
//! ```text
//! caller ─► B1 ─► B2 ─► ... ─► Bn ─► handler
//!        ◄─────────────────────────────┘
//! ```
//!
//! Registration order is execution order: the first registered behavior sees
//! the request first and the response last. A behavior that never runs its
//! [`Next`] short-circuits every inner behavior and the handler.
//!
//! Two behavior shapes exist:
//! - [`PipelineBehavior<R>`] is bound to one request type and sees the typed
//!   request and response. It may answer on its own.
//! - [`Behavior`] applies to every request type. It sees the request through
//!   [`RequestView`] and the response as an opaque [`Outcome`] it can only
//!   pass back up.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{MediatorError, Result};
use crate::handler::RequestHandler;
use crate::request::{short_type_name, Request, RequestView};

/// Boxed future returned by handlers and behaviors.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The rest of the pipeline: the next behavior, or the handler.
///
/// `run` consumes the continuation, so a behavior can invoke it at most once.
pub struct Next<'a, T> {
    step: Box<dyn FnOnce() -> BoxFuture<'a, Result<T>> + Send + 'a>,
}

impl<'a, T: 'a> Next<'a, T> {
    /// Wrap a step as a continuation.
    pub fn new<F>(step: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'a, Result<T>> + Send + 'a,
    {
        Self {
            step: Box::new(step),
        }
    }

    /// Invoke the rest of the pipeline.
    pub fn run(self) -> BoxFuture<'a, Result<T>> {
        (self.step)()
    }
}

/// A response travelling through a generic [`Behavior`].
///
/// Only the pipeline creates outcomes; a generic behavior can return the one
/// its continuation produced, or fail.
pub struct Outcome(Box<dyn Any + Send>);

impl Outcome {
    fn new<T: Send + 'static>(value: T) -> Self {
        Self(Box::new(value))
    }

    fn downcast<T: 'static>(self) -> Result<T> {
        self.0
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MediatorError::ResponseTypeMismatch {
                expected: short_type_name::<T>(),
            })
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Outcome(..)")
    }
}

/// A behavior bound to a single request type.
pub trait PipelineBehavior<R: Request>: Send + Sync + 'static {
    /// Run the behavior. Call `next.run()` to continue down the pipeline.
    fn handle<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
        next: Next<'a, R::Response>,
    ) -> BoxFuture<'a, Result<R::Response>>;
}

/// A behavior applying to every request type it is registered for.
pub trait Behavior: Send + Sync + 'static {
    /// Run the behavior. Call `next.run()` to continue down the pipeline.
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>>;
}

/// A behavior binding resolved for request type `R`.
pub enum ResolvedBehavior<R: Request> {
    /// Generic behavior.
    Shared(Arc<dyn Behavior>),
    /// Behavior bound to `R`.
    Typed(Arc<dyn PipelineBehavior<R>>),
}

impl<R: Request> ResolvedBehavior<R> {
    fn invoke<'a>(
        &'a self,
        request: &'a R,
        cancel: &'a CancellationToken,
        next: Next<'a, R::Response>,
    ) -> BoxFuture<'a, Result<R::Response>> {
        match self {
            Self::Typed(behavior) => behavior.handle(request, cancel, next),
            Self::Shared(behavior) => {
                let erased = Next::new(move || -> BoxFuture<'a, Result<Outcome>> {
                    Box::pin(async move { next.run().await.map(Outcome::new) })
                });
                Box::pin(async move {
                    behavior
                        .handle(request, cancel, erased)
                        .await?
                        .downcast::<R::Response>()
                })
            }
        }
    }
}

impl<R: Request> Clone for ResolvedBehavior<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Shared(behavior) => Self::Shared(behavior.clone()),
            Self::Typed(behavior) => Self::Typed(behavior.clone()),
        }
    }
}

/// Fold `behaviors` around the handler, last to first.
///
/// The returned continuation is the pipeline's entry point.
pub fn compose<'a, R: Request>(
    request: &'a R,
    cancel: &'a CancellationToken,
    handler: &'a dyn RequestHandler<R>,
    behaviors: &'a [ResolvedBehavior<R>],
) -> Next<'a, R::Response> {
    let terminal = Next::new(move || handler.handle(request, cancel));

    behaviors.iter().rev().fold(terminal, |next, behavior| {
        Next::new(move || behavior.invoke(request, cancel, next))
    })
}
