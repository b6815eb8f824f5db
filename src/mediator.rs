//! Mediator builder and dispatch entry points.
//!
//! The [`MediatorBuilder`] provides a fluent API for registering handlers,
//! behaviors and notification handlers. [`MediatorBuilder::build`] freezes
//! the registry; the resulting [`Mediator`] only reads it:
//! 1. Resolve the handler and behaviors for the request type
//! 2. Compose the pipeline
//! 3. Run it on the caller's task and hand back its result unchanged
//!
//! # Example
//!
//! ```
//! use mediator_core::{Mediator, Request};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug)]
//! struct Greet {
//!     name: String,
//! }
//!
//! impl Request for Greet {
//!     type Response = String;
//! }
//!
//! # async fn run() -> mediator_core::Result<()> {
//! let mediator = Mediator::builder()
//!     .handle(|req: &Greet, _cancel| {
//!         let greeting = format!("Hello, {}!", req.name);
//!         async move { Ok(greeting) }
//!     })
//!     .build()?;
//!
//! let cancel = CancellationToken::new();
//! let greeting = mediator.send(Greet { name: "Ada".into() }, &cancel).await?;
//! assert_eq!(greeting, "Hello, Ada!");
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{MediatorError, Result};
use crate::handler::{BindingRegistry, HandlerModule, NotificationHandler, RequestHandler};
use crate::pipeline::{compose, Behavior, PipelineBehavior};
use crate::request::{short_type_name, BindingKey, Notification, Request};
use crate::schema::RegistrySchema;

/// Builder for configuring and creating a [`Mediator`].
///
/// Registration errors do not break the chain; the first one is kept and
/// returned by [`build`](Self::build).
#[derive(Default)]
pub struct MediatorBuilder {
    registry: BindingRegistry,
    error: Option<MediatorError>,
}

impl MediatorBuilder {
    /// Create a new mediator builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!("Rejected registration: {}", e);
            self.error.get_or_insert(e);
        }
    }

    /// Register the handler for request type `R`.
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R>,
    {
        let result = self.registry.register_handler::<R, H>(handler);
        self.record(result);
        self
    }

    /// Register a closure as the handler for request type `R`.
    ///
    /// The closure receives the borrowed request and a clone of the
    /// cancellation token, and must return a `'static` future.
    pub fn handle<R, F, Fut>(mut self, handler: F) -> Self
    where
        R: Request,
        F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R::Response>> + Send + 'static,
    {
        let result = self.registry.register_handler_fn(handler);
        self.record(result);
        self
    }

    /// Append a generic behavior applying to every request.
    ///
    /// Behaviors run in the order they are appended, outermost first.
    pub fn behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.registry.register_behavior(behavior);
        self
    }

    /// Append a generic behavior applying to the requests accepted by
    /// `predicate`.
    pub fn behavior_when<P, B>(mut self, predicate: P, behavior: B) -> Self
    where
        P: Fn(&BindingKey) -> bool + Send + Sync + 'static,
        B: Behavior,
    {
        self.registry.register_behavior_when(predicate, behavior);
        self
    }

    /// Append a behavior bound to request type `R` only.
    pub fn request_behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: Request,
        B: PipelineBehavior<R>,
    {
        self.registry.register_request_behavior::<R, B>(behavior);
        self
    }

    /// Register a handler for notification type `N`.
    pub fn notification_handler<N, H>(mut self, handler: H) -> Self
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        self.registry.register_notification_handler::<N, H>(handler);
        self
    }

    /// Register a closure as a handler for notification type `N`.
    pub fn on<N, F, Fut>(mut self, handler: F) -> Self
    where
        N: Notification,
        F: Fn(&N, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.registry.register_notification_fn(handler);
        self
    }

    /// Install a bundle of registrations.
    pub fn module<M: HandlerModule>(mut self, module: M) -> Self {
        let result = self.registry.install(&module);
        self.record(result);
        self
    }

    /// Freeze the registry and build the mediator.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, e.g.
    /// [`MediatorError::AmbiguousHandlerFound`] for a duplicate handler.
    pub fn build(self) -> Result<Mediator> {
        if let Some(e) = self.error {
            return Err(e);
        }

        tracing::debug!(
            handlers = self.registry.handler_count(),
            behaviors = self.registry.behavior_count(),
            notification_handlers = self.registry.notification_handler_count(),
            "Mediator registry frozen"
        );

        Ok(Mediator {
            registry: Arc::new(self.registry),
        })
    }
}

/// In-process request/response mediator.
///
/// Cheap to clone; clones share the same frozen registry. Each call runs on
/// the caller's task and spawns nothing.
#[derive(Clone)]
pub struct Mediator {
    registry: Arc<BindingRegistry>,
}

impl Mediator {
    /// Create a new mediator builder.
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    /// Create a mediator over an already filled registry.
    pub fn from_registry(registry: BindingRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Send a request through its pipeline to its handler.
    ///
    /// The cancellation token is handed unchanged to every behavior and to
    /// the handler; the mediator itself never cancels.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::NoHandlerFound`] if `R` has no handler, before
    /// any behavior runs. Otherwise returns whatever error the pipeline
    /// produced, unmodified.
    pub async fn send<R: Request>(&self, request: R, cancel: &CancellationToken) -> Result<R::Response> {
        let handler = self.registry.resolve_handler::<R>()?;
        let behaviors = self.registry.resolve_behaviors::<R>();

        tracing::trace!(
            "Dispatching {} through {} behavior(s)",
            short_type_name::<R>(),
            behaviors.len()
        );

        compose(&request, cancel, handler.as_ref(), &behaviors)
            .run()
            .await
    }

    /// Publish a notification to every handler registered for its type.
    ///
    /// Handlers run one after another in registration order. The first
    /// failure stops the remaining handlers and is returned unmodified;
    /// effects of handlers that already completed stay in place. A
    /// notification with no handlers completes successfully.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub async fn publish<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let handlers = self.registry.resolve_notification_handlers::<N>();
        let name = short_type_name::<N>();

        if handlers.is_empty() {
            tracing::trace!("No handlers for {}", name);
            return Ok(());
        }

        for (index, handler) in handlers.iter().enumerate() {
            if let Err(e) = handler.handle(&notification, cancel).await {
                tracing::debug!(
                    "Notification handler #{} of {} for {} failed: {}",
                    index + 1,
                    handlers.len(),
                    name,
                    e
                );
                return Err(e);
            }
        }

        Ok(())
    }

    /// Schema of the registered bindings.
    pub fn schema(&self) -> RegistrySchema {
        self.registry.describe()
    }

    /// The frozen registry.
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("handlers", &self.registry.handler_count())
            .field("behaviors", &self.registry.behavior_count())
            .field(
                "notification_handlers",
                &self.registry.notification_handler_count(),
            )
            .finish()
    }
}
