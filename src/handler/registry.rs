//! Binding registry mapping request and notification types to handlers.
//!
//! The registry is filled once during startup and then frozen behind an
//! `Arc` inside [`Mediator`](crate::Mediator). Resolution is a pure lookup
//! keyed by `TypeId`; nothing is inspected at dispatch time.
//!
//! Each binding is stored type-erased as `Box<dyn Any>` holding an
//! `Arc<dyn RequestHandler<R>>` (or behavior/notification equivalent) under
//! the key of that same `R`, so the downcast on lookup cannot miss.
//!
//! # Example
//!
//! ```
//! use mediator_core::{BindingRegistry, Request};
//!
//! #[derive(Debug)]
//! struct Ping;
//!
//! impl Request for Ping {
//!     type Response = &'static str;
//! }
//!
//! let mut registry = BindingRegistry::new();
//! registry
//!     .register_handler_fn(|_: &Ping, _cancel| async { Ok("pong") })
//!     .unwrap();
//!
//! assert!(registry.resolve_handler::<Ping>().is_ok());
//! assert!(registry.register_handler_fn(|_: &Ping, _cancel| async { Ok("again") }).is_err());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::typed::{FnHandler, FnNotificationHandler, NotificationHandler, RequestHandler};
use crate::error::{MediatorError, Result};
use crate::pipeline::{Behavior, PipelineBehavior, ResolvedBehavior};
use crate::request::{short_type_name, BindingKey, Notification, Request};
use crate::schema::{BehaviorScope, RegistrySchema};

/// Applicability predicate for a generic behavior.
pub type BehaviorPredicate = Box<dyn Fn(&BindingKey) -> bool + Send + Sync>;

type ErasedBinding = Box<dyn Any + Send + Sync>;

/// Entry for a registered request handler.
struct HandlerEntry {
    /// `Arc<dyn RequestHandler<R>>` for the key's `R`.
    binding: ErasedBinding,
    /// Short name of the handler type.
    name: &'static str,
}

/// Entry for a registered behavior. Order in the registry is execution order.
enum BehaviorEntry {
    Shared {
        behavior: Arc<dyn Behavior>,
        applies: Option<BehaviorPredicate>,
        name: &'static str,
    },
    Typed {
        key: BindingKey,
        /// `Arc<dyn PipelineBehavior<R>>` for the key's `R`.
        binding: ErasedBinding,
        name: &'static str,
    },
}

/// Handlers for one notification type, in registration order.
struct NotificationEntry {
    name: &'static str,
    /// `Arc<dyn NotificationHandler<N>>` for the entry's `N`.
    handlers: Vec<ErasedBinding>,
}

/// A bundle of registrations installed as a unit.
///
/// This is the explicit, ordered replacement for discovering handlers by
/// scanning code: list the modules in the order they should be installed.
pub trait HandlerModule {
    /// Register this module's handlers and behaviors.
    fn register(&self, registry: &mut BindingRegistry) -> Result<()>;
}

impl<F> HandlerModule for F
where
    F: Fn(&mut BindingRegistry) -> Result<()>,
{
    fn register(&self, registry: &mut BindingRegistry) -> Result<()> {
        self(registry)
    }
}

/// Registry of handler, behavior and notification bindings.
#[derive(Default)]
pub struct BindingRegistry {
    /// Handlers by request/response pair.
    handlers: HashMap<BindingKey, HandlerEntry>,
    /// Handler keys in registration order (for schema output).
    handler_order: Vec<BindingKey>,
    /// Behaviors in registration order.
    behaviors: Vec<BehaviorEntry>,
    /// Notification handlers by notification type.
    notifications: HashMap<TypeId, NotificationEntry>,
    /// Notification types in registration order (for schema output).
    notification_order: Vec<TypeId>,
}

impl BindingRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for request type `R`.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::AmbiguousHandlerFound`] if `R` already has a
    /// handler. The existing binding is kept.
    pub fn register_handler<R, H>(&mut self, handler: H) -> Result<()>
    where
        R: Request,
        H: RequestHandler<R>,
    {
        let key = BindingKey::of::<R>();
        if self.handlers.contains_key(&key) {
            return Err(MediatorError::AmbiguousHandlerFound {
                request: key.request_name(),
                response: key.response_name(),
            });
        }

        let handler: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.handlers.insert(
            key,
            HandlerEntry {
                binding: Box::new(handler),
                name: short_type_name::<H>(),
            },
        );
        self.handler_order.push(key);
        tracing::trace!("Registered handler for {}", key);
        Ok(())
    }

    /// Register a closure as the handler for request type `R`.
    ///
    /// # Errors
    ///
    /// Same as [`register_handler`](Self::register_handler).
    pub fn register_handler_fn<R, F, Fut>(&mut self, handler: F) -> Result<()>
    where
        R: Request,
        F: Fn(&R, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R::Response>> + Send + 'static,
    {
        self.register_handler::<R, _>(FnHandler::new(handler))
    }

    /// Register a generic behavior applying to every request type.
    pub fn register_behavior<B: Behavior>(&mut self, behavior: B) {
        self.push_shared(Arc::new(behavior), None, short_type_name::<B>());
    }

    /// Register a generic behavior applying to the request types accepted by
    /// `predicate`.
    pub fn register_behavior_when<P, B>(&mut self, predicate: P, behavior: B)
    where
        P: Fn(&BindingKey) -> bool + Send + Sync + 'static,
        B: Behavior,
    {
        self.push_shared(
            Arc::new(behavior),
            Some(Box::new(predicate)),
            short_type_name::<B>(),
        );
    }

    fn push_shared(
        &mut self,
        behavior: Arc<dyn Behavior>,
        applies: Option<BehaviorPredicate>,
        name: &'static str,
    ) {
        tracing::trace!("Registered behavior {} at position {}", name, self.behaviors.len());
        self.behaviors.push(BehaviorEntry::Shared {
            behavior,
            applies,
            name,
        });
    }

    /// Register a behavior bound to request type `R` only.
    pub fn register_request_behavior<R, B>(&mut self, behavior: B)
    where
        R: Request,
        B: PipelineBehavior<R>,
    {
        let behavior: Arc<dyn PipelineBehavior<R>> = Arc::new(behavior);
        let name = short_type_name::<B>();
        tracing::trace!("Registered behavior {} at position {}", name, self.behaviors.len());
        self.behaviors.push(BehaviorEntry::Typed {
            key: BindingKey::of::<R>(),
            binding: Box::new(behavior),
            name,
        });
    }

    /// Register a handler for notification type `N`.
    ///
    /// Handlers run in registration order.
    pub fn register_notification_handler<N, H>(&mut self, handler: H)
    where
        N: Notification,
        H: NotificationHandler<N>,
    {
        let handler: Arc<dyn NotificationHandler<N>> = Arc::new(handler);
        let type_id = TypeId::of::<N>();

        if !self.notifications.contains_key(&type_id) {
            self.notification_order.push(type_id);
        }
        let entry = self
            .notifications
            .entry(type_id)
            .or_insert_with(|| NotificationEntry {
                name: short_type_name::<N>(),
                handlers: Vec::new(),
            });
        entry.handlers.push(Box::new(handler));
        tracing::trace!(
            "Registered notification handler #{} for {}",
            entry.handlers.len(),
            entry.name
        );
    }

    /// Register a closure as a handler for notification type `N`.
    pub fn register_notification_fn<N, F, Fut>(&mut self, handler: F)
    where
        N: Notification,
        F: Fn(&N, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.register_notification_handler::<N, _>(FnNotificationHandler::new(handler));
    }

    /// Install a module's registrations.
    ///
    /// # Errors
    ///
    /// Propagates the first registration error raised by the module.
    pub fn install<M: HandlerModule + ?Sized>(&mut self, module: &M) -> Result<()> {
        module.register(self)
    }

    /// Resolve the handler for request type `R`.
    ///
    /// # Errors
    ///
    /// Returns [`MediatorError::NoHandlerFound`] if `R` has no handler.
    pub fn resolve_handler<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>> {
        let key = BindingKey::of::<R>();
        self.handlers
            .get(&key)
            .and_then(|entry| entry.binding.downcast_ref::<Arc<dyn RequestHandler<R>>>())
            .cloned()
            .ok_or(MediatorError::NoHandlerFound {
                request: key.request_name(),
                response: key.response_name(),
            })
    }

    /// Resolve the behaviors applying to request type `R`, in execution
    /// order (outermost first).
    pub fn resolve_behaviors<R: Request>(&self) -> Vec<ResolvedBehavior<R>> {
        let key = BindingKey::of::<R>();
        self.behaviors
            .iter()
            .filter_map(|entry| match entry {
                BehaviorEntry::Shared {
                    behavior, applies, ..
                } => match applies {
                    Some(predicate) if !predicate(&key) => None,
                    _ => Some(ResolvedBehavior::Shared(behavior.clone())),
                },
                BehaviorEntry::Typed {
                    key: bound, binding, ..
                } if *bound == key => binding
                    .downcast_ref::<Arc<dyn PipelineBehavior<R>>>()
                    .cloned()
                    .map(ResolvedBehavior::Typed),
                BehaviorEntry::Typed { .. } => None,
            })
            .collect()
    }

    /// Resolve the handlers for notification type `N`, in registration order.
    ///
    /// An unknown notification type resolves to an empty list.
    pub fn resolve_notification_handlers<N: Notification>(
        &self,
    ) -> Vec<Arc<dyn NotificationHandler<N>>> {
        self.notifications
            .get(&TypeId::of::<N>())
            .map(|entry| {
                entry
                    .handlers
                    .iter()
                    .filter_map(|binding| binding.downcast_ref::<Arc<dyn NotificationHandler<N>>>())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether request type `R` has a handler.
    pub fn has_handler<R: Request>(&self) -> bool {
        self.handlers.contains_key(&BindingKey::of::<R>())
    }

    /// Number of registered request handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of registered behaviors.
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Number of registered notification handlers across all types.
    pub fn notification_handler_count(&self) -> usize {
        self.notifications.values().map(|e| e.handlers.len()).sum()
    }

    /// Build a [`RegistrySchema`] describing every binding.
    pub fn describe(&self) -> RegistrySchema {
        let mut schema = RegistrySchema::new();

        for key in &self.handler_order {
            if let Some(entry) = self.handlers.get(key) {
                schema.add_handler(key.request_name(), key.response_name(), entry.name);
            }
        }

        for entry in &self.behaviors {
            match entry {
                BehaviorEntry::Shared { applies, name, .. } => {
                    let scope = if applies.is_some() {
                        BehaviorScope::Conditional
                    } else {
                        BehaviorScope::All
                    };
                    schema.add_behavior(name, scope);
                }
                BehaviorEntry::Typed { key, name, .. } => {
                    schema.add_behavior(
                        name,
                        BehaviorScope::Request {
                            request: key.request_name(),
                            response: key.response_name(),
                        },
                    );
                }
            }
        }

        for type_id in &self.notification_order {
            if let Some(entry) = self.notifications.get(type_id) {
                schema.add_notification(entry.name, entry.handlers.len());
            }
        }

        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{BoxFuture, Next, Outcome};
    use crate::request::RequestView;

    #[derive(Debug)]
    struct Ping;

    impl Request for Ping {
        type Response = String;
    }

    #[derive(Debug)]
    struct Count;

    impl Request for Count {
        type Response = usize;
    }

    #[derive(Debug)]
    struct Saved;

    impl Notification for Saved {}

    #[derive(Debug)]
    struct Unknown;

    impl Notification for Unknown {}

    struct Passthrough;

    impl Behavior for Passthrough {
        fn handle<'a>(
            &'a self,
            _request: &'a dyn RequestView,
            _cancel: &'a CancellationToken,
            next: Next<'a, Outcome>,
        ) -> BoxFuture<'a, Result<Outcome>> {
            next.run()
        }
    }

    struct PingOnly;

    impl PipelineBehavior<Ping> for PingOnly {
        fn handle<'a>(
            &'a self,
            _request: &'a Ping,
            _cancel: &'a CancellationToken,
            next: Next<'a, String>,
        ) -> BoxFuture<'a, Result<String>> {
            next.run()
        }
    }

    fn pong_registry() -> BindingRegistry {
        let mut registry = BindingRegistry::new();
        registry
            .register_handler_fn(|_: &Ping, _cancel| async { Ok("pong".to_string()) })
            .unwrap();
        registry
    }

    #[test]
    fn test_register_handler() {
        let registry = pong_registry();

        assert!(registry.has_handler::<Ping>());
        assert!(!registry.has_handler::<Count>());
        assert_eq!(registry.handler_count(), 1);
    }

    #[tokio::test]
    async fn test_resolve_handler() {
        let registry = pong_registry();
        let handler = registry.resolve_handler::<Ping>().unwrap();

        let cancel = CancellationToken::new();
        assert_eq!(handler.handle(&Ping, &cancel).await.unwrap(), "pong");
    }

    #[test]
    fn test_resolve_missing_handler() {
        let registry = pong_registry();

        let err = registry.resolve_handler::<Count>().err().unwrap();
        assert!(matches!(
            err,
            MediatorError::NoHandlerFound {
                request: "Count",
                response: "usize"
            }
        ));
    }

    #[test]
    fn test_duplicate_handler_rejected() {
        let mut registry = pong_registry();

        let err = registry
            .register_handler_fn(|_: &Ping, _cancel| async { Ok("second".to_string()) })
            .unwrap_err();

        assert!(matches!(err, MediatorError::AmbiguousHandlerFound { .. }));
        assert_eq!(registry.handler_count(), 1);
    }

    #[test]
    fn test_resolve_behaviors_filters_by_scope() {
        let mut registry = pong_registry();
        registry.register_behavior(Passthrough);
        registry.register_request_behavior::<Ping, _>(PingOnly);
        registry.register_behavior_when(|key: &BindingKey| key.is::<Count>(), Passthrough);

        let ping = registry.resolve_behaviors::<Ping>();
        assert_eq!(ping.len(), 2);
        assert!(matches!(ping[0], ResolvedBehavior::Shared(_)));
        assert!(matches!(ping[1], ResolvedBehavior::Typed(_)));

        let count = registry.resolve_behaviors::<Count>();
        assert_eq!(count.len(), 2);
        assert!(count.iter().all(|b| matches!(b, ResolvedBehavior::Shared(_))));
    }

    #[test]
    fn test_notification_handlers_in_order() {
        let mut registry = BindingRegistry::new();
        registry.register_notification_fn(|_: &Saved, _cancel| async { Ok(()) });
        registry.register_notification_fn(|_: &Saved, _cancel| async { Ok(()) });

        assert_eq!(registry.resolve_notification_handlers::<Saved>().len(), 2);
        assert!(registry.resolve_notification_handlers::<Unknown>().is_empty());
        assert_eq!(registry.notification_handler_count(), 2);
    }

    #[test]
    fn test_install_module() {
        fn items(registry: &mut BindingRegistry) -> Result<()> {
            registry.register_handler_fn(|_: &Count, _cancel| async { Ok(3) })?;
            registry.register_notification_fn(|_: &Saved, _cancel| async { Ok(()) });
            Ok(())
        }

        let mut registry = pong_registry();
        registry.install(&items).unwrap();

        assert!(registry.has_handler::<Count>());
        assert!(registry.install(&items).is_err());
    }

    #[test]
    fn test_describe() {
        let mut registry = pong_registry();
        registry
            .register_handler_fn(|_: &Count, _cancel| async { Ok(0) })
            .unwrap();
        registry.register_behavior(Passthrough);
        registry.register_request_behavior::<Ping, _>(PingOnly);
        registry.register_notification_fn(|_: &Saved, _cancel| async { Ok(()) });

        let schema = registry.describe();

        assert_eq!(schema.handlers.len(), 2);
        assert_eq!(schema.handlers[0].request, "Ping");
        assert_eq!(schema.handlers[1].request, "Count");
        assert_eq!(schema.behaviors[0].name, "Passthrough");
        assert_eq!(schema.behaviors[0].scope, BehaviorScope::All);
        assert_eq!(
            schema.behaviors[1].scope,
            BehaviorScope::Request {
                request: "Ping",
                response: "String"
            }
        );
        assert_eq!(schema.get_notification("Saved").unwrap().handlers, 1);
    }
}
