//! Registry schema for startup diagnostics.
//!
//! A [`RegistrySchema`] lists every binding held by a frozen registry, in
//! registration order, so an application can log or expose what its mediator
//! will dispatch.
//!
//! # Example
//!
//! ```
//! use mediator_core::schema::{BehaviorScope, RegistrySchema};
//!
//! let mut schema = RegistrySchema::new();
//! schema.add_handler("CreateItem", "ItemDto", "CreateItemHandler");
//! schema.add_behavior("LoggingBehavior", BehaviorScope::All);
//! schema.add_notification("ItemCreated", 2);
//!
//! let json = schema.to_json().unwrap();
//! assert!(json.contains("CreateItem"));
//! ```

use serde::Serialize;

/// Which requests a behavior applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BehaviorScope {
    /// Every request.
    All,
    /// Requests accepted by a registration-time predicate.
    Conditional,
    /// A single request/response pair.
    Request {
        request: &'static str,
        response: &'static str,
    },
}

/// A registered request handler.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerSchema {
    /// Short name of the request type.
    pub request: &'static str,
    /// Short name of the response type.
    pub response: &'static str,
    /// Short name of the handler type.
    pub handler: &'static str,
}

/// A registered behavior.
#[derive(Debug, Clone, Serialize)]
pub struct BehaviorSchema {
    /// Position in the pipeline, outermost first.
    pub position: usize,
    /// Short name of the behavior type.
    pub name: &'static str,
    /// Requests the behavior applies to.
    pub scope: BehaviorScope,
}

/// Handlers registered for one notification type.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationSchema {
    /// Short name of the notification type.
    pub notification: &'static str,
    /// Number of handlers, invoked in registration order.
    pub handlers: usize,
}

/// Schema describing every binding in a registry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrySchema {
    /// Request handlers in registration order.
    pub handlers: Vec<HandlerSchema>,
    /// Behaviors in execution order.
    pub behaviors: Vec<BehaviorSchema>,
    /// Notification types in registration order.
    pub notifications: Vec<NotificationSchema>,
}

impl RegistrySchema {
    /// Create a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request handler.
    pub fn add_handler(
        &mut self,
        request: &'static str,
        response: &'static str,
        handler: &'static str,
    ) {
        self.handlers.push(HandlerSchema {
            request,
            response,
            handler,
        });
    }

    /// Add a behavior at the next pipeline position.
    pub fn add_behavior(&mut self, name: &'static str, scope: BehaviorScope) {
        let position = self.behaviors.len();
        self.behaviors.push(BehaviorSchema {
            position,
            name,
            scope,
        });
    }

    /// Add a notification type with its handler count.
    pub fn add_notification(&mut self, notification: &'static str, handlers: usize) {
        self.notifications.push(NotificationSchema {
            notification,
            handlers,
        });
    }

    /// Get a handler by request name.
    pub fn get_handler(&self, request: &str) -> Option<&HandlerSchema> {
        self.handlers.iter().find(|h| h.request == request)
    }

    /// Get a notification by name.
    pub fn get_notification(&self, notification: &str) -> Option<&NotificationSchema> {
        self.notifications
            .iter()
            .find(|n| n.notification == notification)
    }

    /// Check if schema is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.behaviors.is_empty() && self.notifications.is_empty()
    }

    /// Serialize the schema as a single-line JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
