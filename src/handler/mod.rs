//! Handler module - handler capabilities and the binding registry.
//!
//! Provides:
//! - [`RequestHandler`] / [`NotificationHandler`] - the capabilities handlers implement
//! - [`FnHandler`] / [`FnNotificationHandler`] - closure adapters
//! - [`BindingRegistry`] - maps request and notification types to bindings
//! - [`HandlerModule`] - ordered bulk registration
//!
//! # Example
//!
//! ```
//! use mediator_core::handler::BindingRegistry;
//! use mediator_core::{Notification, Request};
//!
//! #[derive(Debug)]
//! struct Add(i32, i32);
//!
//! impl Request for Add {
//!     type Response = i32;
//! }
//!
//! #[derive(Debug)]
//! struct Added(i32);
//!
//! impl Notification for Added {}
//!
//! let mut registry = BindingRegistry::new();
//!
//! // One handler per request type
//! registry
//!     .register_handler_fn(|req: &Add, _cancel| {
//!         let sum = req.0 + req.1;
//!         async move { Ok(sum) }
//!     })
//!     .unwrap();
//!
//! // Any number of notification handlers
//! registry.register_notification_fn(|_: &Added, _cancel| async { Ok(()) });
//! registry.register_notification_fn(|_: &Added, _cancel| async { Ok(()) });
//! ```

mod registry;
mod typed;

pub use registry::{BehaviorPredicate, BindingRegistry, HandlerModule};
pub use typed::{FnHandler, FnNotificationHandler, NotificationHandler, RequestHandler};
