//! # mediator-core
//!
//! In-process request/response mediator for application code.
//!
//! Callers hand a typed request to a [`Mediator`]; the mediator finds the one
//! handler bound to that request type, runs it inside an ordered chain of
//! pipeline behaviors, and returns the typed response. Notifications are
//! broadcast to every handler registered for their type.
//!
//! ## Architecture
//!
//! - **Registry** ([`BindingRegistry`]): filled once at startup, then frozen
//! - **Pipeline** ([`pipeline`]): behaviors folded around the handler, first
//!   registered runs outermost
//! - **Behaviors** ([`behaviors`]): authorization, validation, logging,
//!   performance and error logging
//!
//! The core spawns nothing. Every call runs on the caller's task.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use mediator_core::behaviors::{LoggingBehavior, ValidationBehavior};
//! use mediator_core::services::{Anonymous, SystemClock};
//! use mediator_core::validation::ValidationFailure;
//! use mediator_core::{CancellationToken, Mediator, MediatorError, Request};
//!
//! #[derive(Debug)]
//! struct CreateList {
//!     title: String,
//! }
//!
//! impl Request for CreateList {
//!     type Response = u64;
//! }
//!
//! #[tokio::main]
//! async fn main() -> mediator_core::Result<()> {
//!     let validation = ValidationBehavior::new().rules(|req: &CreateList| {
//!         if req.title.is_empty() {
//!             vec![ValidationFailure::new("title", "Title is required.")]
//!         } else {
//!             Vec::new()
//!         }
//!     });
//!
//!     let mediator = Mediator::builder()
//!         .behavior(LoggingBehavior::new(Arc::new(Anonymous), Arc::new(SystemClock)))
//!         .behavior(validation)
//!         .handle(|_: &CreateList, _cancel| async { Ok(1) })
//!         .build()?;
//!
//!     let cancel = CancellationToken::new();
//!     let id = mediator.send(CreateList { title: "Groceries".into() }, &cancel).await?;
//!     assert_eq!(id, 1);
//!
//!     let err = mediator.send(CreateList { title: String::new() }, &cancel).await;
//!     assert!(matches!(err, Err(MediatorError::ValidationFailed(_))));
//!     Ok(())
//! }
//! ```

pub mod behaviors;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod request;
pub mod schema;
pub mod services;
pub mod validation;

mod mediator;

pub use error::{ErrorKind, MediatorError, Result};
pub use handler::{BindingRegistry, HandlerModule, NotificationHandler, RequestHandler};
pub use mediator::{Mediator, MediatorBuilder};
pub use pipeline::{Behavior, PipelineBehavior};
pub use request::{Access, BindingKey, Notification, Request, RequestView};
pub use tokio_util::sync::CancellationToken;
