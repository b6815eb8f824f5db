//! Standard cross-cutting behaviors.
//!
//! Each behavior is a generic [`Behavior`](crate::pipeline::Behavior) and
//! applies to every request it is registered for. A typical chain, outermost
//! first:
//!
//! ```text
//! Logging ─► UnhandledError ─► Authorization ─► Validation ─► Performance ─► handler
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use mediator_core::behaviors::{
//!     AuthorizationBehavior, LoggingBehavior, PerformanceBehavior, UnhandledErrorBehavior,
//!     ValidationBehavior,
//! };
//! use mediator_core::services::{CurrentUser, StaticUser, SystemClock};
//! use mediator_core::Mediator;
//!
//! let user: Arc<dyn CurrentUser> = Arc::new(StaticUser::new("alice"));
//! let clock = Arc::new(SystemClock);
//!
//! let mediator = Mediator::builder()
//!     .behavior(LoggingBehavior::new(user.clone(), clock.clone()))
//!     .behavior(UnhandledErrorBehavior)
//!     .behavior(AuthorizationBehavior::new(user.clone()))
//!     .behavior(ValidationBehavior::new())
//!     .behavior(PerformanceBehavior::new(user, clock))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(mediator.schema().behaviors.len(), 5);
//! ```

mod authorization;
mod logging;
mod performance;
mod unhandled;
mod validation;

pub use authorization::AuthorizationBehavior;
pub use logging::LoggingBehavior;
pub use performance::{PerformanceBehavior, PerformanceConfig, DEFAULT_SLOW_REQUEST_THRESHOLD};
pub use unhandled::UnhandledErrorBehavior;
pub use validation::ValidationBehavior;
