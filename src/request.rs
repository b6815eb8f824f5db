//! Request and notification contracts.
//!
//! A [`Request`] names its response type, so the response a caller gets back
//! from [`Mediator::send`](crate::Mediator::send) is fixed at compile time.
//! A [`Notification`] declares no response and may have any number of
//! handlers, including none.
//!
//! # Example
//!
//! ```
//! use mediator_core::{Access, Request};
//!
//! #[derive(Debug)]
//! struct DeleteItem {
//!     id: u64,
//! }
//!
//! impl Request for DeleteItem {
//!     type Response = ();
//!
//!     fn access(&self) -> Access {
//!         Access::AnyRole(&["Administrator"])
//!     }
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A typed input value bound to exactly one handler.
pub trait Request: fmt::Debug + Send + Sync + 'static {
    /// The value the handler produces for this request.
    type Response: Send + 'static;

    /// Access requirement checked by authorization behaviors.
    fn access(&self) -> Access {
        Access::Anonymous
    }
}

/// A typed event broadcast to zero or more independent handlers.
pub trait Notification: fmt::Debug + Send + Sync + 'static {}

/// Access requirement declared by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// No principal required.
    #[default]
    Anonymous,
    /// Any authenticated principal.
    Authenticated,
    /// An authenticated principal holding at least one of the roles.
    AnyRole(&'static [&'static str]),
}

/// Type-erased view of a request.
///
/// Generic behaviors apply to every request type and therefore see requests
/// only through this view.
pub trait RequestView: fmt::Debug + Send + Sync {
    /// Short name of the concrete request type.
    fn name(&self) -> &'static str;

    /// Access requirement of the request.
    fn access(&self) -> Access;

    /// `TypeId` of the concrete request type.
    fn request_type(&self) -> TypeId;

    /// The request as `Any`, for behaviors keyed by request type.
    fn as_any(&self) -> &dyn Any;
}

impl<R: Request> RequestView for R {
    fn name(&self) -> &'static str {
        short_type_name::<R>()
    }

    fn access(&self) -> Access {
        Request::access(self)
    }

    fn request_type(&self) -> TypeId {
        TypeId::of::<R>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Identity of a handler binding: a (request type, response type) pair.
///
/// Equality and hashing use the `TypeId`s only; the names are carried for
/// diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct BindingKey {
    request: TypeId,
    response: TypeId,
    request_name: &'static str,
    response_name: &'static str,
}

impl BindingKey {
    /// Key for request type `R` and its declared response.
    pub fn of<R: Request>() -> Self {
        Self {
            request: TypeId::of::<R>(),
            response: TypeId::of::<R::Response>(),
            request_name: short_type_name::<R>(),
            response_name: short_type_name::<R::Response>(),
        }
    }

    /// Whether this key belongs to request type `R`.
    pub fn is<R: Request>(&self) -> bool {
        self.request == TypeId::of::<R>() && self.response == TypeId::of::<R::Response>()
    }

    #[inline]
    pub fn request_type(&self) -> TypeId {
        self.request
    }

    #[inline]
    pub fn response_type(&self) -> TypeId {
        self.response
    }

    #[inline]
    pub fn request_name(&self) -> &'static str {
        self.request_name
    }

    #[inline]
    pub fn response_name(&self) -> &'static str {
        self.response_name
    }
}

impl PartialEq for BindingKey {
    fn eq(&self, other: &Self) -> bool {
        self.request == other.request && self.response == other.response
    }
}

impl Eq for BindingKey {}

impl Hash for BindingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.request.hash(state);
        self.response.hash(state);
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.request_name, self.response_name)
    }
}

/// Last path segment of a type name, generics stripped.
///
/// `alloc::vec::Vec<u8>` becomes `Vec`, `my_app::items::CreateItem` becomes
/// `CreateItem`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct Ping;

    impl Request for Ping {
        type Response = String;
    }

    #[derive(Debug)]
    struct Purge;

    impl Request for Purge {
        type Response = ();

        fn access(&self) -> Access {
            Access::AnyRole(&["Administrator"])
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Ping>(), "Ping");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
        assert_eq!(short_type_name::<u32>(), "u32");
        assert_eq!(short_type_name::<()>(), "()");
    }

    #[test]
    fn test_request_view() {
        let view: &dyn RequestView = &Purge;
        assert_eq!(view.name(), "Purge");
        assert_eq!(view.access(), Access::AnyRole(&["Administrator"]));
        assert_eq!(view.request_type(), TypeId::of::<Purge>());
        assert!(view.as_any().downcast_ref::<Purge>().is_some());

        let view: &dyn RequestView = &Ping;
        assert_eq!(view.access(), Access::Anonymous);
    }

    #[test]
    fn test_binding_key_identity() {
        let a = BindingKey::of::<Ping>();
        let b = BindingKey::of::<Ping>();
        let c = BindingKey::of::<Purge>();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is::<Ping>());
        assert!(!a.is::<Purge>());
        assert_eq!(a.to_string(), "Ping -> String");

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
