//! Access checks against the current principal.

use std::future::ready;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{MediatorError, Result};
use crate::pipeline::{Behavior, BoxFuture, Next, Outcome};
use crate::request::{Access, RequestView};
use crate::services::CurrentUser;

/// Enforces [`Request::access`](crate::Request::access).
///
/// - [`Access::Anonymous`] passes through.
/// - [`Access::Authenticated`] fails with [`MediatorError::Unauthorized`]
///   when there is no principal.
/// - [`Access::AnyRole`] additionally fails with [`MediatorError::Forbidden`]
///   when the principal holds none of the roles. An empty role list only
///   requires authentication.
pub struct AuthorizationBehavior {
    user: Arc<dyn CurrentUser>,
}

impl AuthorizationBehavior {
    pub fn new(user: Arc<dyn CurrentUser>) -> Self {
        Self { user }
    }

    fn check(&self, access: Access) -> Result<()> {
        let roles: &[&str] = match access {
            Access::Anonymous => return Ok(()),
            Access::Authenticated => &[],
            Access::AnyRole(roles) => roles,
        };

        if self.user.username().is_none() {
            return Err(MediatorError::Unauthorized);
        }

        if roles.is_empty() || roles.iter().any(|role| self.user.is_in_role(role)) {
            Ok(())
        } else {
            Err(MediatorError::Forbidden)
        }
    }
}

impl Behavior for AuthorizationBehavior {
    fn handle<'a>(
        &'a self,
        request: &'a dyn RequestView,
        _cancel: &'a CancellationToken,
        next: Next<'a, Outcome>,
    ) -> BoxFuture<'a, Result<Outcome>> {
        match self.check(request.access()) {
            Ok(()) => next.run(),
            Err(e) => {
                tracing::debug!("Rejected {}: {}", request.name(), e);
                Box::pin(ready(Err(e)))
            }
        }
    }
}
