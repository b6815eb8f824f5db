//! Collaborator capabilities consumed by the standard behaviors.
//!
//! Behaviors take these as constructor arguments instead of reaching for
//! globals, so tests can swap in fakes.

use std::time::Instant;

/// Identity of the principal on whose behalf a request runs.
pub trait CurrentUser: Send + Sync + 'static {
    /// Principal name, or `None` for an anonymous caller.
    fn username(&self) -> Option<&str>;

    /// Roles held by the principal.
    fn roles(&self) -> &[String];

    /// Whether the principal holds `role`.
    fn is_in_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}

/// An unauthenticated caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CurrentUser for Anonymous {
    fn username(&self) -> Option<&str> {
        None
    }

    fn roles(&self) -> &[String] {
        &[]
    }
}

/// A fixed principal.
#[derive(Debug, Clone, Default)]
pub struct StaticUser {
    username: Option<String>,
    roles: Vec<String>,
}

impl StaticUser {
    /// Create a principal with the given name and no roles.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            roles: Vec::new(),
        }
    }

    /// Add a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

impl CurrentUser for StaticUser {
    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// Monotonic time source used for request timing.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// The system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous() {
        assert!(Anonymous.username().is_none());
        assert!(Anonymous.roles().is_empty());
        assert!(!Anonymous.is_in_role("Administrator"));
    }

    #[test]
    fn test_static_user_roles() {
        let user = StaticUser::new("alice").with_role("Administrator").with_role("Auditor");

        assert_eq!(user.username(), Some("alice"));
        assert!(user.is_in_role("Auditor"));
        assert!(!user.is_in_role("auditor"));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
