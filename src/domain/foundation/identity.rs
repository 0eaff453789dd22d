//! Session identity and the storage namespace derived from it.

use std::fmt;

use super::UserId;

const GUEST_NAMESPACE: &str = "guest";

/// Who the current session belongs to.
///
/// Local storage keys are namespaced by this identity; only an
/// authenticated user is authoritative against the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    User(UserId),
    Guest,
}

impl Identity {
    /// Builds an identity from an optional raw user id; blank ids are guests.
    pub fn from_optional(user_id: Option<&str>) -> Self {
        user_id
            .and_then(|id| UserId::new(id).ok())
            .map(Identity::User)
            .unwrap_or(Identity::Guest)
    }

    /// Namespace segment used in storage keys.
    pub fn namespace(&self) -> &str {
        match self {
            Identity::User(id) => id.as_str(),
            Identity::Guest => GUEST_NAMESPACE,
        }
    }

    /// Returns the user id when authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Identity::User(id) => Some(id),
            Identity::Guest => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}
