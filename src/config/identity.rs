//! Signed-in identity configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::Identity;

/// Who the local data belongs to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Authenticated user id; absent means guest
    pub user_id: Option<String>,
}

impl IdentityConfig {
    pub fn identity(&self) -> Identity {
        Identity::from_optional(self.user_id.as_deref())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.as_ref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ValidationError::BlankUserId);
        }
        Ok(())
    }
}
