//! Auth provider collaborator contract.
//!
//! The core never signs users in itself; it consumes the identity the
//! provider reports and asks it to sign out or delete the account.

use crate::model::user::UserIdentity;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no signed-in user")]
    NoCurrentUser,
    /// The provider wants a fresh sign-in before a sensitive operation.
    #[error("recent sign-in required")]
    RequiresRecentLogin,
    #[error("auth provider error: {0}")]
    Provider(String),
}

pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
    fn sign_out(&self) -> Result<(), AuthError>;
    fn delete_current_user(&self) -> Result<(), AuthError>;
}

/// Provider holding one identity in memory, for local sessions and tests.
#[derive(Debug, Default)]
pub struct LocalAuthProvider {
    user: Mutex<Option<UserIdentity>>,
}

impl LocalAuthProvider {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<UserIdentity>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthProvider for LocalAuthProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.slot().clone()
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.slot().take().map(|_| ()).ok_or(AuthError::NoCurrentUser)
    }

    fn delete_current_user(&self) -> Result<(), AuthError> {
        self.slot().take().map(|_| ()).ok_or(AuthError::NoCurrentUser)
    }
}
