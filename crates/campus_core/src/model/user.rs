//! Authenticated user identity as seen by the core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity handed over by the auth collaborator.
///
/// The core reads `uid` for storage keys, `display_name` for the default
/// title and `is_anonymous` for sign-out warnings; the rest is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

impl UserIdentity {
    /// Identity of a signed-in account.
    pub fn account(uid: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name,
            photo_url: None,
            is_anonymous: false,
        }
    }

    /// Anonymous identity with a freshly generated uid.
    ///
    /// Used for device-local sessions before any provider sign-in.
    pub fn local_anonymous() -> Self {
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            display_name: None,
            photo_url: None,
            is_anonymous: true,
        }
    }
}
