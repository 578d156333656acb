//! Auth Provider Port - identity of the calling user.
//!
//! The core never authenticates; it only asks who the current owner is.

use async_trait::async_trait;

use crate::domain::foundation::{CoreError, OwnerId};

/// Port for resolving the authenticated owner of the current request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Returns the owner id of the current caller.
    async fn current_owner(&self) -> Result<OwnerId, CoreError>;
}
