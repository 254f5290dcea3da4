//! RevokeVerificationHandler - Command handler invalidating a customer's verification.

use crate::application::StatusStore;
use crate::domain::foundation::{UserId, VisitorId};
use crate::domain::verification::VerificationError;

/// Command to drop a customer's durable verification.
#[derive(Debug, Clone)]
pub struct RevokeVerificationCommand {
    pub visitor: VisitorId,
    pub user: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeVerificationResult {
    /// Whether a durable record existed before revocation.
    pub had_record: bool,
}

/// Handler for revocation.
///
/// Removes the durable record and the current session's cached status, so
/// the next checkout requires a fresh verification. Other sessions of the
/// same customer keep their cached status until they expire.
pub struct RevokeVerificationHandler {
    store: StatusStore,
}

impl RevokeVerificationHandler {
    pub fn new(store: StatusStore) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: RevokeVerificationCommand,
    ) -> Result<RevokeVerificationResult, VerificationError> {
        let had_record = self.store.is_durably_verified(&cmd.user).await?;

        self.store.revoke(&cmd.user).await?;
        self.store.clear_session_status(&cmd.visitor).await?;

        tracing::info!(user = %cmd.user, had_record, "Age verification revoked");

        Ok(RevokeVerificationResult { had_record })
    }
}
