//! ResolveStatusHandler - Query handler computing a visitor's verification status.

use crate::application::StatusStore;
use crate::domain::foundation::{UserId, VisitorId};
use crate::domain::verification::{VerificationError, VerificationStatus};

/// Query for the current verification status of a request.
#[derive(Debug, Clone)]
pub struct ResolveStatusQuery {
    pub visitor: VisitorId,
    pub user: Option<UserId>,
}

/// Which tier produced the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// A settled status already cached in the session.
    Session,
    /// The durable record, now back-filled into the session.
    Profile,
    /// Nothing on record.
    Default,
}

/// Result of status resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveStatusResult {
    pub status: VerificationStatus,
    pub source: StatusSource,
}

/// Resolves the verification status for a request, first match wins:
///
/// 1. A settled status in the session is returned as is.
/// 2. A durable `verified` record for the customer is copied into the
///    session and `Verified` is returned.
/// 3. Otherwise `Unverified`.
///
/// Never calls the identity provider. Once step 1 or 2 has matched, repeat
/// calls for the same session are answered from the session tier alone.
#[derive(Clone)]
pub struct ResolveStatusHandler {
    store: StatusStore,
}

impl ResolveStatusHandler {
    pub fn new(store: StatusStore) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        query: ResolveStatusQuery,
    ) -> Result<ResolveStatusResult, VerificationError> {
        if let Some(status) = self.store.session_status(&query.visitor).await? {
            if status.is_settled() {
                return Ok(ResolveStatusResult {
                    status,
                    source: StatusSource::Session,
                });
            }
        }

        if let Some(user) = &query.user {
            if self.store.is_durably_verified(user).await? {
                self.store
                    .set_session_status(&query.visitor, VerificationStatus::Verified)
                    .await?;
                tracing::debug!(
                    visitor = %query.visitor,
                    user = %user,
                    "Back-filled session from durable verification record"
                );
                return Ok(ResolveStatusResult {
                    status: VerificationStatus::Verified,
                    source: StatusSource::Profile,
                });
            }
        }

        Ok(ResolveStatusResult {
            status: VerificationStatus::Unverified,
            source: StatusSource::Default,
        })
    }
}
