//! Session-tier and durable-tier verification records.

use serde::{Deserialize, Serialize};

use super::{RedirectTarget, VerificationStatus};
use crate::domain::foundation::Timestamp;

/// Verification state held in one visitor's browsing session.
///
/// There is no explicit "create": an absent session reads as the default,
/// an `Unverified` session with nothing pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub status: VerificationStatus,
    pub pending_redirect: Option<RedirectTarget>,
}

impl AuthSession {
    /// Returns true if no verification has touched this session yet.
    pub fn is_pristine(&self) -> bool {
        self.status == VerificationStatus::Unverified && self.pending_redirect.is_none()
    }
}

/// Durable verification fact for an authenticated customer.
///
/// Only an affirmative outcome is ever stored. `Denied` and `Error` live in
/// the session tier alone, so a denied customer is asked again next session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVerificationRecord {
    pub verified: bool,
    pub verified_at: Option<Timestamp>,
}

impl UserVerificationRecord {
    /// Record for a customer who just passed verification.
    pub fn verified_now() -> Self {
        Self {
            verified: true,
            verified_at: Some(Timestamp::now()),
        }
    }

    /// Record for a customer with nothing on file.
    pub fn absent() -> Self {
        Self {
            verified: false,
            verified_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_pristine_and_unverified() {
        let session = AuthSession::default();
        assert!(session.is_pristine());
        assert_eq!(session.status, VerificationStatus::Unverified);
    }

    #[test]
    fn session_with_pending_redirect_is_not_pristine() {
        let session = AuthSession {
            status: VerificationStatus::Unverified,
            pending_redirect: Some(RedirectTarget::new("/checkout").unwrap()),
        };
        assert!(!session.is_pristine());
    }

    #[test]
    fn verified_now_stamps_the_record() {
        let record = UserVerificationRecord::verified_now();
        assert!(record.verified);
        assert!(record.verified_at.is_some());
    }

    #[test]
    fn absent_record_is_not_verified() {
        assert!(!UserVerificationRecord::absent().verified);
    }
}
