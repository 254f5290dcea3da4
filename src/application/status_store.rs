//! Status store - verification state over the session and profile tiers.
//!
//! Composes the ephemeral `SessionStore` and the durable `ProfileStore`
//! behind one typed interface. The session tier is the fast path consulted
//! on every request; the profile tier holds the affirmative fact for logged
//! in customers and back-fills the session on a miss.
//!
//! | Tier | Key | Value |
//! |------|-----|-------|
//! | session | `age_verification.status` | `VerificationStatus::as_str` |
//! | session | `age_verification.redirect` | relative path |
//! | session | `age_verification.state` | pending OIDC state token |
//! | session | `age_verification.user` | customer last seen on this session |
//! | profile | `age_verified` | `"true"` |
//! | profile | `age_verified_at` | RFC 3339 timestamp |

use std::sync::Arc;

use crate::domain::foundation::{Timestamp, UserId, VisitorId};
use crate::domain::verification::{
    AuthSession, RedirectTarget, StoreError, UserVerificationRecord, VerificationStatus,
};
use crate::ports::{ProfileStore, SessionStore};

pub const SESSION_STATUS_KEY: &str = "age_verification.status";
pub const SESSION_REDIRECT_KEY: &str = "age_verification.redirect";
pub const SESSION_STATE_KEY: &str = "age_verification.state";
pub const SESSION_USER_KEY: &str = "age_verification.user";
pub const PROFILE_VERIFIED_KEY: &str = "age_verified";
pub const PROFILE_VERIFIED_AT_KEY: &str = "age_verified_at";

const AFFIRMATIVE: &str = "true";

/// Typed access to verification state in both storage tiers.
#[derive(Clone)]
pub struct StatusStore {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl StatusStore {
    pub fn new(sessions: Arc<dyn SessionStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { sessions, profiles }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Session tier
    // ════════════════════════════════════════════════════════════════════════

    /// Cached status for this visitor, `None` when the session has no record.
    pub async fn session_status(
        &self,
        visitor: &VisitorId,
    ) -> Result<Option<VerificationStatus>, StoreError> {
        match self.sessions.get(visitor, SESSION_STATUS_KEY).await? {
            Some(raw) => raw
                .parse::<VerificationStatus>()
                .map(Some)
                .map_err(|e| StoreError::corrupt(SESSION_STATUS_KEY, e.to_string())),
            None => Ok(None),
        }
    }

    pub async fn set_session_status(
        &self,
        visitor: &VisitorId,
        status: VerificationStatus,
    ) -> Result<(), StoreError> {
        self.sessions
            .set(visitor, SESSION_STATUS_KEY, status.as_str())
            .await
    }

    pub async fn clear_session_status(&self, visitor: &VisitorId) -> Result<(), StoreError> {
        self.sessions.remove(visitor, SESSION_STATUS_KEY).await
    }

    /// Where the callback should return this visitor.
    ///
    /// A stored value that no longer validates is ignored rather than
    /// followed.
    pub async fn pending_redirect(
        &self,
        visitor: &VisitorId,
    ) -> Result<Option<RedirectTarget>, StoreError> {
        let raw = self.sessions.get(visitor, SESSION_REDIRECT_KEY).await?;
        Ok(raw.and_then(|path| match RedirectTarget::new(path) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::warn!(%visitor, error = %e, "Ignoring invalid pending redirect");
                None
            }
        }))
    }

    pub async fn set_pending_redirect(
        &self,
        visitor: &VisitorId,
        target: &RedirectTarget,
    ) -> Result<(), StoreError> {
        self.sessions
            .set(visitor, SESSION_REDIRECT_KEY, target.as_str())
            .await
    }

    /// State token of the authorization currently in flight, if any.
    pub async fn pending_state(&self, visitor: &VisitorId) -> Result<Option<String>, StoreError> {
        self.sessions.get(visitor, SESSION_STATE_KEY).await
    }

    pub async fn set_pending_state(
        &self,
        visitor: &VisitorId,
        state: &str,
    ) -> Result<(), StoreError> {
        self.sessions.set(visitor, SESSION_STATE_KEY, state).await
    }

    /// Consumes the pending state token so a callback cannot be replayed.
    pub async fn take_pending_state(
        &self,
        visitor: &VisitorId,
    ) -> Result<Option<String>, StoreError> {
        let state = self.sessions.get(visitor, SESSION_STATE_KEY).await?;
        if state.is_some() {
            self.sessions.remove(visitor, SESSION_STATE_KEY).await?;
        }
        Ok(state)
    }

    /// Customer bound to this session by its last API request.
    ///
    /// The callback is a browser navigation without credentials, so this is
    /// how it learns whom to persist the outcome for.
    pub async fn session_user(&self, visitor: &VisitorId) -> Result<Option<UserId>, StoreError> {
        let raw = self.sessions.get(visitor, SESSION_USER_KEY).await?;
        Ok(raw.and_then(|id| UserId::new(id).ok()))
    }

    /// Binds the session to `user`, or unbinds it when the request was
    /// anonymous. Writes only when the binding changes.
    pub async fn bind_session_user(
        &self,
        visitor: &VisitorId,
        user: Option<&UserId>,
    ) -> Result<(), StoreError> {
        let current = self.sessions.get(visitor, SESSION_USER_KEY).await?;
        match user {
            Some(user) if current.as_deref() != Some(user.as_str()) => {
                self.sessions
                    .set(visitor, SESSION_USER_KEY, user.as_str())
                    .await
            }
            None if current.is_some() => self.sessions.remove(visitor, SESSION_USER_KEY).await,
            _ => Ok(()),
        }
    }

    /// Snapshot of the visitor's session-tier record.
    pub async fn session(&self, visitor: &VisitorId) -> Result<AuthSession, StoreError> {
        Ok(AuthSession {
            status: self.session_status(visitor).await?.unwrap_or_default(),
            pending_redirect: self.pending_redirect(visitor).await?,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Profile tier
    // ════════════════════════════════════════════════════════════════════════

    pub async fn durable_record(&self, user: &UserId) -> Result<UserVerificationRecord, StoreError> {
        let verified = self
            .profiles
            .get(user, PROFILE_VERIFIED_KEY)
            .await?
            .map(|v| v == AFFIRMATIVE)
            .unwrap_or(false);

        if !verified {
            return Ok(UserVerificationRecord::absent());
        }

        let verified_at = match self.profiles.get(user, PROFILE_VERIFIED_AT_KEY).await? {
            Some(raw) => match Timestamp::parse_rfc3339(&raw) {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::warn!(user = %user, error = %e, "Unreadable verification timestamp");
                    None
                }
            },
            None => None,
        };

        Ok(UserVerificationRecord {
            verified,
            verified_at,
        })
    }

    pub async fn is_durably_verified(&self, user: &UserId) -> Result<bool, StoreError> {
        Ok(self.durable_record(user).await?.verified)
    }

    /// Persists the affirmative fact for a customer.
    ///
    /// Safe to repeat: the record is a single flag plus the latest timestamp.
    pub async fn persist_verified(&self, user: &UserId) -> Result<UserVerificationRecord, StoreError> {
        let record = UserVerificationRecord::verified_now();
        self.profiles
            .set(user, PROFILE_VERIFIED_KEY, AFFIRMATIVE)
            .await?;
        if let Some(at) = record.verified_at {
            self.profiles
                .set(user, PROFILE_VERIFIED_AT_KEY, &at.to_rfc3339())
                .await?;
        }
        Ok(record)
    }

    /// Deletes the durable record for a customer.
    pub async fn revoke(&self, user: &UserId) -> Result<(), StoreError> {
        self.profiles.remove(user, PROFILE_VERIFIED_KEY).await?;
        self.profiles.remove(user, PROFILE_VERIFIED_AT_KEY).await
    }
}
