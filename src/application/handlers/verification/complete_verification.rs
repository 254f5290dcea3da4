//! CompleteVerificationHandler - Command handler for the provider callback.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::application::StatusStore;
use crate::domain::foundation::{StateMachine, VisitorId};
use crate::domain::verification::{
    claim, ProviderError, RedirectTarget, StoreError, VerificationError, VerificationStatus,
};
use crate::ports::{IdentityProvider, IdentityProviderFactory};

/// Command carrying the provider's redirect back to the gate.
#[derive(Debug, Clone)]
pub struct CompleteVerificationCommand {
    pub visitor: VisitorId,
    pub code: Option<String>,
    pub state: Option<String>,
    /// `error` parameter set by the provider (e.g. the visitor cancelled).
    pub provider_error: Option<String>,
}

/// Outcome of the callback transition.
#[derive(Debug, Clone)]
pub struct CompleteVerificationResult {
    pub status: VerificationStatus,
    /// True if the durable record was written for the customer.
    pub persisted: bool,
    pub redirect_to: RedirectTarget,
}

/// Handler for the callback transition.
///
/// Every provider failure is converted into `VerificationStatus::Error`
/// here; only storage failures escape as errors. The session always ends
/// in exactly one of `Verified`, `Denied` or `Error`. A `Verified` outcome
/// is persisted for the customer the session is bound to, if any.
pub struct CompleteVerificationHandler {
    store: StatusStore,
    providers: Arc<dyn IdentityProviderFactory>,
    claim: String,
    default_return: RedirectTarget,
}

impl CompleteVerificationHandler {
    pub fn new(
        store: StatusStore,
        providers: Arc<dyn IdentityProviderFactory>,
        claim: impl Into<String>,
        default_return: RedirectTarget,
    ) -> Self {
        Self {
            store,
            providers,
            claim: claim.into(),
            default_return,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteVerificationCommand,
    ) -> Result<CompleteVerificationResult, VerificationError> {
        // 1. The state token is single use, whatever happens next
        let expected_state = self.store.take_pending_state(&cmd.visitor).await?;

        // 2. Exchange and claim retrieval, folded into a status
        let outcome = match self.providers.provider() {
            Err(e) => {
                tracing::error!(visitor = %cmd.visitor, error = %e, "Callback received but provider is not configured");
                VerificationStatus::Error
            }
            Ok(provider) => match self
                .exchange(provider.as_ref(), &cmd, expected_state.as_deref())
                .await
            {
                Ok(true) => VerificationStatus::Verified,
                Ok(false) => VerificationStatus::Denied,
                Err(e) => {
                    tracing::warn!(visitor = %cmd.visitor, error = %e, "Age verification exchange failed");
                    VerificationStatus::Error
                }
            },
        };

        // 3. Record the outcome for this session
        let current = match self.store.session_status(&cmd.visitor).await {
            Ok(status) => status.unwrap_or_default(),
            Err(StoreError::Corrupt { .. }) => VerificationStatus::Unverified,
            Err(e) => return Err(e.into()),
        };
        let status = current.transition_to(outcome)?;
        self.store.set_session_status(&cmd.visitor, status).await?;

        // 4. Remember affirmative outcomes for logged-in customers
        let mut persisted = false;
        if status == VerificationStatus::Verified {
            if let Some(user) = self.store.session_user(&cmd.visitor).await? {
                match self.store.persist_verified(&user).await {
                    Ok(_) => persisted = true,
                    Err(e) => {
                        // The session still carries Verified; the customer is
                        // only asked again in a later session.
                        tracing::error!(user = %user, error = %e, "Failed to persist age verification");
                    }
                }
            }
        }

        tracing::info!(
            visitor = %cmd.visitor,
            status = %status,
            persisted,
            "Age verification callback completed"
        );

        // 5. Back to where the visitor left off
        let redirect_to = self
            .store
            .pending_redirect(&cmd.visitor)
            .await?
            .unwrap_or_else(|| self.default_return.clone());

        Ok(CompleteVerificationResult {
            status,
            persisted,
            redirect_to,
        })
    }

    /// Runs the code exchange and returns whether the claim is affirmative.
    async fn exchange(
        &self,
        provider: &dyn IdentityProvider,
        cmd: &CompleteVerificationCommand,
        expected_state: Option<&str>,
    ) -> Result<bool, ProviderError> {
        if let Some(error) = &cmd.provider_error {
            return Err(ProviderError::Returned(error.clone()));
        }

        let code = cmd
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(ProviderError::MissingCode)?;

        let state = match (cmd.state.as_deref(), expected_state) {
            (Some(received), Some(expected))
                if bool::from(received.as_bytes().ct_eq(expected.as_bytes())) =>
            {
                received
            }
            _ => return Err(ProviderError::StateMismatch),
        };

        let session = provider.authenticate(code, state).await?;
        let value = provider.request_user_info(&session, &self.claim).await?;

        Ok(claim::is_affirmative(value.as_ref()))
    }
}
