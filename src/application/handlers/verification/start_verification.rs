//! StartVerificationHandler - Command handler for the start transition.

use std::sync::Arc;

use url::Url;
use uuid::Uuid;

use crate::application::StatusStore;
use crate::domain::foundation::VisitorId;
use crate::domain::verification::{RedirectTarget, VerificationError};
use crate::ports::IdentityProviderFactory;

/// Command to begin age verification for a visitor.
#[derive(Debug, Clone)]
pub struct StartVerificationCommand {
    pub visitor: VisitorId,
    /// Checkout page to return to; the default checkout location if `None`.
    pub return_to: Option<RedirectTarget>,
}

/// Result of a successful start: where to send the browser.
#[derive(Debug, Clone)]
pub struct StartVerificationResult {
    pub authorization_url: Url,
    pub return_to: RedirectTarget,
}

/// Handler for the start transition.
///
/// Records where the visitor left off and a fresh state token in the
/// session, then hands back the provider's authorization URL. The session's
/// current status is left untouched until the callback completes.
pub struct StartVerificationHandler {
    store: StatusStore,
    providers: Arc<dyn IdentityProviderFactory>,
    default_return: RedirectTarget,
}

impl StartVerificationHandler {
    pub fn new(
        store: StatusStore,
        providers: Arc<dyn IdentityProviderFactory>,
        default_return: RedirectTarget,
    ) -> Self {
        Self {
            store,
            providers,
            default_return,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartVerificationCommand,
    ) -> Result<StartVerificationResult, VerificationError> {
        // 1. Configuration problems are fatal here; nothing is written
        let provider = self.providers.provider().map_err(|e| {
            tracing::error!(error = %e, "Age verification provider is not configured");
            e
        })?;

        // 2. Remember where to come back to
        let return_to = cmd.return_to.unwrap_or_else(|| self.default_return.clone());
        self.store
            .set_pending_redirect(&cmd.visitor, &return_to)
            .await?;

        // 3. Bind the authorization to this session
        let state = Uuid::new_v4().simple().to_string();
        self.store.set_pending_state(&cmd.visitor, &state).await?;

        tracing::info!(visitor = %cmd.visitor, return_to = %return_to, "Starting age verification");

        Ok(StartVerificationResult {
            authorization_url: provider.authorization_url(&state),
            return_to,
        })
    }
}
