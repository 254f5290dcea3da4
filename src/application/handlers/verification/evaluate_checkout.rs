//! EvaluateCheckoutHandler - Query handler enforcing the gate at checkout.

use crate::application::StatusStore;
use crate::domain::foundation::{UserId, VisitorId};
use crate::domain::verification::{CheckoutDecision, CheckoutGate, VerificationError, VerificationStatus};

use super::{ResolveStatusHandler, ResolveStatusQuery};

/// Query to evaluate the checkout gate for a request.
#[derive(Debug, Clone)]
pub struct EvaluateCheckoutQuery {
    pub visitor: VisitorId,
    pub user: Option<UserId>,
}

/// Gate evaluation together with the status it was based on.
#[derive(Debug, Clone)]
pub struct EvaluateCheckoutResult {
    pub status: VerificationStatus,
    pub decision: CheckoutDecision,
}

/// Handler for the checkout gate.
///
/// Binds the session to the requesting customer, resolves the status
/// (which may back-fill the session from the durable record) and evaluates
/// the gate.
pub struct EvaluateCheckoutHandler {
    store: StatusStore,
    resolver: ResolveStatusHandler,
    gate: CheckoutGate,
}

impl EvaluateCheckoutHandler {
    pub fn new(store: StatusStore, gate: CheckoutGate) -> Self {
        Self {
            resolver: ResolveStatusHandler::new(store.clone()),
            store,
            gate,
        }
    }

    pub async fn handle(
        &self,
        query: EvaluateCheckoutQuery,
    ) -> Result<EvaluateCheckoutResult, VerificationError> {
        self.store
            .bind_session_user(&query.visitor, query.user.as_ref())
            .await?;

        let resolved = self
            .resolver
            .handle(ResolveStatusQuery {
                visitor: query.visitor,
                user: query.user,
            })
            .await?;

        let decision = self.gate.evaluate(resolved.status);
        if !decision.is_allowed() {
            tracing::debug!(visitor = %query.visitor, status = %resolved.status, "Checkout blocked");
        }

        Ok(EvaluateCheckoutResult {
            status: resolved.status,
            decision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::profile_store::InMemoryProfileStore;
    use crate::adapters::session_store::InMemorySessionStore;
    use crate::domain::verification::{NoticeKind, NoticeMessages};
    use std::sync::Arc;

    fn setup() -> (EvaluateCheckoutHandler, StatusStore) {
        let store = StatusStore::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryProfileStore::new()),
        );
        let handler = EvaluateCheckoutHandler::new(
            store.clone(),
            CheckoutGate::new(NoticeMessages::default(), "/checkout/age-verification/start"),
        );
        (handler, store)
    }

    #[tokio::test]
    async fn fresh_visitor_is_blocked_with_prompt() {
        let (handler, _) = setup();

        let result = handler
            .handle(EvaluateCheckoutQuery {
                visitor: VisitorId::new(),
                user: None,
            })
            .await
            .unwrap();

        assert_eq!(result.status, VerificationStatus::Unverified);
        let notice = result.decision.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Prompt);
        assert!(notice.retry_link.is_some());
    }

    #[tokio::test]
    async fn durable_record_allows_checkout_without_any_flow() {
        let (handler, store) = setup();
        let user = UserId::new("customer-3").unwrap();
        store.persist_verified(&user).await.unwrap();

        let result = handler
            .handle(EvaluateCheckoutQuery {
                visitor: VisitorId::new(),
                user: Some(user),
            })
            .await
            .unwrap();

        assert!(result.decision.is_allowed());
    }

    #[tokio::test]
    async fn denied_session_is_blocked_without_link() {
        let (handler, store) = setup();
        let visitor = VisitorId::new();
        store
            .set_session_status(&visitor, VerificationStatus::Denied)
            .await
            .unwrap();

        let result = handler
            .handle(EvaluateCheckoutQuery {
                visitor,
                user: None,
            })
            .await
            .unwrap();

        let notice = result.decision.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Denied);
        assert!(notice.retry_link.is_none());
    }

    #[tokio::test]
    async fn customer_request_binds_session_to_customer() {
        let (handler, store) = setup();
        let visitor = VisitorId::new();
        let user = UserId::new("customer-4").unwrap();

        handler
            .handle(EvaluateCheckoutQuery {
                visitor,
                user: Some(user.clone()),
            })
            .await
            .unwrap();

        assert_eq!(store.session_user(&visitor).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn anonymous_request_unbinds_session() {
        let (handler, store) = setup();
        let visitor = VisitorId::new();
        let user = UserId::new("customer-5").unwrap();
        store.bind_session_user(&visitor, Some(&user)).await.unwrap();

        handler
            .handle(EvaluateCheckoutQuery {
                visitor,
                user: None,
            })
            .await
            .unwrap();

        assert_eq!(store.session_user(&visitor).await.unwrap(), None);
    }

}
