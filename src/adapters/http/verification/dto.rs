//! HTTP DTOs for the age verification endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::verification::{CheckoutDecision, CheckoutNotice, NoticeKind, VerificationStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string of the start route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartParams {
    /// Checkout page to come back to.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Query string the provider sends back to the callback route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Set instead of `code` when the provider aborted the flow.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parameters standing in for a query string that failed to parse.
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self {
            error: Some("invalid_callback".to_string()),
            error_description: Some(reason.into()),
            ..Default::default()
        }
    }

    /// The provider's error, with its description when one was sent.
    pub fn provider_error(&self) -> Option<String> {
        self.error.as_ref().map(|error| match &self.error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error.clone(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Blocking notice rendered by the storefront.
#[derive(Debug, Clone, Serialize)]
pub struct NoticeResponse {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_label: Option<String>,
}

impl From<&CheckoutNotice> for NoticeResponse {
    fn from(notice: &CheckoutNotice) -> Self {
        Self {
            kind: notice.kind,
            message: notice.message.clone(),
            retry_link: notice.retry_link.clone(),
            link_label: notice.link_label.clone(),
        }
    }
}

/// Gate decision as exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionResponse {
    Allow,
    Block,
}

impl From<&CheckoutDecision> for DecisionResponse {
    fn from(decision: &CheckoutDecision) -> Self {
        if decision.is_allowed() {
            Self::Allow
        } else {
            Self::Block
        }
    }
}

/// Response for `GET /checkout/age-verification`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationStatusResponse {
    pub status: VerificationStatus,
    pub decision: DecisionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoticeResponse>,
}

impl VerificationStatusResponse {
    pub fn new(status: VerificationStatus, decision: &CheckoutDecision) -> Self {
        Self {
            status,
            decision: decision.into(),
            notice: decision.notice().map(NoticeResponse::from),
        }
    }
}

/// Body of the 403 returned when checkout is blocked.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutBlockedResponse {
    pub code: String,
    pub message: String,
    pub status: VerificationStatus,
    pub notice: NoticeResponse,
}

/// Response for `DELETE /checkout/age-verification`.
#[derive(Debug, Clone, Serialize)]
pub struct RevokeResponse {
    /// Whether a durable verification existed and was removed.
    pub revoked: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
