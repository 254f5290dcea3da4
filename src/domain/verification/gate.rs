//! Checkout gate - decides whether a purchase may be finalized.
//!
//! The gate is a pure function of the resolved `VerificationStatus`. It
//! never mutates state; the blocking notice it returns is rendered by the
//! storefront UI.

use serde::{Deserialize, Serialize};

use super::VerificationStatus;

/// Human-facing copy for the blocking notices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeMessages {
    /// Shown to visitors who have not verified yet.
    pub prompt: String,
    /// Shown when the provider reported the visitor as under age.
    pub denied: String,
    /// Shown when the exchange with the provider failed.
    pub error: String,
    /// Shown when the gate is misconfigured; there is nothing to retry.
    pub configuration: String,
    /// Label for the link that starts verification.
    pub link_label: String,
}

impl Default for NoticeMessages {
    fn default() -> Self {
        Self {
            prompt: "You need to verify your age before completing this purchase.".to_string(),
            denied: "We could not confirm that you are over 18, so this purchase cannot be completed."
                .to_string(),
            error: "Age verification did not complete. Please try again.".to_string(),
            configuration:
                "Age verification is currently unavailable. Please contact the site operator."
                    .to_string(),
            link_label: "Verify my age".to_string(),
        }
    }
}

/// Why checkout is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Prompt,
    Denied,
    Error,
}

/// A blocking notice surfaced to the purchase flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutNotice {
    pub kind: NoticeKind,
    pub message: String,
    /// Link that issues the start signal, when retrying makes sense.
    pub retry_link: Option<String>,
    pub link_label: Option<String>,
}

/// Outcome of evaluating the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutDecision {
    Allow,
    Block(CheckoutNotice),
}

impl CheckoutDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CheckoutDecision::Allow)
    }

    /// The blocking notice, if any. `None` means checkout may proceed.
    pub fn notice(&self) -> Option<&CheckoutNotice> {
        match self {
            CheckoutDecision::Allow => None,
            CheckoutDecision::Block(notice) => Some(notice),
        }
    }
}

/// Maps a verification status to a checkout decision.
#[derive(Debug, Clone)]
pub struct CheckoutGate {
    messages: NoticeMessages,
    start_link: String,
}

impl CheckoutGate {
    /// `start_link` is the URL that triggers the start transition.
    pub fn new(messages: NoticeMessages, start_link: impl Into<String>) -> Self {
        Self {
            messages,
            start_link: start_link.into(),
        }
    }

    pub fn messages(&self) -> &NoticeMessages {
        &self.messages
    }

    pub fn evaluate(&self, status: VerificationStatus) -> CheckoutDecision {
        if status.allows_checkout() {
            return CheckoutDecision::Allow;
        }
        let notice = match status {
            VerificationStatus::Denied => {
                self.notice(NoticeKind::Denied, &self.messages.denied, false)
            }
            VerificationStatus::Error => self.notice(NoticeKind::Error, &self.messages.error, true),
            VerificationStatus::Unverified | VerificationStatus::Verified => {
                self.notice(NoticeKind::Prompt, &self.messages.prompt, true)
            }
        };
        CheckoutDecision::Block(notice)
    }

    fn notice(&self, kind: NoticeKind, message: &str, with_link: bool) -> CheckoutNotice {
        CheckoutNotice {
            kind,
            message: message.to_string(),
            retry_link: with_link.then(|| self.start_link.clone()),
            link_label: with_link.then(|| self.messages.link_label.clone()),
        }
    }
}
