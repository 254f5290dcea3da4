//! VerificationStatus enum for tracking a visitor's age verification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Current age verification status for a (visitor, identity) pair.
///
/// `Unverified` is what a visitor without any record sees. The callback
/// transition always lands in one of the three settled states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Verified,
    Denied,
    Error,
}

impl VerificationStatus {
    /// All statuses, in declaration order.
    pub const ALL: [VerificationStatus; 4] = [
        VerificationStatus::Unverified,
        VerificationStatus::Verified,
        VerificationStatus::Denied,
        VerificationStatus::Error,
    ];

    /// Returns true once a callback has produced an outcome.
    ///
    /// A settled session status is authoritative and is returned by the
    /// resolver without consulting the durable store.
    pub fn is_settled(&self) -> bool {
        !matches!(self, VerificationStatus::Unverified)
    }

    /// Returns true if checkout may proceed.
    pub fn allows_checkout(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }

    /// Stable storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Denied => "denied",
            VerificationStatus::Error => "error",
        }
    }
}

impl StateMachine for VerificationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        // Callbacks may overwrite any prior outcome; nothing returns to
        // Unverified except an explicit revocation, which clears the record.
        target.is_settled()
    }

    fn valid_transitions(&self) -> Vec<Self> {
        vec![
            VerificationStatus::Verified,
            VerificationStatus::Denied,
            VerificationStatus::Error,
        ]
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationStatus::Unverified => "Unverified",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Denied => "Denied",
            VerificationStatus::Error => "Error",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for VerificationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(VerificationStatus::Unverified),
            "verified" => Ok(VerificationStatus::Verified),
            "denied" => Ok(VerificationStatus::Denied),
            "error" => Ok(VerificationStatus::Error),
            other => Err(ValidationError::invalid_format(
                "verification_status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unverified() {
        assert_eq!(VerificationStatus::default(), VerificationStatus::Unverified);
    }

    #[test]
    fn only_unverified_is_unsettled() {
        assert!(!VerificationStatus::Unverified.is_settled());
        assert!(VerificationStatus::Verified.is_settled());
        assert!(VerificationStatus::Denied.is_settled());
        assert!(VerificationStatus::Error.is_settled());
    }

    #[test]
    fn only_verified_allows_checkout() {
        for status in VerificationStatus::ALL {
            assert_eq!(
                status.allows_checkout(),
                status == VerificationStatus::Verified
            );
        }
    }

    #[test]
    fn every_status_can_be_overwritten_by_a_callback_outcome() {
        for from in VerificationStatus::ALL {
            assert!(from.can_transition_to(&VerificationStatus::Verified));
            assert!(from.can_transition_to(&VerificationStatus::Denied));
            assert!(from.can_transition_to(&VerificationStatus::Error));
        }
    }

    #[test]
    fn nothing_transitions_back_to_unverified() {
        for from in VerificationStatus::ALL {
            assert!(from.transition_to(VerificationStatus::Unverified).is_err());
        }
    }

    #[test]
    fn settled_states_are_not_terminal() {
        // re-triggerable by a fresh start transition
        assert!(!VerificationStatus::Denied.is_terminal());
        assert!(!VerificationStatus::Error.is_terminal());
    }

    #[test]
    fn storage_form_round_trips() {
        for status in VerificationStatus::ALL {
            assert_eq!(status.as_str().parse::<VerificationStatus>(), Ok(status));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("maybe".parse::<VerificationStatus>().is_err());
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Verified).unwrap(),
            "\"verified\""
        );
    }
}
