//! Interpretation of the age claim returned by the identity provider.

use serde_json::Value;

/// Name of the claim requested from the provider's userinfo endpoint.
pub const AGE_OVER_18_CLAIM: &str = "age_over_18";

/// Returns true only for a strictly affirmative claim value.
///
/// JSON `true` and the string `"true"` are affirmative. Anything else,
/// including an absent claim, `false`, `1` or `"yes"`, is negative.
pub fn is_affirmative(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}
