//! Access tokens

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque capability string presented to the gateway
///
/// The raw value is only reachable through [`AccessToken::expose`]; the
/// `Debug` and `Display` impls never print it, so tokens can sit inside
/// structs that get logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token for placing on the wire
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for AccessToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redact_value() {
        let token = AccessToken::new("s3cret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.to_string(), "***");
        assert_eq!(token.expose(), "s3cret");
    }

    #[test]
    fn test_serializes_raw_value() {
        let token = AccessToken::new("s3cret");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"s3cret\"");
    }
}
