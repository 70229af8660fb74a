//! Token vocabulary shared between the auth service and the CLI.

use serde::{Deserialize, Serialize};

/// The kind of a signed token, carried in the `type` claim.
///
/// Access tokens authenticate API requests and live for 7 days; refresh
/// tokens may only be exchanged for a new pair and live for 30 days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Access,
    Refresh,
}

impl TokenKind {
    /// Lifetime of a token of this kind, in seconds.
    #[must_use]
    pub const fn lifetime_secs(self) -> i64 {
        match self {
            Self::Access => 7 * 24 * 60 * 60,
            Self::Refresh => 30 * 24 * 60 * 60,
        }
    }

    /// The canonical string form, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetimes() {
        assert_eq!(TokenKind::Access.lifetime_secs(), 604_800);
        assert_eq!(TokenKind::Refresh.lifetime_secs(), 2_592_000);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            "\"refresh\""
        );
        let kind: TokenKind = serde_json::from_str("\"access\"").unwrap();
        assert_eq!(kind, TokenKind::Access);
    }
}
