//! JWT issuing and verification.
//!
//! All tokens are HS256 with a fixed issuer and audience. The `type` claim
//! separates access tokens from refresh tokens; admin tokens are access
//! tokens with an extra `adminLevel` claim and no backing user row.

use cafe_wifi_core::types::{TokenKind, UserId};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TOKEN_ISSUER: &str = "slowest-cafe-wifi";
const TOKEN_AUDIENCE: &str = "cafe-users";

/// Claims carried by every token this server signs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or the literal `admin` for admin tokens.
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    #[serde(
        rename = "adminLevel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_level: Option<String>,
}

/// Token verification or signing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
    #[error("token signing failed")]
    Signing,
}

/// Signs and verifies tokens with the configured secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId, kind: TokenKind) -> Result<String, TokenError> {
        self.sign(Claims {
            sub: user_id.to_string(),
            kind,
            iat: 0,
            exp: 0,
            iss: String::new(),
            aud: String::new(),
            admin_level: None,
        })
    }

    /// Sign an admin access token carrying the granted level.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_admin(&self, level: &str) -> Result<String, TokenError> {
        self.sign(Claims {
            sub: "admin".to_string(),
            kind: TokenKind::Access,
            iat: 0,
            exp: 0,
            iss: String::new(),
            aud: String::new(),
            admin_level: Some(level.to_string()),
        })
    }

    fn sign(&self, mut claims: Claims) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        claims.iat = now;
        claims.exp = now + claims.kind.lifetime_secs();
        claims.iss = TOKEN_ISSUER.to_string();
        claims.aud = TOKEN_AUDIENCE.to_string();

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token's signature, expiry, issuer, and audience.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens, otherwise
    /// `TokenError::Invalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d"))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = signer();
        let user_id = UserId::new();

        let token = signer.issue(user_id, TokenKind::Access).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.aud, TOKEN_AUDIENCE);
        assert!(claims.admin_level.is_none());
        assert_eq!(claims.exp - claims.iat, TokenKind::Access.lifetime_secs());
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let signer = signer();
        let token = signer.issue(UserId::new(), TokenKind::Refresh).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, TokenKind::Refresh.lifetime_secs());
    }

    #[test]
    fn test_admin_token_carries_level() {
        let signer = signer();
        let token = signer.issue_admin("super").unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.admin_level.as_deref(), Some("super"));
    }

    #[test]
    fn test_kind_uses_type_claim_on_the_wire() {
        let claims = Claims {
            sub: UserId::new().to_string(),
            kind: TokenKind::Refresh,
            iat: 0,
            exp: 0,
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            admin_level: None,
        };
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value.get("type").unwrap(), "refresh");
        assert!(value.get("kind").is_none());
        assert!(value.get("adminLevel").is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let now = Utc::now().timestamp();
        // Back-dated past the default 60s leeway
        let claims = Claims {
            sub: UserId::new().to_string(),
            kind: TokenKind::Access,
            iat: now - 1000,
            exp: now - 500,
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            admin_level: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d"),
        )
        .unwrap();

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let signer = signer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: UserId::new().to_string(),
            kind: TokenKind::Access,
            iat: now,
            exp: now + 3600,
            iss: "someone-else".to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            admin_level: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6d"),
        )
        .unwrap();

        assert_eq!(signer.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let token = signer.issue(UserId::new(), TokenKind::Access).unwrap();
        let mut tampered = token;
        tampered.pop();

        assert_eq!(signer.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().issue(UserId::new(), TokenKind::Access).unwrap();
        let other = TokenSigner::new(&SecretString::from("dC6z^4Wu*0Tr&7Qp#5Ln@2Km!9Yx$3Ba"));

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }
}
