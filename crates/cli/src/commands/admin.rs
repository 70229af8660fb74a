//! Admin token minting.
//!
//! Signs an admin JWT directly with `JWT_SECRET`, for operators who need an
//! admin token without calling `POST /api/admin/verify`.

use cafe_wifi_core::types::TokenKind;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;
use thiserror::Error;

// Must stay in sync with the server's token signer, which validates
// issuer and audience on every request.
const TOKEN_ISSUER: &str = "slowest-cafe-wifi";
const TOKEN_AUDIENCE: &str = "cafe-users";

#[derive(Debug, Error)]
pub enum AdminTokenError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid level: {0}. Valid levels: standard, super")]
    InvalidLevel(String),

    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Serialize)]
struct AdminClaims<'a> {
    sub: &'a str,
    #[serde(rename = "type")]
    kind: TokenKind,
    iat: i64,
    exp: i64,
    iss: &'a str,
    aud: &'a str,
    #[serde(rename = "adminLevel")]
    admin_level: &'a str,
}

/// Sign an admin token for the given level and print it.
pub fn create_token(level: &str) -> Result<(), AdminTokenError> {
    dotenvy::dotenv().ok();

    if level != "standard" && level != "super" {
        return Err(AdminTokenError::InvalidLevel(level.to_string()));
    }

    let secret =
        std::env::var("JWT_SECRET").map_err(|_| AdminTokenError::MissingEnvVar("JWT_SECRET"))?;

    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        sub: "admin",
        kind: TokenKind::Access,
        iat: now,
        exp: now + TokenKind::Access.lifetime_secs(),
        iss: TOKEN_ISSUER,
        aud: TOKEN_AUDIENCE,
        admin_level: level,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    tracing::info!(admin_level = level, "admin token signed");
    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}
