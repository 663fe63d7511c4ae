//! Authentication middleware for JWT token validation

use anyhow::Result;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::error;

use crate::{error::ApiError, models::Identity, state::AppState};

/// Claims carried by marketplace access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "UserName")]
    pub username: String,
    /// Expiration time
    pub exp: u64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            email: claims.email,
            university: claims.university,
            phone: claims.phone,
            username: claims.username,
        }
    }
}

/// Key material used to verify access tokens
#[derive(Debug, Clone)]
pub enum JwtConfig {
    /// Shared HS256 secret
    Secret(String),
    /// RS256 public key in PEM format
    PublicKey(String),
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: shared secret for HS256 tokens (takes precedence)
    /// - `JWT_PUBLIC_KEY`: RS256 public key (PEM format) or path to a PEM file
    pub fn from_env() -> Result<Self> {
        if let Ok(secret) = env::var("JWT_SECRET") {
            if !secret.is_empty() {
                return Ok(JwtConfig::Secret(secret));
            }
        }

        let public_key = env::var("JWT_PUBLIC_KEY").map_err(|_| {
            anyhow::anyhow!("neither JWT_SECRET nor JWT_PUBLIC_KEY environment variable is set")
        })?;

        // If the public key looks like a file path, read from file (try CWD, then project root)
        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .or_else(|_| {
                    let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
                    path.push(&public_key);
                    std::fs::read_to_string(path)
                })
                .map_err(|e| anyhow::anyhow!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig::PublicKey(public_key))
    }
}

/// Verifies bearer tokens and extracts their claims
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self> {
        let (decoding_key, algorithm) = match config {
            JwtConfig::Secret(secret) => (
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            ),
            JwtConfig::PublicKey(pem) => {
                (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid bearer token, then
/// makes the caller's [`Identity`] available to handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt_verifier.verify(bearer.token()).map_err(|e| {
        error!("Failed to validate token: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(Identity::from(claims));

    Ok(next.run(req).await)
}
