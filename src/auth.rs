use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT Claims carried in the stored bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - User ID as String
    pub sub: String,
    /// The username of the authenticated user.
    pub username: String,
    /// The role assigned to the user.
    pub role: String,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
}

/// The acting employee's identity, decoded once at startup and injected
/// everywhere it is needed instead of re-deriving it from the token per
/// call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub employee_id: i64,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Stored token is not a three-segment JWT")]
    MalformedToken,

    #[error("Token payload segment is not valid base64url")]
    UndecodablePayload,

    #[error("Token claims did not parse: {0}")]
    InvalidClaims(#[from] serde_json::Error),

    #[error("Token subject is not a numeric employee id")]
    InvalidSubject,

    #[error("Token expired at unix time {0}")]
    Expired(i64),
}

/// Decode the claims out of a stored bearer token and turn them into a
/// [`CurrentUser`].
///
/// The signature is deliberately not verified: the secret lives on the
/// backend, which re-validates the token on every request. This client
/// only needs the identity claims out of the payload segment.
pub fn current_user_from_token(token: &str) -> Result<CurrentUser, AuthError> {
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    // Step 1: the token must be header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::MalformedToken);
    }

    // Step 2: decode the payload segment
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| AuthError::UndecodablePayload)?;

    // Step 3: parse the claims
    let claims: Claims = serde_json::from_slice(&payload)?;

    // Step 4: reject expired tokens up front
    let now = chrono::Utc::now().timestamp();
    if (claims.exp as i64) <= now {
        return Err(AuthError::Expired(claims.exp as i64));
    }

    // Step 5: the subject carries the employee id as a string
    let employee_id = claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidSubject)?;

    Ok(CurrentUser {
        employee_id,
        username: claims.username,
        role: claims.role,
    })
}
