use chrono::Utc;
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// The claims the client reads out of an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Expiry as Unix seconds.
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decodes a token's claims without verifying the signature. Verification is
/// the server's job; the client only needs the self-contained expiry claim.
pub fn decode_unverified(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let header = decode_header(token)?;
    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    // Expiry is evaluated by the caller, not rejected here.
    validation.validate_exp = false;
    validation.validate_aud = false;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Whether the token is unusable for the next request.
///
/// A token is expired once `exp <= now`, with no clock-skew grace window.
/// An undecodable token counts as expired: a refresh may still recover the
/// session, so this is never a hard error.
pub fn is_expired(token: &str) -> bool {
    match decode_unverified(token) {
        Ok(claims) => claims.exp <= Utc::now().timestamp(),
        Err(_) => true,
    }
}
