//! Token-based authentication with a sliding refresh window.
//!
//! Tokens are HS256 JWTs carrying the user id. Every protected request
//! must present one; requests whose token is older than the refresh
//! window get a fresh token back in the `Authorization` response header,
//! so an active client never expires. The task core never sees tokens,
//! only the verified acting user id.

use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims: subject (user id), issued-at, expiry. Seconds since epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated acting user, injected into request extensions by the
/// auth middleware and read explicitly by every handler that mutates.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    refresh_after: Duration,
}

impl TokenService {
    pub fn new(secret: &str, token_ttl_minutes: i64, refresh_after_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::minutes(token_ttl_minutes),
            refresh_after: Duration::minutes(refresh_after_minutes),
        }
    }

    /// Issue a token for a user, valid for the configured TTL.
    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: &str, iat: i64) -> Result<String, ApiError> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + self.token_ttl.num_seconds(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(e.into()))
    }

    /// Verify a token and return its claims. Any failure (bad signature,
    /// malformed, expired) surfaces as the same unauthorized outcome.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("token_expired"))
    }

    /// True when the token was issued longer ago than the refresh window
    /// and should be replaced on the way out.
    pub fn needs_refresh(&self, claims: &Claims) -> bool {
        Utc::now().timestamp() - claims.iat > self.refresh_after.num_seconds()
    }
}

/// Middleware guarding the `/user/...` routes.
///
/// Rejects missing or invalid tokens with 401, records the acting user in
/// request extensions, and slides the expiry window by attaching a fresh
/// token to the response when the presented one has aged past the
/// refresh threshold.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(ApiError::Unauthorized("token_not_provided"))?;

    let claims = state.tokens.verify(&token)?;
    let needs_refresh = state.tokens.needs_refresh(&claims);
    let user_id = claims.sub.clone();

    request.extensions_mut().insert(AuthUser(user_id.clone()));

    let mut response = next.run(request).await;

    if needs_refresh {
        let fresh = state.tokens.issue(&user_id)?;
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {fresh}")) {
            response.headers_mut().insert(header::AUTHORIZATION, value);
        }
    }

    Ok(response)
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 60, 15)
    }

    #[test]
    fn issue_then_verify_roundtrips_subject() {
        let tokens = service();
        let token = tokens.issue("user-1").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_token_from_other_secret() {
        let token = TokenService::new("other-secret", 60, 15)
            .issue("user-1")
            .unwrap();
        assert!(matches!(
            service().verify(&token),
            Err(ApiError::Unauthorized("token_expired"))
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(service().verify("not-a-token").is_err());
    }

    #[test]
    fn fresh_token_does_not_need_refresh() {
        let tokens = service();
        let token = tokens.issue("user-1").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert!(!tokens.needs_refresh(&claims));
    }

    #[test]
    fn token_past_window_needs_refresh() {
        let tokens = service();
        let old_iat = Utc::now().timestamp() - 16 * 60;
        let token = tokens.issue_at("user-1", old_iat).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert!(tokens.needs_refresh(&claims));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Backdated well past both the 1-minute TTL and the decoder's
        // default 60s leeway.
        let tokens = TokenService::new("test-secret", 1, 15);
        let token = tokens
            .issue_at("user-1", Utc::now().timestamp() - 10 * 60)
            .unwrap();
        assert!(tokens.verify(&token).is_err());
    }
}
