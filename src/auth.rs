use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::schemas::OwnerId;

/// Claims carried by the bearer token. Tokens are issued by the identity
/// service; this crate only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Resolved owner identity of the request. Extraction fails with 401 before
/// any handler body runs, so unauthenticated callers never reach the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser(pub OwnerId);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

fn resolve(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or(ApiError::Unauthorized("Authentication is not configured"))?;
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;
    let claims = verify_token(&config.jwt_secret, token).map_err(|err| {
        tracing::warn!(error = %err, "rejected bearer token");
        ApiError::Unauthorized("Invalid or expired token")
    })?;
    Ok(AuthUser(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "dev-secret";

    fn sign(secret: &str, sub: &str, ttl_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.into(),
            iat: now as usize,
            exp: (now + ttl_secs) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn test_config() -> AppConfig {
        AppConfig {
            mongodb_uri: "mongodb://localhost:27017".into(),
            database: "rollbook-test".into(),
            bind_addr: "127.0.0.1:0".into(),
            jwt_secret: SECRET.into(),
        }
    }

    fn request_with_header(value: Option<String>) -> HttpRequest {
        let mut request = TestRequest::default().app_data(web::Data::new(test_config()));
        if let Some(value) = value {
            request = request.insert_header((AUTHORIZATION, value));
        }
        request.to_http_request()
    }

    #[test]
    fn signed_token_verifies_to_its_subject() {
        let token = sign(SECRET, "tutor-1", 300);
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "tutor-1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign("other-secret", "tutor-1", 300);
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Validation keeps a default leeway of 60s, so expire well past it.
        let token = sign(SECRET, "tutor-1", -300);
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn extractor_resolves_the_owner() {
        let token = sign(SECRET, "tutor-7", 300);
        let req = request_with_header(Some(format!("Bearer {token}")));
        assert_eq!(resolve(&req).unwrap(), AuthUser("tutor-7".into()));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let req = request_with_header(None);
        assert!(matches!(
            resolve(&req),
            Err(ApiError::Unauthorized("Missing Authorization header"))
        ));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let req = request_with_header(Some("Basic dXNlcjpwYXNz".into()));
        assert!(matches!(
            resolve(&req),
            Err(ApiError::Unauthorized("Invalid Authorization header"))
        ));
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let req = request_with_header(Some("Bearer not-a-jwt".into()));
        assert!(matches!(
            resolve(&req),
            Err(ApiError::Unauthorized("Invalid or expired token"))
        ));
    }
}
