//! Session authentication middleware
//!
//! Every route under the protected router runs behind [`require_auth`]. The
//! session JWT comes from the `session_token` cookie (browser) or an
//! `Authorization: Bearer` header (API clients). On success a
//! [`Principal`] is placed in the request extensions for the handlers.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use routerdesk_auth::jwt::{SESSION_AUDIENCE, SESSION_ISSUER};
use routerdesk_auth::{JwtValidator, SESSION_TOKEN_TYPE};
use routerdesk_control::Principal;
use std::sync::Arc;

use crate::models::ErrorResponse;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    /// Validator for console session tokens signed with `secret`
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(
                JwtValidator::new(secret)
                    .with_issuer(SESSION_ISSUER.to_string())
                    .with_audience(SESSION_AUDIENCE.to_string()),
            ),
        }
    }
}

fn unauthorized(error: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new(error, code)),
    )
}

fn session_cookie(request: &Request) -> Option<String> {
    let cookies = request.headers().get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix("session_token="))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Authentication middleware that validates session tokens
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - Both cookie and Authorization header are missing
/// - Token is malformed, expired or signed with another secret
/// - Token type is not "session"
/// - The `user_id` claim is missing or not a UUID
pub async fn require_auth(
    state: axum::extract::State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = match session_cookie(&request) {
        Some(token) => token,
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    unauthorized(
                        "Missing authentication token (cookie or Authorization header)",
                        "MISSING_AUTH",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    unauthorized(
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                        "INVALID_AUTH_FORMAT",
                    )
                })?
                .to_string()
        }
    };

    let claims = state.validator.validate(&token).map_err(|e| {
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    match claims.token_type.as_deref() {
        Some(SESSION_TOKEN_TYPE) => {}
        Some(other) => {
            return Err(unauthorized(
                format!(
                    "Invalid token type '{}'. Expected 'session' token for API access",
                    other
                ),
                "INVALID_TOKEN_TYPE",
            ));
        }
        None => {
            return Err(unauthorized(
                "Token missing 'token_type' claim",
                "MISSING_TOKEN_TYPE",
            ));
        }
    }

    let user_id = claims
        .user_id
        .as_deref()
        .ok_or_else(|| unauthorized("Token missing 'user_id' claim", "MISSING_USER_ID"))?;

    let principal = Principal::from_claims(user_id, claims.user_role.as_deref())
        .ok_or_else(|| unauthorized("Token 'user_id' claim is not a UUID", "INVALID_USER_ID"))?;

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use chrono::Duration;
    use routerdesk_auth::JwtClaims;
    use tower::ServiceExt; // For oneshot()
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-secret-key";

    async fn protected_handler(axum::Extension(principal): axum::Extension<Principal>) -> String {
        format!("{}:{}", principal.user_id, principal.role.as_str())
    }

    fn create_test_app(jwt_secret: &[u8]) -> Router {
        let jwt_state = Arc::new(JwtState::new(jwt_secret));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ))
            .with_state(jwt_state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn bearer(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/protected")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn error_of(body: &[u8]) -> ErrorResponse {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_valid_session_bearer() {
        let user_id = Uuid::new_v4();
        let claims = JwtClaims::session(user_id.to_string(), "admin".to_string(), Duration::hours(1));
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let (status, body) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), format!("{}:admin", user_id));
    }

    #[tokio::test]
    async fn test_valid_session_cookie() {
        let user_id = Uuid::new_v4();
        let claims = JwtClaims::session(user_id.to_string(), "user".to_string(), Duration::hours(1));
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let request = Request::builder()
            .uri("/protected")
            .header("Cookie", format!("theme=dark; session_token={}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(SECRET), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), format!("{}:user", user_id));
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(SECRET), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body).code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        let request = Request::builder()
            .uri("/protected")
            .header("Authorization", "InvalidFormat token123")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(create_test_app(SECRET), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(error_of(&body)
            .error
            .contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let claims = JwtClaims::session(
            Uuid::new_v4().to_string(),
            "user".to_string(),
            Duration::seconds(-10),
        );
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let (status, body) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(error_of(&body).error.contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_wrong_secret() {
        let claims = JwtClaims::session(Uuid::new_v4().to_string(), "user".to_string(), Duration::hours(1));
        let token = JwtValidator::encode(b"wrong-secret-key", &claims).unwrap();

        let (status, _) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_non_session_token() {
        let claims = JwtClaims::session(Uuid::new_v4().to_string(), "user".to_string(), Duration::hours(1))
            .with_token_type("reset".to_string());
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let (status, body) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error = error_of(&body);
        assert!(error.error.contains("Invalid token type"));
        assert_eq!(error.code.as_deref(), Some("INVALID_TOKEN_TYPE"));
    }

    #[tokio::test]
    async fn test_missing_user_id() {
        let claims = JwtClaims::new(
            "someone".to_string(),
            SESSION_ISSUER.to_string(),
            SESSION_AUDIENCE.to_string(),
            Duration::hours(1),
        )
        .with_token_type(SESSION_TOKEN_TYPE.to_string());
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let (status, body) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(error_of(&body).error.contains("missing 'user_id' claim"));
    }

    #[tokio::test]
    async fn test_non_uuid_user_id() {
        let claims = JwtClaims::session("user-123".to_string(), "user".to_string(), Duration::hours(1));
        let token = JwtValidator::encode(SECRET, &claims).unwrap();

        let (status, body) = send(create_test_app(SECRET), bearer(&token)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(&body).code.as_deref(), Some("INVALID_USER_ID"));
    }
}
