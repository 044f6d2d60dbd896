//! Bearer token authentication middleware.
//!
//! [`authenticate`] runs for every request and attaches an
//! [`Identity`] request extension. It never rejects a request that carries no
//! `Authorization` header; such requests are anonymous. Route groups that need
//! a signed-in, activated user add [`activated`] on top.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::services::token_service::validate_plaintext;
use crate::domain::entities::{Identity, TokenScope, User};
use crate::domain::validation::Validator;
use crate::error::AppError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Resolves the request identity from the `Authorization` header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// Responds `401 Unauthorized` with `WWW-Authenticate: Bearer` when the
/// header is present but malformed, or the token is unknown or expired.
/// Every response carries `Vary: Authorization`.
pub async fn authenticate(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve(&st, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

async fn resolve(st: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(Identity::Anonymous);
    };

    let token = bearer_token(value).ok_or(AppError::InvalidAuthenticationToken)?;

    let mut v = Validator::new();
    validate_plaintext(&mut v, token);
    if !v.is_empty() {
        return Err(AppError::InvalidAuthenticationToken);
    }

    match st
        .token_service
        .lookup(TokenScope::Authentication, token)
        .await
    {
        Ok(user) => Ok(Identity::User(user)),
        Err(AppError::NotFound) => Err(AppError::InvalidAuthenticationToken),
        Err(e) => Err(e),
    }
}

/// Returns the token of an exact `Bearer <token>` header value.
fn bearer_token(value: &HeaderValue) -> Option<&str> {
    let token = value.to_str().ok()?.strip_prefix(BEARER_PREFIX)?;
    (!token.is_empty() && !token.contains(' ')).then_some(token)
}

/// # Errors
///
/// Returns [`AppError::AuthenticationRequired`] for the anonymous identity.
pub fn require_authenticated(identity: &Identity) -> Result<&User, AppError> {
    identity.user().ok_or(AppError::AuthenticationRequired)
}

/// # Errors
///
/// Returns [`AppError::AuthenticationRequired`] for the anonymous identity and
/// [`AppError::InactiveAccount`] for a user who has not activated yet.
pub fn require_activated(identity: &Identity) -> Result<&User, AppError> {
    let user = require_authenticated(identity)?;
    if !user.activated {
        return Err(AppError::InactiveAccount);
    }
    Ok(user)
}

/// Gate for routes that need an activated user.
///
/// Must be layered inside [`authenticate`].
pub async fn activated(req: Request, next: Next) -> Result<Response, AppError> {
    require_activated(req.extensions().get::<Identity>().unwrap_or(&Identity::Anonymous))?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(activated: bool) -> User {
        User {
            id: 1,
            created_at: Utc::now(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            password_hash: String::new(),
            activated,
            version: 1,
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        let ok = HeaderValue::from_static("Bearer Y3QMGX3PJ3WLRL2YRTQGQ6KRHU");
        assert_eq!(bearer_token(&ok), Some("Y3QMGX3PJ3WLRL2YRTQGQ6KRHU"));

        for bad in [
            "Y3QMGX3PJ3WLRL2YRTQGQ6KRHU",
            "bearer Y3QMGX3PJ3WLRL2YRTQGQ6KRHU",
            "Bearer",
            "Bearer ",
            "Bearer a b",
            "Basic dXNlcjpwYXNz",
        ] {
            assert!(
                bearer_token(&HeaderValue::from_static(bad)).is_none(),
                "header = {bad}"
            );
        }
    }

    #[test]
    fn test_anonymous_is_never_authenticated() {
        let anonymous = Identity::Anonymous;
        assert!(matches!(
            require_authenticated(&anonymous),
            Err(AppError::AuthenticationRequired)
        ));
        assert!(matches!(
            require_activated(&anonymous),
            Err(AppError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_inactive_user_is_authenticated_but_not_activated() {
        let identity = Identity::User(user(false));
        assert!(require_authenticated(&identity).is_ok());
        assert!(matches!(
            require_activated(&identity),
            Err(AppError::InactiveAccount)
        ));
    }

    #[test]
    fn test_activated_user_passes_both_gates() {
        let identity = Identity::User(user(true));
        assert_eq!(require_activated(&identity).unwrap().id, 1);
    }
}
