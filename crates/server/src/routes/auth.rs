use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::errors::AuthError;
use service::auth::repo::json::JsonAccountRepository;
use service::auth::service::AuthService;
use service::catalog::CarCatalog;
use service::contact::ContactLog;
use service::uploads::UploadStore;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<CarCatalog>,
    pub accounts: Arc<AuthService<JsonAccountRepository>>,
    pub contacts: Arc<ContactLog>,
    pub uploads: UploadStore,
    pub auth: ServerAuthConfig,
}

/// Username of the session the middleware validated, attached to the
/// request for downstream handlers.
#[derive(Clone)]
pub struct AuthedUser(pub String);

#[derive(Serialize)]
pub struct LoginOutput {
    pub username: String,
    pub token: String,
}

fn auth_status(err: &AuthError) -> StatusCode {
    let status = match err {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Conflict => StatusCode::CONFLICT,
        AuthError::NotFound | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(code = err.code(), error = %err, "auth request refused");
    status
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    state
        .accounts
        .register(input)
        .await
        .map_err(|e| (auth_status(&e), e.to_string()))?;
    Ok(Json(serde_json::json!({"success": true})))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    let session = state
        .accounts
        .login(input)
        .await
        .map_err(|e| (auth_status(&e), e.to_string()))?;

    if let Some(token) = session.token {
        let mut cookie = Cookie::new("auth_token", token.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(false);
        cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
        let jar = jar.add(cookie);
        let out = LoginOutput { username: session.username, token };
        return Ok((jar, Json(out)));
    }
    Err((StatusCode::INTERNAL_SERVER_ERROR, "token generation failed".into()))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Middleware for uploader-only routes: accept `Authorization: Bearer`,
/// falling back to the `auth_token` cookie, and validate the session
/// token. The validated username rides along as [`AuthedUser`].
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        } else {
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            req.extensions_mut().insert(AuthedUser(data.claims.sub));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), error = %e, "session token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
