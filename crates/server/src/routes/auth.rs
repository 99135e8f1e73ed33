//! Registration, login, logout and the current-user endpoint.
//!
//! Successful register/login answers carry the token twice: in the JSON body
//! and in the HTTP-only auth cookie. Browser clients rely on the cookie;
//! the body copy exists for non-browser callers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use evergreen_core::UserRole;

use crate::error::{AppError, Result};
use crate::middleware::{AUTH_COOKIE, CurrentUser};
use crate::models::user::User;
use crate::routes::views::UserOut;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    phone: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    access_token: String,
    user: UserOut,
}

/// Issue a token for a stored user row.
fn issue_token(state: &AppState, user: &User) -> Result<String> {
    let role = user
        .role
        .parse::<UserRole>()
        .map_err(|_| AppError::Internal(format!("unknown role for user {}", user.username)))?;
    Ok(state.tokens().issue(&user.username, role)?)
}

/// Auth cookie: HTTP-only, lax, seven days. Not `Secure`; TLS termination
/// is a deployment concern.
fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(7))
        .build()
}

async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<LoginResponse>)> {
    let user = AuthService::new(state.pool())
        .register(&body.username, &body.email, &body.password, &body.phone)
        .await?;

    let token = issue_token(&state, &user)?;
    let jar = jar.add(auth_cookie(token.clone()));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(LoginResponse {
            access_token: token,
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = AuthService::new(state.pool())
        .login(&body.username, &body.password)
        .await?;

    let token = issue_token(&state, &user)?;
    let jar = jar.add(auth_cookie(token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            access_token: token,
            user: user.into(),
        }),
    ))
}

async fn logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    let jar = jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

async fn me(CurrentUser(user): CurrentUser) -> Json<LoginResponse> {
    // The token already travels in the cookie; it is not echoed back.
    Json(LoginResponse {
        access_token: String::new(),
        user: user.into(),
    })
}
