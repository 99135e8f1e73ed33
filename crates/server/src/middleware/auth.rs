//! Cookie-based authentication extractors.
//!
//! Protected handlers take [`CurrentUser`] (any authenticated account) or
//! [`RequireAdmin`] (admin role) as an argument; extraction reads the token
//! cookie, verifies the signature and expiry, and loads the account named in
//! the claims. Every failure along the way rejects the request, 401 for
//! authentication and 403 for authorization.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Name of the HTTP-only cookie carrying the access token.
pub const AUTH_COOKIE: &str = "shop_access_token";

/// The authenticated account, loaded fresh from the database.
pub struct CurrentUser(pub User);

/// The authenticated account, additionally required to be an admin.
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .ok_or_else(|| AppError::Unauthorized("not authenticated".to_owned()))?;

        let claims = state.tokens().verify(&token)?;

        // The subject may have been deleted or renamed since issuance.
        let user = UserRepository::new(state.pool())
            .get_by_username(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("not authenticated".to_owned()))?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }
        Ok(Self(user))
    }
}
