//! Session-verification middleware gating the protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::config::{AppState, COOKIE_NAME};
use crate::ctx::Ctx;
use crate::error::{Error, Result};

/// Validate the session cookie and attach the caller's identity to the
/// request. Does not touch the store; handlers re-check user existence.
pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(COOKIE_NAME)
        .map(|c| c.value().trim().to_owned())
        .filter(|t| !t.is_empty())
        .ok_or(Error::AuthFailNoToken)?;

    let claims = crate::auth::verify_token(&token, &state.config.jwt_secret)
        .map_err(|_| Error::AuthFailTokenExpired)?;

    req.extensions_mut()
        .insert(Ctx::new(claims.sub, claims.email));

    Ok(next.run(req).await)
}
