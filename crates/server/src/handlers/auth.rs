//! Auth handlers: signup, login, session verification, logout.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth;
use crate::config::{AppState, COOKIE_NAME};
use crate::ctx::Ctx;
use crate::error::{Error, Result};
use crate::models::{User, UserInfo};
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub id: String,
    pub name: String,
    pub email: String,
}

impl AuthResponse {
    fn new(message: &'static str, user: &User) -> Self {
        Self {
            message,
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub message: &'static str,
    pub users: Vec<UserInfo>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(COOKIE_NAME, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::days(auth::TOKEN_TTL_DAYS));
    cookie
}

// Removal must match the name and path the cookie was set with.
fn cleared_session() -> Cookie<'static> {
    let mut cookie = Cookie::new(COOKIE_NAME, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

/// Re-fetch the authenticated user and confirm the token identity matches.
pub(crate) async fn verified_user(state: &AppState, ctx: &Ctx) -> Result<User> {
    let user = state
        .store
        .find_by_id(ctx.user_id())
        .await?
        .ok_or(Error::UserMissing)?;

    if user.id != ctx.user_id() {
        return Err(Error::PermissionDenied);
    }

    Ok(user)
}

/// POST /api/v1/user/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("POST /user/signup - {}", req.email);

    validate::validate_signup(&req.name, &req.email, &req.password)?;

    let name = req.name.trim();
    let email = req.email.trim().to_lowercase();

    if state.store.find_by_email(&email).await?.is_some() {
        warn!("Signup rejected, email already registered: {}", email);
        return Err(Error::UserAlreadyExists);
    }

    let password_hash =
        auth::hash_password(&req.password).map_err(|e| Error::Internal(e.to_string()))?;
    let user = state.store.create_user(name, &email, &password_hash).await?;

    info!("User {} registered", user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("User created successfully", &user)),
    ))
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    info!("POST /user/login - {}", req.email);

    validate::validate_login(&req.email, &req.password)?;

    let email = req.email.trim().to_lowercase();
    let user = state
        .store
        .find_by_email(&email)
        .await?
        .ok_or(Error::UserNotRegistered)?;

    let valid = auth::verify_password(&req.password, &user.password_hash)
        .map_err(|e| Error::Internal(e.to_string()))?;
    if !valid {
        warn!("Failed login attempt for {}", user.email);
        return Err(Error::IncorrectPassword);
    }

    let token = auth::create_token(&user.id, &user.email, &state.config.jwt_secret)
        .map_err(|e| Error::Internal(e.to_string()))?;

    // Drop any pre-existing session cookie before setting the fresh one.
    let jar = jar.remove(cleared_session()).add(session_cookie(token));

    info!("User {} logged in", user.email);

    Ok((jar, Json(AuthResponse::new("Login successful", &user))))
}

/// GET /api/v1/user/auth-status
pub async fn auth_status(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<AuthResponse>> {
    let user = verified_user(&state, &ctx).await?;
    Ok(Json(AuthResponse::new("User verified", &user)))
}

/// GET /api/v1/user/logout
pub async fn logout(
    State(state): State<AppState>,
    ctx: Ctx,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let user = verified_user(&state, &ctx).await?;

    let jar = jar.remove(cleared_session());

    info!("User {} logged out", user.email);

    Ok((jar, Json(AuthResponse::new("Logout successful", &user))))
}

/// GET /api/v1/user
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state
        .store
        .list_users()
        .await?
        .into_iter()
        .map(UserInfo::from)
        .collect();

    Ok(Json(UsersResponse {
        message: "OK",
        users,
    }))
}
