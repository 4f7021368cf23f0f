use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PasswordResetConfirm, PasswordResetRequest,
            RegisterRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        reset::{issue_reset_token, reset_password_with_token},
    },
    error::AppError,
    state::AppState,
    users::repo_types::{NewUser, UserRole},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn password_routes() -> Router<AppState> {
    Router::new()
        .route("/password/reset", post(request_password_reset))
        .route("/password/reset/confirm", post(confirm_password_reset))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AppError::Validation("Password too short".into()));
    }
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name must not be empty".into()));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password)?;
    let user = state
        .users
        .create(NewUser {
            email: payload.email,
            name,
            password_hash: hash,
            role: UserRole::User,
        })
        .await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            token_type: "bearer".into(),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password must be the same outcome
    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".into(),
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(mut payload): Json<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown emails get the same 204; nothing here may reveal existence
    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let ttl_hours = state.config.auth.reset_ttl_hours;
    if let Some(token) =
        issue_reset_token(state.users.as_ref(), state.clock.as_ref(), ttl_hours, &user.email)
            .await?
    {
        if !state
            .mailer
            .send_reset_email(&user.email, &token, &user.name)
            .await
        {
            // token stays valid; delivery is best-effort
            warn!(user_id = %user.id, "reset email could not be sent");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetConfirm>,
) -> Result<StatusCode, AppError> {
    if payload.new_password.len() < 8 {
        return Err(AppError::Validation("Password too short".into()));
    }

    let ok = reset_password_with_token(
        state.users.as_ref(),
        state.clock.as_ref(),
        &payload.token,
        &payload.new_password,
    )
    .await?;

    if !ok {
        return Err(AppError::InvalidResetToken);
    }

    info!("password reset completed");
    Ok(StatusCode::NO_CONTENT)
}
