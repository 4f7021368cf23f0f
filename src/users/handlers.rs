use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        handlers::is_valid_email,
        password::hash_password,
        permissions::{require_admin, require_admin_or_self},
    },
    error::AppError,
    state::AppState,
    users::{
        dto::{Pagination, PublicUser, UpdateUserRequest},
        repo_types::{User, UserChanges},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, actor))]
async fn list_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    require_admin(&actor)?;
    let users = state.users.list(p.limit, p.offset).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, actor, payload))]
async fn update_me(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let target_id = actor.id;
    apply_update(&state, &actor, target_id, payload).await.map(Json)
}

#[instrument(skip(state, _actor))]
async fn get_user(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, actor, payload))]
async fn update_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    require_admin_or_self(&actor, id)?;
    apply_update(&state, &actor, id, payload).await.map(Json)
}

#[instrument(skip(state, actor))]
async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_admin_or_self(&actor, id)?;
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound("User"));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_update(
    state: &AppState,
    actor: &User,
    target_id: Uuid,
    payload: UpdateUserRequest,
) -> Result<PublicUser, AppError> {
    // Role changes stay admin-only even when the caller edits their own record
    if payload.role.is_some() {
        require_admin(actor)?;
    }

    let email = match payload.email {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(AppError::Validation("Invalid email".into()));
            }
            if let Some(existing) = state.users.find_by_email(&email).await? {
                if existing.id != target_id {
                    return Err(AppError::DuplicateEmail);
                }
            }
            Some(email)
        }
        None => None,
    };

    let password_hash = match payload.password {
        Some(password) => {
            if password.len() < 8 {
                return Err(AppError::Validation("Password too short".into()));
            }
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        email,
        name: payload.name,
        password_hash,
        bio: payload.bio,
        avatar: payload.avatar,
        role: payload.role,
    };
    let user = state
        .users
        .update(target_id, changes)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    info!(user_id = %user.id, "user updated");
    Ok(user.into())
}
