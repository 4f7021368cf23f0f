use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

/// Extracts and validates the bearer token, resolving it to the current user.
pub struct CurrentUser(pub User);

/// Verify the token, parse its subject, and load the user. The three failure
/// paths are deliberately indistinguishable to the caller; the reason lives
/// only in the logs.
pub async fn resolve_bearer(
    keys: &JwtKeys,
    store: &dyn UserStore,
    token: &str,
) -> Result<User, AppError> {
    let claims = keys
        .verify(token)
        .map_err(|_| AppError::unauthenticated("token rejected"))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::unauthenticated("malformed subject"))?;

    store
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::unauthenticated("unknown subject"))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::unauthenticated("missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::unauthenticated("invalid auth scheme"))?;

        let keys = JwtKeys::from_ref(state);
        let user = resolve_bearer(&keys, state.users.as_ref(), token).await?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::auth::claims::Claims;
    use crate::auth::password::hash_password;
    use crate::clock::{Clock, ManualClock};
    use crate::users::fake::InMemoryUsers;
    use crate::users::repo_types::{NewUser, UserRole};

    fn make_keys(clock: Arc<dyn Clock>) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(b"test-secret"),
            decoding: jsonwebtoken::DecodingKey::from_secret(b"test-secret"),
            algorithm: jsonwebtoken::Algorithm::HS256,
            access_ttl: std::time::Duration::from_secs(30 * 60),
            clock,
        }
    }

    async fn seeded_store() -> (InMemoryUsers, User) {
        let store = InMemoryUsers::new();
        let user = store
            .create(NewUser {
                email: "alice@example.com".into(),
                name: "Alice".into(),
                password_hash: hash_password("secret123").expect("hash"),
                role: UserRole::User,
            })
            .await
            .expect("create");
        (store, user)
    }

    #[tokio::test]
    async fn resolves_issued_token_to_its_user() {
        let (store, user) = seeded_store().await;
        let keys = make_keys(Arc::new(ManualClock::starting_now()));
        let token = keys.sign(user.id).expect("sign");

        let resolved = resolve_bearer(&keys, &store, &token).await.expect("resolve");
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "alice@example.com");
    }

    #[tokio::test]
    async fn failure_paths_are_indistinguishable() {
        let (store, _user) = seeded_store().await;
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::starting_now());
        let keys = make_keys(clock.clone());

        // malformed token
        let garbage = resolve_bearer(&keys, &store, "not-a-token")
            .await
            .unwrap_err();

        // valid signature, non-uuid subject
        let now = clock.now_utc().unix_timestamp();
        let claims = Claims {
            sub: "not-a-uuid".into(),
            iat: now as usize,
            exp: (now + 600) as usize,
        };
        let bad_sub_token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &keys.encoding,
        )
        .expect("encode");
        let bad_sub = resolve_bearer(&keys, &store, &bad_sub_token)
            .await
            .unwrap_err();

        // valid token for a user that no longer exists
        let orphan_token = keys.sign(Uuid::new_v4()).expect("sign");
        let orphan = resolve_bearer(&keys, &store, &orphan_token)
            .await
            .unwrap_err();

        for err in [&garbage, &bad_sub, &orphan] {
            assert!(matches!(err, AppError::Unauthenticated { .. }));
        }
        // same outward message for all three
        assert_eq!(garbage.to_string(), bad_sub.to_string());
        assert_eq!(bad_sub.to_string(), orphan.to_string());
    }
}
