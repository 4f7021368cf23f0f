use base64ct::{Base64UrlUnpadded, Encoding};
use rand::rngs::OsRng;
use rand::RngCore;
use time::Duration;
use tracing::debug;

use crate::auth::password::hash_password;
use crate::clock::Clock;
use crate::users::repo::UserStore;

/// Raw entropy per reset token; encoded as url-safe base64 without padding.
const RESET_TOKEN_BYTES: usize = 32;

fn generate_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

/// Issue a reset token for the account behind `email` and persist it with its
/// expiry, replacing any token issued earlier. Returns `None` for an unknown
/// email; callers must not reveal which case occurred.
pub async fn issue_reset_token(
    store: &dyn UserStore,
    clock: &dyn Clock,
    ttl_hours: i64,
    email: &str,
) -> anyhow::Result<Option<String>> {
    let Some(user) = store.find_by_email(email).await? else {
        return Ok(None);
    };

    let token = generate_token();
    let expires = clock.now_utc() + Duration::hours(ttl_hours);
    store.set_reset_token(user.id, &token, expires).await?;
    debug!(user_id = %user.id, "reset token issued");
    Ok(Some(token))
}

/// Consume a reset token: re-hash the password and clear the token on the row
/// whose stored token matches and has not expired, in one conditional update.
/// Returns false when nothing matched — expired, already used, or never
/// issued all look the same.
pub async fn reset_password_with_token(
    store: &dyn UserStore,
    clock: &dyn Clock,
    token: &str,
    new_password: &str,
) -> anyhow::Result<bool> {
    let new_hash = hash_password(new_password)?;
    store
        .consume_reset_token(token, &new_hash, clock.now_utc())
        .await
}
