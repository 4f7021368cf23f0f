use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo_types::{User, UserRole};

/// Allow only admins. Denial is the uniform forbidden outcome.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Allow admins, or the owner of the target resource.
pub fn require_admin_or_self(user: &User, target_id: Uuid) -> Result<(), AppError> {
    if user.role != UserRole::Admin && user.id != target_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
