//! Ownership checks. A resource may be mutated only by the user whose id it
//! carries; negative ids are never owners.

use tracing::warn;

use tasklist_db::models::{ListRow, TodoRow};
use tasklist_types::models::{List, Todo};

use crate::error::ApiError;

pub trait Owned {
    fn owner_id(&self) -> i64;
}

impl Owned for List {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for Todo {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for ListRow {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for TodoRow {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

pub fn is_valid_owner(user_id: i64) -> bool {
    user_id >= 0
}

pub fn can_access(acting: i64, resource: &impl Owned) -> bool {
    is_valid_owner(acting) && acting == resource.owner_id()
}

/// Rejects unless `acting` owns `resource`.
pub fn authorize(acting: i64, resource: &impl Owned) -> Result<(), ApiError> {
    if can_access(acting, resource) {
        return Ok(());
    }
    warn!(
        "User {} denied access to resource owned by {}",
        acting,
        resource.owner_id()
    );
    Err(ApiError::Forbidden("resource belongs to another user".into()))
}

/// Checks the owner a request body names for a new or replaced resource.
pub fn check_claimed_owner(acting: i64, claimed: i64) -> Result<(), ApiError> {
    if !is_valid_owner(claimed) {
        return Err(ApiError::Validation(format!("invalid owner id {}", claimed)));
    }
    if acting != claimed {
        warn!("User {} tried to act as user {}", acting, claimed);
        return Err(ApiError::Forbidden(
            "user_id does not match the authenticated user".into(),
        ));
    }
    Ok(())
}
