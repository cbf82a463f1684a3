use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new_v4() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Public projection of an account, safe to hand back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account plus the stored password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user: User,
    pub hashed_password: String,
}

impl UserIdentity {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub nickname: String,
    pub hashed_password: String,
}

/// Replacement values for an update. Every field is already resolved,
/// unchanged fields carry the stored value.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub email: String,
    pub nickname: String,
    pub hashed_password: String,
}
