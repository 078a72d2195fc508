use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const GUEST_PREFIX: &str = "guest-";
pub const GUEST_DISPLAY_NAME: &str = "Guest";

/// An identity backed by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Ephemeral identity minted when nothing can be restored. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestRecord {
    pub id: String,
    pub display_name: String,
    pub is_guest: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SessionUser {
    Member(UserRecord),
    Guest(GuestRecord),
}

impl SessionUser {
    pub fn id(&self) -> &str {
        match self {
            SessionUser::Member(u) => &u.id,
            SessionUser::Guest(g) => &g.id,
        }
    }

    pub fn is_guest(&self) -> bool {
        match self {
            SessionUser::Member(_) => false,
            SessionUser::Guest(g) => g.is_guest,
        }
    }
}

/// Profile data loaded alongside an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: Option<String>,
    pub dietary_preferences: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn member(user: UserRecord) -> Self {
        Self {
            user: Some(SessionUser::Member(user)),
            is_authenticated: true,
        }
    }

    pub fn guest(guest: GuestRecord) -> Self {
        Self {
            user: Some(SessionUser::Guest(guest)),
            is_authenticated: false,
        }
    }

    /// Whether remote persistence may be attempted for this session.
    pub fn is_valid_user(&self) -> bool {
        match &self.user {
            Some(user) => {
                self.is_authenticated && !user.is_guest() && !user.id().starts_with(GUEST_PREFIX)
            }
            None => false,
        }
    }
}
