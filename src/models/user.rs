use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::UserId;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: String,
    pub birthday: NaiveDate,
    /// Ids this user is linked to from its own side: every outgoing edge
    /// plus every confirmed incoming edge
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        birthday: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            login: login.into(),
            name: name.into(),
            birthday,
            friends: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FriendshipStatus {
    Unconfirmed,
    Confirmed,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Unconfirmed => "UNCONFIRMED",
            FriendshipStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendshipStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNCONFIRMED" => Ok(FriendshipStatus::Unconfirmed),
            "CONFIRMED" => Ok(FriendshipStatus::Confirmed),
            other => Err(AppError::DatabaseError(format!(
                "Unknown friendship status '{}'",
                other
            ))),
        }
    }
}

/// Directed edge from requester to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friendship {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: FriendshipStatus,
}

impl Friendship {
    pub fn pending(user_id: UserId, friend_id: UserId) -> Self {
        Self {
            user_id,
            friend_id,
            status: FriendshipStatus::Unconfirmed,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == FriendshipStatus::Confirmed
    }

    /// The other endpoint, if `user` is incident to this edge
    pub fn other_end(&self, user: UserId) -> Option<UserId> {
        if self.user_id == user {
            Some(self.friend_id)
        } else if self.friend_id == user {
            Some(self.user_id)
        } else {
            None
        }
    }
}
