use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{not_found, require};
use crate::core::friendship::mutual_friends;
use crate::core::FriendshipOutcome;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Storage;
use crate::models::{User, UserId};

#[derive(Clone)]
pub struct UserRepository {
    storage: Arc<dyn Storage>,
}

impl UserRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    #[instrument(skip(self, user), fields(login = %user.login))]
    pub async fn create(&self, user: User) -> AppResult<User> {
        if let Some(id) = user.id {
            if self.storage.user_exists(id).await? {
                warn!(user_id = id, "rejected create with an id in use");
                return Err(AppError::Conflict(format!("User {} already exists", id)));
            }
        }
        let created = self.storage.create_user(user).await?;
        info!(user_id = ?created.id, "user created");
        Ok(created)
    }

    pub async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        self.storage.get_user(id).await
    }

    pub async fn get(&self, id: UserId) -> AppResult<User> {
        require(self.find_by_id(id).await?, "User", id)
    }

    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        self.storage.get_all_users().await
    }

    #[instrument(skip(self, user))]
    pub async fn update(&self, id: UserId, user: User) -> AppResult<User> {
        match self.storage.update_user(id, user).await? {
            Some(updated) => {
                info!(user_id = id, "user updated");
                Ok(updated)
            }
            None => {
                warn!(user_id = id, "update of unknown user");
                Err(not_found("User", id))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> AppResult<bool> {
        let removed = self.storage.delete_user(id).await?;
        if removed {
            info!(user_id = id, "user deleted");
        }
        Ok(removed)
    }

    async fn ensure_users(&self, ids: &[UserId]) -> AppResult<()> {
        for &id in ids {
            if !self.storage.user_exists(id).await? {
                return Err(not_found("User", id));
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn request_friend(
        &self,
        id: UserId,
        friend_id: UserId,
    ) -> AppResult<FriendshipOutcome> {
        if id == friend_id {
            return Err(AppError::InvalidArgument(format!(
                "User {} cannot befriend itself",
                id
            )));
        }
        self.ensure_users(&[id, friend_id]).await?;

        let outcome = self.storage.request_friend(id, friend_id).await?;
        match outcome {
            FriendshipOutcome::Unchanged => {
                warn!(user_id = id, friend_id, "friend request changed nothing")
            }
            _ => info!(user_id = id, friend_id, ?outcome, "friend request applied"),
        }
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn remove_friend(&self, id: UserId, friend_id: UserId) -> AppResult<bool> {
        self.ensure_users(&[id, friend_id]).await?;
        let removed = self.storage.remove_friend(id, friend_id).await?;
        if removed {
            info!(user_id = id, friend_id, "friendship removed");
        }
        Ok(removed)
    }

    /// Users joined to `id` by a confirmed edge, ascending by id
    pub async fn list_friends(&self, id: UserId) -> AppResult<Vec<User>> {
        self.ensure_users(&[id]).await?;
        let ids = self.storage.confirmed_friend_ids(id).await?;
        self.storage.get_users(&ids).await
    }

    pub async fn list_mutual_friends(&self, id: UserId, other_id: UserId) -> AppResult<Vec<User>> {
        self.ensure_users(&[id, other_id]).await?;
        let mine = self.storage.confirmed_friend_ids(id).await?;
        let theirs = self.storage.confirmed_friend_ids(other_id).await?;
        self.storage.get_users(&mutual_friends(&mine, &theirs)).await
    }
}
