use crate::{
    EngineError, ResultEngine, User,
    util::{normalize_required_name, parse_uuid, validate_username},
};

use super::Engine;

impl Engine {
    /// Register a new user with the configured initial budget.
    ///
    /// The lookup before the insert only spares a round-trip in the common
    /// case. Uniqueness is enforced by the unique index on
    /// `users.username`: when two registrations race, the loser's insert
    /// fails and is reported as `UsernameTaken` too.
    pub async fn register_user(&self, username: &str, name: &str) -> ResultEngine<User> {
        validate_username(username)?;
        let name = normalize_required_name(name)?;

        if self
            .find_user_by_username(self.database.as_ref(), username)
            .await?
            .is_some()
        {
            return Err(EngineError::UsernameTaken(username.to_string()));
        }

        let user = User::new(username.to_string(), name, self.initial_budget);
        let stored = self.insert_user(self.database.as_ref(), &user).await?;
        tracing::info!(username = %stored.username, id = %stored.id, "registered user");
        Ok(stored)
    }

    /// Return the user registered under `username`.
    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        self.find_user_by_username(self.database.as_ref(), username)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(username.to_string()))
    }

    /// Return the user with the given id.
    pub async fn user_by_id(&self, id: &str) -> ResultEngine<User> {
        let uuid = parse_uuid(id, "user")?;
        self.find_user_by_id(self.database.as_ref(), uuid)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(id.to_string()))
    }

    /// Every registered user, in store order.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        self.find_users(self.database.as_ref()).await
    }
}
