//! Typed store access.
//!
//! One method per record shape and lookup; callers never pick a table at
//! runtime. Every helper takes the connection explicitly so it can run either
//! on the shared pool or inside a transaction.

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, SqlErr, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, Message, ResultEngine, User, messages, users};

use super::Engine;

impl Engine {
    /// Insert a user and return the stored row.
    ///
    /// A duplicate key on `users.username` surfaces as `UsernameTaken`.
    pub(super) async fn insert_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user: &User,
    ) -> ResultEngine<User> {
        let model = users::ActiveModel::from(user)
            .insert(db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::UsernameTaken(user.username.clone())
                }
                _ => EngineError::from(err),
            })?;
        User::try_from(model)
    }

    pub(super) async fn insert_message<C: ConnectionTrait>(
        &self,
        db: &C,
        message: &Message,
    ) -> ResultEngine<Message> {
        let model = messages::ActiveModel::from(message).insert(db).await?;
        Message::try_from(model)
    }

    pub(super) async fn find_user_by_username<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<Option<User>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username.to_string()))
            .one(db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub(super) async fn find_user_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
    ) -> ResultEngine<Option<User>> {
        users::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    pub(super) async fn find_users<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<Vec<User>> {
        users::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    pub(super) async fn find_message_by_id<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
    ) -> ResultEngine<Option<Message>> {
        messages::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .map(Message::try_from)
            .transpose()
    }

    /// Messages addressed to `username`, in store order.
    pub(super) async fn find_messages_to<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<Vec<Message>> {
        messages::Entity::find()
            .filter(messages::Column::Recipient.eq(username.to_string()))
            .all(db)
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    pub(super) async fn find_messages<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> ResultEngine<Vec<Message>> {
        messages::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(Message::try_from)
            .collect()
    }

    /// Decrement the budget in the store and read the row back.
    ///
    /// The subtraction is evaluated by the store (`budget = budget - amount`),
    /// never from a value read here. Run it inside a transaction so the read
    /// observes exactly this write. Returns `None` when no user matched.
    pub(super) async fn decrement_budget<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
        amount: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Option<User>> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::Budget,
                Expr::col(users::Column::Budget).sub(amount),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Username.eq(username.to_string()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_user_by_username(db, username).await
    }
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::Database;

    use super::*;

    async fn engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_insert_maps_to_username_taken() {
        let engine = engine().await;
        let db = engine.database.as_ref();

        engine
            .insert_user(db, &User::new("orange".to_string(), "Orange".to_string(), 10))
            .await
            .unwrap();
        let err = engine
            .insert_user(db, &User::new("orange".to_string(), "Other".to_string(), 10))
            .await
            .unwrap_err();

        assert_eq!(err, EngineError::UsernameTaken("orange".to_string()));
        assert_eq!(engine.find_users(db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn decrement_budget_of_unknown_user_touches_nothing() {
        let engine = engine().await;
        let db = engine.database.as_ref();

        let outcome = engine
            .decrement_budget(db, "ghost", 1, Utc::now())
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
