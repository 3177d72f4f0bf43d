use crate::{EngineError, Message, ResultEngine, util::parse_uuid};

use super::Engine;

impl Engine {
    /// Return a message by id.
    pub async fn message_by_id(&self, id: &str) -> ResultEngine<Message> {
        let uuid = parse_uuid(id, "message")?;
        self.find_message_by_id(self.database.as_ref(), uuid)
            .await?
            .ok_or_else(|| EngineError::MessageNotFound(id.to_string()))
    }

    /// Messages addressed to `username`.
    ///
    /// Fails with `UserNotFound` when nobody is registered under that name.
    /// Results come back in store order (insertion order on SQLite), not
    /// sorted by `sent_at`.
    pub async fn messages_to(&self, username: &str) -> ResultEngine<Vec<Message>> {
        self.user_by_username(username).await?;
        self.find_messages_to(self.database.as_ref(), username).await
    }

    /// Every message, in store order.
    pub async fn messages(&self) -> ResultEngine<Vec<Message>> {
        self.find_messages(self.database.as_ref()).await
    }
}
