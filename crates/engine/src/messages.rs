//! Message primitives.
//!
//! A `Message` is append-only: once persisted it is never updated or
//! deleted. In storage the `from`/`to` usernames live in the `sender` and
//! `recipient` columns.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Build a new message stamped with a fresh id and the current instant.
    pub fn new(from: String, to: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            body,
            sent_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender: String,
    pub recipient: String,
    pub body: String,
    pub sent_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Message> for ActiveModel {
    fn from(message: &Message) -> Self {
        Self {
            id: ActiveValue::Set(message.id.to_string()),
            sender: ActiveValue::Set(message.from.clone()),
            recipient: ActiveValue::Set(message.to.clone()),
            body: ActiveValue::Set(message.body.clone()),
            sent_at: ActiveValue::Set(message.sent_at),
        }
    }
}

impl TryFrom<Model> for Message {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "message")?,
            from: model.sender,
            to: model.recipient,
            body: model.body,
            sent_at: model.sent_at,
        })
    }
}
