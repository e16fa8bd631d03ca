use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::user::TelegramId;

pub type RoomId = i64;
pub type MessageId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRoom {
    pub id: RoomId,
    pub name: String,
    pub creator_id: TelegramId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_room_id: RoomId,
    pub user_id: TelegramId,
    pub text: String,
    pub sent_at: NaiveDateTime,
}
