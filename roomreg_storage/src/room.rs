use async_trait::async_trait;
use roomreg_models::{
    room::{ChatMessage, ChatRoom, RoomId},
    user::TelegramId,
};
use serde::Serialize;

use crate::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub creator_id: TelegramId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub user_id: TelegramId,
    pub chat_room_id: RoomId,
    pub text: String,
}

#[async_trait]
pub trait RoomStorage: Send + Sync {
    async fn create_room(&self, room: NewRoom) -> Result<ChatRoom, StorageError>;

    /// All rooms, or only the rooms `member` belongs to.
    async fn list_rooms(&self, member: Option<TelegramId>) -> Result<Vec<ChatRoom>, StorageError>;

    /// Adding an existing member again is a no-op.
    async fn add_member(&self, room_id: RoomId, telegram_id: TelegramId)
    -> Result<(), StorageError>;

    async fn post_message(&self, message: NewMessage) -> Result<ChatMessage, StorageError>;
    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StorageError>;

    async fn find_room_by_name(&self, name: &str) -> Result<Option<ChatRoom>, StorageError> {
        let rooms = self.list_rooms(None).await?;
        Ok(rooms.into_iter().find(|room| room.name == name))
    }
}
