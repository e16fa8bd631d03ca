use roomreg_models::{
    chrono::NaiveDateTime,
    room::{ChatMessage, ChatRoom},
};

#[derive(sqlx::FromRow)]
pub struct RoomStorageModel {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
}

impl From<RoomStorageModel> for ChatRoom {
    fn from(value: RoomStorageModel) -> Self {
        Self {
            id: value.id,
            name: value.name,
            creator_id: value.creator_id,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct MessageStorageModel {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub text: String,
    pub sent_at: NaiveDateTime,
}

impl From<MessageStorageModel> for ChatMessage {
    fn from(value: MessageStorageModel) -> Self {
        Self {
            id: value.id,
            chat_room_id: value.room_id,
            user_id: value.user_id,
            text: value.text,
            sent_at: value.sent_at,
        }
    }
}
