mod model;

use async_trait::async_trait;
use model::{MessageStorageModel, RoomStorageModel};
use roomreg_models::{
    room::{ChatMessage, ChatRoom, RoomId},
    user::TelegramId,
};
use sqlx::SqliteConnection;

use crate::{NewMessage, NewRoom, RoomStorage, StorageError};

pub struct SqliteRoomStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteRoomStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

async fn ensure_room_and_user(
    conn: &mut SqliteConnection,
    room_id: RoomId,
    telegram_id: TelegramId,
) -> Result<(), StorageError> {
    let rooms = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_one(&mut *conn)
        .await?;
    if rooms == 0 {
        return Err(StorageError::NotFound(format!("room {room_id}")));
    }

    let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE telegram_id = ?")
        .bind(telegram_id)
        .fetch_one(&mut *conn)
        .await?;
    if users == 0 {
        return Err(StorageError::NotFound(format!("user {telegram_id}")));
    }

    Ok(())
}

#[async_trait]
impl RoomStorage for SqliteRoomStorage {
    async fn create_room(&self, room: NewRoom) -> Result<ChatRoom, StorageError> {
        let NewRoom { creator_id, name } = room;

        let created = sqlx::query_as::<_, RoomStorageModel>(
            "INSERT INTO rooms (name, creator_id) VALUES (?, ?) RETURNING *",
        )
        .bind(&name)
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(room) => {
                log::info!("Created room {} ({:?}) for {creator_id}", room.id, room.name);
                Ok(room.into())
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StorageError::DuplicateName(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_rooms(&self, member: Option<TelegramId>) -> Result<Vec<ChatRoom>, StorageError> {
        let rooms = match member {
            Some(telegram_id) => {
                sqlx::query_as::<_, RoomStorageModel>(
                    "
SELECT rooms.*
FROM rooms
JOIN room_members ON room_members.room_id = rooms.id
WHERE room_members.telegram_id = ?
ORDER BY rooms.id
",
                )
                .bind(telegram_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RoomStorageModel>("SELECT * FROM rooms ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rooms.into_iter().map(Into::into).collect())
    }

    async fn add_member(
        &self,
        room_id: RoomId,
        telegram_id: TelegramId,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        ensure_room_and_user(&mut *tx, room_id, telegram_id).await?;

        sqlx::query("INSERT OR IGNORE INTO room_members (room_id, telegram_id) VALUES (?, ?)")
            .bind(room_id)
            .bind(telegram_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        log::info!("Added user {telegram_id} to room {room_id}");
        Ok(())
    }

    async fn post_message(&self, message: NewMessage) -> Result<ChatMessage, StorageError> {
        let NewMessage {
            user_id,
            chat_room_id,
            text,
        } = message;

        let mut tx = self.pool.begin().await?;
        ensure_room_and_user(&mut *tx, chat_room_id, user_id).await?;

        let message = sqlx::query_as::<_, MessageStorageModel>(
            "INSERT INTO messages (room_id, user_id, text) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(chat_room_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(message.into())
    }

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StorageError> {
        let messages = sqlx::query_as::<_, MessageStorageModel>(
            "SELECT * FROM messages WHERE room_id = ? ORDER BY id",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages.into_iter().map(Into::into).collect())
    }
}
