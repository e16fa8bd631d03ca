use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use roomreg_models::{
    chrono::NaiveDateTime,
    room::{ChatMessage, ChatRoom, RoomId},
    user::{TelegramId, User},
};
use roomreg_storage::{
    NewMessage, NewRoom, RoomStorage, StorageError, UserStorage, UserUpsert,
};

/// In-memory store that records every call it receives.
#[derive(Default)]
pub struct FakeStore {
    pub calls: AtomicUsize,
    unavailable: AtomicBool,
    users: Mutex<Vec<User>>,
    upserts: Mutex<Vec<UserUpsert>>,
    rooms: Mutex<Vec<ChatRoom>>,
    members: Mutex<Vec<(RoomId, TelegramId)>>,
}

impl FakeStore {
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.store(true, Ordering::SeqCst);
        store
    }

    pub fn with_user(upsert: UserUpsert) -> Self {
        let store = Self::default();
        store.merge(upsert);
        store
    }

    pub fn with_room(self, name: &str) -> Self {
        let mut rooms = self.rooms.lock().unwrap();
        let id = rooms.len() as RoomId + 1;
        rooms.push(ChatRoom {
            id,
            name: name.to_string(),
            creator_id: 1,
        });
        drop(rooms);
        self
    }

    pub fn upserts(&self) -> Vec<UserUpsert> {
        self.upserts.lock().unwrap().clone()
    }

    pub fn rooms(&self) -> Vec<ChatRoom> {
        self.rooms.lock().unwrap().clone()
    }

    pub fn members(&self) -> Vec<(RoomId, TelegramId)> {
        self.members.lock().unwrap().clone()
    }

    fn call(&self) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn merge(&self, upsert: UserUpsert) -> User {
        let mut users = self.users.lock().unwrap();
        let index = match users
            .iter()
            .position(|user| user.telegram_id == upsert.telegram_id)
        {
            Some(index) => index,
            None => {
                let id = users.len() as i64 + 1;
                users.push(User {
                    id,
                    telegram_id: upsert.telegram_id,
                    display_name: None,
                    timezone: None,
                    working_hours_start: None,
                    working_hours_end: None,
                    role: None,
                    created_at: NaiveDateTime::default(),
                });
                users.len() - 1
            }
        };

        let user = &mut users[index];
        user.display_name = upsert.display_name.or(user.display_name.take());
        user.timezone = upsert.timezone.or(user.timezone);
        user.working_hours_start = upsert.working_hours_start.or(user.working_hours_start);
        user.working_hours_end = upsert.working_hours_end.or(user.working_hours_end);
        user.role = upsert.role.or(user.role);
        user.clone()
    }
}

#[async_trait]
impl UserStorage for FakeStore {
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User, StorageError> {
        self.call()?;
        self.upserts.lock().unwrap().push(upsert.clone());
        Ok(self.merge(upsert))
    }

    async fn get_user(&self, telegram_id: TelegramId) -> Result<Option<User>, StorageError> {
        self.call()?;
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|user| user.telegram_id == telegram_id)
            .cloned())
    }
}

#[async_trait]
impl RoomStorage for FakeStore {
    async fn create_room(&self, room: NewRoom) -> Result<ChatRoom, StorageError> {
        self.call()?;
        let mut rooms = self.rooms.lock().unwrap();
        if rooms.iter().any(|existing| existing.name == room.name) {
            return Err(StorageError::DuplicateName(room.name));
        }

        let room = ChatRoom {
            id: rooms.len() as RoomId + 1,
            name: room.name,
            creator_id: room.creator_id,
        };
        rooms.push(room.clone());
        Ok(room)
    }

    async fn list_rooms(&self, member: Option<TelegramId>) -> Result<Vec<ChatRoom>, StorageError> {
        self.call()?;
        let members = self.members.lock().unwrap();
        let rooms = self.rooms.lock().unwrap();
        Ok(rooms
            .iter()
            .filter(|room| member.is_none_or(|member| members.contains(&(room.id, member))))
            .cloned()
            .collect())
    }

    async fn add_member(
        &self,
        room_id: RoomId,
        telegram_id: TelegramId,
    ) -> Result<(), StorageError> {
        self.call()?;
        if !self.rooms.lock().unwrap().iter().any(|room| room.id == room_id) {
            return Err(StorageError::NotFound(format!("room {room_id}")));
        }
        if !self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|user| user.telegram_id == telegram_id)
        {
            return Err(StorageError::NotFound(format!("user {telegram_id}")));
        }

        let mut members = self.members.lock().unwrap();
        if !members.contains(&(room_id, telegram_id)) {
            members.push((room_id, telegram_id));
        }
        Ok(())
    }

    async fn post_message(&self, message: NewMessage) -> Result<ChatMessage, StorageError> {
        self.call()?;
        Err(StorageError::Rejected(format!(
            "messages are not kept by the fake store: {message:?}"
        )))
    }

    async fn list_messages(&self, _room_id: RoomId) -> Result<Vec<ChatMessage>, StorageError> {
        self.call()?;
        Ok(Vec::new())
    }
}
