//! Client for the REST store served by `roomreg_api`.
//!
//! `404`, `409` and `400` keep their meaning; every other failure to reach
//! the store collapses into [`StorageError::Unavailable`]. Error bodies are
//! only read for their `message` field.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use roomreg_models::{
    room::{ChatMessage, ChatRoom, RoomId},
    user::{TelegramId, User},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{NewMessage, NewRoom, RoomStorage, StorageError, UserStorage, UserUpsert};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberBody {
    telegram_id: TelegramId,
}

pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(base_url: Url) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // Url::join drops the last path segment unless it ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, StorageError> {
        self.base_url
            .join(path)
            .map_err(|e| StorageError::Unavailable(format!("invalid store url: {e}")))
    }
}

async fn error_from(response: Response) -> StorageError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    };

    match status {
        StatusCode::NOT_FOUND => {
            let what = message.strip_suffix(" not found").unwrap_or(&message);
            StorageError::NotFound(what.to_string())
        }
        StatusCode::CONFLICT => StorageError::DuplicateName(message),
        StatusCode::BAD_REQUEST => StorageError::Rejected(message),
        _ => StorageError::Unavailable(message),
    }
}

async fn ensure_success(response: Response) -> Result<Response, StorageError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from(response).await)
    }
}

#[async_trait]
impl UserStorage for HttpStore {
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User, StorageError> {
        let response = self
            .client
            .post(self.endpoint("users")?)
            .json(&upsert)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn get_user(&self, telegram_id: TelegramId) -> Result<Option<User>, StorageError> {
        let response = self
            .client
            .get(self.endpoint(&format!("users/{telegram_id}"))?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(ensure_success(response).await?.json().await?))
    }
}

#[async_trait]
impl RoomStorage for HttpStore {
    async fn create_room(&self, room: NewRoom) -> Result<ChatRoom, StorageError> {
        let response = self
            .client
            .post(self.endpoint("rooms")?)
            .json(&room)
            .send()
            .await?;

        match ensure_success(response).await {
            Ok(response) => Ok(response.json().await?),
            Err(StorageError::DuplicateName(_)) => Err(StorageError::DuplicateName(room.name)),
            Err(e) => Err(e),
        }
    }

    async fn list_rooms(&self, member: Option<TelegramId>) -> Result<Vec<ChatRoom>, StorageError> {
        let mut request = self.client.get(self.endpoint("rooms")?);
        if let Some(telegram_id) = member {
            request = request.query(&[("member", telegram_id)]);
        }

        Ok(ensure_success(request.send().await?).await?.json().await?)
    }

    async fn add_member(
        &self,
        room_id: RoomId,
        telegram_id: TelegramId,
    ) -> Result<(), StorageError> {
        let response = self
            .client
            .post(self.endpoint(&format!("rooms/{room_id}/members"))?)
            .json(&MemberBody { telegram_id })
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn post_message(&self, message: NewMessage) -> Result<ChatMessage, StorageError> {
        let response = self
            .client
            .post(self.endpoint("messages")?)
            .json(&message)
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<ChatMessage>, StorageError> {
        let response = self
            .client
            .get(self.endpoint("messages")?)
            .query(&[("roomId", room_id)])
            .send()
            .await?;

        Ok(ensure_success(response).await?.json().await?)
    }
}
