use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use roomreg_models::{
    room::{ChatMessage, RoomId},
    user::TelegramId,
};
use roomreg_storage::NewMessage;
use serde::Deserialize;

use crate::{ApiError, ApiState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostMessageRequest {
    user_id: Option<TelegramId>,
    chat_room_id: Option<RoomId>,
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesQuery {
    room_id: Option<RoomId>,
}

pub(crate) async fn post_message(
    State(state): State<ApiState>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let Json(request) = payload?;

    let (Some(user_id), Some(chat_room_id), Some(text)) =
        (request.user_id, request.chat_room_id, request.text)
    else {
        return Err(ApiError::BadRequest(
            "userId, chatRoomId and text are required".to_string(),
        ));
    };

    let message = state
        .rooms
        .post_message(NewMessage {
            user_id,
            chat_room_id,
            text,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub(crate) async fn list_messages(
    State(state): State<ApiState>,
    query: Result<Query<ListMessagesQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let Query(query) = query?;
    let room_id = query
        .room_id
        .ok_or_else(|| ApiError::BadRequest("roomId is required".to_string()))?;

    let messages = state.rooms.list_messages(room_id).await?;
    Ok(Json(messages))
}
