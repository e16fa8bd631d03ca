use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use roomreg_models::{
    room::{ChatRoom, RoomId},
    user::TelegramId,
};
use roomreg_storage::NewRoom;
use serde::Deserialize;

use crate::{ApiError, ApiState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRoomRequest {
    creator_id: Option<TelegramId>,
    name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ListRoomsQuery {
    member: Option<TelegramId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddMemberRequest {
    telegram_id: Option<TelegramId>,
}

pub(crate) async fn create_room(
    State(state): State<ApiState>,
    payload: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatRoom>), ApiError> {
    let Json(request) = payload?;

    let creator_id = request
        .creator_id
        .ok_or_else(|| ApiError::BadRequest("creatorId is required".to_string()))?;
    let name = request
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Room name is required".to_string()))?;

    let room = state.rooms.create_room(NewRoom { creator_id, name }).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub(crate) async fn list_rooms(
    State(state): State<ApiState>,
    query: Result<Query<ListRoomsQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatRoom>>, ApiError> {
    let Query(query) = query?;

    let rooms = state.rooms.list_rooms(query.member).await?;
    Ok(Json(rooms))
}

pub(crate) async fn add_member(
    State(state): State<ApiState>,
    Path(room_id): Path<RoomId>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    let telegram_id = request
        .telegram_id
        .ok_or_else(|| ApiError::BadRequest("telegramId is required".to_string()))?;

    state.rooms.add_member(room_id, telegram_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
