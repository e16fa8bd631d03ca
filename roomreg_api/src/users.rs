use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use roomreg_models::{
    user::{Role, TelegramId, User, parse_timezone},
    working_time::WorkingTime,
};
use roomreg_storage::UserUpsert;
use serde::Deserialize;

use crate::{ApiError, ApiState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsertUserRequest {
    telegram_id: Option<TelegramId>,
    display_name: Option<String>,
    timezone: Option<String>,
    working_hours_start: Option<String>,
    working_hours_end: Option<String>,
    role: Option<String>,
}

impl UpsertUserRequest {
    fn into_upsert(self) -> Result<UserUpsert, ApiError> {
        let telegram_id = self
            .telegram_id
            .ok_or_else(|| ApiError::BadRequest("telegramId is required".to_string()))?;

        let timezone = self
            .timezone
            .map(|name| parse_timezone(&name))
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("Invalid timezone: {e}")))?;

        let working_hours_start = parse_time(self.working_hours_start)?;
        let working_hours_end = parse_time(self.working_hours_end)?;

        let role = self
            .role
            .map(|role| role.parse::<Role>())
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("Invalid user role: {e}")))?;

        Ok(UserUpsert {
            telegram_id,
            display_name: self.display_name,
            timezone,
            working_hours_start,
            working_hours_end,
            role,
        })
    }
}

fn parse_time(value: Option<String>) -> Result<Option<WorkingTime>, ApiError> {
    value
        .map(|time| time.parse::<WorkingTime>())
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid time format. Use HH:MM".to_string()))
}

pub(crate) async fn upsert_user(
    State(state): State<ApiState>,
    payload: Result<Json<UpsertUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(request) = payload?;
    let upsert = request.into_upsert()?;

    let user = state.users.upsert_user(upsert).await?;
    Ok(Json(user))
}

pub(crate) async fn get_user(
    State(state): State<ApiState>,
    Path(telegram_id): Path<TelegramId>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .get_user(telegram_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User not found"))
}
