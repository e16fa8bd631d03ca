use async_trait::async_trait;
use roomreg_models::{
    chrono_tz,
    user::{Role, TelegramId, User},
    working_time::WorkingTime,
};
use serde::Serialize;

use crate::StorageError;

/// Create-or-update request keyed on `telegram_id`. Fields left as `None`
/// keep whatever the store already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub telegram_id: TelegramId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<chrono_tz::Tz>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours_start: Option<WorkingTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_hours_end: Option<WorkingTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpsert {
    pub fn new(telegram_id: TelegramId) -> Self {
        Self {
            telegram_id,
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Atomic with respect to concurrent upserts of the same `telegram_id`.
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User, StorageError>;
    async fn get_user(&self, telegram_id: TelegramId) -> Result<Option<User>, StorageError>;
}
