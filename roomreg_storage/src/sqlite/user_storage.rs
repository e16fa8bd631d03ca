mod model;

use async_trait::async_trait;
use model::UserStorageModel;
use roomreg_models::user::{TelegramId, User};

use crate::{StorageError, UserStorage, UserUpsert};

pub struct SqliteUserStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteUserStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStorage for SqliteUserStorage {
    async fn upsert_user(&self, upsert: UserUpsert) -> Result<User, StorageError> {
        let UserUpsert {
            telegram_id,
            display_name,
            timezone,
            working_hours_start,
            working_hours_end,
            role,
        } = upsert;
        let timezone = timezone.map(|tz| tz.name());
        let working_hours_start = working_hours_start.map(|time| time.to_string());
        let working_hours_end = working_hours_end.map(|time| time.to_string());
        let role = role.map(|role| role.token());

        // Single statement, so two upserts of one telegram_id can never both insert.
        let user = sqlx::query_as::<_, UserStorageModel>(
            "
INSERT INTO users (telegram_id, display_name, timezone, working_hours_start, working_hours_end, role)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT (telegram_id) DO UPDATE
SET display_name = COALESCE(excluded.display_name, users.display_name),
    timezone = COALESCE(excluded.timezone, users.timezone),
    working_hours_start = COALESCE(excluded.working_hours_start, users.working_hours_start),
    working_hours_end = COALESCE(excluded.working_hours_end, users.working_hours_end),
    role = COALESCE(excluded.role, users.role)
RETURNING *
",
        )
        .bind(telegram_id)
        .bind(display_name)
        .bind(timezone)
        .bind(working_hours_start)
        .bind(working_hours_end)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        log::info!("Upserted user {telegram_id}");
        Ok(user.into())
    }

    async fn get_user(&self, telegram_id: TelegramId) -> Result<Option<User>, StorageError> {
        let user = sqlx::query_as::<_, UserStorageModel>("SELECT * FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(Into::into))
    }
}
