use roomreg_models::{
    chrono::NaiveDateTime,
    user::{User, parse_timezone},
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserStorageModel {
    pub id: i64,
    pub telegram_id: i64,
    pub display_name: Option<String>,
    pub timezone: Option<String>,
    pub working_hours_start: Option<String>,
    pub working_hours_end: Option<String>,
    pub role: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<UserStorageModel> for User {
    fn from(value: UserStorageModel) -> Self {
        let telegram_id = value.telegram_id;
        let timezone = value.timezone.and_then(|tz| {
            parse_timezone(&tz)
                .inspect_err(|e| log::warn!("User {telegram_id} has a stored {e}, ignoring it"))
                .ok()
        });

        Self {
            id: value.id,
            telegram_id,
            display_name: value.display_name,
            timezone,
            working_hours_start: parse_stored(telegram_id, value.working_hours_start),
            working_hours_end: parse_stored(telegram_id, value.working_hours_end),
            role: parse_stored(telegram_id, value.role),
            created_at: value.created_at,
        }
    }
}

fn parse_stored<T>(telegram_id: i64, stored: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    stored.and_then(|text| {
        text.parse()
            .inspect_err(|e| log::warn!("User {telegram_id} has an invalid stored value: {e}"))
            .ok()
    })
}
