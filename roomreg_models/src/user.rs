use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::working_time::WorkingTime;

pub type UserId = i64;
pub type TelegramId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timezone {0:?}")]
pub struct UnknownTimezone(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(String);

/// Looks a name up in the IANA timezone database ignoring ASCII case, so
/// `europe/moscow` resolves to `Europe/Moscow`.
pub fn parse_timezone(name: &str) -> Result<chrono_tz::Tz, UnknownTimezone> {
    chrono_tz::Tz::from_str_insensitive(name).map_err(|_| UnknownTimezone(name.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Customer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Developer, Role::Customer];

    /// Human readable label, also used as keyboard button text.
    pub fn label(self) -> &'static str {
        match self {
            Role::Developer => "Developer",
            Role::Customer => "Customer",
        }
    }

    /// Stored and wire representation.
    pub fn token(self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.token().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub telegram_id: TelegramId,
    pub display_name: Option<String>,
    pub timezone: Option<chrono_tz::Tz>,
    pub working_hours_start: Option<WorkingTime>,
    pub working_hours_end: Option<WorkingTime>,
    pub role: Option<Role>,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn has_display_name(&self) -> bool {
        self.display_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}
