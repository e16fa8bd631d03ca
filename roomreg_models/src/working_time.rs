use std::{fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a time of day as HH:MM, got {0:?}")]
pub struct TimeParseError(String);

/// Time of day with minute granularity, written as zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkingTime(NaiveTime);

impl WorkingTime {
    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hours, minutes, 0).map(Self)
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl FromStr for WorkingTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeParseError(s.to_string());

        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        let hours = two_digits(hours).ok_or_else(invalid)?;
        let minutes = two_digits(minutes).ok_or_else(invalid)?;

        Self::from_hm(hours, minutes).ok_or_else(invalid)
    }
}

fn two_digits(part: &str) -> Option<u32> {
    match part.as_bytes() {
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
            Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
        }
        _ => None,
    }
}

impl fmt::Display for WorkingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for WorkingTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkingTime> for String {
    fn from(value: WorkingTime) -> Self {
        value.to_string()
    }
}
