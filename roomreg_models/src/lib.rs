pub mod room;
pub mod settings;
pub mod user;
pub mod working_time;

pub use chrono;
pub use chrono_tz;
