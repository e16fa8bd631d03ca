mod error;
pub mod http;
mod room;
pub mod sqlite;
mod user;

pub use error::StorageError;
pub use room::{NewMessage, NewRoom, RoomStorage};
pub use user::{UserStorage, UserUpsert};
