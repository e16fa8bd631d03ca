use std::net::SocketAddr;

use serde::Deserialize;
use url::Url;

use crate::user::TelegramId;

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    pub token: String,
    /// The only identity allowed to run room administration commands.
    pub admin_id: TelegramId,
    pub web_app_url: Option<Url>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSettings {
    pub listen: SocketAddr,
}

/// Remote REST store used by the bot instead of the local database.
#[derive(Deserialize, Debug, Clone)]
pub struct StoreSettings {
    pub url: Url,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub telegram: Option<TelegramSettings>,
    pub database: DatabaseSettings,
    pub api: Option<ApiSettings>,
    pub store: Option<StoreSettings>,
}
