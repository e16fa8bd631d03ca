mod appsettings;

use std::sync::Arc;

use anyhow::Context;
use roomreg_api::ApiState;
use roomreg_models::settings::Settings;
use roomreg_storage::{
    RoomStorage, UserStorage,
    http::HttpStore,
    sqlite::{self, room_storage::SqliteRoomStorage, user_storage::SqliteUserStorage},
};
use roomreg_telegram::{BotConfig, TelegramInteractionInterface, teloxide::Bot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Stores {
    users: Arc<dyn UserStorage>,
    rooms: Arc<dyn RoomStorage>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load().context("Failed to load appsettings")?;

    if settings.telegram.is_none() && settings.api.is_none() {
        log::warn!("Neither [telegram] nor [api] is configured, nothing to run");
        return Ok(());
    }

    let local = if needs_database(&settings) {
        Some(local_stores(&settings.database.url).await?)
    } else {
        None
    };

    let shutdown = CancellationToken::new();
    let api = settings.api.as_ref().zip(local.as_ref()).map(|(api, stores)| {
        let state = ApiState {
            users: stores.users.clone(),
            rooms: stores.rooms.clone(),
        };
        tokio::spawn(roomreg_api::serve(api.listen, state, shutdown.clone()))
    });

    let work = async {
        let Some(telegram) = &settings.telegram else {
            log::info!("Telegram is not configured, serving the store API only");
            tokio::signal::ctrl_c().await?;
            return Ok(());
        };

        let stores = match (&settings.store, local) {
            (Some(store), _) => {
                log::info!("Bot uses the remote store at {}", store.url);
                let http = Arc::new(HttpStore::new(store.url.clone())?);
                Stores {
                    users: http.clone(),
                    rooms: http,
                }
            }
            (None, Some(local)) => local,
            (None, None) => anyhow::bail!("Bot has neither a local database nor a remote store"),
        };

        let bot = Bot::new(telegram.token.clone());
        TelegramInteractionInterface::start(bot, stores.users, stores.rooms, BotConfig::from(telegram))
            .await;
        Ok(())
    };

    run_alongside_api(api, shutdown, work).await
}

/// The API always serves the local database. The bot uses it unless a remote
/// `[store]` is configured.
fn needs_database(settings: &Settings) -> bool {
    settings.api.is_some() || (settings.telegram.is_some() && settings.store.is_none())
}

async fn local_stores(url: &str) -> anyhow::Result<Stores> {
    let pool = sqlite::connect(url).await?;
    Ok(Stores {
        users: Arc::new(SqliteUserStorage::new(pool.clone())),
        rooms: Arc::new(SqliteRoomStorage::new(pool)),
    })
}

/// Runs `work` next to the API task. An API failure is returned as soon as it
/// happens; otherwise the API is shut down once `work` is done.
async fn run_alongside_api(
    api: Option<JoinHandle<anyhow::Result<()>>>,
    shutdown: CancellationToken,
    work: impl Future<Output = anyhow::Result<()>>,
) -> anyhow::Result<()> {
    let Some(mut api) = api else {
        return work.await;
    };

    tokio::select! {
        result = &mut api => {
            shutdown.cancel();
            result?.context("Store API failed")?;
            anyhow::bail!("Store API stopped unexpectedly")
        }
        result = work => {
            shutdown.cancel();
            api.await??;
            result
        }
    }
}
