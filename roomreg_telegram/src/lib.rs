mod conversation;
mod register_user;
pub mod registration;
mod rooms;

#[cfg(test)]
mod test_utils;

pub use teloxide;

use std::sync::Arc;

use roomreg_models::{settings::TelegramSettings, user::TelegramId};
use roomreg_storage::{RoomStorage, UserStorage};
use teloxide::{
    dispatching::{
        UpdateHandler,
        dialogue::{self, InMemStorage},
    },
    dptree::case,
    prelude::*,
    utils::command::BotCommands,
};
use url::Url;

use registration::RegistrationState;

type GlobalDialogue = Dialogue<GlobalState, InMemStorage<GlobalState>>;
type HandlerResult = anyhow::Result<()>;

const INVALID_STATE: &str =
    "I don't know what to do with that. Use /start to register or /help to see the commands.";
const CANCELLED: &str = "Cancelled current operation.";

#[derive(Default, Clone, Debug, PartialEq, Eq)]
enum GlobalState {
    #[default]
    Idle,
    Registering(RegistrationState),
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub admin_id: TelegramId,
    pub web_app_url: Option<Url>,
}

impl BotConfig {
    fn is_admin(&self, telegram_id: TelegramId) -> bool {
        telegram_id == self.admin_id
    }
}

impl From<&TelegramSettings> for BotConfig {
    fn from(settings: &TelegramSettings) -> Self {
        Self {
            admin_id: settings.admin_id,
            web_app_url: settings.web_app_url.clone(),
        }
    }
}

pub struct TelegramInteractionInterface;

impl TelegramInteractionInterface {
    pub async fn start(
        bot: teloxide::Bot,
        users: Arc<dyn UserStorage>,
        rooms: Arc<dyn RoomStorage>,
        config: BotConfig,
    ) {
        log::info!("Starting Telegram UI.");

        if let Err(e) = bot.set_my_commands(GlobalCommand::bot_commands()).await {
            log::error!("Failed to register bot commands: {e}");
        }

        Dispatcher::builder(bot, schema())
            .dependencies(dptree::deps![
                InMemStorage::<GlobalState>::new(),
                users,
                rooms,
                Arc::new(config)
            ])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    }
}

/// Commands win over the dialogue state, so `/start` and `/cancel` work in the
/// middle of a registration.
fn schema() -> UpdateHandler<anyhow::Error> {
    let command_handler = teloxide::filter_command::<GlobalCommand, _>()
        .branch(case![GlobalCommand::Start].endpoint(register_user::start))
        .branch(case![GlobalCommand::Help].endpoint(help))
        .branch(case![GlobalCommand::Cancel].endpoint(cancel))
        .branch(case![GlobalCommand::CreateRoom(name)].endpoint(rooms::create_room))
        .branch(case![GlobalCommand::AddUserToRoom(args)].endpoint(rooms::add_user_to_room))
        .branch(case![GlobalCommand::ListRooms].endpoint(rooms::list_rooms));

    dialogue::enter::<Update, InMemStorage<GlobalState>, GlobalState, _>().branch(
        Update::filter_message()
            .branch(command_handler)
            .branch(register_user::schema())
            .branch(dptree::endpoint(invalid_state)),
    )
}

async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GlobalCommand::descriptions().to_string())
        .await?;
    Ok(())
}

async fn cancel(bot: Bot, dialogue: GlobalDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, CANCELLED).await?;
    dialogue.exit().await?;
    Ok(())
}

async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, INVALID_STATE).await?;
    Ok(())
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "snake_case",
    description = "These commands are supported:"
)]
enum GlobalCommand {
    #[command(description = "register or open the app.")]
    Start,
    #[command(description = "show this text.")]
    Help,
    #[command(description = "create a room (admin only).")]
    CreateRoom(String),
    #[command(description = "add a user to a room (admin only).")]
    AddUserToRoom(String),
    #[command(description = "list the rooms you are a member of.")]
    ListRooms,
    #[command(description = "cancel the current operation.")]
    Cancel,
}
