use std::sync::Arc;

use roomreg_models::user::Role;
use roomreg_storage::UserStorage;
use teloxide::{
    dispatching::UpdateHandler,
    dptree::case,
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
        KeyboardRemove, WebAppInfo,
    },
};

use crate::{
    BotConfig, GlobalDialogue, GlobalState, HandlerResult,
    conversation::{self, Keyboard, Outcome, Turn},
    registration::RegistrationState,
};

/// `/start` from any state. An unfinished registration is dropped and the
/// entry point is evaluated from scratch.
pub(crate) async fn start(
    bot: Bot,
    dialogue: GlobalDialogue,
    msg: Message,
    users: Arc<dyn UserStorage>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let turn = conversation::start(users.as_ref(), config.web_app_url.as_ref(), msg.chat.id.0).await;
    apply(&bot, &dialogue, turn).await
}

async fn receive_answer(
    bot: Bot,
    dialogue: GlobalDialogue,
    msg: Message,
    state: RegistrationState,
    users: Arc<dyn UserStorage>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let input = msg.text().filter(|text| !text.starts_with('/'));

    let turn = conversation::receive(
        users.as_ref(),
        config.web_app_url.as_ref(),
        state,
        msg.chat.id.0,
        input,
    )
    .await;
    apply(&bot, &dialogue, turn).await
}

async fn apply(bot: &Bot, dialogue: &GlobalDialogue, turn: Turn) -> HandlerResult {
    match turn.next {
        Outcome::Continue(state) => dialogue.update(GlobalState::Registering(state)).await?,
        Outcome::Exit => dialogue.exit().await?,
    }

    for reply in turn.replies {
        let request = bot.send_message(dialogue.chat_id(), reply.text);
        match reply.keyboard {
            None => request.await?,
            Some(Keyboard::Roles) => request.reply_markup(roles_keyboard()).await?,
            Some(Keyboard::Remove) => request.reply_markup(KeyboardRemove::new()).await?,
            Some(Keyboard::Launcher(url)) => {
                let button = InlineKeyboardButton::web_app("Open the app", WebAppInfo { url });
                request
                    .reply_markup(InlineKeyboardMarkup::new(vec![vec![button]]))
                    .await?
            }
        };
    }

    Ok(())
}

fn roles_keyboard() -> KeyboardMarkup {
    let buttons = Role::ALL
        .into_iter()
        .map(|role| KeyboardButton::new(role.label()))
        .collect::<Vec<_>>();

    KeyboardMarkup::new(vec![buttons])
}

pub(super) fn schema() -> UpdateHandler<anyhow::Error> {
    case![GlobalState::Registering(state)].endpoint(receive_answer)
}
