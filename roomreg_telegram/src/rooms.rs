use std::sync::Arc;

use roomreg_models::{room::ChatRoom, user::TelegramId};
use roomreg_storage::{NewRoom, RoomStorage, StorageError};
use teloxide::prelude::*;

use crate::{BotConfig, HandlerResult};

const PERMISSION_DENIED: &str = "You don't have permission to do that.";
const CREATE_ROOM_USAGE: &str = "Please put the room name after the command: /create_room <name>";
const ADD_USER_USAGE: &str =
    "Please put the user's telegram id and the room name after the command: /add_user_to_room <telegram id> <room name>";

pub(crate) async fn create_room(
    bot: Bot,
    msg: Message,
    name: String,
    rooms: Arc<dyn RoomStorage>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let reply = create_room_reply(rooms.as_ref(), &config, msg.chat.id.0, &name).await;
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub(crate) async fn add_user_to_room(
    bot: Bot,
    msg: Message,
    args: String,
    rooms: Arc<dyn RoomStorage>,
    config: Arc<BotConfig>,
) -> HandlerResult {
    let reply = add_user_to_room_reply(rooms.as_ref(), &config, msg.chat.id.0, &args).await;
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub(crate) async fn list_rooms(
    bot: Bot,
    msg: Message,
    rooms: Arc<dyn RoomStorage>,
) -> HandlerResult {
    let reply = list_rooms_reply(rooms.as_ref(), msg.chat.id.0).await;
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn create_room_reply(
    rooms: &dyn RoomStorage,
    config: &BotConfig,
    caller: TelegramId,
    name: &str,
) -> String {
    if !config.is_admin(caller) {
        log::warn!("User {caller} tried to create a room");
        return PERMISSION_DENIED.to_string();
    }

    let name = name.trim();
    if name.is_empty() {
        return CREATE_ROOM_USAGE.to_string();
    }

    let room = NewRoom {
        creator_id: caller,
        name: name.to_string(),
    };

    match rooms.create_room(room).await {
        Ok(room) => {
            log::info!("Created room {} ({:?})", room.id, room.name);
            format!("Room '{}' created!", room.name)
        }
        Err(StorageError::DuplicateName(name)) => {
            format!("A room named '{name}' already exists.")
        }
        Err(e) => {
            log::error!("Failed to create room {name:?}: {e}");
            "Something went wrong while creating the room.".to_string()
        }
    }
}

/// The first word is the telegram id, the rest of the line is the room name.
fn parse_member_args(args: &str) -> Option<(TelegramId, &str)> {
    let (telegram_id, room_name) = args.trim().split_once(char::is_whitespace)?;
    let room_name = room_name.trim();
    if room_name.is_empty() {
        return None;
    }

    Some((telegram_id.parse().ok()?, room_name))
}

async fn add_user_to_room_reply(
    rooms: &dyn RoomStorage,
    config: &BotConfig,
    caller: TelegramId,
    args: &str,
) -> String {
    if !config.is_admin(caller) {
        log::warn!("User {caller} tried to add a room member");
        return PERMISSION_DENIED.to_string();
    }

    let Some((telegram_id, room_name)) = parse_member_args(args) else {
        return ADD_USER_USAGE.to_string();
    };

    let result = match rooms.find_room_by_name(room_name).await {
        Ok(Some(room)) => rooms.add_member(room.id, telegram_id).await,
        Ok(None) => return format!("Room '{room_name}' not found."),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            log::info!("Added user {telegram_id} to room {room_name:?}");
            format!("User {telegram_id} added to room '{room_name}'!")
        }
        Err(StorageError::NotFound(what)) => format!("Could not add the user: {what} not found."),
        Err(e) => {
            log::error!("Failed to add user {telegram_id} to room {room_name:?}: {e}");
            "Something went wrong while adding the user.".to_string()
        }
    }
}

fn format_room_list(rooms: &[ChatRoom]) -> String {
    if rooms.is_empty() {
        return "You are not a member of any room.".to_string();
    }

    let names: Vec<String> = rooms.iter().map(|room| format!("- {}", room.name)).collect();
    format!("You are a member of these rooms:\n{}", names.join("\n"))
}

async fn list_rooms_reply(rooms: &dyn RoomStorage, caller: TelegramId) -> String {
    match rooms.list_rooms(Some(caller)).await {
        Ok(rooms) => format_room_list(&rooms),
        Err(e) => {
            log::error!("Failed to list rooms of user {caller}: {e}");
            "Something went wrong while listing your rooms.".to_string()
        }
    }
}
