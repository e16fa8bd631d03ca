use roomreg_models::user::TelegramId;
use roomreg_storage::UserStorage;
use url::Url;

use crate::registration::{AfterSubmit, Entry, RegistrationState, Step, entry};

const LOOKUP_FAILED: &str = "Something went wrong. Please try again later.";
const DETAILS_SAVE_FAILED: &str =
    "Something went wrong while saving your details. Please contact the administrator.";
const ROLE_SAVE_FAILED: &str =
    "Something went wrong while saving your role. Please try again later.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Keyboard {
    Roles,
    Remove,
    Launcher(Url),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    fn prompt(state: &RegistrationState) -> Self {
        match state {
            RegistrationState::AwaitingRole => Self::with_keyboard(state.prompt(), Keyboard::Roles),
            _ => Self::text(state.prompt()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Continue(RegistrationState),
    Exit,
}

/// What the bot says and where the dialogue goes after one update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Turn {
    pub replies: Vec<Reply>,
    pub next: Outcome,
}

impl Turn {
    fn stay(reply: Reply, state: RegistrationState) -> Self {
        Self {
            replies: vec![reply],
            next: Outcome::Continue(state),
        }
    }

    fn exit(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            next: Outcome::Exit,
        }
    }
}

pub(crate) async fn start(
    users: &dyn UserStorage,
    web_app_url: Option<&Url>,
    telegram_id: TelegramId,
) -> Turn {
    let user = match users.get_user(telegram_id).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to look up user {telegram_id}: {e}");
            return Turn::exit(Reply::text(LOOKUP_FAILED));
        }
    };

    match entry(user.as_ref()) {
        Entry::Register(state) => {
            log::info!("User {telegram_id} entered registration at {state:?}");
            Turn::stay(Reply::prompt(&state), state)
        }
        Entry::Launch { display_name, role } => {
            Turn::exit(launcher(&display_name, role.label(), web_app_url))
        }
    }
}

fn launcher(display_name: &str, role: &str, web_app_url: Option<&Url>) -> Reply {
    match web_app_url {
        Some(url) => Reply::with_keyboard(
            format!("Hi, {display_name} ({role})! Press the button to open the app:"),
            Keyboard::Launcher(url.clone()),
        ),
        None => Reply::text("The web app is not configured. Please contact the administrator."),
    }
}

/// Handles one message of an active registration. `input` is `None` for
/// anything that is not plain text.
pub(crate) async fn receive(
    users: &dyn UserStorage,
    web_app_url: Option<&Url>,
    state: RegistrationState,
    telegram_id: TelegramId,
    input: Option<&str>,
) -> Turn {
    let Some(input) = input else {
        return Turn::stay(Reply::prompt(&state), state);
    };

    let (upsert, then) = match state.clone().advance(telegram_id, input) {
        Err(e) => {
            log::debug!("User {telegram_id} sent invalid input: {e}");
            let reprompt = match state {
                RegistrationState::AwaitingRole => {
                    Reply::with_keyboard(e.reprompt(), Keyboard::Roles)
                }
                _ => Reply::text(e.reprompt()),
            };
            return Turn::stay(reprompt, state);
        }
        Ok(Step::Next(next)) => return Turn::stay(Reply::prompt(&next), next),
        Ok(Step::Submit { upsert, then }) => (upsert, then),
    };

    let failure = match then {
        AfterSubmit::Finish => DETAILS_SAVE_FAILED,
        AfterSubmit::ReEnter => ROLE_SAVE_FAILED,
    };

    let user = match users.upsert_user(upsert).await {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to save user {telegram_id}: {e}");
            return Turn::exit(Reply::text(failure));
        }
    };

    log::info!("Saved user {telegram_id} with id {}", user.id);

    match then {
        AfterSubmit::Finish => Turn::exit(Reply::text(
            "Your details are saved. Send /start to choose your role.",
        )),
        AfterSubmit::ReEnter => {
            let role = user.role.map(|role| role.label()).unwrap_or_default();
            let mut turn = start(users, web_app_url, telegram_id).await;
            turn.replies.insert(
                0,
                Reply::with_keyboard(format!("Your role is set to {role}."), Keyboard::Remove),
            );
            turn
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use roomreg_models::{chrono_tz::Tz, user::Role, working_time::WorkingTime};
    use roomreg_storage::{
        UserUpsert,
        sqlite::{connect_in_memory, user_storage::SqliteUserStorage},
    };

    use super::*;
    use crate::test_utils::FakeStore;

    fn app_url() -> Url {
        Url::parse("https://app.example.com/").unwrap()
    }

    async fn send_all(
        users: &dyn UserStorage,
        mut state: RegistrationState,
        answers: &[&str],
    ) -> Turn {
        let mut last = None;
        for answer in answers {
            let turn = receive(users, None, state.clone(), 42, Some(answer)).await;
            if let Outcome::Continue(next) = &turn.next {
                state = next.clone();
            }
            last = Some(turn);
        }
        last.unwrap()
    }

    #[tokio::test]
    async fn identity_42_is_stored_once_registration_completes() {
        let pool = connect_in_memory().await.unwrap();
        let users = SqliteUserStorage::new(pool);

        let turn = start(&users, None, 42).await;
        assert_eq!(turn.next, Outcome::Continue(RegistrationState::AwaitingName));

        let turn = send_all(
            &users,
            RegistrationState::AwaitingName,
            &["Alice", "Not/AZone"],
        )
        .await;
        assert_eq!(
            turn.next,
            Outcome::Continue(RegistrationState::AwaitingTimezone {
                display_name: "Alice".to_string()
            })
        );
        assert!(users.get_user(42).await.unwrap().is_none());

        let turn = send_all(
            &users,
            RegistrationState::AwaitingName,
            &["Alice", "Not/AZone", "Europe/Moscow", "09:00", "18:00"],
        )
        .await;
        assert_eq!(turn.next, Outcome::Exit);

        let user = users.get_user(42).await.unwrap().unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert_eq!(user.timezone, Some(Tz::Europe__Moscow));
        assert_eq!(user.working_hours_start, WorkingTime::from_hm(9, 0));
        assert_eq!(user.working_hours_end, WorkingTime::from_hm(18, 0));
        assert_eq!(user.role, None);

        let turn = start(&users, None, 42).await;
        assert_eq!(turn.next, Outcome::Continue(RegistrationState::AwaitingRole));
        assert_eq!(turn.replies[0].keyboard, Some(Keyboard::Roles));
    }

    #[tokio::test]
    async fn abandoned_registration_never_reaches_store() {
        let store = FakeStore::default();

        send_all(
            &store,
            RegistrationState::AwaitingName,
            &["Alice", "UTC", "09:00"],
        )
        .await;

        assert!(store.upserts().is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_text_message_repeats_prompt() {
        let store = FakeStore::default();
        let state = RegistrationState::AwaitingTimezone {
            display_name: "Alice".to_string(),
        };

        let turn = receive(&store, None, state.clone(), 42, None).await;

        assert_eq!(turn.next, Outcome::Continue(state.clone()));
        assert_eq!(turn.replies, vec![Reply::text(state.prompt())]);
    }

    #[tokio::test]
    async fn role_choice_falls_through_to_launcher() {
        let store = FakeStore::with_user(UserUpsert {
            display_name: Some("Alice".to_string()),
            ..UserUpsert::new(42)
        });
        let url = app_url();

        let turn = receive(
            &store,
            Some(&url),
            RegistrationState::AwaitingRole,
            42,
            Some("developer"),
        )
        .await;

        assert_eq!(turn.next, Outcome::Exit);
        assert_eq!(turn.replies.len(), 2);
        assert_eq!(turn.replies[0].keyboard, Some(Keyboard::Remove));
        assert_eq!(turn.replies[1].keyboard, Some(Keyboard::Launcher(url)));
        assert_eq!(
            store.upserts(),
            vec![UserUpsert {
                role: Some(Role::Developer),
                ..UserUpsert::new(42)
            }]
        );
    }

    #[tokio::test]
    async fn registered_user_without_web_app_gets_notice() {
        let store = FakeStore::with_user(UserUpsert {
            display_name: Some("Alice".to_string()),
            role: Some(Role::Customer),
            ..UserUpsert::new(42)
        });

        let turn = start(&store, None, 42).await;

        assert_eq!(turn.next, Outcome::Exit);
        assert_eq!(turn.replies[0].keyboard, None);
        assert!(turn.replies[0].text.contains("not configured"));
    }

    #[tokio::test]
    async fn store_failure_ends_registration() {
        let store = FakeStore::unavailable();
        let state = RegistrationState::AwaitingWorkEnd {
            display_name: "Alice".to_string(),
            timezone: Tz::UTC,
            work_start: WorkingTime::from_hm(9, 0).unwrap(),
        };

        let turn = receive(&store, None, state, 42, Some("18:00")).await;

        assert_eq!(turn.next, Outcome::Exit);
        assert_eq!(turn.replies, vec![Reply::text(DETAILS_SAVE_FAILED)]);
    }

    #[tokio::test]
    async fn lookup_failure_on_start_ends_conversation() {
        let store = FakeStore::unavailable();

        let turn = start(&store, None, 42).await;

        assert_eq!(turn, Turn::exit(Reply::text(LOOKUP_FAILED)));
    }
}
