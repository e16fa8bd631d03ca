use roomreg_models::{
    chrono_tz::Tz,
    user::{Role, TelegramId, UnknownRole, UnknownTimezone, User, parse_timezone},
    working_time::{TimeParseError, WorkingTime},
};
use roomreg_storage::UserUpsert;
use thiserror::Error;

/// Progress of one registration conversation. Each variant carries only the
/// answers collected so far.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub enum RegistrationState {
    #[default]
    AwaitingName,
    AwaitingTimezone {
        display_name: String,
    },
    AwaitingWorkStart {
        display_name: String,
        timezone: Tz,
    },
    AwaitingWorkEnd {
        display_name: String,
        timezone: Tz,
        work_start: WorkingTime,
    },
    AwaitingRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("display name is empty")]
    EmptyName,

    #[error(transparent)]
    UnknownTimezone(#[from] UnknownTimezone),

    #[error(transparent)]
    MalformedTime(#[from] TimeParseError),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

impl InputError {
    pub fn reprompt(&self) -> &'static str {
        match self {
            InputError::EmptyName => "The name can't be empty. Please enter your name:",
            InputError::UnknownTimezone(_) => {
                "Unknown timezone. Please send a timezone name, e.g. Europe/Moscow:"
            }
            InputError::MalformedTime(_) => {
                "Invalid time format. Please send the time as HH:MM, e.g. 09:00:"
            }
            InputError::UnknownRole(_) => "Please choose one of the offered roles.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSubmit {
    /// The conversation ends once the upsert is done.
    Finish,
    /// The entry point is evaluated again with the stored record.
    ReEnter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Next(RegistrationState),
    Submit {
        upsert: UserUpsert,
        then: AfterSubmit,
    },
}

/// Where `/start` leads for a given stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Register(RegistrationState),
    Launch { display_name: String, role: Role },
}

pub fn entry(user: Option<&User>) -> Entry {
    let Some(user) = user.filter(|user| user.has_display_name()) else {
        return Entry::Register(RegistrationState::AwaitingName);
    };

    match (&user.display_name, user.role) {
        (Some(display_name), Some(role)) => Entry::Launch {
            display_name: display_name.clone(),
            role,
        },
        _ => Entry::Register(RegistrationState::AwaitingRole),
    }
}

impl RegistrationState {
    /// Consumes one text answer. Errors leave the caller holding the
    /// unchanged state, so a failed answer is simply asked again.
    pub fn advance(self, telegram_id: TelegramId, input: &str) -> Result<Step, InputError> {
        match self {
            RegistrationState::AwaitingName => {
                if input.trim().is_empty() {
                    return Err(InputError::EmptyName);
                }

                Ok(Step::Next(RegistrationState::AwaitingTimezone {
                    display_name: input.to_string(),
                }))
            }
            RegistrationState::AwaitingTimezone { display_name } => {
                let timezone = parse_timezone(input.trim())?;

                Ok(Step::Next(RegistrationState::AwaitingWorkStart {
                    display_name,
                    timezone,
                }))
            }
            RegistrationState::AwaitingWorkStart {
                display_name,
                timezone,
            } => {
                let work_start = input.trim().parse::<WorkingTime>()?;

                Ok(Step::Next(RegistrationState::AwaitingWorkEnd {
                    display_name,
                    timezone,
                    work_start,
                }))
            }
            RegistrationState::AwaitingWorkEnd {
                display_name,
                timezone,
                work_start,
            } => {
                let work_end = input.trim().parse::<WorkingTime>()?;

                Ok(Step::Submit {
                    upsert: UserUpsert {
                        display_name: Some(display_name),
                        timezone: Some(timezone),
                        working_hours_start: Some(work_start),
                        working_hours_end: Some(work_end),
                        ..UserUpsert::new(telegram_id)
                    },
                    then: AfterSubmit::Finish,
                })
            }
            RegistrationState::AwaitingRole => {
                let role = input.trim().parse::<Role>()?;

                Ok(Step::Submit {
                    upsert: UserUpsert {
                        role: Some(role),
                        ..UserUpsert::new(telegram_id)
                    },
                    then: AfterSubmit::ReEnter,
                })
            }
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            RegistrationState::AwaitingName => {
                "Hi! Please enter the name other people will see in chats:".to_string()
            }
            RegistrationState::AwaitingTimezone { display_name } => format!(
                "Nice to meet you, {display_name}. Now send your timezone, e.g. Europe/Moscow:"
            ),
            RegistrationState::AwaitingWorkStart { timezone, .. } => format!(
                "Your timezone is {}. When does your working day start? Send the time as HH:MM, e.g. 09:00:",
                timezone.name()
            ),
            RegistrationState::AwaitingWorkEnd { .. } => {
                "When does your working day end? Send the time as HH:MM, e.g. 18:00:".to_string()
            }
            RegistrationState::AwaitingRole => "Please choose your role:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomreg_models::chrono::NaiveDateTime;

    fn hm(hours: u32, minutes: u32) -> WorkingTime {
        WorkingTime::from_hm(hours, minutes).unwrap()
    }

    fn next(step: Result<Step, InputError>) -> RegistrationState {
        match step {
            Ok(Step::Next(state)) => state,
            other => panic!("expected next state, got {other:?}"),
        }
    }

    fn user(display_name: Option<&str>, role: Option<Role>) -> User {
        User {
            id: 1,
            telegram_id: 42,
            display_name: display_name.map(str::to_string),
            timezone: None,
            working_hours_start: None,
            working_hours_end: None,
            role,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn identity_42_registers_in_one_submission() {
        let state = RegistrationState::AwaitingName;

        let state = next(state.advance(42, "Alice"));
        assert_eq!(
            state,
            RegistrationState::AwaitingTimezone {
                display_name: "Alice".to_string()
            }
        );

        let rejected = state.clone().advance(42, "Not/AZone");
        assert!(matches!(rejected, Err(InputError::UnknownTimezone(_))));

        let state = next(state.advance(42, "Europe/Moscow"));
        assert_eq!(
            state,
            RegistrationState::AwaitingWorkStart {
                display_name: "Alice".to_string(),
                timezone: Tz::Europe__Moscow,
            }
        );

        let state = next(state.advance(42, "09:00"));
        let step = state.advance(42, "18:00").unwrap();

        assert_eq!(
            step,
            Step::Submit {
                upsert: UserUpsert {
                    telegram_id: 42,
                    display_name: Some("Alice".to_string()),
                    timezone: Some(Tz::Europe__Moscow),
                    working_hours_start: Some(hm(9, 0)),
                    working_hours_end: Some(hm(18, 0)),
                    role: None,
                },
                then: AfterSubmit::Finish,
            }
        );
    }

    #[test]
    fn nothing_is_submitted_before_work_end() {
        let answers = ["Bob", "UTC", "08:30"];
        let mut state = RegistrationState::AwaitingName;

        for answer in answers {
            state = next(state.advance(7, answer));
        }

        assert!(matches!(state, RegistrationState::AwaitingWorkEnd { .. }));
    }

    #[test]
    fn blank_name_is_rejected_but_other_names_kept_verbatim() {
        assert_eq!(
            RegistrationState::AwaitingName.advance(1, "   "),
            Err(InputError::EmptyName)
        );

        let state = next(RegistrationState::AwaitingName.advance(1, "  Anna Maria "));
        assert_eq!(
            state,
            RegistrationState::AwaitingTimezone {
                display_name: "  Anna Maria ".to_string()
            }
        );
    }

    #[test]
    fn timezone_answer_ignores_case() {
        let state = RegistrationState::AwaitingTimezone {
            display_name: "Alice".to_string(),
        };

        let state = next(state.advance(42, " europe/moscow "));

        assert_eq!(
            state,
            RegistrationState::AwaitingWorkStart {
                display_name: "Alice".to_string(),
                timezone: Tz::Europe__Moscow,
            }
        );
        assert!(state.prompt().contains("Europe/Moscow"));
    }

    #[test]
    fn malformed_times_are_rejected() {
        let state = RegistrationState::AwaitingWorkStart {
            display_name: "Alice".to_string(),
            timezone: Tz::UTC,
        };

        for input in ["9:00", "24:00", "12:60", "noon", ""] {
            assert!(
                matches!(
                    state.clone().advance(42, input),
                    Err(InputError::MalformedTime(_))
                ),
                "{input:?} was accepted"
            );
        }
    }

    #[test]
    fn role_answer_submits_only_the_role() {
        let step = RegistrationState::AwaitingRole
            .advance(42, " customer ")
            .unwrap();

        assert_eq!(
            step,
            Step::Submit {
                upsert: UserUpsert {
                    role: Some(Role::Customer),
                    ..UserUpsert::new(42)
                },
                then: AfterSubmit::ReEnter,
            }
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = RegistrationState::AwaitingRole.advance(42, "Manager");

        assert!(matches!(result, Err(InputError::UnknownRole(_))));
    }

    #[test]
    fn entry_depends_on_stored_record() {
        assert_eq!(
            entry(None),
            Entry::Register(RegistrationState::AwaitingName)
        );
        assert_eq!(
            entry(Some(&user(Some(" "), Some(Role::Developer)))),
            Entry::Register(RegistrationState::AwaitingName)
        );
        assert_eq!(
            entry(Some(&user(Some("Alice"), None))),
            Entry::Register(RegistrationState::AwaitingRole)
        );
        assert_eq!(
            entry(Some(&user(Some("Alice"), Some(Role::Developer)))),
            Entry::Launch {
                display_name: "Alice".to_string(),
                role: Role::Developer,
            }
        );
    }
}
