pub mod callback;
pub mod general_message;
pub mod message;

use std::sync::Arc;

use teloxide::{
    dispatching::{
        dialogue,
        dialogue::{InMemStorage, InMemStorageError},
        UpdateHandler,
    },
    prelude::*,
    types::User,
};

use crate::bot::commands::Command;
use crate::config::BotSettings;
use crate::services::notifier::PromotionNotifier;
use crate::services::roster::{Caller, RosterService};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// What the bot is waiting for in a chat.
///
/// Dialogues are stored per chat, so a prompt remembers who it was shown to
/// and text from anyone else in a group is not taken as the answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogueState {
    #[default]
    Idle,
    /// Sign up was pressed; the user's next text is their display name.
    AwaitingDisplayName { user_id: i64 },
    /// The admin asked to add someone; their next text is the name.
    AwaitingManualName { user_id: i64 },
}

impl DialogueState {
    pub fn prompted_user(&self) -> Option<i64> {
        match self {
            DialogueState::Idle => None,
            DialogueState::AwaitingDisplayName { user_id }
            | DialogueState::AwaitingManualName { user_id } => Some(*user_id),
        }
    }

    /// The state as it applies to `user_id`: someone else's prompt reads as idle.
    pub fn for_user(self, user_id: i64) -> DialogueState {
        if self.prompted_user() == Some(user_id) {
            self
        } else {
            DialogueState::Idle
        }
    }
}

pub type RosterDialogue = Dialogue<DialogueState, InMemStorage<DialogueState>>;

/// Pending prompt addressed to `who`, leaving other users' prompts alone.
pub async fn own_prompt(
    dialogue: &RosterDialogue,
    who: &Actor,
) -> Result<DialogueState, InMemStorageError> {
    let state = dialogue.get().await?.unwrap_or_default();
    Ok(state.for_user(who.caller.user_id))
}

/// Drops the pending prompt if it was addressed to `who`.
pub async fn exit_own_prompt(
    dialogue: &RosterDialogue,
    who: &Actor,
) -> Result<(), InMemStorageError> {
    if own_prompt(dialogue, who).await? != DialogueState::Idle {
        dialogue.exit().await?;
    }
    Ok(())
}

/// Everything a handler needs besides the update itself.
#[derive(Clone)]
pub struct BotContext {
    pub roster: RosterService,
    pub notifier: PromotionNotifier,
    pub settings: Arc<BotSettings>,
}

/// The Telegram user behind an update and the chat to answer in.
#[derive(Debug, Clone)]
pub struct Actor {
    pub caller: Caller,
    pub chat_id: ChatId,
    pub telegram_name: String,
    pub username: Option<String>,
}

impl Actor {
    pub fn from_user(user: &User, chat_id: ChatId) -> Self {
        Self {
            caller: Caller::new(user.id.0 as i64),
            chat_id,
            telegram_name: user.full_name(),
            username: user.username.clone(),
        }
    }

    /// Name used in log lines.
    pub fn log_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.telegram_name)
    }
}

pub struct BotHandler {
    pub ctx: BotContext,
}

impl BotHandler {
    pub fn new(roster: RosterService, notifier: PromotionNotifier, settings: BotSettings) -> Self {
        Self {
            ctx: BotContext {
                roster,
                notifier,
                settings: Arc::new(settings),
            },
        }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let ctx_command = self.ctx.clone();
        let ctx_message = self.ctx.clone();
        let ctx_callback = self.ctx.clone();

        dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command, dialogue: RosterDialogue| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, dialogue, ctx).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(
                move |bot: Bot, msg: Message, dialogue: RosterDialogue| {
                    let ctx = ctx_message.clone();
                    async move { general_message::handle_general_message(bot, msg, dialogue, ctx).await }
                },
            ))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: RosterDialogue| {
                    let ctx = ctx_callback.clone();
                    async move { callback::callback_handler(bot, q, dialogue, ctx).await }
                },
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_only_applies_to_prompted_user() {
        let state = DialogueState::AwaitingDisplayName { user_id: 7 };
        assert_eq!(state.clone().for_user(7), state);
        assert_eq!(state.for_user(8), DialogueState::Idle);

        let manual = DialogueState::AwaitingManualName { user_id: 1 };
        assert_eq!(manual.prompted_user(), Some(1));
        assert_eq!(manual.for_user(2), DialogueState::Idle);
        assert_eq!(DialogueState::Idle.for_user(1), DialogueState::Idle);
    }

    #[test]
    fn test_actor_log_name_prefers_username() {
        let mut who = Actor {
            caller: Caller::new(5),
            chat_id: ChatId(-100),
            telegram_name: "Anna K".to_string(),
            username: Some("anna_k".to_string()),
        };
        assert_eq!(who.log_name(), "anna_k");
        who.username = None;
        assert_eq!(who.log_name(), "Anna K");
    }
}
