use teloxide::prelude::*;

use crate::bot::commands::{admin, list, registration, schedule};
use crate::bot::handlers::{
    exit_own_prompt, own_prompt, Actor, BotContext, DialogueState, HandlerResult, RosterDialogue,
};
use crate::bot::keyboards::MenuButton;
use crate::utils::feedback::CommandFeedback;

pub async fn handle_general_message(
    bot: Bot,
    msg: Message,
    dialogue: RosterDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };
    let who = Actor::from_user(user, msg.chat.id);

    // Menu buttons always win over the sender's own pending prompt
    if let Some(button) = MenuButton::from_text(text) {
        exit_own_prompt(&dialogue, &who).await?;
        return handle_menu_button(&bot, &who, button, &dialogue, &ctx).await;
    }

    // In groups the prompt belongs to one member; other members just chat
    match own_prompt(&dialogue, &who).await? {
        DialogueState::AwaitingDisplayName { .. } => {
            dialogue.exit().await?;
            registration::handle_register(&bot, &who, text, &ctx).await?;
        }
        DialogueState::AwaitingManualName { .. } => {
            dialogue.exit().await?;
            admin::handle_add_manual(&bot, &who, text, &dialogue, &ctx).await?;
        }
        DialogueState::Idle => handle_free_text(&bot, &who, text).await?,
    }
    Ok(())
}

async fn handle_menu_button(
    bot: &Bot,
    who: &Actor,
    button: MenuButton,
    dialogue: &RosterDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    match button {
        MenuButton::SignUp => registration::prompt_sign_up(bot, who, dialogue, ctx).await?,
        MenuButton::List => list::handle_list(bot, who, ctx).await?,
        MenuButton::Schedule => schedule::handle_schedule(bot, who, ctx).await?,
        MenuButton::Cancel => registration::handle_cancel(bot, who, ctx).await?,
        MenuButton::Help => schedule::handle_help(bot, who, ctx).await?,
        MenuButton::Admin => admin::handle_admin_panel(bot, who, ctx).await?,
    }
    Ok(())
}

/// Hints for text that is neither a command nor a menu button.
pub fn free_text_hint(text: &str) -> Option<(String, Option<&'static str>)> {
    let lowered = text.to_lowercase();
    if text.starts_with('/') {
        let command = text.split_whitespace().next().unwrap_or(text);
        Some((
            format!("Unknown command: {command}"),
            Some("Use /help to see all available commands, or check your command syntax."),
        ))
    } else if lowered.contains("register") || lowered.contains("sign up") {
        Some(("Press 📝 Sign up or send /register to get on the list.".to_string(), None))
    } else if lowered.contains("help") {
        Some(("Use /help to see all available commands.".to_string(), None))
    } else {
        None
    }
}

async fn handle_free_text(bot: &Bot, who: &Actor, text: &str) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    match free_text_hint(text) {
        Some((error, Some(suggestion))) => {
            feedback.validation_error(&error, suggestion).await?;
        }
        Some((hint, None)) => {
            feedback.info(&hint).await?;
        }
        // Anything else is ignored to avoid spamming group chats
        None => {}
    }
    Ok(())
}
