use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::handlers::{Actor, BotContext, DialogueState, RosterDialogue};
use crate::bot::keyboards::sign_up_prompt;
use crate::database::models::{ListKind, Placement, Removal, RosterLimits, RosterState};
use crate::error::RosterError;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_rejected, log_command_start, log_command_success};
use crate::utils::markdown::{bold, escape_markdown};

/// Confirmation shown after a successful sign-up.
pub fn registration_confirmation(
    display_name: &str,
    placement: &Placement,
    state: &RosterState,
    limits: RosterLimits,
) -> String {
    let status = match placement.list {
        ListKind::Main => format!(
            "✅ {}, you are in the main list\\! \\(place {}/{}\\)",
            escape_markdown(display_name),
            placement.position,
            placement.capacity
        ),
        ListKind::Reserve => format!(
            "⏳ {}, you are in the reserve\\. \\(place {}/{}\\)\nYou will get a message if a place opens up\\.",
            escape_markdown(display_name),
            placement.position,
            placement.capacity
        ),
    };

    format!(
        "{status}\n\n📅 {}\n▪️ Date: {}\n▪️ Time: {}\n▪️ Place: {}\n\n📊 {}\n▪️ Main list: {}/{}\n▪️ Reserve: {}/{}",
        bold("Training:"),
        escape_markdown(&state.session.date),
        escape_markdown(&state.session.time),
        escape_markdown(&state.session.place),
        bold("Statistics:"),
        state.main.len(),
        limits.max_main,
        state.reserve.len(),
        limits.max_reserve,
    )
}

/// Text sent to the person who cancelled.
pub fn cancellation_message(removal: &Removal) -> String {
    let mut text = match removal.from {
        ListKind::Main => "Your registration is cancelled.".to_string(),
        ListKind::Reserve => "Your reserve registration is cancelled.".to_string(),
    };
    if let Some(promoted) = &removal.promoted {
        text.push_str(&format!(" {} moved up from the reserve.", promoted.display_name));
    }
    text
}

/// Sign up button or bare `/register`: ask for the display name.
pub async fn prompt_sign_up(
    bot: &Bot,
    who: &Actor,
    dialogue: &RosterDialogue,
    ctx: &BotContext,
) -> crate::bot::handlers::HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let snapshot = ctx.roster.list(who.caller).await?;

    // Early answers for the obvious cases; register() re-checks everything
    let early = if !snapshot.state.registration_open {
        Some(RosterError::RegistrationClosed)
    } else if snapshot.state.find_user(who.caller.user_id).is_some() {
        Some(RosterError::DuplicateUser)
    } else if snapshot.state.total() >= snapshot.limits.total() {
        Some(RosterError::CapacityExceeded)
    } else {
        None
    };
    if let Some(err) = early {
        feedback.roster_error(&err).await?;
        return Ok(());
    }

    dialogue
        .update(DialogueState::AwaitingDisplayName { user_id: who.caller.user_id })
        .await?;
    bot.send_message(
        who.chat_id,
        format!(
            "✍️ Send the name to put on the list \\(up to 50 characters\\), or use your Telegram name\\.\n\n{} {} \\| {} \\| {}",
            bold("Training:"),
            escape_markdown(&snapshot.state.session.date),
            escape_markdown(&snapshot.state.session.time),
            escape_markdown(&snapshot.state.session.place),
        ),
    )
    .parse_mode(ParseMode::MarkdownV2)
    .reply_markup(sign_up_prompt(&who.telegram_name))
    .await?;
    Ok(())
}

pub async fn handle_register(
    bot: &Bot,
    who: &Actor,
    display_name: &str,
    ctx: &BotContext,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let user_id = who.caller.user_id;
    let chat_id = who.chat_id.0;
    log_command_start("register", who.log_name(), user_id, chat_id, Some(display_name.trim()));

    match ctx.roster.register(who.caller, display_name, who.username.clone()).await {
        Ok(outcome) => {
            let placement = outcome.value;
            let text = registration_confirmation(
                display_name.trim(),
                &placement,
                &outcome.state,
                ctx.roster.limits(),
            );
            bot.send_message(who.chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            if let Some(warning) = &outcome.persistence_warning {
                feedback.persistence_warning(warning).await?;
            }
            let details = format!("{} place {}", placement.list.label(), placement.position);
            log_command_success("register", who.log_name(), user_id, chat_id, Some(&details));
        }
        Err(e) => {
            log_command_rejected("register", who.log_name(), user_id, chat_id, &e.to_string());
            feedback.roster_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_cancel(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let user_id = who.caller.user_id;
    let chat_id = who.chat_id.0;
    log_command_start("cancel", who.log_name(), user_id, chat_id, None);

    match ctx.roster.cancel(who.caller).await {
        Ok(outcome) => {
            feedback.success(&cancellation_message(&outcome.value)).await?;
            if let Some(warning) = &outcome.persistence_warning {
                feedback.persistence_warning(warning).await?;
            }
            if let Some(promoted) = outcome.value.promoted.clone() {
                ctx.notifier.spawn_notify(promoted, outcome.state.session.clone());
            }
            log_command_success("cancel", who.log_name(), user_id, chat_id, Some(outcome.value.from.label()));
        }
        Err(e) => {
            log_command_rejected("cancel", who.log_name(), user_id, chat_id, &e.to_string());
            feedback.roster_error(&e).await?;
        }
    }
    Ok(())
}
