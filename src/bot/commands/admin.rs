use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::bot::commands::list::{render_roster, Numbering};
use crate::bot::handlers::{Actor, BotContext, DialogueState, HandlerResult, RosterDialogue};
use crate::bot::keyboards::{admin_panel, confirm_new_session};
use crate::database::models::{Removal, SessionField};
use crate::error::RosterError;
use crate::services::roster::{Outcome, RosterSnapshot};
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_rejected, log_command_start, log_command_success};
use crate::utils::validation::parse_participant_index;

fn field_name(field: SessionField) -> &'static str {
    match field {
        SessionField::Date => "date",
        SessionField::Time => "time",
        SessionField::Place => "place",
    }
}

pub fn removal_summary(removal: &Removal) -> String {
    let mut text = format!("Removed {} from the {}.", removal.entry.display_name, removal.from.label());
    if let Some(promoted) = &removal.promoted {
        text.push_str(&format!(" {} moved up from the reserve.", promoted.display_name));
    }
    text
}

/// Sends the outcome's warning, if any, and logs success.
async fn finish<T>(
    feedback: &CommandFeedback,
    who: &Actor,
    command: &str,
    outcome: &Outcome<T>,
    details: &str,
) -> ResponseResult<()> {
    if let Some(warning) = &outcome.persistence_warning {
        feedback.persistence_warning(warning).await?;
    }
    log_command_success(command, who.log_name(), who.caller.user_id, who.chat_id.0, Some(details));
    Ok(())
}

async fn reject(feedback: &CommandFeedback, who: &Actor, command: &str, err: &RosterError) -> ResponseResult<()> {
    log_command_rejected(command, who.log_name(), who.caller.user_id, who.chat_id.0, &err.to_string());
    feedback.roster_error(err).await?;
    Ok(())
}

/// Numbered roster plus the inline admin keyboard.
pub async fn handle_admin_panel(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    if !ctx.roster.is_admin(who.caller) {
        return reject(&feedback, who, "admin", &RosterError::PermissionDenied).await;
    }

    match ctx.roster.list(who.caller).await {
        Ok(snapshot) => {
            bot.send_message(who.chat_id, render_roster(&snapshot, Numbering::Continuous))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(admin_panel(&snapshot.state))
                .await?;
        }
        Err(e) => {
            feedback.roster_error(&e).await?;
        }
    }
    Ok(())
}

/// Redraws an existing admin panel message after a change.
pub async fn refresh_admin_panel(
    bot: &Bot,
    chat_id: ChatId,
    message_id: MessageId,
    snapshot: &RosterSnapshot,
) -> ResponseResult<()> {
    let result = bot
        .edit_message_text(chat_id, message_id, render_roster(snapshot, Numbering::Continuous))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(admin_panel(&snapshot.state))
        .await;

    // Telegram rejects edits that change nothing; that is fine here
    if let Err(e) = result {
        tracing::debug!("Admin panel not refreshed: {}", e);
    }
    Ok(())
}

pub async fn handle_set_field(
    bot: &Bot,
    who: &Actor,
    field: SessionField,
    value: &str,
    ctx: &BotContext,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let command = format!("set{}", field_name(field));
    log_command_start(&command, who.log_name(), who.caller.user_id, who.chat_id.0, Some(value));

    match ctx.roster.admin_set_field(who.caller, field, value).await {
        Ok(outcome) => {
            let session = &outcome.value;
            feedback
                .success(&format!(
                    "Training {} updated.\n\n📅 {}\n⏰ {}\n📍 {}",
                    field_name(field),
                    session.date,
                    session.time,
                    session.place
                ))
                .await?;
            finish(&feedback, who, &command, &outcome, value.trim()).await
        }
        Err(e) => reject(&feedback, who, &command, &e).await,
    }
}

/// `/add` with a name adds directly; without one it asks for the name.
pub async fn handle_add_manual(
    bot: &Bot,
    who: &Actor,
    display_name: &str,
    dialogue: &RosterDialogue,
    ctx: &BotContext,
) -> HandlerResult {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    if !ctx.roster.is_admin(who.caller) {
        reject(&feedback, who, "add", &RosterError::PermissionDenied).await?;
        return Ok(());
    }

    if display_name.trim().is_empty() {
        dialogue
            .update(DialogueState::AwaitingManualName { user_id: who.caller.user_id })
            .await?;
        feedback.info("Send the name of the participant to add.").await?;
        return Ok(());
    }

    log_command_start("add", who.log_name(), who.caller.user_id, who.chat_id.0, Some(display_name.trim()));
    match ctx.roster.admin_add_manual(who.caller, display_name).await {
        Ok(outcome) => {
            let placement = outcome.value;
            feedback
                .success(&format!(
                    "{} added to the {} (place {}/{}).",
                    display_name.trim(),
                    placement.list.label(),
                    placement.position,
                    placement.capacity
                ))
                .await?;
            finish(&feedback, who, "add", &outcome, placement.list.label()).await?;
        }
        Err(e) => reject(&feedback, who, "add", &e).await?,
    }
    Ok(())
}

/// Removes participant `index` and reports it. Panel buttons pass the entry
/// tag they were drawn with, so a press on an outdated panel removes nobody.
/// Returns the new roster so an admin panel can be redrawn.
pub async fn remove_participant(
    bot: &Bot,
    who: &Actor,
    index: usize,
    tag: Option<u32>,
    ctx: &BotContext,
) -> ResponseResult<Option<RosterSnapshot>> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let details = index.to_string();
    log_command_start("remove", who.log_name(), who.caller.user_id, who.chat_id.0, Some(&details));

    let result = match tag {
        Some(tag) => ctx.roster.admin_remove_tagged(who.caller, index, tag).await,
        None => ctx.roster.admin_remove_by_index(who.caller, index).await,
    };
    match result {
        Ok(outcome) => {
            feedback.success(&removal_summary(&outcome.value)).await?;
            if let Some(promoted) = outcome.value.promoted.clone() {
                ctx.notifier.spawn_notify(promoted, outcome.state.session.clone());
            }
            finish(&feedback, who, "remove", &outcome, &details).await?;
            Ok(Some(RosterSnapshot { state: outcome.state, limits: ctx.roster.limits() }))
        }
        Err(e) => {
            reject(&feedback, who, "remove", &e).await?;
            Ok(None)
        }
    }
}

pub async fn handle_remove(bot: &Bot, who: &Actor, raw_index: &str, ctx: &BotContext) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    if !ctx.roster.is_admin(who.caller) {
        return reject(&feedback, who, "remove", &RosterError::PermissionDenied).await;
    }

    let total = match ctx.roster.list(who.caller).await {
        Ok(snapshot) => snapshot.state.total(),
        Err(_) => 0,
    };
    match parse_participant_index(raw_index, total) {
        Ok(index) => remove_participant(bot, who, index, None, ctx).await.map(|_| ()),
        Err(e) => reject(&feedback, who, "remove", &e).await,
    }
}

/// Opens or closes registration. Returns the new roster for panel redraws.
pub async fn set_registration_open(
    bot: &Bot,
    who: &Actor,
    open: bool,
    ctx: &BotContext,
) -> ResponseResult<Option<RosterSnapshot>> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    let command = if open { "open" } else { "close" };
    log_command_start(command, who.log_name(), who.caller.user_id, who.chat_id.0, None);

    match ctx.roster.admin_set_registration_open(who.caller, open).await {
        Ok(outcome) => {
            let text = if outcome.value { "Registration is open." } else { "Registration is closed." };
            feedback.success(text).await?;
            finish(&feedback, who, command, &outcome, text).await?;
            Ok(Some(RosterSnapshot { state: outcome.state, limits: ctx.roster.limits() }))
        }
        Err(e) => {
            reject(&feedback, who, command, &e).await?;
            Ok(None)
        }
    }
}

/// First step of a reset: ask the admin to confirm.
pub async fn ask_new_session(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    if !ctx.roster.is_admin(who.caller) {
        return reject(&feedback, who, "newsession", &RosterError::PermissionDenied).await;
    }

    let total = match ctx.roster.list(who.caller).await {
        Ok(snapshot) => snapshot.state.total(),
        Err(_) => 0,
    };
    bot.send_message(
        who.chat_id,
        format!("🆕 Start a new session? All {total} current registrations will be deleted."),
    )
    .reply_markup(confirm_new_session())
    .await?;
    Ok(())
}

pub async fn start_new_session(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), who.chat_id);
    log_command_start("newsession", who.log_name(), who.caller.user_id, who.chat_id.0, None);

    match ctx.roster.admin_new_session(who.caller).await {
        Ok(outcome) => {
            let session = &outcome.value;
            feedback
                .success(&format!(
                    "New session started. Registration is open.\n\n📅 {}\n⏰ {}\n📍 {}",
                    session.date, session.time, session.place
                ))
                .await?;
            finish(&feedback, who, "newsession", &outcome, &session.date).await
        }
        Err(e) => reject(&feedback, who, "newsession", &e).await,
    }
}
