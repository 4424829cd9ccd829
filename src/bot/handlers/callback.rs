use teloxide::prelude::*;
use teloxide::types::MessageId;

use crate::bot::commands::{admin, registration};
use crate::bot::handlers::{
    own_prompt, Actor, BotContext, DialogueState, HandlerResult, RosterDialogue,
};
use crate::bot::keyboards::CallbackAction;
use crate::services::roster::RosterSnapshot;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: RosterDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).text("Invalid callback data format").await?;
        return Ok(());
    };

    // Buttons live on a message; fall back to the private chat with the user
    let origin = q.message.as_ref().map(|m| (m.chat.id, m.id));
    let chat_id = origin.map_or(ChatId(q.from.id.0 as i64), |(chat_id, _)| chat_id);
    let who = Actor::from_user(&q.from, chat_id);

    tracing::info!(
        "Callback received: '{}' from user {} ({}) in chat {}",
        data,
        who.log_name(),
        who.caller.user_id,
        chat_id.0
    );

    let Some(action) = CallbackAction::parse(&data) else {
        bot.answer_callback_query(q.id).text("Unknown button").await?;
        return Ok(());
    };

    if action.is_admin_action() && !ctx.roster.is_admin(who.caller) {
        tracing::warn!("User {} pressed admin button '{}'", who.caller.user_id, data);
        bot.answer_callback_query(q.id).text("⛔ Admins only").await?;
        return Ok(());
    }

    // Sign-up prompt buttons only work for the member who asked for them
    if action.is_sign_up_action() && own_prompt(&dialogue, &who).await? == DialogueState::Idle {
        bot.answer_callback_query(q.id)
            .text("This prompt is not yours or has expired. Press 📝 Sign up again.")
            .await?;
        return Ok(());
    }

    bot.answer_callback_query(q.id.clone()).await?;

    match action {
        CallbackAction::SignUpWithTelegramName => {
            dialogue.exit().await?;
            clear_buttons(&bot, origin).await;
            registration::handle_register(&bot, &who, &who.telegram_name, &ctx).await?;
        }
        CallbackAction::SignUpAbort => {
            dialogue.exit().await?;
            clear_buttons(&bot, origin).await;
            bot.send_message(chat_id, "Sign up cancelled.").await?;
        }
        CallbackAction::AdminOpen | CallbackAction::AdminClose => {
            let open = action == CallbackAction::AdminOpen;
            let snapshot = admin::set_registration_open(&bot, &who, open, &ctx).await?;
            redraw(&bot, origin, snapshot).await?;
        }
        CallbackAction::AdminAddManual => {
            dialogue
                .update(DialogueState::AwaitingManualName { user_id: who.caller.user_id })
                .await?;
            bot.send_message(chat_id, "Send the name of the participant to add.").await?;
        }
        CallbackAction::AdminNewSession => {
            admin::ask_new_session(&bot, &who, &ctx).await?;
        }
        CallbackAction::AdminNewSessionConfirm => {
            clear_buttons(&bot, origin).await;
            admin::start_new_session(&bot, &who, &ctx).await?;
        }
        CallbackAction::AdminNewSessionAbort => {
            clear_buttons(&bot, origin).await;
            bot.send_message(chat_id, "The roster was kept as it is.").await?;
        }
        CallbackAction::AdminRemove { index, tag } => {
            let snapshot = admin::remove_participant(&bot, &who, index, Some(tag), &ctx).await?;
            redraw(&bot, origin, snapshot).await?;
        }
        CallbackAction::AdminRefresh => {
            let snapshot = ctx.roster.list(who.caller).await?;
            redraw(&bot, origin, Some(snapshot)).await?;
        }
    }

    Ok(())
}

async fn redraw(
    bot: &Bot,
    origin: Option<(ChatId, MessageId)>,
    snapshot: Option<RosterSnapshot>,
) -> ResponseResult<()> {
    if let (Some((chat_id, message_id)), Some(snapshot)) = (origin, snapshot) {
        admin::refresh_admin_panel(bot, chat_id, message_id, &snapshot).await?;
    }
    Ok(())
}

/// Drops the inline keyboard so a one-shot prompt can't be pressed twice.
async fn clear_buttons(bot: &Bot, origin: Option<(ChatId, MessageId)>) {
    if let Some((chat_id, message_id)) = origin {
        if let Err(e) = bot.edit_message_reply_markup(chat_id, message_id).await {
            tracing::debug!("Could not clear buttons: {}", e);
        }
    }
}
