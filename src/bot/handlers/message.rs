use teloxide::prelude::*;

use crate::bot::commands::{admin, list, registration, schedule, Command};
use crate::bot::handlers::{exit_own_prompt, Actor, BotContext, HandlerResult, RosterDialogue};
use crate::database::models::SessionField;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::log_command_error;

fn command_name(cmd: &Command) -> &'static str {
    match cmd {
        Command::Help => "help",
        Command::Start => "start",
        Command::Register(_) => "register",
        Command::Cancel => "cancel",
        Command::List => "list",
        Command::Schedule => "schedule",
        Command::Admin => "admin",
        Command::SetDate(_) => "setdate",
        Command::SetTime(_) => "settime",
        Command::SetPlace(_) => "setplace",
        Command::Add(_) => "add",
        Command::Remove(_) => "remove",
        Command::Open => "open",
        Command::Close => "close",
        Command::NewSession => "newsession",
    }
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: RosterDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let who = Actor::from_user(user, msg.chat.id);

    // Any command from the prompted user interrupts their name prompt
    exit_own_prompt(&dialogue, &who).await?;

    let name = command_name(&cmd);
    tracing::debug!("Command /{} from user {} in chat {}", name, who.caller.user_id, who.chat_id.0);

    let result: HandlerResult = match cmd {
        Command::Help => schedule::handle_help(&bot, &who, &ctx).await.map_err(Into::into),
        Command::Start => schedule::handle_start(&bot, &who, &ctx).await.map_err(Into::into),
        Command::Register(display_name) => {
            if display_name.trim().is_empty() {
                registration::prompt_sign_up(&bot, &who, &dialogue, &ctx).await
            } else {
                registration::handle_register(&bot, &who, &display_name, &ctx)
                    .await
                    .map_err(Into::into)
            }
        }
        Command::Cancel => registration::handle_cancel(&bot, &who, &ctx).await.map_err(Into::into),
        Command::List => list::handle_list(&bot, &who, &ctx).await.map_err(Into::into),
        Command::Schedule => schedule::handle_schedule(&bot, &who, &ctx).await.map_err(Into::into),
        Command::Admin => admin::handle_admin_panel(&bot, &who, &ctx).await.map_err(Into::into),
        Command::SetDate(value) => set_field(&bot, &who, SessionField::Date, &value, &ctx).await,
        Command::SetTime(value) => set_field(&bot, &who, SessionField::Time, &value, &ctx).await,
        Command::SetPlace(value) => set_field(&bot, &who, SessionField::Place, &value, &ctx).await,
        Command::Add(display_name) => {
            admin::handle_add_manual(&bot, &who, &display_name, &dialogue, &ctx).await
        }
        Command::Remove(index) => admin::handle_remove(&bot, &who, &index, &ctx).await.map_err(Into::into),
        Command::Open => admin::set_registration_open(&bot, &who, true, &ctx)
            .await
            .map(|_| ())
            .map_err(Into::into),
        Command::Close => admin::set_registration_open(&bot, &who, false, &ctx)
            .await
            .map(|_| ())
            .map_err(Into::into),
        Command::NewSession => admin::ask_new_session(&bot, &who, &ctx).await.map_err(Into::into),
    };

    if let Err(e) = &result {
        log_command_error(name, who.log_name(), who.caller.user_id, who.chat_id.0, &e.to_string());
    }
    result
}

/// `/setdate`, `/settime` and `/setplace` share the usage hint for a missing value.
async fn set_field(
    bot: &Bot,
    who: &Actor,
    field: SessionField,
    value: &str,
    ctx: &BotContext,
) -> HandlerResult {
    if value.trim().is_empty() && ctx.roster.is_admin(who.caller) {
        let usage = match field {
            SessionField::Date => "/setdate 2024-05-14",
            SessionField::Time => "/settime 20:45",
            SessionField::Place => "/setplace Central gym",
        };
        CommandFeedback::new(bot.clone(), who.chat_id)
            .validation_error("A value is required.", &format!("Use {usage}"))
            .await?;
        return Ok(());
    }
    admin::handle_set_field(bot, who, field, value, ctx).await?;
    Ok(())
}
