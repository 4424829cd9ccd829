use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::Command;
use crate::bot::handlers::{Actor, BotContext};
use crate::bot::keyboards::main_menu;
use crate::config::BotSettings;
use crate::database::models::{RosterLimits, SessionInfo};
use crate::utils::datetime::describe_session_date;
use crate::utils::feedback::CommandFeedback;
use crate::utils::markdown::{bold, escape_markdown};

fn session_lines(session: &SessionInfo) -> String {
    format!(
        "📅 {}\n⏰ {}\n📍 {}",
        escape_markdown(&describe_session_date(&session.date)),
        escape_markdown(&session.time),
        escape_markdown(&session.place),
    )
}

fn contact_line(settings: &BotSettings) -> String {
    match &settings.admin_contact {
        Some(contact) => format!("\n\n{} {}", bold("Administrator:"), escape_markdown(contact)),
        None => String::new(),
    }
}

pub fn render_welcome(session: &SessionInfo, limits: RosterLimits) -> String {
    format!(
        "🏋️ {}\n\n{}\n{}\n\n👥 {} {} main \\+ {} reserve\n\nChoose an action:",
        bold("Training Roster Bot"),
        bold("Next training:"),
        session_lines(session),
        bold("Places:"),
        limits.max_main,
        limits.max_reserve,
    )
}

pub fn render_schedule(session: &SessionInfo, settings: &BotSettings) -> String {
    let mut text = format!(
        "⏰ {}\n\n{}\n{}",
        bold("TRAINING SCHEDULE"),
        bold("Next training:"),
        session_lines(session),
    );

    let regular: Vec<String> = settings
        .schedule_info
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("▪️ {}", escape_markdown(line)))
        .collect();
    if !regular.is_empty() {
        text.push_str(&format!("\n\n{}\n{}", bold("Regular schedule:"), regular.join("\n")));
    }

    text.push_str(&contact_line(settings));
    text
}

pub fn render_help(is_admin: bool, settings: &BotSettings) -> String {
    let mut text = format!(
        "❓ {}\n\n{}\n1\\. 📝 {} \\- add yourself to the list\n2\\. 👥 {} \\- see who is coming\n3\\. ⏰ {} \\- date, time and place\n4\\. 🚫 {} \\- cancel your registration\n\nWhen the main list is full you go to the reserve and move up automatically when someone cancels\\.",
        bold("HELP"),
        bold("How to use:"),
        bold("Sign up"),
        bold("List"),
        bold("Schedule"),
        bold("Cancel"),
    );

    if is_admin {
        text.push_str(&format!("\n\n{}\n", bold("Admin commands:")));
        let admin_lines: Vec<String> = Command::descriptions()
            .to_string()
            .lines()
            .filter(|line| line.contains("Admin:"))
            .map(|line| escape_markdown(line.trim()))
            .collect();
        text.push_str(&admin_lines.join("\n"));
    }

    text.push_str(&contact_line(settings));
    text
}

pub async fn handle_start(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let is_admin = ctx.roster.is_admin(who.caller);
    match ctx.roster.list(who.caller).await {
        Ok(snapshot) => {
            bot.send_message(who.chat_id, render_welcome(&snapshot.state.session, snapshot.limits))
                .parse_mode(ParseMode::MarkdownV2)
                .reply_markup(main_menu(is_admin))
                .await?;
            tracing::info!("User {} started the bot", who.caller.user_id);
        }
        Err(e) => {
            CommandFeedback::new(bot.clone(), who.chat_id).roster_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_schedule(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    match ctx.roster.list(who.caller).await {
        Ok(snapshot) => {
            bot.send_message(who.chat_id, render_schedule(&snapshot.state.session, &ctx.settings))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Err(e) => {
            CommandFeedback::new(bot.clone(), who.chat_id).roster_error(&e).await?;
        }
    }
    Ok(())
}

pub async fn handle_help(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    let is_admin = ctx.roster.is_admin(who.caller);
    bot.send_message(who.chat_id, render_help(is_admin, &ctx.settings))
        .parse_mode(ParseMode::MarkdownV2)
        .reply_markup(main_menu(is_admin))
        .await?;
    Ok(())
}
