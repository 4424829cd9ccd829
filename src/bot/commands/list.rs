use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::handlers::{Actor, BotContext};
use crate::database::models::Entry;
use crate::services::roster::RosterSnapshot;
use crate::utils::feedback::CommandFeedback;
use crate::utils::markdown::{bold, escape_markdown};

/// How participant numbers are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// Each list counts from 1, the way participants see it.
    PerList,
    /// Reserve continues after main; these are the numbers `/remove` takes.
    Continuous,
}

fn entry_line(number: usize, entry: &Entry) -> String {
    let mut line = format!("{}\\. {}", number, escape_markdown(&entry.display_name));
    if let Some(handle) = entry.username() {
        line.push_str(&format!(" \\(@{}\\)", escape_markdown(handle)));
    }
    if entry.is_manual() {
        line.push_str(" ✍️");
    }
    line.push('\n');
    line
}

/// Full roster as MarkdownV2.
pub fn render_roster(snapshot: &RosterSnapshot, numbering: Numbering) -> String {
    let state = &snapshot.state;
    let limits = snapshot.limits;

    let mut text = format!(
        "🏋️ {}\n⏰ {} {}\n📍 {} {}\n{}\n\n",
        bold(&format!("TRAINING {}", escape_markdown(&state.session.date))),
        bold("Time:"),
        escape_markdown(&state.session.time),
        bold("Place:"),
        escape_markdown(&state.session.place),
        if state.registration_open { "🔓 Registration is open" } else { "🔒 Registration is closed" },
    );

    text.push_str(&format!(
        "✅ {}\n",
        bold(&format!("Main list \\({}/{}\\):", state.main.len(), limits.max_main))
    ));
    if state.main.is_empty() {
        text.push_str("Nobody yet\n");
    }
    for (i, entry) in state.main.iter().enumerate() {
        text.push_str(&entry_line(i + 1, entry));
    }

    text.push_str(&format!(
        "\n⏳ {}\n",
        bold(&format!("Reserve \\({}/{}\\):", state.reserve.len(), limits.max_reserve))
    ));
    if state.reserve.is_empty() {
        text.push_str("Nobody yet\n");
    }
    let offset = match numbering {
        Numbering::PerList => 0,
        Numbering::Continuous => state.main.len(),
    };
    for (i, entry) in state.reserve.iter().enumerate() {
        text.push_str(&entry_line(offset + i + 1, entry));
    }

    text.push_str(&format!("\n📊 {} {}", bold("Total registered:"), state.total()));
    text
}

pub async fn handle_list(bot: &Bot, who: &Actor, ctx: &BotContext) -> ResponseResult<()> {
    match ctx.roster.list(who.caller).await {
        Ok(snapshot) => {
            bot.send_message(who.chat_id, render_roster(&snapshot, Numbering::PerList))
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to read roster: {}", e);
            CommandFeedback::new(bot.clone(), who.chat_id).roster_error(&e).await?;
        }
    }
    Ok(())
}
