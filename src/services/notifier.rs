use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::database::models::{Entry, SessionInfo};
use crate::utils::markdown::{bold, escape_markdown};

/// Tells promoted participants that they moved from the reserve into the
/// main list. Delivery is best effort.
#[derive(Clone)]
pub struct PromotionNotifier {
    bot: Bot,
}

impl PromotionNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Sends the notice in the background. Never fails the caller.
    pub fn spawn_notify(&self, promoted: Entry, session: SessionInfo) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify(&promoted, &session).await;
        });
    }

    pub async fn notify(&self, promoted: &Entry, session: &SessionInfo) {
        let Some(user_id) = promoted.user_id() else {
            tracing::debug!("Manual entry '{}' promoted, nobody to notify", promoted.display_name);
            return;
        };

        match self
            .bot
            .send_message(ChatId(user_id), promotion_message(promoted, session))
            .parse_mode(ParseMode::MarkdownV2)
            .await
        {
            Ok(_) => tracing::info!("Notified user {} about promotion", user_id),
            Err(e) => tracing::warn!("Failed to notify user {} about promotion: {}", user_id, e),
        }
    }
}

pub fn promotion_message(promoted: &Entry, session: &SessionInfo) -> String {
    format!(
        "🎉 {}\n\n{}, a place opened up and you moved from the reserve into the main list\\.\n\n📅 {}\n⏰ {}\n📍 {}",
        bold("You are in\\!"),
        escape_markdown(&promoted.display_name),
        escape_markdown(&session.date),
        escape_markdown(&session.time),
        escape_markdown(&session.place),
    )
}
