use teloxide::prelude::*;
use teloxide::types::ParseMode;
use crate::error::RosterError;
use crate::utils::markdown::escape_markdown;

/// Feedback types for different command outcomes
#[derive(Debug, Clone)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
}

impl FeedbackType {
    pub fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }
}

/// Builds the MarkdownV2 body of a feedback message.
pub fn format_feedback(feedback_type: &FeedbackType, message: &str) -> String {
    format!("{} {}", feedback_type.emoji(), escape_markdown(message))
}

/// Builds the MarkdownV2 body for a failed roster operation.
pub fn format_roster_error(err: &RosterError) -> String {
    let message = format!("{err}\n\n💡 {}", err.suggestion());
    format_feedback(&FeedbackType::Error, &message)
}

/// Centralized feedback system for bot commands
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Send immediate feedback message
    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        self.bot
            .send_message(self.chat_id, format_feedback(&feedback_type, message))
            .parse_mode(ParseMode::MarkdownV2)
            .await
    }

    /// Send success feedback
    pub async fn success(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Success, message).await
    }

    /// Send warning feedback
    pub async fn warning(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Warning, message).await
    }

    /// Send info feedback
    pub async fn info(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Info, message).await
    }

    /// Report a failed roster operation together with its hint
    pub async fn roster_error(&self, err: &RosterError) -> ResponseResult<Message> {
        self.bot
            .send_message(self.chat_id, format_roster_error(err))
            .parse_mode(ParseMode::MarkdownV2)
            .await
    }

    /// Warn that the change was applied but not written to disk
    pub async fn persistence_warning(&self, err: &RosterError) -> ResponseResult<Message> {
        tracing::warn!("Operation applied in memory only: {}", err);
        self.warning("Saved in memory only, the roster file could not be written.").await
    }

    /// Send validation error with helpful suggestion
    pub async fn validation_error(&self, error: &str, suggestion: &str) -> ResponseResult<Message> {
        let message = format!("{error}\n\n💡 Suggestion: {suggestion}");
        self.send(FeedbackType::Error, &message).await
    }
}
