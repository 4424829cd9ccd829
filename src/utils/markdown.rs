//! Helpers for Telegram MarkdownV2 text.
//!
//! Everything user-controlled (display names, usernames, places) goes through
//! [`escape_markdown`] before it is embedded in a formatted message.

const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escapes markdown special characters for MarkdownV2 parsing mode
///
/// # Example
/// ```
/// use training_roster_bot::utils::markdown::escape_markdown;
///
/// let escaped = escape_markdown("Anna (goalkeeper)");
/// assert_eq!(escaped, "Anna \\(goalkeeper\\)");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps already-escaped text in MarkdownV2 bold markers.
pub fn bold(escaped: &str) -> String {
    format!("*{escaped}*")
}
