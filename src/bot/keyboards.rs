use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::database::models::RosterState;

/// Buttons of the persistent reply keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    SignUp,
    List,
    Schedule,
    Cancel,
    Help,
    Admin,
}

impl MenuButton {
    const ALL: [MenuButton; 6] = [
        MenuButton::SignUp,
        MenuButton::List,
        MenuButton::Schedule,
        MenuButton::Cancel,
        MenuButton::Help,
        MenuButton::Admin,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuButton::SignUp => "📝 Sign up",
            MenuButton::List => "👥 List",
            MenuButton::Schedule => "⏰ Schedule",
            MenuButton::Cancel => "🚫 Cancel",
            MenuButton::Help => "❓ Help",
            MenuButton::Admin => "👑 Admin",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|b| b.label() == text)
    }
}

pub fn main_menu(is_admin: bool) -> KeyboardMarkup {
    let button = |b: MenuButton| KeyboardButton::new(b.label());
    let mut rows = vec![
        vec![button(MenuButton::SignUp), button(MenuButton::List)],
        vec![button(MenuButton::Schedule), button(MenuButton::Cancel)],
    ];
    if is_admin {
        rows.push(vec![button(MenuButton::Help), button(MenuButton::Admin)]);
    } else {
        rows.push(vec![button(MenuButton::Help)]);
    }
    KeyboardMarkup::new(rows)
}

/// Inline button payloads. Encoded as short `scope:action[:arg]` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    SignUpWithTelegramName,
    SignUpAbort,
    AdminOpen,
    AdminClose,
    AdminAddManual,
    AdminNewSession,
    AdminNewSessionConfirm,
    AdminNewSessionAbort,
    /// Participant number plus the `Entry::tag` it had when the panel was drawn.
    AdminRemove { index: usize, tag: u32 },
    AdminRefresh,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "signup:default" => CallbackAction::SignUpWithTelegramName,
            "signup:abort" => CallbackAction::SignUpAbort,
            "admin:open" => CallbackAction::AdminOpen,
            "admin:close" => CallbackAction::AdminClose,
            "admin:add" => CallbackAction::AdminAddManual,
            "admin:newsession" => CallbackAction::AdminNewSession,
            "admin:newsession:confirm" => CallbackAction::AdminNewSessionConfirm,
            "admin:newsession:abort" => CallbackAction::AdminNewSessionAbort,
            "admin:refresh" => CallbackAction::AdminRefresh,
            other => {
                let (index, tag) = other.strip_prefix("admin:remove:")?.split_once(':')?;
                CallbackAction::AdminRemove { index: index.parse().ok()?, tag: tag.parse().ok()? }
            }
        };
        Some(action)
    }

    pub fn data(&self) -> String {
        match self {
            CallbackAction::SignUpWithTelegramName => "signup:default".to_string(),
            CallbackAction::SignUpAbort => "signup:abort".to_string(),
            CallbackAction::AdminOpen => "admin:open".to_string(),
            CallbackAction::AdminClose => "admin:close".to_string(),
            CallbackAction::AdminAddManual => "admin:add".to_string(),
            CallbackAction::AdminNewSession => "admin:newsession".to_string(),
            CallbackAction::AdminNewSessionConfirm => "admin:newsession:confirm".to_string(),
            CallbackAction::AdminNewSessionAbort => "admin:newsession:abort".to_string(),
            CallbackAction::AdminRemove { index, tag } => format!("admin:remove:{index}:{tag}"),
            CallbackAction::AdminRefresh => "admin:refresh".to_string(),
        }
    }

    pub fn is_sign_up_action(&self) -> bool {
        matches!(self, CallbackAction::SignUpWithTelegramName | CallbackAction::SignUpAbort)
    }

    pub fn is_admin_action(&self) -> bool {
        !self.is_sign_up_action()
    }

    fn button(self, text: impl Into<String>) -> InlineKeyboardButton {
        InlineKeyboardButton::callback(text, self.data())
    }
}

pub fn sign_up_prompt(telegram_name: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![CallbackAction::SignUpWithTelegramName.button(format!("Use \"{telegram_name}\""))],
        vec![CallbackAction::SignUpAbort.button("✖️ Never mind")],
    ])
}

/// Registration toggle, add/new-session actions and one remove button per
/// participant, numbered the same way as `/remove` expects.
pub fn admin_panel(state: &RosterState) -> InlineKeyboardMarkup {
    let toggle = if state.registration_open {
        CallbackAction::AdminClose.button("🔒 Close registration")
    } else {
        CallbackAction::AdminOpen.button("🔓 Open registration")
    };

    let mut rows = vec![
        vec![toggle, CallbackAction::AdminAddManual.button("➕ Add participant")],
        vec![
            CallbackAction::AdminNewSession.button("🆕 New session"),
            CallbackAction::AdminRefresh.button("🔄 Refresh"),
        ],
    ];

    let remove_buttons: Vec<InlineKeyboardButton> = state
        .entries()
        .enumerate()
        .map(|(i, entry)| {
            CallbackAction::AdminRemove { index: i + 1, tag: entry.tag() }
                .button(format!("❌ {}. {}", i + 1, entry.display_name))
        })
        .collect();
    rows.extend(remove_buttons.chunks(2).map(<[InlineKeyboardButton]>::to_vec));

    InlineKeyboardMarkup::new(rows)
}

pub fn confirm_new_session() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        CallbackAction::AdminNewSessionConfirm.button("✅ Yes, clear the roster"),
        CallbackAction::AdminNewSessionAbort.button("↩️ Keep it"),
    ]])
}
