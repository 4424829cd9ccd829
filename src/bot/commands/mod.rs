pub mod admin;
pub mod list;
pub mod registration;
pub mod schedule;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Training roster commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Show the menu and the next training")]
    Start,
    #[command(description = "Sign up, optionally with the name to show: /register Anna K.")]
    Register(String),
    #[command(description = "Cancel your registration")]
    Cancel,
    #[command(description = "Show the main list and the reserve")]
    List,
    #[command(description = "Show date, time and place")]
    Schedule,
    #[command(description = "Admin: numbered roster and controls")]
    Admin,
    #[command(description = "Admin: set the date, /setdate 2024-05-14")]
    SetDate(String),
    #[command(description = "Admin: set the time, /settime 20:45")]
    SetTime(String),
    #[command(description = "Admin: set the place, /setplace Central gym")]
    SetPlace(String),
    #[command(description = "Admin: add a participant by name, /add Guest Name")]
    Add(String),
    #[command(description = "Admin: remove participant number N, /remove 3")]
    Remove(String),
    #[command(description = "Admin: open registration")]
    Open,
    #[command(description = "Admin: close registration")]
    Close,
    #[command(description = "Admin: clear the roster and start a new session")]
    NewSession,
}
