/// Roster JSON file access
pub mod store;
/// Roster entries, state and the persisted document shape
pub mod models;
