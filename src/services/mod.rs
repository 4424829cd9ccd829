/// HTTP health endpoints
pub mod health;
/// Best-effort promotion messages
pub mod notifier;
/// Serialized roster operations with persistence
pub mod roster;
