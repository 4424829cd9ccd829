//! # Training Roster Bot
//!
//! A Telegram bot that keeps the sign-up list for a recurring training session.
//!
//! ## Features
//! - Main list with a fixed capacity and a reserve list behind it
//! - Automatic promotion from the reserve, with a private notification
//! - Admin controls for date, time, place, manual entries and removals
//! - Opening, closing and resetting registration
//! - Persistent storage in a single JSON file

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Roster models and the JSON file store
pub mod database;
/// Error types shared by the roster and the store
pub mod error;
/// Roster operations, promotion notices and the health endpoint
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
