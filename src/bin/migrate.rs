use anyhow::{anyhow, Result};
use std::env;
use std::io;
use std::path::Path;
use training_roster_bot::config::Config;
use training_roster_bot::database::models::RosterState;
use training_roster_bot::database::store::RosterStore;
use training_roster_bot::utils::datetime::today;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the migration
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "training_roster_bot=info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => migrate_file().await,
        "check" => check_file().await,
        "reset" => reset_file().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn open_store() -> Result<(Config, RosterStore)> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    println!("📄 Roster file: {}", short_path(&config.data_path));

    let store = RosterStore::open(config.data_path.clone(), config.defaults.clone())
        .await
        .map_err(|e| anyhow!("Failed to open roster file: {}", e))?;
    Ok((config, store))
}

/// Rewrites the roster file in the current format: legacy name fields and the
/// separate manual list are folded in, and the limits are enforced.
async fn migrate_file() -> Result<()> {
    println!("🔧 Training Roster Bot - Data Migration Tool");
    println!("============================================");

    let (config, store) = open_store().await?;

    let mut state = match store.load().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Could not read the roster file: {e}");
            std::process::exit(1);
        }
    };

    let dropped = state.normalize(config.limits);
    for entry in &dropped {
        println!("⚠️  Dropped '{}': no room left under the current limits", entry.display_name);
    }

    store
        .save(&state)
        .await
        .map_err(|e| anyhow!("Failed to write roster file: {}", e))?;

    println!("✅ Migration completed successfully!");
    println!(
        "👥 {} main ({} max), {} reserve ({} max)",
        state.main.len(),
        config.limits.max_main,
        state.reserve.len(),
        config.limits.max_reserve
    );
    Ok(())
}

async fn check_file() -> Result<()> {
    println!("🔍 Checking roster file...");

    let (config, store) = open_store().await?;

    match store.load_document().await {
        Ok(None) => {
            println!("ℹ️  No roster file yet; the bot will start a fresh session.");
        }
        Ok(Some(document)) => {
            let legacy = !document.manual_entries.is_empty();
            let mut state = document.into_state(&config.defaults, today());
            let dropped = state.normalize(config.limits);

            println!("✅ Roster file is readable!");
            println!("📋 Session: {} {} at {}", state.session.date, state.session.time, state.session.place);
            println!(
                "👥 Main: {}/{}  Reserve: {}/{}  Registration: {}",
                state.main.len(),
                config.limits.max_main,
                state.reserve.len(),
                config.limits.max_reserve,
                if state.registration_open { "open" } else { "closed" }
            );
            if legacy {
                println!("💡 The file still uses the separate manual list; run 'migrate' to fold it in");
            }
            if !dropped.is_empty() {
                println!("⚠️  {} entries do not fit the current limits and would be dropped", dropped.len());
            }
        }
        Err(e) => {
            println!("⚠️  Roster file check failed: {e}");
            println!("💡 Fix or remove the file, or run 'migrate reset' to start over");
        }
    }

    Ok(())
}

async fn reset_file() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL registrations in the roster file!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    let (_, store) = open_store().await?;

    if store.remove().await.map_err(|e| anyhow!("Failed to delete roster file: {}", e))? {
        println!("🗑️  Deleted roster file");
    }

    println!("🔄 Writing a fresh session...");
    let fresh = RosterState::fresh(store.defaults(), today());
    store
        .save(&fresh)
        .await
        .map_err(|e| anyhow!("Failed to write roster file: {}", e))?;

    println!("✅ Reset completed! Next training: {} {}", fresh.session.date, fresh.session.time);
    Ok(())
}

fn short_path(path: &Path) -> String {
    // Only the file name, full paths stay out of shared terminals
    match path.file_name() {
        Some(name) => format!(".../{}", name.to_string_lossy()),
        None => path.display().to_string(),
    }
}

fn print_help() {
    println!("🏋️ Training Roster Bot - Data Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Rewrite the roster file in the current format (default)");
    println!("    check          Check that the roster file is readable and fits the limits");
    println!("    reset          Delete all registrations and start a fresh session - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    ROSTER_DATA_PATH   Roster file (default: ./data/training_data.json)");
    println!("    MAX_MAIN           Main list capacity (default: 20)");
    println!("    MAX_RESERVE        Reserve capacity (default: 10)");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Upgrade the roster file");
    println!("    migrate check              # Check roster status");
    println!("    migrate reset              # Start over (careful!)");
    println!();
}
