use anyhow::Result;
use tempfile::{tempdir, TempDir};
use training_roster_bot::database::models::*;
use training_roster_bot::database::store::RosterStore;
use training_roster_bot::error::RosterError;
use training_roster_bot::services::roster::{Caller, RosterService};

const ADMIN: Caller = Caller { user_id: 1000 };

async fn setup_service(limits: RosterLimits) -> Result<(RosterService, TempDir)> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("training_data.json");
    let store = RosterStore::open(path, SessionDefaults::default()).await?;
    let service = RosterService::new(store, limits, ADMIN.user_id).await;
    Ok((service, temp_dir))
}

fn user(id: i64) -> Caller {
    Caller::new(id)
}

#[tokio::test]
async fn test_register_places_main_then_reserve() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits { max_main: 1, max_reserve: 1 }).await?;

    let first = service.register(user(1), "Anna", None).await?;
    assert_eq!(first.value.list, ListKind::Main);
    assert!(first.is_persisted());

    let second = service.register(user(2), "Boris", None).await?;
    assert_eq!(second.value.list, ListKind::Reserve);

    let third = service.register(user(3), "Clara", None).await;
    assert_eq!(third.unwrap_err(), RosterError::CapacityExceeded);
    Ok(())
}

#[tokio::test]
async fn test_changes_reach_the_file() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", Some("anna".to_string())).await?;

    let on_disk = service.store().load().await?;
    assert_eq!(on_disk.main.len(), 1);
    assert_eq!(on_disk.main[0].user_id(), Some(1));
    assert_eq!(on_disk.main[0].username(), Some("anna"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_registration_rejected() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", None).await?;

    let again = service.register(user(1), "Anna again", None).await;
    assert_eq!(again.unwrap_err(), RosterError::DuplicateUser);

    let same_name = service.register(user(2), " anna ", None).await;
    assert!(matches!(same_name, Err(RosterError::DuplicateName(_))));
    Ok(())
}

#[tokio::test]
async fn test_cancel_promotes_first_reserve() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits { max_main: 2, max_reserve: 2 }).await?;
    for (id, name) in [(1, "Anna"), (2, "Boris"), (3, "Clara"), (4, "Dmitry")] {
        service.register(user(id), name, None).await?;
    }

    let outcome = service.cancel(user(1)).await?;
    assert_eq!(outcome.value.from, ListKind::Main);
    assert_eq!(outcome.value.promoted.map(|e| e.display_name), Some("Clara".to_string()));

    let snapshot = service.list(user(2)).await?;
    let main: Vec<&str> = snapshot.state.main.iter().map(|e| e.display_name.as_str()).collect();
    let reserve: Vec<&str> = snapshot.state.reserve.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(main, vec!["Boris", "Clara"]);
    assert_eq!(reserve, vec!["Dmitry"]);

    assert_eq!(service.cancel(user(1)).await.unwrap_err(), RosterError::NotRegistered);
    Ok(())
}

#[tokio::test]
async fn test_admin_operations_require_admin() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", None).await?;
    let stranger = user(2);

    assert_eq!(
        service.admin_set_field(stranger, SessionField::Place, "Elsewhere").await.unwrap_err(),
        RosterError::PermissionDenied
    );
    assert_eq!(
        service.admin_add_manual(stranger, "Guest").await.unwrap_err(),
        RosterError::PermissionDenied
    );
    assert_eq!(
        service.admin_remove_by_index(stranger, 1).await.unwrap_err(),
        RosterError::PermissionDenied
    );
    assert_eq!(
        service.admin_set_registration_open(stranger, false).await.unwrap_err(),
        RosterError::PermissionDenied
    );
    assert_eq!(
        service.admin_new_session(stranger).await.unwrap_err(),
        RosterError::PermissionDenied
    );

    // Nothing changed
    let snapshot = service.list(stranger).await?;
    assert_eq!(snapshot.state.total(), 1);
    assert!(snapshot.state.registration_open);
    Ok(())
}

#[tokio::test]
async fn test_closed_registration_still_allows_manual_adds() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.admin_set_registration_open(ADMIN, false).await?;

    assert_eq!(
        service.register(user(1), "Anna", None).await.unwrap_err(),
        RosterError::RegistrationClosed
    );

    let added = service.admin_add_manual(ADMIN, "Guest").await?;
    assert_eq!(added.value.list, ListKind::Main);
    assert!(added.state.main[0].is_manual());
    Ok(())
}

#[tokio::test]
async fn test_admin_set_fields() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;

    let outcome = service.admin_set_field(ADMIN, SessionField::Date, "2024-05-14").await?;
    assert_eq!(outcome.value.date, "2024-05-14");
    let outcome = service.admin_set_field(ADMIN, SessionField::Time, "19:30").await?;
    assert_eq!(outcome.value.time, "19:30");
    let outcome = service.admin_set_field(ADMIN, SessionField::Place, " Central gym ").await?;
    assert_eq!(outcome.value.place, "Central gym");

    let bad = service.admin_set_field(ADMIN, SessionField::Date, "14/05/2024").await;
    assert!(matches!(bad, Err(RosterError::InvalidDate(_))));

    let stored = service.store().load().await?;
    assert_eq!(stored.session.date, "2024-05-14");
    assert_eq!(stored.session.time, "19:30");
    Ok(())
}

#[tokio::test]
async fn test_remove_by_index_spans_both_lists() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits { max_main: 2, max_reserve: 2 }).await?;
    for (id, name) in [(1, "Anna"), (2, "Boris"), (3, "Clara"), (4, "Dmitry")] {
        service.register(user(id), name, None).await?;
    }

    // Participant 4 is the second reserve entry
    let removed = service.admin_remove_by_index(ADMIN, 4).await?;
    assert_eq!(removed.value.entry.display_name, "Dmitry");
    assert_eq!(removed.value.from, ListKind::Reserve);
    assert!(removed.value.promoted.is_none());

    let removed = service.admin_remove_by_index(ADMIN, 1).await?;
    assert_eq!(removed.value.entry.display_name, "Anna");
    assert_eq!(removed.value.promoted.map(|e| e.display_name), Some("Clara".to_string()));

    assert_eq!(
        service.admin_remove_by_index(ADMIN, 3).await.unwrap_err(),
        RosterError::IndexOutOfRange { index: 3, total: 2 }
    );
    Ok(())
}

#[tokio::test]
async fn test_new_session_clears_everything() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", None).await?;
    service.admin_set_field(ADMIN, SessionField::Place, "Somewhere else").await?;
    service.admin_set_registration_open(ADMIN, false).await?;

    let outcome = service.admin_new_session(ADMIN).await?;
    assert_eq!(outcome.state.total(), 0);
    assert!(outcome.state.registration_open);
    assert_eq!(outcome.value.place, SessionDefaults::default().place);
    assert_eq!(outcome.value.time, "20:45");
    Ok(())
}

#[tokio::test]
async fn test_reads_external_file_changes() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", None).await?;

    let mut edited = service.store().load().await?;
    edited.add_manual(RosterLimits::STANDARD, "Edited by hand", "11:00")?;
    service.store().save(&edited).await?;

    let snapshot = service.list(user(1)).await?;
    assert_eq!(snapshot.state.total(), 2);
    Ok(())
}

#[tokio::test]
async fn test_oversized_file_is_normalized_on_start() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("training_data.json");
    let store = RosterStore::open(path, SessionDefaults::default()).await?;

    let mut state = store.load().await?;
    for id in 1..=5 {
        state.register(RosterLimits::STANDARD, id, &format!("User {id}"), None, "10:00")?;
    }
    store.save(&state).await?;

    let service = RosterService::new(store, RosterLimits { max_main: 2, max_reserve: 2 }, ADMIN.user_id).await;
    let snapshot = service.list(ADMIN).await?;
    assert_eq!(snapshot.state.main.len(), 2);
    assert_eq!(snapshot.state.reserve.len(), 2);
    assert_eq!(snapshot.state.reserve[0].display_name, "User 3");
    Ok(())
}

#[tokio::test]
async fn test_persistence_failure_keeps_change_in_memory() -> Result<()> {
    let temp_dir = tempdir()?;
    // A directory where the file should be: reads and the final rename fail
    let path = temp_dir.path().join("training_data.json");
    std::fs::create_dir(&path)?;
    let store = RosterStore::open(path, SessionDefaults::default()).await?;
    let service = RosterService::new(store, RosterLimits::STANDARD, ADMIN.user_id).await;

    let outcome = service.register(user(1), "Anna", None).await?;
    assert!(!outcome.is_persisted());
    assert!(matches!(
        outcome.persistence_warning,
        Some(RosterError::PersistenceFailure(_))
    ));

    let snapshot = service.list(user(1)).await?;
    assert_eq!(snapshot.state.main.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unsaved_change_survives_next_operation() -> Result<()> {
    let (service, temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    service.register(user(1), "Anna", None).await?;

    // The file stays readable but new writes can't land
    let blocker = temp_dir.path().join("training_data.json.tmp");
    std::fs::create_dir(&blocker)?;
    let outcome = service.register(user(2), "Boris", None).await?;
    assert!(!outcome.is_persisted());

    let names = |state: &RosterState| -> Vec<String> {
        state.main.iter().map(|e| e.display_name.clone()).collect()
    };
    let snapshot = service.list(user(1)).await?;
    assert_eq!(names(&snapshot.state), vec!["Anna", "Boris"]);

    let third = service.register(user(3), "Clara", None).await?;
    assert_eq!(names(&third.state), vec!["Anna", "Boris", "Clara"]);

    // Once writes work again everything reaches the file
    std::fs::remove_dir(&blocker)?;
    let cancel = service.cancel(user(3)).await?;
    assert!(cancel.is_persisted());
    let on_disk = service.store().load().await?;
    assert_eq!(names(&on_disk), vec!["Anna", "Boris"]);
    Ok(())
}

#[tokio::test]
async fn test_panel_removal_refuses_shifted_slot() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::STANDARD).await?;
    for (id, name) in [(1, "Anna"), (2, "Boris"), (3, "Clara")] {
        service.register(user(id), name, None).await?;
    }
    let panel = service.list(ADMIN).await?;
    let tag_of_boris = panel.state.entry_at(2).map(Entry::tag).unwrap();

    service.cancel(user(1)).await?;
    let stale = service.admin_remove_tagged(ADMIN, 2, tag_of_boris).await;
    assert_eq!(stale.unwrap_err(), RosterError::RosterChanged { index: 2 });
    assert_eq!(service.list(ADMIN).await?.state.total(), 2);

    let removed = service.admin_remove_tagged(ADMIN, 1, tag_of_boris).await?;
    assert_eq!(removed.value.entry.display_name, "Boris");

    let denied = service.admin_remove_tagged(user(3), 1, 0).await;
    assert_eq!(denied.unwrap_err(), RosterError::PermissionDenied);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_registrations_respect_capacity() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits::TEST).await?;

    let mut handles = Vec::new();
    for id in 1..=10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.register(user(id), &format!("Player {id}"), None).await
        }));
    }

    let mut accepted = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => accepted += 1,
            Err(e) => {
                assert_eq!(e, RosterError::CapacityExceeded);
                full += 1;
            }
        }
    }
    assert_eq!(accepted, 5);
    assert_eq!(full, 5);

    let on_disk = service.store().load().await?;
    assert_eq!(on_disk.main.len(), 3);
    assert_eq!(on_disk.reserve.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_full_scenario() -> Result<()> {
    let (service, _temp_dir) = setup_service(RosterLimits { max_main: 2, max_reserve: 1 }).await?;

    service.register(user(1), "A", None).await?;
    service.register(user(2), "B", None).await?;
    let c = service.register(user(3), "C", None).await?;
    assert_eq!(c.value.list, ListKind::Reserve);
    assert_eq!(
        service.register(user(4), "D", None).await.unwrap_err(),
        RosterError::CapacityExceeded
    );

    let cancel = service.cancel(user(1)).await?;
    assert_eq!(cancel.value.promoted.map(|e| e.display_name), Some("C".to_string()));

    let snapshot = service.list(user(4)).await?;
    let main: Vec<&str> = snapshot.state.main.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(main, vec!["B", "C"]);
    assert!(snapshot.state.reserve.is_empty());

    let d = service.register(user(4), "D", None).await?;
    assert_eq!(d.value.list, ListKind::Reserve);
    Ok(())
}
