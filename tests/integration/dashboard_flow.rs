//! End-to-end dashboard flows: Services over HttpApi, a file-backed session
//! store and the fake API

use std::{path::Path, sync::Arc};

use chrono::Duration;
use tokio_test::{assert_err, assert_ok};

use itmanager_dashboard::{
    api::HttpApi,
    config::{ApiConfig, AppConfig},
    models::{EquipmentDraft, EquipmentStatus},
    services::{
        equipment::{Outcome, ADMIN_ONLY_DELETE},
        notifications::{ManualClock, ToastKind},
        router::View,
        session::{TOKEN_KEY, USER_KEY},
    },
    storage::{FileStore, KeyValueStore},
    AppError, AppState,
};

use crate::fake_api::{admin_user, equipment, FakeApi};

fn app(fake: &FakeApi, session_file: &Path, clock: Arc<ManualClock>) -> AppState {
    let config = AppConfig {
        api: ApiConfig {
            base_url: fake.base_url.clone(),
        },
        ..Default::default()
    };
    let api = HttpApi::new(&config.api).unwrap();
    let store = FileStore::open(session_file).unwrap();
    AppState::with_clock(config, Arc::new(api), Arc::new(store), clock)
}

fn new_item() -> EquipmentDraft {
    EquipmentDraft {
        equipment_type: "Monitor".to_string(),
        brand: "Dell".to_string(),
        model: "P2422H".to_string(),
        serial_number: "CN-0042".to_string(),
        inventory_code: "INV-0002".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_admin_creates_equipment() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&fake, &dir.path().join("session.json"), Arc::new(ManualClock::default()));
    let services = &state.services;

    assert!(!services.start());
    assert_ok!(services.sign_in("ada", "secret").await);
    assert_ok!(services.load_equipment_screen().await);
    assert_eq!(services.equipment.items().len(), 1);
    assert_eq!(services.equipment.types().len(), 3);

    let lists_before = fake.calls("GET /equipos");
    assert_ok!(services.equipment.begin_create());
    assert_eq!(assert_ok!(services.equipment.submit(new_item()).await), Outcome::Done);

    assert_eq!(fake.calls("GET /equipos"), lists_before + 1);
    assert!(services.equipment.form().is_none());
    let items = services.equipment.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].id, 2);
    assert_eq!(items[1].status, EquipmentStatus::Available);

    let toast = services.notifications.current().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.text, "created");
}

#[tokio::test]
async fn test_session_survives_restart() {
    let fake = FakeApi::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");

    let first = app(&fake, &session_file, Arc::new(ManualClock::default()));
    assert_ok!(first.services.sign_in("ada", "secret").await);
    drop(first);

    let second = app(&fake, &session_file, Arc::new(ManualClock::default()));
    assert!(second.services.start());
    assert_eq!(second.services.session.user(), Some(admin_user()));
    assert!(second.services.equipment.is_mounted());
}

#[tokio::test]
async fn test_corrupted_session_file_forces_sign_in() {
    let fake = FakeApi::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    {
        let store = FileStore::open(&session_file).unwrap();
        store.set(TOKEN_KEY, "admin-token").unwrap();
        store.set(USER_KEY, "{\"id\": oops").unwrap();
    }

    let state = app(&fake, &session_file, Arc::new(ManualClock::default()));
    assert!(!state.services.start());

    let store = FileStore::open(&session_file).unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(store.get(USER_KEY).unwrap(), None);
    assert_eq!(
        state.services.notifications.current().map(|t| t.kind),
        Some(ToastKind::Error)
    );
}

#[tokio::test]
async fn test_bad_login_writes_nothing() {
    let fake = FakeApi::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let state = app(&fake, &session_file, Arc::new(ManualClock::default()));

    assert_err!(state.services.sign_in("baduser", "badpass").await);

    assert!(!session_file.exists());
    assert!(!state.services.session.is_authenticated());
    assert_eq!(
        state.services.session.last_error().as_deref(),
        Some("Invalid username or password")
    );
    assert_eq!(
        state.services.notifications.current().map(|t| t.text).as_deref(),
        Some("Invalid username or password")
    );
}

#[tokio::test]
async fn test_standard_user_cannot_delete() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&fake, &dir.path().join("session.json"), Arc::new(ManualClock::default()));
    let services = &state.services;

    assert_ok!(services.sign_in("sam", "secret").await);
    assert_ok!(services.equipment.list().await);
    let calls_before = fake.total_calls();

    let result = services.equipment.delete(1, |_| true).await;

    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert_eq!(fake.total_calls(), calls_before);
    assert_eq!(fake.calls("DELETE /equipos/1"), 0);
    assert_eq!(
        services.notifications.current().map(|t| t.text).as_deref(),
        Some(ADMIN_ONLY_DELETE)
    );
}

#[tokio::test]
async fn test_admin_deletes_after_confirmation() {
    let fake = FakeApi::start(vec![equipment(1), equipment(2)]).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&fake, &dir.path().join("session.json"), Arc::new(ManualClock::default()));
    let services = &state.services;

    assert_ok!(services.sign_in("ada", "secret").await);
    assert_ok!(services.equipment.list().await);

    let mut prompt = String::new();
    let outcome = services
        .equipment
        .delete(1, |text| {
            prompt = text.to_string();
            true
        })
        .await;

    assert_eq!(assert_ok!(outcome), Outcome::Done);
    assert!(!prompt.is_empty());
    assert_eq!(fake.calls("DELETE /equipos/1"), 1);
    let ids: Vec<i64> = services.equipment.items().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_navigation_by_role() {
    let fake = FakeApi::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&fake, &dir.path().join("session.json"), Arc::new(ManualClock::default()));
    let services = &state.services;

    assert!(matches!(services.navigate(View::Dashboard), Err(AppError::Authorization(_))));

    assert_ok!(services.sign_in("sam", "secret").await);
    assert_eq!(services.active_view(), View::Equipment);
    assert!(services.nav_entries().iter().all(|e| e.view != View::Users));
    assert_err!(services.navigate(View::Users));
    assert_eq!(services.active_view(), View::Equipment);

    assert_eq!(assert_ok!(services.navigate(View::Maintenance)), View::Equipment);
    assert!(!services.equipment.is_mounted());
    assert_ok!(services.navigate(View::Equipment));
    assert!(services.equipment.is_mounted());

    services.sign_out();
    assert!(!services.session.is_authenticated());
    assert!(!services.equipment.is_mounted());

    assert_ok!(services.sign_in("ada", "secret").await);
    assert!(services.nav_entries().iter().any(|e| e.view == View::Users));
    assert_ok!(services.navigate(View::Users));
}

#[tokio::test]
async fn test_toast_expires() {
    let fake = FakeApi::start(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::default());
    let state = app(&fake, &dir.path().join("session.json"), clock.clone());
    let services = &state.services;

    assert_ok!(services.sign_in("ada", "secret").await);
    assert!(services.notifications.current().is_some());

    clock.advance(Duration::seconds(state.config.notifications.ttl_seconds as i64));
    assert!(services.notifications.tick());
    assert!(services.notifications.current().is_none());
}
