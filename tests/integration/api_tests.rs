//! HttpApi against the in-process fake API

use axum::http::StatusCode;

use itmanager_dashboard::{
    api::{HttpApi, InventoryApi},
    config::ApiConfig,
    models::{EquipmentDraft, EquipmentStatus, Role},
    AppError,
};

use crate::fake_api::{equipment, FakeApi, ADMIN_TOKEN, STANDARD_TOKEN};

fn client(fake: &FakeApi) -> HttpApi {
    HttpApi::new(&ApiConfig {
        base_url: format!("{}/", fake.base_url),
    })
    .expect("Failed to build client")
}

fn draft(serial: &str) -> EquipmentDraft {
    EquipmentDraft {
        equipment_type: "Desktop".to_string(),
        brand: "HP".to_string(),
        model: "EliteDesk".to_string(),
        serial_number: serial.to_string(),
        inventory_code: "INV-0100".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_login() {
    let fake = FakeApi::start(vec![]).await;
    let api = client(&fake);

    let response = api.login("ada", "secret").await.expect("Login failed");

    assert_eq!(response.token, ADMIN_TOKEN);
    assert_eq!(response.user.role, Role::Admin);
    assert_eq!(response.user.full_name, "Ada Admin");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let fake = FakeApi::start(vec![]).await;
    let api = client(&fake);

    let err = api.login("ada", "wrong").await.unwrap_err();

    match err {
        AppError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message.as_deref(), Some("Invalid username or password"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_and_types() {
    let fake = FakeApi::start(vec![equipment(1), equipment(2)]).await;
    let api = client(&fake);

    let items = api.list_equipment(STANDARD_TOKEN).await.expect("List failed");
    assert_eq!(items, vec![equipment(1), equipment(2)]);

    let types = api.list_equipment_types(STANDARD_TOKEN).await.expect("Types failed");
    let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Laptop", "Desktop", "Monitor"]);
}

#[tokio::test]
async fn test_list_without_data_is_empty() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    fake.state.lock().list_without_data = true;
    let api = client(&fake);

    let items = api.list_equipment(ADMIN_TOKEN).await.expect("List failed");

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_unauthorized_access() {
    let fake = FakeApi::start(vec![]).await;
    let api = client(&fake);

    let err = api.list_equipment("forged").await.unwrap_err();

    assert!(matches!(err, AppError::Api { status: 401, .. }));
    assert_eq!(err.user_message("fallback"), "Invalid token");
}

#[tokio::test]
async fn test_create_update_and_delete() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    let api = client(&fake);

    let created = api.create_equipment(ADMIN_TOKEN, &draft("NEW-1")).await.unwrap();
    assert_eq!(created.as_deref(), Some("created"));

    let mut changed = draft("NEW-1");
    changed.status = EquipmentStatus::Assigned;
    changed.assigned_to = Some("jdoe".to_string());
    let updated = api.update_equipment(ADMIN_TOKEN, 2, &changed).await.unwrap();
    assert_eq!(updated.as_deref(), Some("updated"));

    {
        let state = fake.state.lock();
        let stored = state.equipment.iter().find(|e| e.id == 2).unwrap();
        assert_eq!(stored.status, EquipmentStatus::Assigned);
        assert_eq!(stored.assigned_to.as_deref(), Some("jdoe"));
    }

    let deleted = api.delete_equipment(ADMIN_TOKEN, 1).await.unwrap();
    assert_eq!(deleted.as_deref(), Some("deleted"));
    assert_eq!(fake.state.lock().equipment.len(), 1);
}

#[tokio::test]
async fn test_conflict_message_is_kept() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    let api = client(&fake);

    let err = api.create_equipment(ADMIN_TOKEN, &draft("SN-1")).await.unwrap_err();

    assert_eq!(err.user_message("Could not create"), "Serial number already registered");
}

#[tokio::test]
async fn test_error_without_message_uses_fallback() {
    let fake = FakeApi::start(vec![equipment(1)]).await;
    let api = client(&fake);

    let err = api.delete_equipment(ADMIN_TOKEN, 99).await.unwrap_err();
    assert!(matches!(err, AppError::Api { status: 404, message: None }));

    fake.state.lock().list_failure = Some(StatusCode::BAD_GATEWAY);
    let err = api.list_equipment(ADMIN_TOKEN).await.unwrap_err();
    assert!(matches!(err, AppError::Api { status: 502, message: None }));
    assert_eq!(err.user_message("Could not load equipment."), "Could not load equipment.");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpApi::new(&ApiConfig {
        base_url: format!("http://{}/api", addr),
    })
    .unwrap();

    let err = api.list_equipment(ADMIN_TOKEN).await.unwrap_err();
    assert!(err.is_network());
}
