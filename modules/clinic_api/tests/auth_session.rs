//! Authentication flows and their effect on the stored session.

mod common;

use std::sync::Arc;
use std::time::Duration;

use clinic_api::model::{ChangePasswordRequest, LoginRequest, ProfileUpdate, RegisterRequest, Role};
use clinic_api::session::{FileStore, KeyValueStore, TOKEN_KEY, USER_KEY};
use clinic_api::{
    ApiError, BillsApi, ClinicClient, ErrorKind, MedicalRecordsApi, Redirect, SessionContext,
    SessionState, UsersApi,
};
use httpmock::prelude::*;
use rest_client::RetryPolicy;
use serde_json::json;
use tempfile::TempDir;

use common::{client_with, memory_session, patient_user, patient_user_json};

fn auth_body(token: &str) -> serde_json::Value {
    json!({"token": token, "user": patient_user_json()})
}

#[tokio::test]
async fn register_then_login_as_patient() {
    let server = MockServer::start_async().await;
    let register = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/users/register")
                .header_missing("Authorization")
                .json_body(json!({
                    "username": "9998887777",
                    "email": "pat@example.com",
                    "password": "secret12",
                    "role": "PATIENT",
                    "firstName": "Pat",
                    "lastName": "Doe",
                    "phoneNumber": "9998887777"
                }));
            then.status(200).json_body(auth_body("reg-token"));
        })
        .await;
    let login = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/users/login")
                .json_body(json!({"username": "9998887777", "password": "secret12"}));
            then.status(200).json_body(auth_body("login-token"));
        })
        .await;
    let bills = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/bills/patient/42")
                .header("Authorization", "Bearer login-token");
            then.status(200).json_body(json!([]));
        })
        .await;

    let session = memory_session();
    let clinic = client_with(&server, session.clone());

    let registered = clinic
        .users()
        .register(&RegisterRequest {
            username: "9998887777".into(),
            email: "pat@example.com".into(),
            password: "secret12".into(),
            role: Role::Patient,
            first_name: "Pat".into(),
            last_name: "Doe".into(),
            phone_number: "9998887777".into(),
        })
        .await
        .unwrap();
    assert_eq!(registered.token, "reg-token");
    assert_eq!(session.token().unwrap().as_deref(), Some("reg-token"));

    assert_eq!(clinic.users().logout().unwrap(), Redirect::Login);
    assert!(!clinic.users().is_authenticated().unwrap());

    let auth = clinic
        .users()
        .login(&LoginRequest {
            username: "9998887777".into(),
            password: "secret12".into(),
        })
        .await
        .unwrap();

    assert_eq!(auth.user.role, Role::Patient);
    assert!(clinic.users().is_authenticated().unwrap());
    assert_eq!(clinic.users().current_user().unwrap(), Some(patient_user()));

    let user_id = clinic.users().current_user().unwrap().unwrap().id;
    clinic.bills().get_by_patient(user_id).await.unwrap();

    register.assert_async().await;
    login.assert_async().await;
    bills.assert_async().await;
}

#[tokio::test]
async fn unauthorized_response_clears_session() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/bills/1");
            then.status(401).json_body(json!({"message": "JWT expired"}));
        })
        .await;

    let session = memory_session();
    session.persist("expired", &patient_user()).unwrap();
    let clinic = client_with(&server, session.clone());

    let err = clinic.bills().get_by_id(1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.redirect(), Some(Redirect::Login));
    assert_eq!(session.token().unwrap(), None);
    assert_eq!(session.current_user().unwrap(), None);
    assert_eq!(session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn failed_login_leaves_session_untouched() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/users/login");
            then.status(400)
                .json_body(json!({"message": "Invalid username or password"}));
        })
        .await;

    let session = memory_session();
    let clinic = client_with(&server, session.clone());
    let err = clinic
        .users()
        .login(&LoginRequest {
            username: "9998887777".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Server { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid username or password");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert_eq!(session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn empty_token_is_not_persisted() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/users/login");
            then.status(200).json_body(auth_body(""));
        })
        .await;

    let session = memory_session();
    let clinic = client_with(&server, session.clone());
    let auth = clinic
        .users()
        .login(&LoginRequest {
            username: "9998887777".into(),
            password: "secret12".into(),
        })
        .await
        .unwrap();

    assert!(auth.token.is_empty());
    assert_eq!(session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn profile_update_refreshes_stored_user() {
    let server = MockServer::start_async().await;
    let mut updated = patient_user_json();
    updated["email"] = json!("new@example.com");
    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/v1/users/profile")
                .header("Authorization", "Bearer tok")
                .json_body(json!({"email": "new@example.com"}));
            then.status(200).json_body(updated.clone());
        })
        .await;

    let session = memory_session();
    session.persist("tok", &patient_user()).unwrap();
    let clinic = client_with(&server, session.clone());

    let user = clinic
        .users()
        .update_profile(&ProfileUpdate {
            email: Some("new@example.com".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(user.email, "new@example.com");
    assert_eq!(session.current_user().unwrap().unwrap().email, "new@example.com");
    assert_eq!(session.token().unwrap().as_deref(), Some("tok"));
}

#[tokio::test]
async fn profile_update_without_session_stores_nothing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/v1/users/profile");
            then.status(200).json_body(patient_user_json());
        })
        .await;

    let session = memory_session();
    let clinic = client_with(&server, session.clone());
    clinic
        .users()
        .update_profile(&ProfileUpdate::default())
        .await
        .unwrap();

    assert_eq!(session.current_user().unwrap(), None);
    assert_eq!(session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn change_password_sends_both_passwords() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/users/change-password")
                .json_body(json!({"oldPassword": "secret12", "newPassword": "secret34"}));
            then.status(200).body("Password changed successfully");
        })
        .await;

    let clinic = client_with(&server, memory_session());
    clinic
        .users()
        .change_password(&ChangePasswordRequest {
            old_password: "secret12".into(),
            new_password: "secret34".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn file_session_survives_restart() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/users/login");
            then.status(200).json_body(auth_body("durable"));
        })
        .await;
    let authed = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/medical-records")
                .header("Authorization", "Bearer durable");
            then.status(200).json_body(json!([]));
        })
        .await;

    let dir = TempDir::new().unwrap();
    let open = || {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
        ClinicClient::new(
            &server.url("/api/v1"),
            Duration::from_secs(5),
            RetryPolicy::none(),
            SessionContext::new(store),
        )
        .unwrap()
    };

    let first = open();
    first
        .users()
        .login(&LoginRequest {
            username: "9998887777".into(),
            password: "secret12".into(),
        })
        .await
        .unwrap();
    drop(first);

    let second = open();
    assert_eq!(second.users().current_user().unwrap(), Some(patient_user()));
    second.medical_records().get_all().await.unwrap();
    authed.assert_async().await;

    assert!(second.users().logout().is_ok());
    assert!(!dir.path().join(TOKEN_KEY).exists());
    assert!(!dir.path().join(USER_KEY).exists());
}

#[tokio::test]
async fn corrupted_file_session_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(USER_KEY), "{\"id\": \"not a number\"").unwrap();
    std::fs::write(dir.path().join(TOKEN_KEY), "tok").unwrap();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path()).unwrap());
    let session = SessionContext::new(store);

    let err = session.current_user().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptedSession);

    // clearing recovers
    session.clear().unwrap();
    assert_eq!(session.state().unwrap(), SessionState::Anonymous);
}
