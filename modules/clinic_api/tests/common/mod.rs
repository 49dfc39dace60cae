#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use clinic_api::model::{Role, User};
use clinic_api::session::{KeyValueStore, MemoryStore};
use clinic_api::{ClinicClient, SessionContext};
use httpmock::MockServer;
use rest_client::RetryPolicy;
use serde_json::{json, Value};

pub fn memory_session() -> SessionContext {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    SessionContext::new(store)
}

pub fn client_with(server: &MockServer, session: SessionContext) -> ClinicClient {
    ClinicClient::new(
        &server.url("/api/v1"),
        Duration::from_secs(5),
        RetryPolicy::none(),
        session,
    )
    .unwrap()
}

pub fn patient_user_json() -> Value {
    json!({
        "id": 42,
        "username": "9998887777",
        "email": "pat@example.com",
        "role": "PATIENT",
        "firstName": "Pat",
        "lastName": "Doe",
        "phoneNumber": "9998887777"
    })
}

pub fn patient_user() -> User {
    User {
        id: 42,
        username: "9998887777".into(),
        email: "pat@example.com".into(),
        role: Role::Patient,
        first_name: "Pat".into(),
        last_name: "Doe".into(),
        phone_number: Some("9998887777".into()),
        created_at: None,
        updated_at: None,
    }
}

pub fn bill_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "patientId": 3,
        "amount": 120.0,
        "description": "Root canal consultation",
        "dueDate": "2024-06-01",
        "status": status,
        "items": [
            {"description": "Consultation", "quantity": 1, "unitPrice": 120.0, "total": 120.0}
        ],
        "paymentMethod": if status == "PAID" { json!("CARD") } else { Value::Null },
        "createdAt": "2024-05-01T10:00:00",
        "updatedAt": "2024-05-01T10:00:00"
    })
}

pub fn appointment_json(id: i64) -> Value {
    json!({
        "id": id,
        "patientId": 3,
        "doctorId": 7,
        "startTime": "2024-05-01T09:00:00",
        "endTime": "2024-05-01T09:30:00",
        "appointmentDate": "2024-05-01T09:00:00",
        "status": "SCHEDULED",
        "notes": "Check-up",
        "createdAt": "2024-04-20T08:00:00Z",
        "updatedAt": "2024-04-20T08:00:00Z"
    })
}
