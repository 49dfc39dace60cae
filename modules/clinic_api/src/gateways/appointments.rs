use async_trait::async_trait;
use chrono::NaiveDate;
use rest_client::{ApiClient, ApiError};
use tracing::{debug, instrument};

use crate::contract::client::AppointmentsApi;
use crate::contract::model::{Appointment, AppointmentRequest};
use crate::gateways::resource::RestResource;

/// REST adapter for `/appointments`.
#[derive(Clone)]
pub struct AppointmentsRestClient {
    resource: RestResource<AppointmentRequest, Appointment>,
}

impl AppointmentsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "appointments"),
        }
    }
}

#[async_trait]
impl AppointmentsApi for AppointmentsRestClient {
    #[instrument(
        name = "clinic_api.appointments.create",
        skip_all,
        fields(patient_id = req.patient_id, doctor_id = req.doctor_id)
    )]
    async fn create(&self, req: &AppointmentRequest) -> Result<Appointment, ApiError> {
        if !req.has_valid_window() {
            // sent anyway; the server owns validation
            debug!("appointment ends before it starts");
        }
        self.resource.create(req).await
    }

    #[instrument(name = "clinic_api.appointments.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<Appointment>, ApiError> {
        self.resource.get_all().await
    }

    #[instrument(name = "clinic_api.appointments.get_by_id", skip_all, fields(appointment_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<Appointment, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.appointments.update", skip_all, fields(appointment_id = id))]
    async fn update(&self, id: i64, req: &AppointmentRequest) -> Result<Appointment, ApiError> {
        self.resource.update(id, req).await
    }

    #[instrument(name = "clinic_api.appointments.delete", skip_all, fields(appointment_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.resource.delete(id).await
    }

    #[instrument(
        name = "clinic_api.appointments.get_by_patient",
        skip_all,
        fields(patient_id = patient_id)
    )]
    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, ApiError> {
        self.resource.list_by("patient", patient_id).await
    }

    #[instrument(name = "clinic_api.appointments.get_by_doctor", skip_all, fields(doctor_id = doctor_id))]
    async fn get_by_doctor(&self, doctor_id: i64) -> Result<Vec<Appointment>, ApiError> {
        self.resource.list_by("doctor", doctor_id).await
    }

    #[instrument(name = "clinic_api.appointments.get_by_date", skip_all, fields(date = %date))]
    async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError> {
        // NaiveDate displays as YYYY-MM-DD
        self.resource.list_by("date", date).await
    }
}
