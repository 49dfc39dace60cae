use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::instrument;

use crate::contract::client::MedicalRecordsApi;
use crate::contract::model::{MedicalRecord, MedicalRecordRequest};
use crate::gateways::resource::RestResource;

#[derive(Clone)]
pub struct MedicalRecordsRestClient {
    resource: RestResource<MedicalRecordRequest, MedicalRecord>,
}

impl MedicalRecordsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "medical-records"),
        }
    }
}

#[async_trait]
impl MedicalRecordsApi for MedicalRecordsRestClient {
    #[instrument(
        name = "clinic_api.medical_records.create",
        skip_all,
        fields(patient_id = req.patient_id, doctor_id = req.doctor_id)
    )]
    async fn create(&self, req: &MedicalRecordRequest) -> Result<MedicalRecord, ApiError> {
        self.resource.create(req).await
    }

    #[instrument(name = "clinic_api.medical_records.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<MedicalRecord>, ApiError> {
        self.resource.get_all().await
    }

    #[instrument(name = "clinic_api.medical_records.get_by_id", skip_all, fields(record_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<MedicalRecord, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.medical_records.update", skip_all, fields(record_id = id))]
    async fn update(
        &self,
        id: i64,
        req: &MedicalRecordRequest,
    ) -> Result<MedicalRecord, ApiError> {
        self.resource.update(id, req).await
    }

    #[instrument(name = "clinic_api.medical_records.delete", skip_all, fields(record_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.resource.delete(id).await
    }

    #[instrument(
        name = "clinic_api.medical_records.get_by_patient",
        skip_all,
        fields(patient_id = patient_id)
    )]
    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<MedicalRecord>, ApiError> {
        self.resource.list_by("patient", patient_id).await
    }

    #[instrument(
        name = "clinic_api.medical_records.get_by_doctor",
        skip_all,
        fields(doctor_id = doctor_id)
    )]
    async fn get_by_doctor(&self, doctor_id: i64) -> Result<Vec<MedicalRecord>, ApiError> {
        self.resource.list_by("doctor", doctor_id).await
    }
}
