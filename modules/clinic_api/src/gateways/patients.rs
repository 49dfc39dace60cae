use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::instrument;

use crate::contract::client::PatientsApi;
use crate::contract::model::{Patient, PatientRequest};
use crate::gateways::resource::RestResource;

#[derive(Clone)]
pub struct PatientsRestClient {
    resource: RestResource<PatientRequest, Patient>,
}

impl PatientsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "patients"),
        }
    }
}

#[async_trait]
impl PatientsApi for PatientsRestClient {
    #[instrument(name = "clinic_api.patients.create", skip_all, fields(user_id = req.user_id))]
    async fn create(&self, req: &PatientRequest) -> Result<Patient, ApiError> {
        self.resource.create(req).await
    }

    #[instrument(name = "clinic_api.patients.get_by_id", skip_all, fields(patient_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<Patient, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.patients.update", skip_all, fields(patient_id = id))]
    async fn update(&self, id: i64, req: &PatientRequest) -> Result<Patient, ApiError> {
        self.resource.update(id, req).await
    }

    #[instrument(name = "clinic_api.patients.delete", skip_all, fields(patient_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.resource.delete(id).await
    }
}
