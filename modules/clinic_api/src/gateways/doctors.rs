use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::instrument;

use crate::contract::client::DoctorsApi;
use crate::contract::model::{Doctor, DoctorRequest};
use crate::gateways::resource::RestResource;

#[derive(Clone)]
pub struct DoctorsRestClient {
    resource: RestResource<DoctorRequest, Doctor>,
}

impl DoctorsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "doctors"),
        }
    }
}

#[async_trait]
impl DoctorsApi for DoctorsRestClient {
    #[instrument(name = "clinic_api.doctors.create", skip_all, fields(user_id = req.user_id))]
    async fn create(&self, req: &DoctorRequest) -> Result<Doctor, ApiError> {
        self.resource.create(req).await
    }

    #[instrument(name = "clinic_api.doctors.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<Doctor>, ApiError> {
        self.resource.get_all().await
    }

    #[instrument(name = "clinic_api.doctors.get_by_id", skip_all, fields(doctor_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<Doctor, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.doctors.update", skip_all, fields(doctor_id = id))]
    async fn update(&self, id: i64, req: &DoctorRequest) -> Result<Doctor, ApiError> {
        self.resource.update(id, req).await
    }

    #[instrument(name = "clinic_api.doctors.delete", skip_all, fields(doctor_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.resource.delete(id).await
    }
}
