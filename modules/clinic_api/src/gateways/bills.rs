use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::{info, instrument};

use crate::contract::client::BillsApi;
use crate::contract::model::{Bill, BillPaymentRequest, BillRequest, BillStatus};
use crate::gateways::resource::RestResource;

/// REST adapter for `/bills`.
#[derive(Clone)]
pub struct BillsRestClient {
    resource: RestResource<BillRequest, Bill>,
}

impl BillsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "bills"),
        }
    }
}

#[async_trait]
impl BillsApi for BillsRestClient {
    #[instrument(
        name = "clinic_api.bills.create",
        skip_all,
        fields(patient_id = req.patient_id, amount = %req.amount)
    )]
    async fn create(&self, req: &BillRequest) -> Result<Bill, ApiError> {
        self.resource.create(req).await
    }

    #[instrument(name = "clinic_api.bills.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<Bill>, ApiError> {
        self.resource.get_all().await
    }

    #[instrument(name = "clinic_api.bills.get_by_id", skip_all, fields(bill_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<Bill, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.bills.update", skip_all, fields(bill_id = id))]
    async fn update(&self, id: i64, req: &BillRequest) -> Result<Bill, ApiError> {
        self.resource.update(id, req).await
    }

    #[instrument(name = "clinic_api.bills.delete", skip_all, fields(bill_id = id))]
    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.resource.delete(id).await
    }

    #[instrument(name = "clinic_api.bills.get_by_patient", skip_all, fields(patient_id = patient_id))]
    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<Bill>, ApiError> {
        self.resource.list_by("patient", patient_id).await
    }

    #[instrument(name = "clinic_api.bills.get_by_status", skip_all, fields(status = %status))]
    async fn get_by_status(&self, status: BillStatus) -> Result<Vec<Bill>, ApiError> {
        self.resource.list_by("status", status).await
    }

    #[instrument(
        name = "clinic_api.bills.mark_as_paid",
        skip_all,
        fields(bill_id = id, payment_method = %payment_method)
    )]
    async fn mark_as_paid(&self, id: i64, payment_method: &str) -> Result<Bill, ApiError> {
        let body = BillPaymentRequest {
            payment_method: payment_method.to_string(),
        };
        let path = self.resource.path(&[&id, &"pay"]);
        let bill: Bill = self.resource.client().post(&path, &body).await?;
        info!(status = %bill.status, "bill payment recorded");
        Ok(bill)
    }
}
