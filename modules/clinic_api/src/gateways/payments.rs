use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::{info, instrument};

use crate::contract::client::PaymentsApi;
use crate::contract::model::{Payment, PaymentRequest};
use crate::gateways::resource::RestResource;

#[derive(Clone)]
pub struct PaymentsRestClient {
    resource: RestResource<PaymentRequest, Payment>,
}

impl PaymentsRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self {
            resource: RestResource::new(client, "payments"),
        }
    }
}

#[async_trait]
impl PaymentsApi for PaymentsRestClient {
    #[instrument(
        name = "clinic_api.payments.create",
        skip_all,
        fields(patient_id = req.patient_id, method = %req.payment_method)
    )]
    async fn create(&self, req: &PaymentRequest) -> Result<Payment, ApiError> {
        let payment = self.resource.create(req).await?;
        info!(payment_id = payment.id, "payment recorded");
        Ok(payment)
    }

    #[instrument(name = "clinic_api.payments.get_all", skip_all)]
    async fn get_all(&self) -> Result<Vec<Payment>, ApiError> {
        self.resource.get_all().await
    }

    #[instrument(name = "clinic_api.payments.get_by_id", skip_all, fields(payment_id = id))]
    async fn get_by_id(&self, id: i64) -> Result<Payment, ApiError> {
        self.resource.get_by_id(id).await
    }

    #[instrument(name = "clinic_api.payments.update", skip_all, fields(payment_id = id))]
    async fn update(&self, id: i64, req: &PaymentRequest) -> Result<Payment, ApiError> {
        self.resource.update(id, req).await
    }
}
