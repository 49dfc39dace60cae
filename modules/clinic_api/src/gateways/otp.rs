use async_trait::async_trait;
use rest_client::{ApiClient, ApiError};
use tracing::instrument;
use url::Url;

use crate::contract::client::OtpApi;
use crate::contract::model::DeliveryMethod;

/// One-time passwords. The client passed in is rooted at the OTP mount
/// (`/api/otp`), not at the versioned API base.
#[derive(Clone)]
pub struct OtpRestClient {
    client: ApiClient,
}

impl OtpRestClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn base_url(&self) -> &Url {
        self.client.base_url()
    }
}

#[async_trait]
impl OtpApi for OtpRestClient {
    #[instrument(name = "clinic_api.otp.request", skip_all, fields(delivery = delivery.as_str()))]
    async fn request_otp(
        &self,
        email_or_phone: &str,
        delivery: DeliveryMethod,
    ) -> Result<String, ApiError> {
        self.client
            .post_for_text(
                "/request",
                &[
                    ("emailOrPhoneNumber", email_or_phone),
                    ("deliveryMethod", delivery.as_str()),
                ],
            )
            .await
    }

    #[instrument(name = "clinic_api.otp.verify", skip_all)]
    async fn verify_otp(&self, email_or_phone: &str, otp: &str) -> Result<String, ApiError> {
        self.client
            .post_for_text(
                "/verify",
                &[("emailOrPhoneNumber", email_or_phone), ("otp", otp)],
            )
            .await
    }
}
