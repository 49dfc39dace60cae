use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rest_client::{ApiClient, ApiError, RetryPolicy};
use runtime::AppConfig;
use tracing::info;

use crate::config::{ClinicApiConfig, SessionBackend};
use crate::gateways::{
    AppointmentsRestClient, BillsRestClient, DoctorsRestClient, MedicalRecordsRestClient,
    OtpRestClient, PatientsRestClient, PaymentsRestClient, UsersRestClient,
};
use crate::session::{FileStore, KeyValueStore, MemoryStore, SessionContext};

/// Where the OTP controller is mounted, relative to the API origin.
pub const OTP_PATH: &str = "/api/otp";

/// Entry point of the module: one request pipeline, one session, and a
/// gateway per resource, all sharing them.
#[derive(Clone)]
pub struct ClinicClient {
    api: ApiClient,
    session: SessionContext,
    appointments: AppointmentsRestClient,
    bills: BillsRestClient,
    medical_records: MedicalRecordsRestClient,
    users: UsersRestClient,
    doctors: DoctorsRestClient,
    patients: PatientsRestClient,
    payments: PaymentsRestClient,
    otp: OtpRestClient,
}

impl ClinicClient {
    /// Wire the gateways around `session`. The session is installed as the
    /// pipeline's credential source. OTP calls go to [`OTP_PATH`] on the
    /// origin of `base_url`.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
        session: SessionContext,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::builder()
            .base_url(base_url)
            .timeout(timeout)
            .retry(retry)
            .credentials(Arc::new(session.clone()))
            .build()?;
        let otp_base = api
            .base_url()
            .join(OTP_PATH)
            .map_err(|e| ApiError::request_setup(format!("cannot derive OTP base URL: {e}")))?;
        let otp_api = api.with_base_url(otp_base.as_str())?;

        Ok(Self {
            appointments: AppointmentsRestClient::new(api.clone()),
            bills: BillsRestClient::new(api.clone()),
            medical_records: MedicalRecordsRestClient::new(api.clone()),
            users: UsersRestClient::new(api.clone(), session.clone()),
            doctors: DoctorsRestClient::new(api.clone()),
            patients: PatientsRestClient::new(api.clone()),
            payments: PaymentsRestClient::new(api.clone()),
            otp: OtpRestClient::new(otp_api),
            api,
            session,
        })
    }

    /// Point the OTP gateway somewhere other than the derived default.
    pub fn with_otp_base_url(mut self, otp_base_url: &str) -> Result<Self, ApiError> {
        self.otp = OtpRestClient::new(self.api.with_base_url(otp_base_url)?);
        Ok(self)
    }

    /// Build from application configuration: `client.*` for the pipeline and
    /// `modules.clinic_api` for session storage and retries.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let module_cfg = ClinicApiConfig::from_provider(config)?;

        let store: Arc<dyn KeyValueStore> = match module_cfg.session_backend {
            SessionBackend::Memory => Arc::new(MemoryStore::new()),
            SessionBackend::File => {
                let dir = module_cfg.session_path(Path::new(&config.client.home_dir));
                Arc::new(
                    FileStore::open(&dir)
                        .with_context(|| format!("cannot open session store {}", dir.display()))?,
                )
            }
        };

        let mut client = Self::new(
            &config.client.base_url,
            config.client.timeout(),
            module_cfg.retry_policy(),
            SessionContext::new(store),
        )
        .context("failed to build clinic API client")?;
        if let Some(otp_base_url) = &module_cfg.otp_base_url {
            client = client
                .with_otp_base_url(otp_base_url)
                .context("invalid modules.clinic_api.otp_base_url")?;
        }

        info!(
            base_url = %client.api.base_url(),
            otp_base_url = %client.otp.base_url(),
            timeout_ms = config.client.timeout_ms,
            backend = ?module_cfg.session_backend,
            "clinic API client ready"
        );
        Ok(client)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn appointments(&self) -> &AppointmentsRestClient {
        &self.appointments
    }

    pub fn bills(&self) -> &BillsRestClient {
        &self.bills
    }

    pub fn medical_records(&self) -> &MedicalRecordsRestClient {
        &self.medical_records
    }

    pub fn users(&self) -> &UsersRestClient {
        &self.users
    }

    pub fn doctors(&self) -> &DoctorsRestClient {
        &self.doctors
    }

    pub fn patients(&self) -> &PatientsRestClient {
        &self.patients
    }

    pub fn payments(&self) -> &PaymentsRestClient {
        &self.payments
    }

    pub fn otp(&self) -> &OtpRestClient {
        &self.otp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MODULE_NAME;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn from_config_uses_file_store_under_home() {
        let home = TempDir::new().unwrap();
        let mut cfg = AppConfig::default();
        cfg.client.home_dir = home.path().to_string_lossy().to_string();

        let client = ClinicClient::from_config(&cfg).unwrap();

        assert!(home.path().join("session").is_dir());
        assert_eq!(client.api().timeout(), Duration::from_millis(17_000));
        assert_eq!(
            client.api().base_url().as_str(),
            "http://localhost:8081/api/v1"
        );
        assert!(!client.session().is_authenticated().unwrap());
    }

    #[test]
    fn from_config_memory_backend_and_retry() {
        let mut cfg = AppConfig::default();
        cfg.client.base_url = "http://clinic.test/api/v1".into();
        cfg.client.timeout_ms = 500;
        cfg.modules.insert(
            MODULE_NAME.into(),
            json!({"session_backend": "memory", "retry_max_attempts": 2, "retry_backoff_ms": 10}),
        );

        let client = ClinicClient::from_config(&cfg).unwrap();

        assert_eq!(client.api().timeout(), Duration::from_millis(500));
        assert_eq!(
            client.api().retry_policy(),
            RetryPolicy::new(2, Duration::from_millis(10))
        );
    }

    #[test]
    fn otp_base_url_is_derived_from_origin_unless_configured() {
        let mut cfg = AppConfig::default();
        cfg.client.base_url = "http://clinic.test:8081/api/v1".into();
        cfg.modules
            .insert(MODULE_NAME.into(), json!({"session_backend": "memory"}));

        let client = ClinicClient::from_config(&cfg).unwrap();
        assert_eq!(client.otp().base_url().as_str(), "http://clinic.test:8081/api/otp");

        cfg.modules.insert(
            MODULE_NAME.into(),
            json!({"session_backend": "memory", "otp_base_url": "http://otp.test/otp"}),
        );
        let client = ClinicClient::from_config(&cfg).unwrap();
        assert_eq!(client.otp().base_url().as_str(), "http://otp.test/otp");
        assert_eq!(
            client.api().base_url().as_str(),
            "http://clinic.test:8081/api/v1"
        );
    }

    #[test]
    fn from_config_rejects_bad_base_url() {
        let mut cfg = AppConfig::default();
        cfg.client.base_url = "not a url".into();
        cfg.modules
            .insert(MODULE_NAME.into(), json!({"session_backend": "memory"}));
        assert!(ClinicClient::from_config(&cfg).is_err());
    }
}
