//! Typed client for the dental clinic REST API.
//!
//! - `contract`: wire models and the per-resource service traits
//! - `gateways`: REST adapters implementing those traits
//! - `session`: the persisted `(token, user)` pair and its storage backends
//! - [`ClinicClient`]: wires everything around one [`rest_client::ApiClient`]

pub mod config;
pub mod contract;
pub mod gateways;
pub mod module;
pub mod session;

pub use config::{ClinicApiConfig, SessionBackend};
pub use contract::client::{
    AppointmentsApi, BillsApi, DoctorsApi, MedicalRecordsApi, OtpApi, PatientsApi, PaymentsApi,
    UsersApi,
};
pub use contract::model;
pub use module::ClinicClient;
pub use session::{Session, SessionContext, SessionState};

pub use rest_client::{ApiError, ErrorKind, Redirect};
