//! REST adapters implementing the contract traits over [`rest_client::ApiClient`].

pub mod appointments;
pub mod bills;
pub mod doctors;
pub mod medical_records;
pub mod otp;
pub mod patients;
pub mod payments;
pub mod resource;
pub mod users;

pub use appointments::AppointmentsRestClient;
pub use bills::BillsRestClient;
pub use doctors::DoctorsRestClient;
pub use medical_records::MedicalRecordsRestClient;
pub use otp::OtpRestClient;
pub use patients::PatientsRestClient;
pub use payments::PaymentsRestClient;
pub use resource::RestResource;
pub use users::UsersRestClient;
