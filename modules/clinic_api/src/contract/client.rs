use async_trait::async_trait;
use chrono::NaiveDate;
use rest_client::{ApiError, Redirect};

use crate::contract::model::{
    Appointment, AppointmentRequest, AuthResponse, Bill, BillRequest, BillStatus,
    ChangePasswordRequest, DeliveryMethod, Doctor, DoctorRequest, LoginRequest, MedicalRecord,
    MedicalRecordRequest, Patient, PatientRequest, Payment, PaymentRequest, ProfileUpdate,
    RegisterRequest, Role, User, UserRequest,
};

/// Appointments resource (`/appointments`).
#[async_trait]
pub trait AppointmentsApi: Send + Sync {
    async fn create(&self, req: &AppointmentRequest) -> Result<Appointment, ApiError>;

    async fn get_all(&self) -> Result<Vec<Appointment>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Appointment, ApiError>;

    /// Full replacement of the appointment.
    async fn update(&self, id: i64, req: &AppointmentRequest) -> Result<Appointment, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<Appointment>, ApiError>;

    async fn get_by_doctor(&self, doctor_id: i64) -> Result<Vec<Appointment>, ApiError>;

    async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, ApiError>;
}

/// Bills resource (`/bills`).
#[async_trait]
pub trait BillsApi: Send + Sync {
    async fn create(&self, req: &BillRequest) -> Result<Bill, ApiError>;

    async fn get_all(&self) -> Result<Vec<Bill>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Bill, ApiError>;

    async fn update(&self, id: i64, req: &BillRequest) -> Result<Bill, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<Bill>, ApiError>;

    async fn get_by_status(&self, status: BillStatus) -> Result<Vec<Bill>, ApiError>;

    /// Ask the server to settle the bill. The server decides what a repeated
    /// payment means; whatever it answers is returned unchanged.
    async fn mark_as_paid(&self, id: i64, payment_method: &str) -> Result<Bill, ApiError>;
}

/// Medical records resource (`/medical-records`).
#[async_trait]
pub trait MedicalRecordsApi: Send + Sync {
    async fn create(&self, req: &MedicalRecordRequest) -> Result<MedicalRecord, ApiError>;

    async fn get_all(&self) -> Result<Vec<MedicalRecord>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<MedicalRecord, ApiError>;

    async fn update(&self, id: i64, req: &MedicalRecordRequest)
        -> Result<MedicalRecord, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    async fn get_by_patient(&self, patient_id: i64) -> Result<Vec<MedicalRecord>, ApiError>;

    async fn get_by_doctor(&self, doctor_id: i64) -> Result<Vec<MedicalRecord>, ApiError>;
}

/// Authentication, profile and account administration (`/users`).
///
/// `register` and `login` store the returned session, `logout` clears it.
/// The admin operations (`create_user` through `upgrade_role`) never touch
/// the session, except that updating the logged-in account refreshes the
/// stored user.
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Clear the session and tell the caller where to go next.
    fn logout(&self) -> Result<Redirect, ApiError>;

    fn current_user(&self) -> Result<Option<User>, ApiError>;

    fn is_authenticated(&self) -> Result<bool, ApiError>;

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    async fn change_password(&self, req: &ChangePasswordRequest) -> Result<(), ApiError>;

    async fn create_user(&self, req: &UserRequest) -> Result<User, ApiError>;

    async fn get_all(&self) -> Result<Vec<User>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<User, ApiError>;

    async fn update(&self, id: i64, req: &UserRequest) -> Result<User, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    /// Grant `role` to the user (`PUT /users/upgrade-role`); returns the
    /// server's confirmation text.
    async fn upgrade_role(&self, user_id: i64, role: Role) -> Result<String, ApiError>;
}

/// Payments resource (`/payments`). Payments are never deleted.
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    async fn create(&self, req: &PaymentRequest) -> Result<Payment, ApiError>;

    async fn get_all(&self) -> Result<Vec<Payment>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Payment, ApiError>;

    async fn update(&self, id: i64, req: &PaymentRequest) -> Result<Payment, ApiError>;
}

/// Doctors resource (`/doctors`).
#[async_trait]
pub trait DoctorsApi: Send + Sync {
    async fn create(&self, req: &DoctorRequest) -> Result<Doctor, ApiError>;

    async fn get_all(&self) -> Result<Vec<Doctor>, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Doctor, ApiError>;

    async fn update(&self, id: i64, req: &DoctorRequest) -> Result<Doctor, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Patients resource (`/patients`).
#[async_trait]
pub trait PatientsApi: Send + Sync {
    async fn create(&self, req: &PatientRequest) -> Result<Patient, ApiError>;

    async fn get_by_id(&self, id: i64) -> Result<Patient, ApiError>;

    async fn update(&self, id: i64, req: &PatientRequest) -> Result<Patient, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// One-time password delivery and verification (`/api/otp`).
#[async_trait]
pub trait OtpApi: Send + Sync {
    /// Returns the server's confirmation text.
    async fn request_otp(
        &self,
        email_or_phone: &str,
        delivery: DeliveryMethod,
    ) -> Result<String, ApiError>;

    async fn verify_otp(&self, email_or_phone: &str, otp: &str) -> Result<String, ApiError>;
}
