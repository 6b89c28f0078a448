//! Backend API boundary.
//!
//! `WizardApi` is the seam the step controller and uploader talk through;
//! `HttpApi` is the production implementation. Tests substitute stubs.

pub mod http;
pub mod types;

pub use http::HttpApi;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::wizard::forms::{AdType, AddressForm, DayHours, RegistrationForm};

use types::{
    AdPayload, CreateAddressResponse, CreateAdResponse, PersonalPayload, PlanGroup,
    PlanSelection, RegisterResponse, UploadSignature, VerifyResponse,
};

/// Every backend call the wizard makes, one method per endpoint.
#[async_trait]
pub trait WizardApi: Send + Sync {
    /// `POST /auth/register`. Also used verbatim for an OTP resend.
    async fn register(&self, reg: &RegistrationForm) -> Result<RegisterResponse, ApiError>;

    /// `POST /auth/verify-register`. Implementations capture the returned
    /// bearer token for all subsequent calls.
    async fn verify_register(&self, phone: &str, otp: &str) -> Result<VerifyResponse, ApiError>;

    /// `PATCH /user/update/personal` with a sparse payload.
    async fn update_personal_info(&self, personal: &PersonalPayload) -> Result<(), ApiError>;

    /// `PATCH /user/update/languages`.
    async fn update_languages(&self, languages: &[String]) -> Result<(), ApiError>;

    /// `PATCH /user/update/availability`.
    async fn update_schedule(&self, schedule: &[DayHours]) -> Result<(), ApiError>;

    /// `POST /address`.
    async fn create_address(
        &self,
        address: &AddressForm,
    ) -> Result<CreateAddressResponse, ApiError>;

    /// `POST /ads/{adType}`.
    async fn create_ad(
        &self,
        ad_type: AdType,
        payload: &AdPayload,
    ) -> Result<CreateAdResponse, ApiError>;

    /// `GET /ads/{adType}/{adId}/plans`.
    async fn ad_plans(&self, ad_type: AdType, ad_id: &str) -> Result<Vec<PlanGroup>, ApiError>;

    /// `PATCH /ads/{adType}/{adId}/plans`.
    async fn apply_ad_plans(
        &self,
        ad_type: AdType,
        ad_id: &str,
        selection: &PlanSelection,
    ) -> Result<(), ApiError>;

    /// `GET /media/cloudinary-signature/{folder}` — authorization for one
    /// direct-to-cloud upload.
    async fn upload_signature(&self, folder: &str) -> Result<UploadSignature, ApiError>;
}
