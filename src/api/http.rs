//! reqwest-backed `WizardApi` implementation.

use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::wizard::forms::{AdType, AddressForm, DayHours, RegistrationForm};

use super::WizardApi;
use super::types::{
    AdPayload, CreateAddressResponse, CreateAdResponse, PersonalPayload, PlanGroup,
    PlanSelection, RegisterResponse, UploadSignature, VerifyResponse,
};

/// Error payload shape the backend uses for rejections.
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    msg: Option<String>,
}

/// JSON-over-HTTPS client for the wizard backend.
///
/// Holds the bearer token captured at OTP verification and attaches it to
/// every later request.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<SecretString>>,
    log_responses: bool,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            token: RwLock::new(None),
            log_responses: config.log_responses,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Replace the stored bearer token.
    pub async fn set_token(&self, token: &str) {
        *self.token.write().await = Some(SecretString::from(token));
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Issue one request and return the parsed JSON body.
    ///
    /// Non-success statuses become `ApiError::Rejected` carrying the
    /// payload's `msg` field when present.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = self.token.read().await.as_ref() {
            req = req.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await.map_err(|e| ApiError::Transport {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();

        if self.log_responses {
            tracing::debug!(endpoint = path, status = status.as_u16(), body = %text, "API response");
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.msg)
                .unwrap_or_default();
            return Err(ApiError::Rejected {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(ApiError::from)
    }

    fn decode<T: DeserializeOwned>(value: Value, endpoint: &str) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl WizardApi for HttpApi {
    async fn register(&self, reg: &RegistrationForm) -> Result<RegisterResponse, ApiError> {
        let body = serde_json::to_value(reg)?;
        let value = self.request(Method::POST, "/auth/register", Some(body)).await?;
        Self::decode(value, "/auth/register")
    }

    async fn verify_register(&self, phone: &str, otp: &str) -> Result<VerifyResponse, ApiError> {
        let body = serde_json::json!({ "phone": phone, "otp": otp });
        let value = self
            .request(Method::POST, "/auth/verify-register", Some(body))
            .await?;
        let resp: VerifyResponse = Self::decode(value, "/auth/verify-register")?;
        if let Some(token) = resp.token.as_deref() {
            self.set_token(token).await;
            tracing::info!("auth token captured from OTP verification");
        }
        Ok(resp)
    }

    async fn update_personal_info(&self, personal: &PersonalPayload) -> Result<(), ApiError> {
        let body = serde_json::to_value(personal)?;
        self.request(Method::PATCH, "/user/update/personal", Some(body))
            .await?;
        Ok(())
    }

    async fn update_languages(&self, languages: &[String]) -> Result<(), ApiError> {
        let body = serde_json::json!({ "languages": languages });
        self.request(Method::PATCH, "/user/update/languages", Some(body))
            .await?;
        Ok(())
    }

    async fn update_schedule(&self, schedule: &[DayHours]) -> Result<(), ApiError> {
        let body = serde_json::json!({ "schedule": schedule });
        self.request(Method::PATCH, "/user/update/availability", Some(body))
            .await?;
        Ok(())
    }

    async fn create_address(
        &self,
        address: &AddressForm,
    ) -> Result<CreateAddressResponse, ApiError> {
        let body = serde_json::to_value(address)?;
        let value = self.request(Method::POST, "/address", Some(body)).await?;
        Self::decode(value, "/address")
    }

    async fn create_ad(
        &self,
        ad_type: AdType,
        payload: &AdPayload,
    ) -> Result<CreateAdResponse, ApiError> {
        let path = format!("/ads/{}", ad_type.as_str());
        let body = serde_json::to_value(payload)?;
        let value = self.request(Method::POST, &path, Some(body)).await?;
        Self::decode(value, &path)
    }

    async fn ad_plans(&self, ad_type: AdType, ad_id: &str) -> Result<Vec<PlanGroup>, ApiError> {
        let path = format!("/ads/{}/{ad_id}/plans", ad_type.as_str());
        let value = self.request(Method::GET, &path, None).await?;
        Self::decode(value, &path)
    }

    async fn apply_ad_plans(
        &self,
        ad_type: AdType,
        ad_id: &str,
        selection: &PlanSelection,
    ) -> Result<(), ApiError> {
        let path = format!("/ads/{}/{ad_id}/plans", ad_type.as_str());
        let body = serde_json::to_value(selection)?;
        self.request(Method::PATCH, &path, Some(body)).await?;
        Ok(())
    }

    async fn upload_signature(&self, folder: &str) -> Result<UploadSignature, ApiError> {
        let path = format!("/media/cloudinary-signature/{folder}");
        let value = self.request(Method::GET, &path, None).await?;
        Self::decode(value, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::forms::AccountType;

    #[test]
    fn url_joins_without_double_slash() {
        let api = HttpApi::new(&ApiConfig {
            base_url: "http://localhost:3000/api/".to_string(),
            log_responses: false,
        });
        assert_eq!(api.url("/auth/register"), "http://localhost:3000/api/auth/register");
    }

    #[test]
    fn register_body_forces_individual_account() {
        let reg = RegistrationForm {
            full_name: "John Doe".to_string(),
            phone: "9876543210".to_string(),
            email: Some("john@example.com".to_string()),
            password: "secret".to_string(),
            account_type: AccountType::Individual,
        };
        let body = serde_json::to_value(&reg).unwrap();
        assert_eq!(body["accountType"], "individual");
        assert_eq!(body["phone"], "9876543210");
    }

    #[tokio::test]
    async fn token_round_trip() {
        let api = HttpApi::new(&ApiConfig::default());
        assert!(api.token.read().await.is_none());
        api.set_token("tok-123").await;
        assert!(api.token.read().await.is_some());
        api.clear_token().await;
        assert!(api.token.read().await.is_none());
    }
}
