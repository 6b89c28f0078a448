//! Request and response types for the wizard's backend API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::wizard::forms::{BudgetFrequency, GeoPoint, ProductKind, StockType};

// ── Auth ────────────────────────────────────────────────────────────

/// Response from `POST /auth/register`. Non-production builds include the
/// OTP so a developer can drive the flow without a phone.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub msg: Option<String>,
    pub otp: Option<String>,
}

/// Response from `POST /auth/verify-register`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub msg: Option<String>,
    /// Bearer token for all subsequent calls.
    pub token: Option<String>,
}

// ── Profile ─────────────────────────────────────────────────────────

/// Sparse payload for `PATCH /user/update/personal`. Only fields the user
/// actually filled are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

impl PersonalPayload {
    /// An all-empty payload is not sent at all.
    pub fn is_empty(&self) -> bool {
        self.profile_pic.is_none() && self.gender.is_none() && self.dob.is_none()
    }
}

// ── Created entities ────────────────────────────────────────────────

/// Response from `POST /address`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAddressResponse {
    pub msg: Option<String>,
    #[serde(alias = "_id", alias = "addressId")]
    pub id: String,
}

/// Response from `POST /ads/{adType}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdResponse {
    pub msg: Option<String>,
    #[serde(alias = "_id", alias = "adId")]
    pub id: String,
}

// ── Plans ───────────────────────────────────────────────────────────

/// Which tier a plan group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanGroupKind {
    BasePlans,
    PrimePlans,
}

/// One purchasable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    /// Plan length in days.
    pub duration: u32,
    pub price: Decimal,
}

/// A group of plans of one tier, as returned by
/// `GET /ads/{adType}/{adId}/plans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanGroup {
    #[serde(rename = "type")]
    pub kind: PlanGroupKind,
    pub plans: Vec<Plan>,
}

/// Body of `PATCH /ads/{adType}/{adId}/plans`. The prime plan is an
/// explicit null when not chosen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSelection {
    pub base_plan_duration: u32,
    pub prime_plan_duration: Option<u32>,
}

// ── Ads ─────────────────────────────────────────────────────────────

/// Media URLs attached to an ad. Image slots that were never filled are
/// dropped from the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub images: Vec<String>,
}

/// Validated budget range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPayload {
    pub min: Decimal,
    pub max: Decimal,
}

/// Body of `POST /ads/adlisting`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub address_id: String,
    pub geo_location: GeoPoint,
    pub title: String,
    pub category: String,
    pub description: String,
    pub media: MediaPayload,
    pub product: ProductKind,
    pub budget: BudgetPayload,
    pub budget_frequency: BudgetFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
}

/// Body of `POST /ads/stockad`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPayload {
    pub address_id: String,
    pub geo_location: GeoPoint,
    pub title: String,
    pub category: String,
    pub description: String,
    pub media: MediaPayload,
    pub stock_type: StockType,
    pub mrp: Decimal,
    pub selling_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_mfg: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_exp: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_qty: Option<u32>,
}

/// Type-discriminated ad payload. The discriminator travels in the URL
/// path, so the body serializes as the bare variant fields.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AdPayload {
    Listing(ListingPayload),
    Stock(StockPayload),
}

// ── Media upload ────────────────────────────────────────────────────

/// Time-boxed authorization for one direct-to-cloud upload, from
/// `GET /media/cloudinary-signature/{folder}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub timestamp: i64,
    pub signature: String,
    pub api_key: String,
    pub folder: String,
    pub cloud_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn personal_payload_sparse() {
        let payload = PersonalPayload {
            gender: Some("male".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["gender"], "male");
        assert!(json.get("profilePic").is_none());
        assert!(json.get("dob").is_none());
        assert!(!payload.is_empty());
        assert!(PersonalPayload::default().is_empty());
    }

    #[test]
    fn plan_selection_serializes_explicit_null_prime() {
        let selection = PlanSelection {
            base_plan_duration: 30,
            prime_plan_duration: None,
        };
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["basePlanDuration"], 30);
        assert!(json["primePlanDuration"].is_null());
    }

    #[test]
    fn plan_group_parses_server_shape() {
        let raw = r#"{
            "type": "basePlans",
            "plans": [{"_id": "p1", "name": "Basic", "duration": 30, "price": 99}]
        }"#;
        let group: PlanGroup = serde_json::from_str(raw).unwrap();
        assert_eq!(group.kind, PlanGroupKind::BasePlans);
        assert_eq!(group.plans[0].id, "p1");
        assert_eq!(group.plans[0].duration, 30);
        assert_eq!(group.plans[0].price, dec!(99));
    }

    #[test]
    fn created_id_accepts_mongo_alias() {
        let resp: CreateAddressResponse =
            serde_json::from_str(r#"{"_id": "addr-1"}"#).unwrap();
        assert_eq!(resp.id, "addr-1");
        let resp: CreateAdResponse = serde_json::from_str(r#"{"id": "ad-1"}"#).unwrap();
        assert_eq!(resp.id, "ad-1");
    }

    #[test]
    fn upload_signature_parses_camel_case() {
        let raw = r#"{
            "timestamp": 1735689600,
            "signature": "abc",
            "apiKey": "key",
            "folder": "ads",
            "cloudName": "demo"
        }"#;
        let sig: UploadSignature = serde_json::from_str(raw).unwrap();
        assert_eq!(sig.cloud_name, "demo");
        assert_eq!(sig.api_key, "key");
    }
}
