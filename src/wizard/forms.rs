//! Per-step form records and their defaults.
//!
//! Every record here lives in memory for the duration of one wizard run.
//! Field names serialize in the camelCase shape the backend expects.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::types::PlanGroup;

/// Languages the profile step can choose from.
pub const LANGUAGE_CATALOG: [&str; 11] = [
    "English",
    "Hindi",
    "Bengali",
    "Telugu",
    "Marathi",
    "Tamil",
    "Gujarati",
    "Urdu",
    "Kannada",
    "Malayalam",
    "Punjabi",
];

/// Sample 2 or 3 distinct languages from the catalog.
pub fn random_languages() -> Vec<String> {
    let mut rng = rand::thread_rng();
    let count = if rng.gen_bool(0.5) { 2 } else { 3 };
    LANGUAGE_CATALOG
        .choose_multiple(&mut rng, count)
        .map(|s| s.to_string())
        .collect()
}

// ── Registration ────────────────────────────────────────────────────

/// Account type. The wizard only ever registers individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Individual,
}

impl Default for AccountType {
    fn default() -> Self {
        Self::Individual
    }
}

/// Credentials collected at the first step. Read-only once the OTP step
/// begins; an OTP resend reuses it verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub full_name: String,
    /// 10-digit numeric string.
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    pub account_type: AccountType,
}

/// The OTP input: up to 6 digits. Reset to empty on resend.
#[derive(Debug, Clone, Default)]
pub struct OtpInput {
    pub otp: String,
}

// ── Profile ─────────────────────────────────────────────────────────

/// Days of the week, Monday-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const WEEK: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

/// Availability for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    pub day: Day,
    pub is_open: bool,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// The default weekly schedule: Monday through Saturday 09:00–17:00 open,
/// Sunday closed. Always exactly one entry per day, Monday-first.
pub fn default_schedule() -> Vec<DayHours> {
    Day::WEEK
        .into_iter()
        .map(|day| DayHours {
            day,
            is_open: day != Day::Sunday,
            start: ClockTime::new(9, 0),
            end: ClockTime::new(17, 0),
        })
        .collect()
}

/// Profile details gathered after OTP verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    pub languages: Vec<String>,
    pub schedule: Vec<DayHours>,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            profile_pic: None,
            gender: None,
            dob: None,
            languages: random_languages(),
            schedule: default_schedule(),
        }
    }
}

// ── Address ─────────────────────────────────────────────────────────

/// GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub point_type: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            point_type: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    /// The zero origin means "no location captured yet", never a real
    /// position. Submission is blocked until it is replaced.
    pub fn unset() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn is_unset(&self) -> bool {
        self.coordinates == [0.0, 0.0]
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::unset()
    }
}

/// The address step's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_or_flat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    pub country: String,
    pub geo_location: GeoPoint,
}

impl Default for AddressForm {
    fn default() -> Self {
        Self {
            house_or_flat: None,
            street: None,
            area: None,
            city: String::new(),
            district: None,
            state: None,
            pincode: None,
            country: "India".to_string(),
            geo_location: GeoPoint::unset(),
        }
    }
}

// ── Ad listing ──────────────────────────────────────────────────────

/// The two mutually exclusive classified-ad variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
    Adlisting,
    Stockad,
}

impl AdType {
    /// Path segment for the `/ads/{adType}` endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adlisting => "adlisting",
            Self::Stockad => "stockad",
        }
    }
}

impl Default for AdType {
    fn default() -> Self {
        Self::Adlisting
    }
}

impl std::fmt::Display for AdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an ad listing offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Product,
    Service,
}

/// How often an ad listing's budget applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetFrequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Default for BudgetFrequency {
    fn default() -> Self {
        Self::Daily
    }
}

/// Stock ad category. FMCG stock requires an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockType {
    Fmcg,
    NonFmcg,
}

/// Budget range for an ad listing, unfilled until the user enters it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

/// Uploaded media slots: one optional video and up to three images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdMedia {
    pub video: Option<String>,
    pub images: [Option<String>; 3],
}

/// Fields specific to the "adlisting" variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub product: Option<ProductKind>,
    pub budget: Budget,
    pub budget_frequency: BudgetFrequency,
    /// Years of experience; only meaningful when `product` is Service.
    pub experience: Option<String>,
}

/// Fields specific to the "stockad" variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetails {
    pub stock_type: Option<StockType>,
    pub mrp: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub stock_mfg: Option<NaiveDate>,
    pub stock_exp: Option<NaiveDate>,
    pub brand_name: Option<String>,
    pub min_order_qty: Option<u32>,
}

/// The ad-listing step's record. Both variant field groups are kept while
/// the user edits; only the group matching `ad_type` is validated and
/// submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    pub ad_type: AdType,
    pub title: String,
    pub category: String,
    pub description: String,
    pub media: AdMedia,
    #[serde(flatten)]
    pub listing: ListingDetails,
    #[serde(flatten)]
    pub stock: StockDetails,
}

// ── Plan selection ──────────────────────────────────────────────────

/// The user's plan picks, from the server-supplied catalog. The base plan
/// is mandatory, the prime plan an optional add-on.
#[derive(Debug, Clone, Default)]
pub struct PlanChoice {
    pub base_plan_duration: Option<u32>,
    pub prime_plan_duration: Option<u32>,
}

// ── Aggregate ───────────────────────────────────────────────────────

/// All per-step form data for one wizard session.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pub registration: RegistrationForm,
    pub otp: OtpInput,
    pub profile: ProfileForm,
    pub address: AddressForm,
    pub ad: AdDraft,
    pub plans: PlanChoice,
}

// Re-exported here so form consumers see the whole catalog surface.
pub use crate::api::types::Plan;

/// Find the plan groups split into (base, prime) lists.
pub fn split_plan_groups(groups: &[PlanGroup]) -> (Vec<Plan>, Vec<Plan>) {
    use crate::api::types::PlanGroupKind;
    let base = groups
        .iter()
        .filter(|g| g.kind == PlanGroupKind::BasePlans)
        .flat_map(|g| g.plans.clone())
        .collect();
    let prime = groups
        .iter()
        .filter(|g| g.kind == PlanGroupKind::PrimePlans)
        .flat_map(|g| g.plans.clone())
        .collect();
    (base, prime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_monday_first_week() {
        let schedule = default_schedule();
        assert_eq!(schedule.len(), 7);
        for (entry, day) in schedule.iter().zip(Day::WEEK) {
            assert_eq!(entry.day, day);
            assert_eq!(entry.start, ClockTime::new(9, 0));
            assert_eq!(entry.end, ClockTime::new(17, 0));
        }
        assert!(schedule[..6].iter().all(|d| d.is_open));
        assert!(!schedule[6].is_open);
    }

    #[test]
    fn random_languages_samples_two_or_three_distinct() {
        for _ in 0..50 {
            let langs = random_languages();
            assert!(langs.len() == 2 || langs.len() == 3, "got {langs:?}");
            let mut deduped = langs.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), langs.len(), "duplicates in {langs:?}");
            for lang in &langs {
                assert!(LANGUAGE_CATALOG.contains(&lang.as_str()));
            }
        }
    }

    #[test]
    fn geo_point_unset_sentinel() {
        assert!(GeoPoint::unset().is_unset());
        assert!(!GeoPoint::new(77.6117, 12.9352).is_unset());
        // Half-set is still a real (if odd) location
        assert!(!GeoPoint::new(0.0, 12.9352).is_unset());
    }

    #[test]
    fn registration_serializes_camel_case() {
        let reg = RegistrationForm {
            full_name: "John Doe".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            password: "secret".to_string(),
            account_type: AccountType::Individual,
        };
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["fullName"], "John Doe");
        assert_eq!(json["accountType"], "individual");
        // Unset email is omitted, not null
        assert!(json.get("email").is_none());
    }

    #[test]
    fn day_hours_wire_shape() {
        let hours = DayHours {
            day: Day::Monday,
            is_open: true,
            start: ClockTime::new(9, 0),
            end: ClockTime::new(17, 0),
        };
        let json = serde_json::to_value(&hours).unwrap();
        assert_eq!(json["day"], "Monday");
        assert_eq!(json["isOpen"], true);
        assert_eq!(json["start"]["hour"], 9);
        assert_eq!(json["end"]["minute"], 0);
    }

    #[test]
    fn stock_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&StockType::NonFmcg).unwrap(),
            "\"nonFmcg\""
        );
        assert_eq!(serde_json::to_string(&StockType::Fmcg).unwrap(), "\"fmcg\"");
    }

    #[test]
    fn address_defaults() {
        let address = AddressForm::default();
        assert_eq!(address.country, "India");
        assert!(address.geo_location.is_unset());
        assert!(address.city.is_empty());
    }
}
