//! Bulk JSON import — reconciles legacy export documents onto the wizard's
//! form records so a session can be fast-forwarded.
//!
//! Documents come in several historical shapes: fields may sit at the root
//! or inside named sub-objects (`address`, `adlisting`, `stockad`).
//! Precedence is per field: a usable value in the sub-object wins over a
//! root-level duplicate. Empty strings count as absent, matching the
//! exports this tolerates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::ImportError;
use crate::wizard::forms::{
    AdDraft, AdType, AddressForm, Budget, BudgetFrequency, ClockTime, DayHours, FormData,
    GeoPoint, ListingDetails, ProductKind, ProfileForm, RegistrationForm, StockDetails,
    StockType, default_schedule, random_languages,
};

/// A fully reconciled import, ready to merge into the session's forms.
#[derive(Debug, Clone)]
pub struct ImportedData {
    pub registration: RegistrationForm,
    pub profile: ProfileForm,
    pub address: AddressForm,
    pub ad: AdDraft,
}

/// Parse an import document. Nothing is applied here; a failure leaves the
/// caller's state untouched by construction.
pub fn parse(text: &str) -> Result<ImportedData, ImportError> {
    let doc: Value = serde_json::from_str(text)?;
    if !doc.is_object() {
        return Err(ImportError::NotAnObject);
    }

    Ok(ImportedData {
        registration: registration_from(&doc),
        profile: profile_from(&doc),
        address: address_from(&doc),
        ad: ad_from(&doc),
    })
}

// ── Per-record reconciliation ───────────────────────────────────────

fn registration_from(doc: &Value) -> RegistrationForm {
    RegistrationForm {
        full_name: string_at(doc, "fullName").unwrap_or_default(),
        phone: string_at(doc, "phone").unwrap_or_default(),
        email: string_at(doc, "email"),
        password: string_at(doc, "password").unwrap_or_default(),
        account_type: Default::default(),
    }
}

fn profile_from(doc: &Value) -> ProfileForm {
    let languages: Vec<String> = doc
        .get("languages")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(as_string)
                .collect()
        })
        .unwrap_or_default();

    ProfileForm {
        profile_pic: string_at(doc, "profilePic"),
        gender: string_at(doc, "gender"),
        dob: string_at(doc, "dob").and_then(|s| s.parse().ok()),
        languages: if languages.is_empty() {
            random_languages()
        } else {
            languages
        },
        schedule: schedule_from(doc),
    }
}

/// Overlay the document's schedule entries onto the default week. Day
/// names are normalized to the canonical Monday-first order; only the
/// hours and the open flag are taken from the document.
fn schedule_from(doc: &Value) -> Vec<DayHours> {
    let mut schedule = default_schedule();
    let Some(entries) = doc.get("schedule").and_then(Value::as_array) else {
        return schedule;
    };
    for (slot, entry) in schedule.iter_mut().zip(entries) {
        if let Some(open) = entry.get("isOpen").and_then(Value::as_bool) {
            slot.is_open = open;
        }
        overlay_time(&mut slot.start, entry.get("start"));
        overlay_time(&mut slot.end, entry.get("end"));
    }
    schedule
}

fn overlay_time(time: &mut ClockTime, value: Option<&Value>) {
    let Some(value) = value else { return };
    if let Some(hour) = value.get("hour").and_then(Value::as_u64) {
        time.hour = hour.min(23) as u8;
    }
    if let Some(minute) = value.get("minute").and_then(Value::as_u64) {
        time.minute = minute.min(59) as u8;
    }
}

fn address_from(doc: &Value) -> AddressForm {
    let section = Section::new(doc, "address");
    AddressForm {
        house_or_flat: section.string("houseOrFlat"),
        street: section.string("street"),
        area: section.string("area"),
        city: section.string("city").unwrap_or_default(),
        district: section.string("district"),
        state: section.string("state"),
        pincode: section.string("pincode"),
        country: section.string("country").unwrap_or_else(|| "India".to_string()),
        geo_location: geo_from(&section),
    }
}

/// Coordinates coerce to numeric; anything malformed or missing collapses
/// to the unset origin, which downstream treats as "no location yet".
fn geo_from(section: &Section) -> GeoPoint {
    let Some(geo) = section.value("geoLocation") else {
        return GeoPoint::unset();
    };
    let Some(coords) = geo.get("coordinates").and_then(Value::as_array) else {
        return GeoPoint::unset();
    };
    if coords.len() != 2 {
        return GeoPoint::unset();
    }
    GeoPoint::new(as_coord(&coords[0]), as_coord(&coords[1]))
}

fn ad_from(doc: &Value) -> AdDraft {
    let ad_type = ad_type_from(doc);
    let section = Section::new(doc, ad_type.as_str());

    let mut draft = AdDraft {
        ad_type,
        title: section.string("title").unwrap_or_default(),
        category: section.string("category").unwrap_or_default(),
        description: section.string("description").unwrap_or_default(),
        ..Default::default()
    };

    match ad_type {
        AdType::Adlisting => {
            draft.listing = ListingDetails {
                product: section.string("product").as_deref().and_then(product_kind),
                budget: budget_from(&section),
                budget_frequency: section
                    .string("budgetFrequency")
                    .as_deref()
                    .and_then(budget_frequency)
                    .unwrap_or_default(),
                experience: section.string("experience"),
            };
        }
        AdType::Stockad => {
            draft.stock = StockDetails {
                stock_type: section.string("stockType").as_deref().and_then(stock_type),
                mrp: section.decimal("mrp"),
                selling_price: section.decimal("sellingPrice"),
                stock_mfg: section.date("stockMfg"),
                stock_exp: section.date("stockExp"),
                brand_name: section.string("brandName"),
                min_order_qty: section.integer("minOrderQty"),
            };
        }
    }
    draft
}

/// The discriminator may sit inside a variant sub-object or at the root.
/// Absent both, a lone `stockad` sub-object implies a stock ad; everything
/// else defaults to an ad listing.
fn ad_type_from(doc: &Value) -> AdType {
    for key in ["adlisting", "stockad"] {
        if let Some(tag) = doc
            .get(key)
            .and_then(|n| n.get("adType"))
            .and_then(Value::as_str)
            .and_then(ad_type)
        {
            return tag;
        }
    }
    if let Some(tag) = doc.get("adType").and_then(Value::as_str).and_then(ad_type) {
        return tag;
    }
    let has_listing = doc.get("adlisting").is_some_and(Value::is_object);
    let has_stock = doc.get("stockad").is_some_and(Value::is_object);
    if has_stock && !has_listing {
        AdType::Stockad
    } else {
        AdType::Adlisting
    }
}

/// Budgets arrive either as `{min, max}` or as a legacy single value that
/// means min = max.
fn budget_from(section: &Section) -> Budget {
    let Some(value) = section.value("budget") else {
        return Budget::default();
    };
    match value {
        Value::Object(map) => Budget {
            min: map.get("min").and_then(as_decimal),
            max: map.get("max").and_then(as_decimal),
        },
        Value::Number(_) | Value::String(_) => {
            let single = as_decimal(value);
            Budget {
                min: single,
                max: single,
            }
        }
        _ => Budget::default(),
    }
}

// ── Root-or-nested lookup ───────────────────────────────────────────

/// Field lookup scoped to a named sub-object with root fallback. A usable
/// nested value wins; an absent or unusable one falls through to the root.
struct Section<'a> {
    nested: Option<&'a Value>,
    root: &'a Value,
}

impl<'a> Section<'a> {
    fn new(root: &'a Value, key: &str) -> Self {
        Self {
            nested: root.get(key).filter(|v| v.is_object()),
            root,
        }
    }

    /// Raw precedence lookup: first present key wins.
    fn value(&self, key: &str) -> Option<&'a Value> {
        self.nested
            .and_then(|n| n.get(key))
            .or_else(|| self.root.get(key))
    }

    fn string(&self, key: &str) -> Option<String> {
        self.coerced(key, as_string)
    }

    fn decimal(&self, key: &str) -> Option<Decimal> {
        self.coerced(key, as_decimal)
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        self.coerced(key, |v| as_string(v).and_then(|s| s.parse().ok()))
    }

    fn integer(&self, key: &str) -> Option<u32> {
        self.coerced(key, |v| match v {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    fn coerced<T>(&self, key: &str, coerce: impl Fn(&Value) -> Option<T>) -> Option<T> {
        self.nested
            .and_then(|n| n.get(key))
            .and_then(&coerce)
            .or_else(|| self.root.get(key).and_then(&coerce))
    }
}

fn string_at(doc: &Value, key: &str) -> Option<String> {
    doc.get(key).and_then(as_string)
}

// ── Coercions ───────────────────────────────────────────────────────

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_coord(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn ad_type(s: &str) -> Option<AdType> {
    match s {
        "adlisting" => Some(AdType::Adlisting),
        "stockad" => Some(AdType::Stockad),
        _ => None,
    }
}

fn product_kind(s: &str) -> Option<ProductKind> {
    match s {
        "product" => Some(ProductKind::Product),
        "service" => Some(ProductKind::Service),
        _ => None,
    }
}

fn budget_frequency(s: &str) -> Option<BudgetFrequency> {
    match s {
        "hourly" => Some(BudgetFrequency::Hourly),
        "daily" => Some(BudgetFrequency::Daily),
        "weekly" => Some(BudgetFrequency::Weekly),
        "monthly" => Some(BudgetFrequency::Monthly),
        _ => None,
    }
}

fn stock_type(s: &str) -> Option<StockType> {
    match s {
        "fmcg" => Some(StockType::Fmcg),
        "nonFmcg" => Some(StockType::NonFmcg),
        _ => None,
    }
}

/// Merge an import into existing form data, replacing every record the
/// import produces and leaving the rest (OTP input, plan picks) alone.
pub fn apply(imported: ImportedData, forms: &mut FormData) {
    forms.registration = imported.registration;
    forms.profile = imported.profile;
    forms.address = imported.address;
    forms.ad = imported.ad;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::forms::{Day, LANGUAGE_CATALOG};
    use rust_decimal_macros::dec;

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse("{not json"), Err(ImportError::Parse(_))));
        assert!(matches!(parse("[1, 2]"), Err(ImportError::NotAnObject)));
    }

    #[test]
    fn nested_address_wins_over_root() {
        let imported = parse(
            r#"{
                "address": {"city": "Pune", "pincode": "411001"},
                "city": "Delhi",
                "state": "Maharashtra"
            }"#,
        )
        .unwrap();
        assert_eq!(imported.address.city, "Pune");
        // Absent in the sub-object, picked up from the root
        assert_eq!(imported.address.state.as_deref(), Some("Maharashtra"));
        assert_eq!(imported.address.pincode.as_deref(), Some("411001"));
        assert_eq!(imported.address.country, "India");
    }

    #[test]
    fn empty_nested_value_falls_through_to_root() {
        let imported = parse(
            r#"{"address": {"city": ""}, "city": "Delhi"}"#,
        )
        .unwrap();
        assert_eq!(imported.address.city, "Delhi");
    }

    #[test]
    fn missing_languages_are_sampled_from_catalog() {
        let imported = parse(r#"{"fullName": "John Doe"}"#).unwrap();
        let langs = &imported.profile.languages;
        assert!(langs.len() == 2 || langs.len() == 3);
        let mut deduped = langs.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), langs.len());
        for lang in langs {
            assert!(LANGUAGE_CATALOG.contains(&lang.as_str()));
        }
    }

    #[test]
    fn provided_languages_pass_through() {
        let imported =
            parse(r#"{"languages": ["English", "Tamil"]}"#).unwrap();
        assert_eq!(imported.profile.languages, vec!["English", "Tamil"]);
    }

    #[test]
    fn schedule_overlays_onto_default_week() {
        let imported = parse(
            r#"{"schedule": [
                {"isOpen": false},
                {"start": {"hour": 10}, "end": {"hour": 18, "minute": 30}}
            ]}"#,
        )
        .unwrap();
        let schedule = &imported.profile.schedule;
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[0].day, Day::Monday);
        assert!(!schedule[0].is_open);
        assert_eq!(schedule[1].start, ClockTime::new(10, 0));
        assert_eq!(schedule[1].end, ClockTime::new(18, 30));
        // Untouched days keep the defaults
        assert_eq!(schedule[2].start, ClockTime::new(9, 0));
        assert!(!schedule[6].is_open, "Sunday stays closed");
    }

    #[test]
    fn coordinates_coerce_and_default_to_unset() {
        let imported = parse(
            r#"{"geoLocation": {"type": "Point", "coordinates": ["77.61", 12.93]}}"#,
        )
        .unwrap();
        assert_eq!(imported.address.geo_location.coordinates, [77.61, 12.93]);

        let imported = parse(r#"{"geoLocation": {"coordinates": [77.61]}}"#).unwrap();
        assert!(imported.address.geo_location.is_unset());

        let imported = parse(r#"{"fullName": "No Geo"}"#).unwrap();
        assert!(imported.address.geo_location.is_unset());
    }

    #[test]
    fn legacy_scalar_budget_means_min_equals_max() {
        let imported = parse(r#"{"adType": "adlisting", "budget": 750}"#).unwrap();
        assert_eq!(imported.ad.listing.budget.min, Some(dec!(750)));
        assert_eq!(imported.ad.listing.budget.max, Some(dec!(750)));

        let imported = parse(
            r#"{"adType": "adlisting", "budget": {"min": 500, "max": "1000"}}"#,
        )
        .unwrap();
        assert_eq!(imported.ad.listing.budget.min, Some(dec!(500)));
        assert_eq!(imported.ad.listing.budget.max, Some(dec!(1000)));
    }

    #[test]
    fn ad_type_defaults_and_context_inference() {
        let imported = parse(r#"{"title": "Anything"}"#).unwrap();
        assert_eq!(imported.ad.ad_type, AdType::Adlisting);

        // A lone stockad sub-object implies a stock ad
        let imported = parse(r#"{"stockad": {"title": "Bulk Maggi"}}"#).unwrap();
        assert_eq!(imported.ad.ad_type, AdType::Stockad);
        assert_eq!(imported.ad.title, "Bulk Maggi");

        // An explicit tag beats inference
        let imported =
            parse(r#"{"adType": "stockad", "title": "Bulk"}"#).unwrap();
        assert_eq!(imported.ad.ad_type, AdType::Stockad);
    }

    #[test]
    fn stock_fields_reconcile_with_nested_precedence() {
        let imported = parse(
            r#"{
                "adType": "stockad",
                "mrp": 15,
                "stockad": {
                    "mrp": "12",
                    "sellingPrice": 10,
                    "stockExp": "2025-12-31",
                    "brandName": "Nestle",
                    "minOrderQty": "100"
                },
                "stockType": "fmcg"
            }"#,
        )
        .unwrap();
        let stock = &imported.ad.stock;
        assert_eq!(stock.mrp, Some(dec!(12)), "nested mrp wins");
        assert_eq!(stock.selling_price, Some(dec!(10)));
        assert_eq!(stock.stock_type, Some(StockType::Fmcg));
        assert_eq!(stock.stock_exp, "2025-12-31".parse().ok());
        assert_eq!(stock.brand_name.as_deref(), Some("Nestle"));
        assert_eq!(stock.min_order_qty, Some(100));
    }

    #[test]
    fn registration_fields_from_root() {
        let imported = parse(
            r#"{
                "fullName": "John Doe",
                "phone": "9876543210",
                "password": "hunter2",
                "accountType": "business"
            }"#,
        )
        .unwrap();
        assert_eq!(imported.registration.full_name, "John Doe");
        assert_eq!(imported.registration.phone, "9876543210");
        // The account type is not importable; it is always individual
        let json = serde_json::to_value(&imported.registration).unwrap();
        assert_eq!(json["accountType"], "individual");
    }

    #[test]
    fn full_sample_document_round_trips() {
        let imported = parse(
            r#"{
                "fullName": "Jane Smith",
                "phone": "9876543211",
                "gender": "female",
                "dob": "1992-05-20",
                "address": {
                    "houseOrFlat": "Shop 5, Ground Floor",
                    "street": "Brigade Road",
                    "city": "Bangalore",
                    "pincode": "560025"
                },
                "geoLocation": {"type": "Point", "coordinates": [77.6094, 12.9716]},
                "adType": "adlisting",
                "title": "Looking for Experienced Plumber",
                "category": "home services",
                "product": "service",
                "budget": {"min": 500, "max": 1000},
                "budgetFrequency": "hourly",
                "description": "Bathroom renovation work.",
                "experience": "3.5"
            }"#,
        )
        .unwrap();
        assert_eq!(imported.profile.gender.as_deref(), Some("female"));
        assert_eq!(imported.profile.dob, "1992-05-20".parse().ok());
        assert_eq!(imported.address.city, "Bangalore");
        assert_eq!(
            imported.address.geo_location.coordinates,
            [77.6094, 12.9716]
        );
        assert_eq!(imported.ad.listing.product, Some(ProductKind::Service));
        assert_eq!(
            imported.ad.listing.budget_frequency,
            BudgetFrequency::Hourly
        );
        assert_eq!(imported.ad.listing.experience.as_deref(), Some("3.5"));
    }
}
