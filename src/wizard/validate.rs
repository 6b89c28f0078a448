//! Client-side validation run before any network call.
//!
//! A failure here blocks the submission entirely: no request is issued and
//! the session error field is left alone.

use std::sync::LazyLock;

use regex::Regex;

use crate::api::types::{
    AdPayload, BudgetPayload, ListingPayload, MediaPayload, PlanSelection, StockPayload,
};
use crate::error::ValidationError;
use crate::wizard::forms::{
    AdDraft, AdMedia, AdType, AddressForm, PlanChoice, ProductKind, StockType,
};

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").unwrap());
static OTP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Phone numbers are exactly 10 digits.
pub fn phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// OTP submission requires all 6 digits.
pub fn otp(otp: &str) -> Result<(), ValidationError> {
    if OTP_RE.is_match(otp) {
        Ok(())
    } else {
        Err(ValidationError::IncompleteOtp)
    }
}

/// An address needs a city and a real location. The `[0,0]` origin means
/// the location was never captured.
pub fn address(address: &AddressForm) -> Result<(), ValidationError> {
    if address.city.trim().is_empty() {
        return Err(ValidationError::MissingCity);
    }
    if address.geo_location.is_unset() {
        return Err(ValidationError::LocationUnset);
    }
    Ok(())
}

/// Check an ad draft against its variant's invariants and assemble the
/// submission payload.
pub fn ad_payload(
    draft: &AdDraft,
    address_id: &str,
    geo_location: &crate::wizard::forms::GeoPoint,
) -> Result<AdPayload, ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }
    if draft.category.trim().is_empty() {
        return Err(ValidationError::MissingField("category"));
    }
    if draft.description.trim().is_empty() {
        return Err(ValidationError::MissingField("description"));
    }

    let media = media_payload(&draft.media);

    match draft.ad_type {
        AdType::Adlisting => {
            let product = draft
                .listing
                .product
                .ok_or(ValidationError::MissingField("product"))?;
            let min = draft
                .listing
                .budget
                .min
                .ok_or(ValidationError::MissingField("budget.min"))?;
            let max = draft
                .listing
                .budget
                .max
                .ok_or(ValidationError::MissingField("budget.max"))?;
            if min > max {
                return Err(ValidationError::BudgetRange { min, max });
            }
            // Experience only travels with service listings.
            let experience = match product {
                ProductKind::Service => draft.listing.experience.clone(),
                ProductKind::Product => None,
            };
            Ok(AdPayload::Listing(ListingPayload {
                address_id: address_id.to_string(),
                geo_location: geo_location.clone(),
                title: draft.title.clone(),
                category: draft.category.clone(),
                description: draft.description.clone(),
                media,
                product,
                budget: BudgetPayload { min, max },
                budget_frequency: draft.listing.budget_frequency,
                experience,
            }))
        }
        AdType::Stockad => {
            let stock_type = draft
                .stock
                .stock_type
                .ok_or(ValidationError::MissingField("stockType"))?;
            let mrp = draft
                .stock
                .mrp
                .ok_or(ValidationError::MissingField("mrp"))?;
            let selling_price = draft
                .stock
                .selling_price
                .ok_or(ValidationError::MissingField("sellingPrice"))?;
            if selling_price > mrp {
                return Err(ValidationError::PriceAboveMrp { mrp, selling_price });
            }
            if stock_type == StockType::Fmcg && draft.stock.stock_exp.is_none() {
                return Err(ValidationError::MissingExpiry);
            }
            Ok(AdPayload::Stock(StockPayload {
                address_id: address_id.to_string(),
                geo_location: geo_location.clone(),
                title: draft.title.clone(),
                category: draft.category.clone(),
                description: draft.description.clone(),
                media,
                stock_type,
                mrp,
                selling_price,
                stock_mfg: draft.stock.stock_mfg,
                stock_exp: draft.stock.stock_exp,
                brand_name: draft.stock.brand_name.clone(),
                min_order_qty: draft.stock.min_order_qty,
            }))
        }
    }
}

/// The base plan is mandatory; prime is an optional add-on.
pub fn plan_selection(choice: &PlanChoice) -> Result<PlanSelection, ValidationError> {
    let base = choice
        .base_plan_duration
        .ok_or(ValidationError::MissingBasePlan)?;
    Ok(PlanSelection {
        base_plan_duration: base,
        prime_plan_duration: choice.prime_plan_duration,
    })
}

fn media_payload(media: &AdMedia) -> MediaPayload {
    MediaPayload {
        video: media.video.clone(),
        images: media.images.iter().flatten().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::forms::{Budget, GeoPoint, ListingDetails, StockDetails};
    use rust_decimal_macros::dec;

    fn listing_draft(min: rust_decimal::Decimal, max: rust_decimal::Decimal) -> AdDraft {
        AdDraft {
            ad_type: AdType::Adlisting,
            title: "Looking for Experienced Plumber".to_string(),
            category: "home services".to_string(),
            description: "Bathroom renovation work.".to_string(),
            listing: ListingDetails {
                product: Some(ProductKind::Service),
                budget: Budget {
                    min: Some(min),
                    max: Some(max),
                },
                experience: Some("3.5".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn stock_draft() -> AdDraft {
        AdDraft {
            ad_type: AdType::Stockad,
            title: "Maggi Noodles - Bulk Stock".to_string(),
            category: "food & beverages".to_string(),
            description: "Fresh stock for retailers.".to_string(),
            stock: StockDetails {
                stock_type: Some(StockType::Fmcg),
                mrp: Some(dec!(12)),
                selling_price: Some(dec!(10)),
                stock_exp: "2025-12-31".parse().ok(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn phone_requires_ten_digits() {
        assert!(phone("9876543210").is_ok());
        assert_eq!(phone("98765").unwrap_err(), ValidationError::InvalidPhone);
        assert_eq!(
            phone("98765432101").unwrap_err(),
            ValidationError::InvalidPhone
        );
        assert_eq!(
            phone("98765abcde").unwrap_err(),
            ValidationError::InvalidPhone
        );
    }

    #[test]
    fn otp_requires_six_digits() {
        assert!(otp("123456").is_ok());
        assert_eq!(otp("12345").unwrap_err(), ValidationError::IncompleteOtp);
        assert_eq!(otp("1234567").unwrap_err(), ValidationError::IncompleteOtp);
        assert_eq!(otp("12a456").unwrap_err(), ValidationError::IncompleteOtp);
    }

    #[test]
    fn address_needs_city_and_location() {
        let mut form = AddressForm::default();
        assert_eq!(address(&form).unwrap_err(), ValidationError::MissingCity);

        form.city = "Pune".to_string();
        assert_eq!(address(&form).unwrap_err(), ValidationError::LocationUnset);

        form.geo_location = GeoPoint::new(73.8567, 18.5204);
        assert!(address(&form).is_ok());
    }

    #[test]
    fn budget_range_enforced() {
        let draft = listing_draft(dec!(1000), dec!(500));
        let err = ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::BudgetRange {
                min: dec!(1000),
                max: dec!(500)
            }
        );

        let draft = listing_draft(dec!(500), dec!(1000));
        assert!(ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).is_ok());
    }

    #[test]
    fn experience_dropped_for_product_listings() {
        let mut draft = listing_draft(dec!(500), dec!(1000));
        draft.listing.product = Some(ProductKind::Product);
        let payload = ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).unwrap();
        match payload {
            AdPayload::Listing(listing) => assert!(listing.experience.is_none()),
            AdPayload::Stock(_) => panic!("expected listing payload"),
        }
    }

    #[test]
    fn selling_price_capped_at_mrp() {
        let mut draft = stock_draft();
        draft.stock.mrp = Some(dec!(10));
        draft.stock.selling_price = Some(dec!(12));
        let err = ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::PriceAboveMrp {
                mrp: dec!(10),
                selling_price: dec!(12)
            }
        );
    }

    #[test]
    fn fmcg_requires_expiry() {
        let mut draft = stock_draft();
        draft.stock.stock_exp = None;
        let err = ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).unwrap_err();
        assert_eq!(err, ValidationError::MissingExpiry);

        // Non-FMCG stock is fine without one
        draft.stock.stock_type = Some(StockType::NonFmcg);
        assert!(ad_payload(&draft, "addr-1", &GeoPoint::new(1.0, 2.0)).is_ok());
    }

    #[test]
    fn plan_choice_requires_base() {
        let choice = PlanChoice::default();
        assert_eq!(
            plan_selection(&choice).unwrap_err(),
            ValidationError::MissingBasePlan
        );

        let choice = PlanChoice {
            base_plan_duration: Some(30),
            prime_plan_duration: None,
        };
        let selection = plan_selection(&choice).unwrap();
        assert_eq!(selection.base_plan_duration, 30);
        assert!(selection.prime_plan_duration.is_none());
    }

    #[test]
    fn media_payload_drops_empty_slots() {
        let media = AdMedia {
            video: None,
            images: [Some("https://cdn/img0.jpg".to_string()), None, None],
        };
        let payload = media_payload(&media);
        assert_eq!(payload.images, vec!["https://cdn/img0.jpg".to_string()]);
        assert!(payload.video.is_none());
    }
}
