use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use onboard::api::HttpApi;
use onboard::config::WizardConfig;
use onboard::upload::{CloudinaryTransport, MediaSlot, UploadFile, Uploader};
use onboard::wizard::forms::{AdType, ProductKind, StockType, split_plan_groups};
use onboard::wizard::{Wizard, WizardStep};

type InputLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = WizardConfig::from_env()?;

    eprintln!("🧭 Onboard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api.base_url);
    if config.dev.auto_verify_otp {
        eprintln!("   Dev assist: OTP auto-verify ON");
    }
    eprintln!("   Type ':import <file>' at any prompt to fast-forward from a JSON export.\n");

    let api = Arc::new(HttpApi::new(&config.api));
    let wizard = Wizard::new(api.clone(), config.dev.clone());
    let uploader = Uploader::new(
        api,
        Arc::new(CloudinaryTransport::new()),
        wizard.forms_handle(),
        &config.upload,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let session = wizard.session().await;
        if let Some(msg) = &session.success_message {
            eprintln!("✅ {msg}");
        }
        if let Some(err) = &session.error {
            eprintln!("❌ {err}");
        }

        match session.step {
            WizardStep::Initial => run_registration(&wizard, &mut lines).await?,
            WizardStep::Otp => run_otp(&wizard, &config, &mut lines).await?,
            WizardStep::UserDetails => run_profile(&wizard, &mut lines).await?,
            WizardStep::Address => run_address(&wizard, &mut lines).await?,
            WizardStep::AdListing => run_ad(&wizard, &uploader, &mut lines).await?,
            WizardStep::AdPlans => run_plans(&wizard, &mut lines).await?,
            WizardStep::Complete => {
                eprintln!("🎉 Onboarding complete. Welcome aboard!");
                break;
            }
        }
    }

    Ok(())
}

/// Prompt for one line, handling the `:import` escape inline.
async fn ask(wizard: &Wizard, lines: &mut InputLines, label: &str) -> anyhow::Result<String> {
    loop {
        eprint!("{label}");
        let Some(line) = lines.next_line().await? else {
            anyhow::bail!("stdin closed");
        };
        let line = line.trim().to_string();
        if let Some(path) = line.strip_prefix(":import ") {
            let path = path.trim();
            match tokio::fs::read_to_string(path).await {
                Ok(text) => match wizard.import_json(&text).await {
                    Ok(()) => eprintln!("📋 Imported form data from {path}"),
                    Err(e) => eprintln!("❌ {e}"),
                },
                Err(e) => eprintln!("❌ Could not read {path}: {e}"),
            }
            continue;
        }
        return Ok(line);
    }
}

async fn run_registration(wizard: &Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    eprintln!("── Step 1 of 6: Register ──");
    let current = wizard.forms().await.registration;
    let full_name = ask_or(wizard, lines, "Full name", &current.full_name).await?;
    let phone = ask_or(wizard, lines, "Phone (10 digits)", &current.phone).await?;
    let email = ask(wizard, lines, "Email (optional): ").await?;
    let password = ask(wizard, lines, "Password: ").await?;

    wizard
        .update_forms(|forms| {
            forms.registration.full_name = full_name;
            forms.registration.phone = phone;
            if !email.is_empty() {
                forms.registration.email = Some(email);
            }
            if !password.is_empty() {
                forms.registration.password = password;
            }
        })
        .await;

    if let Err(e) = wizard.submit_registration().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

async fn run_otp(
    wizard: &Wizard,
    config: &WizardConfig,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    eprintln!("── Step 2 of 6: Verify phone ──");
    let session = wizard.session().await;
    if config.dev.show_otp {
        if let Some(otp) = &session.otp_from_server {
            eprintln!("🔐 Dev OTP: {otp}");
        }
    }

    let input = ask(
        wizard,
        lines,
        "Enter OTP (6 digits), 'resend', or blank to refresh: ",
    )
    .await?;
    if input.is_empty() {
        // Re-check the step; the auto-verify assist may have advanced it.
        return Ok(());
    }
    if input == "resend" {
        wizard.resend_otp().await;
        return Ok(());
    }

    wizard.set_otp_input(&input).await;
    if let Err(e) = wizard.submit_otp().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

async fn run_profile(wizard: &Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    eprintln!("── Step 3 of 6: Profile ──");
    let languages = wizard.forms().await.profile.languages.join(", ");
    let gender = ask(wizard, lines, "Gender (blank to skip): ").await?;
    let dob = ask(wizard, lines, "Date of birth YYYY-MM-DD (blank to skip): ").await?;
    let langs = ask(
        wizard,
        lines,
        &format!("Languages, comma-separated (blank keeps {languages}): "),
    )
    .await?;

    wizard
        .update_forms(|forms| {
            if !gender.is_empty() {
                forms.profile.gender = Some(gender);
            }
            if let Ok(date) = dob.parse() {
                forms.profile.dob = Some(date);
            }
            if !langs.is_empty() {
                forms.profile.languages = langs
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        })
        .await;

    if let Err(e) = wizard.submit_profile().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

async fn run_address(wizard: &Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    eprintln!("── Step 4 of 6: Address ──");
    let current = wizard.forms().await.address;
    let city = ask_or(wizard, lines, "City", &current.city).await?;
    let state = ask(wizard, lines, "State (optional): ").await?;
    let street = ask(wizard, lines, "Street (optional): ").await?;
    let pincode = ask(wizard, lines, "Pincode (optional): ").await?;
    let coords = if current.geo_location.is_unset() {
        ask(wizard, lines, "Coordinates as lon,lat: ").await?
    } else {
        ask(
            wizard,
            lines,
            "Coordinates as lon,lat (blank keeps imported): ",
        )
        .await?
    };

    wizard
        .update_forms(|forms| {
            forms.address.city = city;
            if !state.is_empty() {
                forms.address.state = Some(state);
            }
            if !street.is_empty() {
                forms.address.street = Some(street);
            }
            if !pincode.is_empty() {
                forms.address.pincode = Some(pincode);
            }
            if let Some((lon, lat)) = parse_coords(&coords) {
                forms.address.geo_location = onboard::wizard::forms::GeoPoint::new(lon, lat);
            }
        })
        .await;

    if let Err(e) = wizard.submit_address().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

async fn run_ad(
    wizard: &Wizard,
    uploader: &Uploader,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    eprintln!("── Step 5 of 6: First ad (optional) ──");
    let choice = ask(wizard, lines, "Create your first ad? (yes/skip): ").await?;
    if choice == "skip" || choice == "no" {
        wizard.skip_ad().await;
        return Ok(());
    }

    let ad_type = match ask(wizard, lines, "Ad type (adlisting/stockad): ").await?.as_str() {
        "stockad" => AdType::Stockad,
        _ => AdType::Adlisting,
    };
    let current = wizard.forms().await.ad;
    let title = ask_or(wizard, lines, "Title", &current.title).await?;
    let category = ask_or(wizard, lines, "Category", &current.category).await?;
    let description = ask_or(wizard, lines, "Description", &current.description).await?;

    wizard
        .update_forms(|forms| {
            forms.ad.ad_type = ad_type;
            forms.ad.title = title;
            forms.ad.category = category;
            forms.ad.description = description;
        })
        .await;

    match ad_type {
        AdType::Adlisting => {
            let product = match ask(wizard, lines, "Offering (product/service): ").await?.as_str()
            {
                "product" => ProductKind::Product,
                _ => ProductKind::Service,
            };
            let min = ask(wizard, lines, "Budget min: ").await?;
            let max = ask(wizard, lines, "Budget max: ").await?;
            let experience = if product == ProductKind::Service {
                ask(wizard, lines, "Years of experience (optional): ").await?
            } else {
                String::new()
            };
            wizard
                .update_forms(|forms| {
                    forms.ad.listing.product = Some(product);
                    forms.ad.listing.budget.min = min.parse().ok();
                    forms.ad.listing.budget.max = max.parse().ok();
                    if !experience.is_empty() {
                        forms.ad.listing.experience = Some(experience);
                    }
                })
                .await;
        }
        AdType::Stockad => {
            let stock_type = match ask(wizard, lines, "Stock type (fmcg/nonFmcg): ")
                .await?
                .as_str()
            {
                "fmcg" => StockType::Fmcg,
                _ => StockType::NonFmcg,
            };
            let mrp = ask(wizard, lines, "MRP: ").await?;
            let selling = ask(wizard, lines, "Selling price: ").await?;
            let expiry = if stock_type == StockType::Fmcg {
                ask(wizard, lines, "Expiry date YYYY-MM-DD: ").await?
            } else {
                String::new()
            };
            let brand = ask(wizard, lines, "Brand name (optional): ").await?;
            wizard
                .update_forms(|forms| {
                    forms.ad.stock.stock_type = Some(stock_type);
                    forms.ad.stock.mrp = mrp.parse().ok();
                    forms.ad.stock.selling_price = selling.parse().ok();
                    forms.ad.stock.stock_exp = expiry.parse().ok();
                    if !brand.is_empty() {
                        forms.ad.stock.brand_name = Some(brand);
                    }
                })
                .await;
        }
    }

    attach_media(wizard, uploader, lines).await?;

    if let Err(e) = wizard.submit_ad().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

async fn attach_media(
    wizard: &Wizard,
    uploader: &Uploader,
    lines: &mut InputLines,
) -> anyhow::Result<()> {
    loop {
        let input = ask(
            wizard,
            lines,
            "Media: 'video <path>', 'image <0-2> <path>', or 'done': ",
        )
        .await?;
        if input.is_empty() || input == "done" {
            return Ok(());
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let (slot, path) = match parts.as_slice() {
            ["video", path] => (MediaSlot::Video, *path),
            ["image", index, path] => match index.parse() {
                Ok(index) => (MediaSlot::Image(index), *path),
                Err(_) => {
                    eprintln!("⚠️  Image index must be 0, 1, or 2");
                    continue;
                }
            },
            _ => {
                eprintln!("⚠️  Unrecognized media command");
                continue;
            }
        };

        let file = match UploadFile::read(Path::new(path)).await {
            Ok(file) => file,
            Err(e) => {
                eprintln!("❌ {e}");
                continue;
            }
        };
        match uploader.upload(file, slot).await {
            Ok(url) => eprintln!("📤 Uploaded to {url}"),
            Err(e) => eprintln!("❌ {e}"),
        }
    }
}

async fn run_plans(wizard: &Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    eprintln!("── Step 6 of 6: Plans ──");
    let session = wizard.session().await;
    if let Some(groups) = &session.ad_plans {
        let (base, prime) = split_plan_groups(groups);
        eprintln!("Base plans (required):");
        for plan in &base {
            eprintln!("   {} days — {} ({})", plan.duration, plan.name, plan.price);
        }
        if !prime.is_empty() {
            eprintln!("Prime plans (optional add-on):");
            for plan in &prime {
                eprintln!("   {} days — {} ({})", plan.duration, plan.name, plan.price);
            }
        }
    }

    let base = ask(wizard, lines, "Base plan duration (days): ").await?;
    let prime = ask(wizard, lines, "Prime plan duration (days, blank for none): ").await?;

    wizard
        .update_forms(|forms| {
            forms.plans.base_plan_duration = base.parse().ok();
            forms.plans.prime_plan_duration = prime.parse().ok();
        })
        .await;

    if let Err(e) = wizard.submit_plans().await {
        eprintln!("⚠️  {e}");
    }
    Ok(())
}

/// Prompt that keeps a pre-filled (imported) value when the user enters
/// nothing.
async fn ask_or(
    wizard: &Wizard,
    lines: &mut InputLines,
    label: &str,
    current: &str,
) -> anyhow::Result<String> {
    let label = if current.is_empty() {
        format!("{label}: ")
    } else {
        format!("{label} [{current}]: ")
    };
    let input = ask(wizard, lines, &label).await?;
    if input.is_empty() {
        Ok(current.to_string())
    } else {
        Ok(input)
    }
}

fn parse_coords(input: &str) -> Option<(f64, f64)> {
    let (lon, lat) = input.split_once(',')?;
    Some((lon.trim().parse().ok()?, lat.trim().parse().ok()?))
}
