//! The wizard controller — owns session state, sequences submissions, and
//! enforces the step transitions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::api::WizardApi;
use crate::api::types::{PersonalPayload, PlanGroup};
use crate::config::DevConfig;
use crate::error::{ApiError, ImportError, ValidationError};
use crate::import;
use crate::wizard::forms::{FormData, ProfileForm};
use crate::wizard::step::WizardStep;
use crate::wizard::validate;

/// Session state for one wizard run. Lives in memory only; a restart
/// discards it.
#[derive(Debug, Clone, Default)]
pub struct WizardSession {
    pub step: WizardStep,
    /// True while a submission is in flight. The UI disables its trigger;
    /// the controller additionally refuses a second submission itself.
    pub loading: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
    /// OTP echoed back by non-production backends for the dev assist.
    pub otp_from_server: Option<String>,
    /// Set once by the address submission, never cleared.
    pub created_address_id: Option<String>,
    /// Set once by the ad submission, never cleared.
    pub created_ad_id: Option<String>,
    /// Plan catalog fetched right after the ad is created.
    pub ad_plans: Option<Vec<PlanGroup>>,
}

/// What a submit handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The call succeeded; the session now sits at this step. A resend
    /// reports the step it stayed on.
    Advanced(WizardStep),
    /// The call failed; the session error says why. Step unchanged, the
    /// form stays editable and resubmittable.
    Failed,
    /// Another submission is already in flight; nothing was done.
    Busy,
    /// The handler does not apply to the current step; nothing was done.
    OutOfStep,
}

/// Coordinates the onboarding flow. All mutations of session and form
/// state go through these methods; views only ever read snapshots.
#[derive(Clone)]
pub struct Wizard {
    api: Arc<dyn WizardApi>,
    session: Arc<RwLock<WizardSession>>,
    forms: Arc<RwLock<FormData>>,
    /// At-most-one-in-flight permit for step submissions.
    in_flight: Arc<AtomicBool>,
    /// Last server OTP value consumed by the auto-fill assist.
    auto_filled_otp: Arc<RwLock<Option<String>>>,
    dev: DevConfig,
}

impl Wizard {
    pub fn new(api: Arc<dyn WizardApi>, dev: DevConfig) -> Self {
        Self {
            api,
            session: Arc::new(RwLock::new(WizardSession::default())),
            forms: Arc::new(RwLock::new(FormData::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            auto_filled_otp: Arc::new(RwLock::new(None)),
            dev,
        }
    }

    // ── State access ────────────────────────────────────────────────

    pub async fn session(&self) -> WizardSession {
        self.session.read().await.clone()
    }

    pub async fn step(&self) -> WizardStep {
        self.session.read().await.step
    }

    pub async fn forms(&self) -> FormData {
        self.forms.read().await.clone()
    }

    /// Edit form data in place (the UI's input binding).
    pub async fn update_forms<F: FnOnce(&mut FormData)>(&self, f: F) {
        f(&mut *self.forms.write().await);
    }

    pub async fn set_otp_input(&self, otp: &str) {
        self.forms.write().await.otp.otp = otp.to_string();
    }

    /// Shared handle for collaborators that write form slices directly
    /// (the media uploader).
    pub fn forms_handle(&self) -> Arc<RwLock<FormData>> {
        Arc::clone(&self.forms)
    }

    // ── Submission lifecycle ────────────────────────────────────────

    /// Gate a submission: the wizard must sit at `expected` and no other
    /// submission may be running. On success the loading flag is up and
    /// the stale error cleared.
    async fn begin(&self, expected: WizardStep) -> Result<(), Submission> {
        if self.session.read().await.step != expected {
            return Err(Submission::OutOfStep);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(Submission::Busy);
        }
        let mut session = self.session.write().await;
        session.loading = true;
        session.error = None;
        Ok(())
    }

    /// Settle a successful submission. Every success path funnels through
    /// here so the loading flag and permit can never leak.
    async fn settle_ok(&self, step: WizardStep, message: impl Into<String>) -> Submission {
        {
            let mut session = self.session.write().await;
            session.success_message = Some(message.into());
            session.error = None;
            session.step = step;
            session.loading = false;
        }
        self.in_flight.store(false, Ordering::Release);
        tracing::info!(step = %step, "wizard advanced");
        Submission::Advanced(step)
    }

    /// Settle a failed submission: record the message, stay on the current
    /// step. Most recent action wins, so any prior success banner clears.
    async fn settle_err(&self, message: String) -> Submission {
        {
            let mut session = self.session.write().await;
            tracing::warn!(step = %session.step, error = %message, "submission failed");
            session.error = Some(message);
            session.success_message = None;
            session.loading = false;
        }
        self.in_flight.store(false, Ordering::Release);
        Submission::Failed
    }

    // ── Step handlers ───────────────────────────────────────────────

    /// Submit the registration form. On success the server has sent an
    /// OTP and the wizard moves to the OTP step.
    pub async fn submit_registration(&self) -> Result<Submission, ValidationError> {
        let reg = self.forms.read().await.registration.clone();
        validate::phone(&reg.phone)?;
        if let Err(blocked) = self.begin(WizardStep::Initial).await {
            return Ok(blocked);
        }

        let outcome = match self.api.register(&reg).await {
            Ok(resp) => {
                if let Some(otp) = resp.otp {
                    tracing::debug!("dev OTP received from server");
                    self.session.write().await.otp_from_server = Some(otp);
                }
                let msg = resp.msg.unwrap_or_else(|| {
                    "OTP sent successfully! Please check your phone.".to_string()
                });
                self.settle_ok(WizardStep::Otp, msg).await
            }
            Err(e) => self.settle_err(e.user_message("Registration failed")).await,
        };

        if matches!(outcome, Submission::Advanced(_)) {
            self.maybe_auto_fill().await;
        }
        Ok(outcome)
    }

    /// Verify the entered OTP. Requires all 6 digits; anything less is
    /// rejected before any call is made.
    pub async fn submit_otp(&self) -> Result<Submission, ValidationError> {
        let (phone, otp) = {
            let forms = self.forms.read().await;
            (forms.registration.phone.clone(), forms.otp.otp.clone())
        };
        validate::otp(&otp)?;
        if let Err(blocked) = self.begin(WizardStep::Otp).await {
            return Ok(blocked);
        }

        let outcome = match self.api.verify_register(&phone, &otp).await {
            Ok(_) => {
                self.settle_ok(WizardStep::UserDetails, "OTP verified successfully!")
                    .await
            }
            Err(e) => {
                self.settle_err(e.user_message("OTP verification failed"))
                    .await
            }
        };
        Ok(outcome)
    }

    /// Re-issue the registration call to get a fresh OTP. Stays on the OTP
    /// step; clears the OTP input and re-arms the auto-fill assist so the
    /// new delivery may fill again.
    pub async fn resend_otp(&self) -> Submission {
        let reg = self.forms.read().await.registration.clone();
        if let Err(blocked) = self.begin(WizardStep::Otp).await {
            return blocked;
        }

        let outcome = match self.api.register(&reg).await {
            Ok(resp) => {
                self.forms.write().await.otp.otp.clear();
                *self.auto_filled_otp.write().await = None;
                self.session.write().await.otp_from_server = resp.otp;
                self.settle_ok(WizardStep::Otp, "OTP resent successfully!").await
            }
            Err(e) => self.settle_err(e.user_message("Failed to resend OTP")).await,
        };

        if matches!(outcome, Submission::Advanced(_)) {
            self.maybe_auto_fill().await;
        }
        outcome
    }

    /// Submit profile details: personal info, languages, and schedule are
    /// pushed sequentially, each only when non-empty, and an earlier
    /// failure stops the chain.
    pub async fn submit_profile(&self) -> Result<Submission, ValidationError> {
        let profile = self.forms.read().await.profile.clone();
        if let Err(blocked) = self.begin(WizardStep::UserDetails).await {
            return Ok(blocked);
        }

        let outcome = match self.push_profile(&profile).await {
            Ok(()) => {
                self.settle_ok(WizardStep::Address, "Profile details saved successfully!")
                    .await
            }
            Err(e) => {
                self.settle_err(e.user_message("Failed to update user details"))
                    .await
            }
        };
        Ok(outcome)
    }

    async fn push_profile(&self, profile: &ProfileForm) -> Result<(), ApiError> {
        let personal = PersonalPayload {
            profile_pic: profile.profile_pic.clone(),
            gender: profile.gender.clone(),
            dob: profile.dob,
        };
        if !personal.is_empty() {
            self.api.update_personal_info(&personal).await?;
        }
        if !profile.languages.is_empty() {
            self.api.update_languages(&profile.languages).await?;
        }
        if !profile.schedule.is_empty() {
            self.api.update_schedule(&profile.schedule).await?;
        }
        Ok(())
    }

    /// Submit the address. The created id is captured for the ad step.
    pub async fn submit_address(&self) -> Result<Submission, ValidationError> {
        let address = self.forms.read().await.address.clone();
        validate::address(&address)?;
        if let Err(blocked) = self.begin(WizardStep::Address).await {
            return Ok(blocked);
        }

        let outcome = match self.api.create_address(&address).await {
            Ok(resp) => {
                self.session.write().await.created_address_id = Some(resp.id);
                let msg = resp
                    .msg
                    .unwrap_or_else(|| "Address saved successfully!".to_string());
                self.settle_ok(WizardStep::AdListing, msg).await
            }
            Err(e) => {
                self.settle_err(e.user_message("Failed to create address"))
                    .await
            }
        };
        Ok(outcome)
    }

    /// Create the first ad, then fetch its plan catalog. Both must succeed
    /// for the wizard to move to plan selection.
    pub async fn submit_ad(&self) -> Result<Submission, ValidationError> {
        let (ad, geo_location) = {
            let forms = self.forms.read().await;
            (forms.ad.clone(), forms.address.geo_location.clone())
        };
        let address_id = self
            .session
            .read()
            .await
            .created_address_id
            .clone()
            .ok_or(ValidationError::AddressNotCreated)?;
        let payload = validate::ad_payload(&ad, &address_id, &geo_location)?;
        if let Err(blocked) = self.begin(WizardStep::AdListing).await {
            return Ok(blocked);
        }

        let outcome = match self.api.create_ad(ad.ad_type, &payload).await {
            Ok(created) => {
                self.session.write().await.created_ad_id = Some(created.id.clone());
                match self.api.ad_plans(ad.ad_type, &created.id).await {
                    Ok(plans) => {
                        self.session.write().await.ad_plans = Some(plans);
                        self.settle_ok(WizardStep::AdPlans, "Ad created successfully!")
                            .await
                    }
                    Err(e) => {
                        self.settle_err(e.user_message("Failed to load ad plans"))
                            .await
                    }
                }
            }
            Err(e) => self.settle_err(e.user_message("Failed to create ad")).await,
        };
        Ok(outcome)
    }

    /// Skip the optional first-ad step and finish the wizard.
    pub async fn skip_ad(&self) -> Submission {
        if self.in_flight.load(Ordering::Acquire) {
            return Submission::Busy;
        }
        let mut session = self.session.write().await;
        if session.step != WizardStep::AdListing {
            return Submission::OutOfStep;
        }
        session.step = WizardStep::Complete;
        session.success_message = Some("Registration complete.".to_string());
        session.error = None;
        drop(session);
        tracing::info!("ad listing skipped");
        Submission::Advanced(WizardStep::Complete)
    }

    /// Apply the chosen plans to the created ad and finish the wizard.
    pub async fn submit_plans(&self) -> Result<Submission, ValidationError> {
        let (choice, ad_type) = {
            let forms = self.forms.read().await;
            (forms.plans.clone(), forms.ad.ad_type)
        };
        let selection = validate::plan_selection(&choice)?;
        let ad_id = self
            .session
            .read()
            .await
            .created_ad_id
            .clone()
            .ok_or(ValidationError::AdNotCreated)?;
        if let Err(blocked) = self.begin(WizardStep::AdPlans).await {
            return Ok(blocked);
        }

        let outcome = match self.api.apply_ad_plans(ad_type, &ad_id, &selection).await {
            Ok(()) => {
                self.settle_ok(
                    WizardStep::Complete,
                    "Plans applied successfully! Registration complete.",
                )
                .await
            }
            Err(e) => self.settle_err(e.user_message("Failed to apply plans")).await,
        };
        Ok(outcome)
    }

    // ── Dev assist ──────────────────────────────────────────────────

    /// Fill the OTP input from the server-delivered value and schedule one
    /// automatic verification after the configured delay.
    ///
    /// Edge-triggered: each delivered OTP value is consumed at most once,
    /// tracked against the last value filled. A resend clears the marker,
    /// so the next delivery fires again even if the digits repeat. Safe to
    /// call any number of times.
    pub async fn maybe_auto_fill(&self) -> bool {
        if !self.dev.auto_verify_otp {
            return false;
        }
        let Some(otp) = self.session.read().await.otp_from_server.clone() else {
            return false;
        };
        {
            let mut filled = self.auto_filled_otp.write().await;
            if filled.as_deref() == Some(otp.as_str()) {
                return false;
            }
            *filled = Some(otp.clone());
        }
        self.forms.write().await.otp.otp = otp.clone();
        tracing::debug!("OTP auto-filled; automatic verification armed");

        let wizard = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(wizard.dev.auto_verify_delay).await;
            let in_otp_step = wizard.session.read().await.step == WizardStep::Otp;
            let input = wizard.forms.read().await.otp.otp.clone();
            // The user may have edited the input or moved on while we slept.
            if !in_otp_step || input != otp {
                return;
            }
            match wizard.submit_otp().await {
                Ok(outcome) => {
                    tracing::debug!(?outcome, "automatic OTP verification finished");
                }
                Err(e) => tracing::warn!(error = %e, "automatic OTP verification blocked"),
            }
        });
        true
    }

    // ── Bulk import ─────────────────────────────────────────────────

    /// Parse a bulk JSON document and fast-forward the form data.
    ///
    /// The document is fully reconciled before anything is written; a
    /// parse failure leaves every record untouched.
    pub async fn import_json(&self, text: &str) -> Result<(), ImportError> {
        let imported = import::parse(text)?;
        import::apply(imported, &mut *self.forms.write().await);
        tracing::info!("bulk import applied to form data");
        Ok(())
    }
}

// Note: Wizard handlers are exercised against a stub WizardApi in
// tests/wizard_flow.rs. The pure pieces (steps, forms, validation, import)
// are tested in their own modules.
