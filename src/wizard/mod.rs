//! The onboarding wizard core: step machine, form records, validation, and
//! the controller that ties them to the backend.

pub mod controller;
pub mod forms;
pub mod step;
pub mod validate;

pub use controller::{Submission, Wizard, WizardSession};
pub use step::WizardStep;
