//! Wizard step state machine — tracks which stage of onboarding the user is in.

use serde::{Deserialize, Serialize};

/// The steps of the onboarding wizard.
///
/// Progresses linearly: Initial → Otp → UserDetails → Address → AdListing →
/// AdPlans → Complete. The ad-listing step may also jump straight to
/// Complete via an explicit skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    Initial,
    Otp,
    UserDetails,
    Address,
    #[serde(rename = "adlisting")]
    AdListing,
    #[serde(rename = "adplans")]
    AdPlans,
    Complete,
}

impl WizardStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (Initial, Otp)
                | (Otp, UserDetails)
                | (UserDetails, Address)
                | (Address, AdListing)
                | (AdListing, AdPlans)
                | (AdListing, Complete)
                | (AdPlans, Complete)
        )
    }

    /// Whether this step is terminal (the wizard is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// The next step in the linear progression, if any. The skip edge
    /// (AdListing → Complete) is not part of the linear order.
    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Initial => Some(Otp),
            Otp => Some(UserDetails),
            UserDetails => Some(Address),
            Address => Some(AdListing),
            AdListing => Some(AdPlans),
            AdPlans => Some(Complete),
            Complete => None,
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        Self::Initial
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initial => "initial",
            Self::Otp => "otp",
            Self::UserDetails => "userDetails",
            Self::Address => "address",
            Self::AdListing => "adlisting",
            Self::AdPlans => "adplans",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use WizardStep::*;
        let transitions = [
            (Initial, Otp),
            (Otp, UserDetails),
            (UserDetails, Address),
            (Address, AdListing),
            (AdListing, AdPlans),
            (AdPlans, Complete),
            // Skip edge
            (AdListing, Complete),
        ];
        for (from, to) in transitions {
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn invalid_transitions() {
        use WizardStep::*;
        // Skip steps
        assert!(!Initial.can_transition_to(UserDetails));
        assert!(!Otp.can_transition_to(Address));
        // The only legal jump is the ad-listing skip
        assert!(!Address.can_transition_to(Complete));
        // Go backward
        assert!(!UserDetails.can_transition_to(Otp));
        // Terminal
        assert!(!Complete.can_transition_to(Initial));
        // Self-transition
        assert!(!Otp.can_transition_to(Otp));
    }

    #[test]
    fn is_terminal() {
        use WizardStep::*;
        assert!(Complete.is_terminal());
        assert!(!Initial.is_terminal());
        assert!(!AdListing.is_terminal());
        assert!(!AdPlans.is_terminal());
    }

    #[test]
    fn next_walks_all_steps() {
        use WizardStep::*;
        let expected = [Otp, UserDetails, Address, AdListing, AdPlans, Complete];
        let mut current = Initial;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn display_matches_serde() {
        use WizardStep::*;
        let steps = [
            Initial, Otp, UserDetails, Address, AdListing, AdPlans, Complete,
        ];
        for step in steps {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            // JSON wraps in quotes
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }
}
