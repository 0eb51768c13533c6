//! Claim aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, UserId};

use crate::decision::{Decision, FinalDecision, RiskLevel};
use crate::error::ClaimError;

/// Claim lifecycle state
///
/// `RECEIVED -> PROCESSING -> {APPROVED | REJECTED | REQUIRES_REVIEW} | ERROR`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimState {
    Received,
    Processing,
    Approved,
    Rejected,
    RequiresReview,
    Error,
}

impl ClaimState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimState::Received => "RECEIVED",
            ClaimState::Processing => "PROCESSING",
            ClaimState::Approved => "APPROVED",
            ClaimState::Rejected => "REJECTED",
            ClaimState::RequiresReview => "REQUIRES_REVIEW",
            ClaimState::Error => "ERROR",
        }
    }

    /// Whether the claim has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimState::Approved
                | ClaimState::Rejected
                | ClaimState::RequiresReview
                | ClaimState::Error
        )
    }

    fn can_transition_to(self, target: ClaimState) -> bool {
        use ClaimState::*;
        matches!(
            (self, target),
            (Received, Processing)
                | (Processing, Approved)
                | (Processing, Rejected)
                | (Processing, RequiresReview)
                | (Processing, Error)
        )
    }
}

impl From<FinalDecision> for ClaimState {
    fn from(decision: FinalDecision) -> Self {
        match decision {
            FinalDecision::Approved => ClaimState::Approved,
            FinalDecision::Rejected => ClaimState::Rejected,
            FinalDecision::RequiresReview => ClaimState::RequiresReview,
            FinalDecision::Error => ClaimState::Error,
        }
    }
}

impl std::fmt::Display for ClaimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClaimState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(ClaimState::Received),
            "PROCESSING" => Ok(ClaimState::Processing),
            "APPROVED" => Ok(ClaimState::Approved),
            "REJECTED" => Ok(ClaimState::Rejected),
            "REQUIRES_REVIEW" => Ok(ClaimState::RequiresReview),
            "ERROR" => Ok(ClaimState::Error),
            other => Err(format!("unknown claim state '{other}'")),
        }
    }
}

/// The persisted claim aggregate root.
///
/// Owns its survey, image, and explanation records (persisted separately,
/// keyed by claim identity); the most recently appended survey/explanation
/// is the one consulted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub user_id: Option<UserId>,
    pub insurer: String,
    pub policy_category: String,
    pub description: String,
    pub state: ClaimState,
    pub risk_level: Option<RiskLevel>,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a newly received claim
    pub fn received(
        user_id: Option<UserId>,
        insurer: impl Into<String>,
        policy_category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            user_id,
            insurer: insurer.into(),
            policy_category: policy_category.into(),
            description: description.into(),
            state: ClaimState::Received,
            risk_level: None,
            created_at: Utc::now(),
        }
    }

    /// Moves the claim into `PROCESSING` ahead of the durable checkpoint
    pub fn begin_processing(&mut self) -> Result<(), ClaimError> {
        self.transition(ClaimState::Processing)
    }

    /// Applies the decision, moving the claim to its terminal state.
    ///
    /// Valid exactly once per processing attempt; a second call fails the
    /// transition check.
    pub fn finalize(&mut self, decision: &Decision) -> Result<(), ClaimError> {
        self.transition(ClaimState::from(decision.final_decision))?;
        self.risk_level = Some(decision.risk_level);
        Ok(())
    }

    /// Marks the claim failed after a persistence error
    pub fn mark_error(&mut self) {
        self.state = ClaimState::Error;
    }

    fn transition(&mut self, target: ClaimState) -> Result<(), ClaimError> {
        if !self.state.can_transition_to(target) {
            return Err(ClaimError::InvalidStateTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_claim() -> Claim {
        Claim::received(None, "Acko", "Two Wheeler", "rear-ended at a signal")
    }

    fn approved() -> Decision {
        Decision {
            final_decision: FinalDecision::Approved,
            risk_level: RiskLevel::Low,
            reasons: vec!["All checks passed".to_string()],
        }
    }

    #[test]
    fn test_received_to_processing() {
        let mut claim = test_claim();
        assert!(claim.begin_processing().is_ok());
        assert_eq!(claim.state, ClaimState::Processing);
    }

    #[test]
    fn test_finalize_requires_processing() {
        let mut claim = test_claim();
        assert!(claim.finalize(&approved()).is_err());
    }

    #[test]
    fn test_finalize_is_exactly_once() {
        let mut claim = test_claim();
        claim.begin_processing().unwrap();
        claim.finalize(&approved()).unwrap();
        assert_eq!(claim.state, ClaimState::Approved);
        assert_eq!(claim.risk_level, Some(RiskLevel::Low));
        assert!(claim.finalize(&approved()).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ClaimState::Approved.is_terminal());
        assert!(ClaimState::Error.is_terminal());
        assert!(!ClaimState::Processing.is_terminal());
    }

    #[test]
    fn test_state_round_trips_through_str() {
        for state in [
            ClaimState::Received,
            ClaimState::Processing,
            ClaimState::Approved,
            ClaimState::Rejected,
            ClaimState::RequiresReview,
            ClaimState::Error,
        ] {
            assert_eq!(state.as_str().parse::<ClaimState>().unwrap(), state);
        }
    }
}
