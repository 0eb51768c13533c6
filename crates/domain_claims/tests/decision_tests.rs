//! Decision engine tests

use proptest::prelude::*;

use domain_claims::{
    decide, Claimability, FinalDecision, ImageFindings, RiskLevel, SurveyFacts,
};
use test_utils::{ImageFindingsBuilder, SurveyFactsBuilder};

#[test]
fn test_all_clear_is_approved_low() {
    let survey = SurveyFactsBuilder::clean().build();
    let image = ImageFindingsBuilder::claimable().build();

    let decision = decide(&survey, &image);

    assert_eq!(decision.final_decision, FinalDecision::Approved);
    assert_eq!(decision.risk_level, RiskLevel::Low);
    assert_eq!(decision.reasons, vec!["All checks passed"]);
}

#[test]
fn test_empty_inputs_fire_no_rules() {
    let decision = decide(&SurveyFacts::default(), &ImageFindings::default());

    assert_eq!(decision.final_decision, FinalDecision::Approved);
    assert_eq!(decision.risk_level, RiskLevel::Low);
    assert_eq!(decision.reasons, vec!["All checks passed"]);
}

#[test]
fn test_not_claimable_image_rejects_despite_clean_survey() {
    let survey = SurveyFactsBuilder::clean().build();
    let image = ImageFindingsBuilder::new()
        .with_claimability(Claimability::NotClaimable)
        .with_final_reason("Only small scratches/dents detected")
        .build();

    let decision = decide(&survey, &image);

    assert_eq!(decision.final_decision, FinalDecision::Rejected);
    assert_eq!(decision.risk_level, RiskLevel::High);
    assert_eq!(decision.reasons, vec!["Only small scratches/dents detected"]);
}

#[test]
fn test_not_claimable_without_stated_reason_uses_default() {
    let image = ImageFindingsBuilder::new()
        .with_claimability(Claimability::NotClaimable)
        .build();

    let decision = decide(&SurveyFacts::default(), &image);

    assert_eq!(decision.reasons, vec!["Damage criteria not met"]);
}

#[test]
fn test_requires_review_image_is_medium_risk() {
    let image = ImageFindingsBuilder::new()
        .with_claimability(Claimability::RequiresReview)
        .build();

    let decision = decide(&SurveyFactsBuilder::clean().build(), &image);

    assert_eq!(decision.final_decision, FinalDecision::RequiresReview);
    assert_eq!(decision.risk_level, RiskLevel::Medium);
    assert_eq!(decision.reasons, vec!["Image evidence requires manual review"]);
}

#[test]
fn test_expired_policy_rejects() {
    let survey = SurveyFactsBuilder::new().with_claimable_policy(false).build();

    let decision = decide(&survey, &ImageFindings::default());

    assert_eq!(decision.final_decision, FinalDecision::Rejected);
    assert_eq!(decision.risk_level, RiskLevel::High);
    assert!(decision.reasons.contains(&"Policy expired or invalid".to_string()));
}

#[test]
fn test_alcohol_intoxication_rejects() {
    let survey = SurveyFactsBuilder::clean().with_alcohol_intoxicated(true).build();
    let image = ImageFindingsBuilder::claimable().build();

    let decision = decide(&survey, &image);

    assert_eq!(decision.final_decision, FinalDecision::Rejected);
    assert_eq!(decision.risk_level, RiskLevel::High);
    assert!(decision
        .reasons
        .contains(&"Driver Alcohol Intoxication Detected".to_string()));
}

#[test]
fn test_legacy_prediction_rejects() {
    let survey = SurveyFactsBuilder::clean().with_prediction("REJECTED", 0.12).build();

    let decision = decide(&survey, &ImageFindings::default());

    assert_eq!(decision.final_decision, FinalDecision::Rejected);
    assert!(decision.reasons.contains(&"Survey risk factors failed".to_string()));
}

#[test]
fn test_reasons_accumulate_in_rule_order() {
    let survey = SurveyFactsBuilder::new()
        .with_alcohol_intoxicated(true)
        .with_driver_license_valid(false)
        .build();

    let decision = decide(&survey, &ImageFindings::default());

    assert_eq!(
        decision.reasons,
        vec!["Driver Alcohol Intoxication Detected", "Driver license invalid"]
    );
    assert_eq!(decision.final_decision, FinalDecision::Rejected);
}

#[test]
fn test_later_rules_overwrite_review_verdict() {
    // Requires-review image followed by a rejecting survey rule: the
    // verdict and risk are overwritten, both reasons remain.
    let survey = SurveyFactsBuilder::new().with_claimable_policy(false).build();
    let image = ImageFindingsBuilder::new()
        .with_claimability(Claimability::RequiresReview)
        .build();

    let decision = decide(&survey, &image);

    assert_eq!(decision.final_decision, FinalDecision::Rejected);
    assert_eq!(decision.risk_level, RiskLevel::High);
    assert_eq!(
        decision.reasons,
        vec![
            "Image evidence requires manual review",
            "Policy expired or invalid"
        ]
    );
}

proptest! {
    /// An invalid policy rejects at high risk regardless of every other field.
    #[test]
    fn prop_invalid_policy_always_rejects(
        alcohol in any::<Option<bool>>(),
        license in any::<Option<bool>>(),
        claimable_image in any::<bool>(),
        prediction_rejected in any::<bool>(),
    ) {
        let mut builder = SurveyFactsBuilder::new().with_claimable_policy(false);
        if let Some(value) = alcohol {
            builder = builder.with_alcohol_intoxicated(value);
        }
        if let Some(value) = license {
            builder = builder.with_driver_license_valid(value);
        }
        if prediction_rejected {
            builder = builder.with_prediction("REJECTED", 0.2);
        }
        let image = if claimable_image {
            ImageFindingsBuilder::claimable().build()
        } else {
            ImageFindings::default()
        };

        let decision = decide(&builder.build(), &image);

        prop_assert_eq!(decision.final_decision, FinalDecision::Rejected);
        prop_assert_eq!(decision.risk_level, RiskLevel::High);
    }

    /// A not-claimable image rejects at high risk regardless of the survey.
    #[test]
    fn prop_not_claimable_image_always_rejects(
        claimable_policy in any::<Option<bool>>(),
        alcohol in any::<Option<bool>>(),
    ) {
        let mut builder = SurveyFactsBuilder::new();
        if let Some(value) = claimable_policy {
            builder = builder.with_claimable_policy(value);
        }
        if let Some(value) = alcohol {
            builder = builder.with_alcohol_intoxicated(value);
        }
        let image = ImageFindingsBuilder::new()
            .with_claimability(Claimability::NotClaimable)
            .build();

        let decision = decide(&builder.build(), &image);

        prop_assert_eq!(decision.final_decision, FinalDecision::Rejected);
        prop_assert_eq!(decision.risk_level, RiskLevel::High);
    }

    /// Reasons are never empty and the default verdict only appears alone.
    #[test]
    fn prop_reasons_never_empty(
        claimable_policy in any::<Option<bool>>(),
        alcohol in any::<Option<bool>>(),
        license in any::<Option<bool>>(),
    ) {
        let mut builder = SurveyFactsBuilder::new();
        if let Some(value) = claimable_policy {
            builder = builder.with_claimable_policy(value);
        }
        if let Some(value) = alcohol {
            builder = builder.with_alcohol_intoxicated(value);
        }
        if let Some(value) = license {
            builder = builder.with_driver_license_valid(value);
        }

        let decision = decide(&builder.build(), &ImageFindings::default());

        prop_assert!(!decision.reasons.is_empty());
        if decision.reasons.contains(&"All checks passed".to_string()) {
            prop_assert_eq!(decision.reasons.len(), 1);
            prop_assert_eq!(decision.final_decision, FinalDecision::Approved);
        }
    }
}
