//! Test data builders
//!
//! Builder patterns for constructing survey payloads and image findings
//! with defaults, so tests specify only the relevant fields.

use serde_json::Value;

use domain_claims::{
    AccidentSpecifics, Claimability, ComputedFlags, ImageFindings, SectionMap, Severity,
    SurveyFacts,
};

/// Builder for survey payloads
#[derive(Debug, Default)]
pub struct SurveyFactsBuilder {
    claimable_policy: Option<bool>,
    alcohol_intoxicated: Option<bool>,
    driver_license_valid: Option<bool>,
    damage_parts: Option<Vec<String>>,
    prediction: Option<String>,
    probability: Option<f64>,
    vehicle_details: SectionMap,
    incident_details: SectionMap,
}

impl SurveyFactsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A survey that passes every decision rule
    pub fn clean() -> Self {
        Self::new()
            .with_claimable_policy(true)
            .with_alcohol_intoxicated(false)
            .with_driver_license_valid(true)
    }

    pub fn with_claimable_policy(mut self, value: bool) -> Self {
        self.claimable_policy = Some(value);
        self
    }

    pub fn with_alcohol_intoxicated(mut self, value: bool) -> Self {
        self.alcohol_intoxicated = Some(value);
        self
    }

    pub fn with_driver_license_valid(mut self, value: bool) -> Self {
        self.driver_license_valid = Some(value);
        self
    }

    pub fn with_damage_parts(mut self, parts: &[&str]) -> Self {
        self.damage_parts = Some(parts.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_prediction(mut self, prediction: impl Into<String>, probability: f64) -> Self {
        self.prediction = Some(prediction.into());
        self.probability = Some(probability);
        self
    }

    pub fn with_vehicle_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vehicle_details.insert(key.into(), value.into());
        self
    }

    pub fn with_incident_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.incident_details.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SurveyFacts {
        let accident_specifics = if self.alcohol_intoxicated.is_some()
            || self.driver_license_valid.is_some()
            || self.damage_parts.is_some()
        {
            Some(AccidentSpecifics {
                alcohol_intoxicated: self.alcohol_intoxicated,
                driver_license_valid: self.driver_license_valid,
                damage_parts: self.damage_parts,
                ..Default::default()
            })
        } else {
            None
        };

        SurveyFacts {
            vehicle_details: (!self.vehicle_details.is_empty()).then_some(self.vehicle_details),
            incident_details: (!self.incident_details.is_empty()).then_some(self.incident_details),
            accident_specifics,
            computed: self.claimable_policy.map(|value| ComputedFlags {
                claimable_policy: Some(value),
                ..Default::default()
            }),
            prediction: self.prediction,
            probability: self.probability,
            ..Default::default()
        }
    }
}

/// Builder for image findings
#[derive(Debug, Default)]
pub struct ImageFindingsBuilder {
    findings: ImageFindings,
}

impl ImageFindingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings for a clearly claimable major-damage image
    pub fn claimable() -> Self {
        Self::new()
            .with_claimability(Claimability::Claimable)
            .with_damage(Severity::Major)
    }

    pub fn with_claimability(mut self, claimability: Claimability) -> Self {
        self.findings.claimability = Some(claimability);
        self
    }

    pub fn with_damage(mut self, severity: Severity) -> Self {
        self.findings.damage_detected = true;
        self.findings.severity = severity;
        self
    }

    pub fn with_final_reason(mut self, reason: impl Into<String>) -> Self {
        self.findings.final_reason = Some(reason.into());
        self
    }

    pub fn with_reasoning(mut self, notes: &[&str]) -> Self {
        self.findings.reasoning = notes.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.findings.confidence = confidence;
        self
    }

    pub fn build(self) -> ImageFindings {
        self.findings
    }
}
