//! Survey payload schema
//!
//! Survey data arrives from the claim wizard as nested camelCase JSON.
//! Known decision-relevant fields are typed; everything else is carried
//! through open sections so the payload round-trips to persistence intact.
//! Accessors return `Option` - an absent path is a typed "absent", never an
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open JSON section of a survey payload
pub type SectionMap = serde_json::Map<String, Value>;

/// Per-claim survey facts supplied by the caller.
///
/// May be enriched in place by the orchestrator with a model-derived
/// `prediction`/`probability` before persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurveyFacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_details: Option<SectionMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_details: Option<SectionMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accident_specifics: Option<AccidentSpecifics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedFlags>,
    /// Prior tabular-model verdict, if the caller already ran one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Unrecognized top-level keys, preserved verbatim
    #[serde(flatten)]
    pub extra: SectionMap,
}

/// Accident-specific answers with the decision-relevant flags typed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccidentSpecifics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alcohol_intoxicated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_license_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_parts: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: SectionMap,
}

/// Flags derived by the caller before submission (snake_case on the wire)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedFlags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimable_policy: Option<bool>,
    #[serde(flatten)]
    pub extra: SectionMap,
}

impl SurveyFacts {
    /// Tolerant construction from raw JSON: an absent or unparseable
    /// payload degrades to an empty survey rather than failing the claim.
    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            return SurveyFacts::default();
        }
        serde_json::from_value(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "unparseable survey payload, treating as empty");
            SurveyFacts::default()
        })
    }

    pub fn claimable_policy(&self) -> Option<bool> {
        self.computed.as_ref()?.claimable_policy
    }

    pub fn alcohol_intoxicated(&self) -> Option<bool> {
        self.accident_specifics.as_ref()?.alcohol_intoxicated
    }

    pub fn driver_license_valid(&self) -> Option<bool> {
        self.accident_specifics.as_ref()?.driver_license_valid
    }

    /// Whether a tabular-model result is already attached
    pub fn has_prediction(&self) -> bool {
        self.probability.is_some()
    }

    /// Merges a tabular-model result into the payload
    pub fn apply_prediction(&mut self, prediction: String, probability: f64) {
        self.prediction = Some(prediction);
        self.probability = Some(probability);
    }

    /// Flattens the nested sections into one map: vehicle details, incident
    /// details, accident specifics, then top-level scalars. Later sections
    /// win on key collisions.
    pub fn flattened(&self) -> SectionMap {
        let mut flat = SectionMap::new();
        if let Some(section) = &self.vehicle_details {
            flat.extend(section.clone());
        }
        if let Some(section) = &self.incident_details {
            flat.extend(section.clone());
        }
        if let Some(specifics) = &self.accident_specifics {
            if let Some(flag) = specifics.alcohol_intoxicated {
                flat.insert("alcoholIntoxicated".to_string(), flag.into());
            }
            if let Some(flag) = specifics.driver_license_valid {
                flat.insert("driverLicenseValid".to_string(), flag.into());
            }
            if let Some(parts) = &specifics.damage_parts {
                flat.insert("damageParts".to_string(), parts.clone().into());
            }
            flat.extend(specifics.extra.clone());
        }
        for (key, value) in &self.extra {
            if value.is_string() || value.is_number() || value.is_boolean() {
                flat.insert(key.clone(), value.clone());
            }
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_wire_names() {
        let survey = SurveyFacts::from_value(json!({
            "accidentSpecifics": {"alcoholIntoxicated": true, "driverLicenseValid": false},
            "computed": {"claimable_policy": false}
        }));
        assert_eq!(survey.alcohol_intoxicated(), Some(true));
        assert_eq!(survey.driver_license_valid(), Some(false));
        assert_eq!(survey.claimable_policy(), Some(false));
    }

    #[test]
    fn test_absent_paths_are_none() {
        let survey = SurveyFacts::default();
        assert_eq!(survey.claimable_policy(), None);
        assert_eq!(survey.alcohol_intoxicated(), None);
        assert_eq!(survey.driver_license_valid(), None);
    }

    #[test]
    fn test_unparseable_payload_degrades_to_empty() {
        let survey = SurveyFacts::from_value(json!("not an object"));
        assert_eq!(survey, SurveyFacts::default());
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let survey = SurveyFacts::from_value(json!({"customField": "kept"}));
        let value = serde_json::to_value(&survey).unwrap();
        assert_eq!(value["customField"], "kept");
    }

    #[test]
    fn test_flattened_merges_sections_and_scalars() {
        let survey = SurveyFacts::from_value(json!({
            "vehicleDetails": {"carAge": 4},
            "incidentDetails": {"accidentType": "collision"},
            "accidentSpecifics": {"damageParts": ["Damage Front"], "driverAtFault": true},
            "region": "north",
            "nested": {"dropped": true}
        }));
        let flat = survey.flattened();
        assert_eq!(flat["carAge"], 4);
        assert_eq!(flat["accidentType"], "collision");
        assert_eq!(flat["damageParts"], json!(["Damage Front"]));
        assert_eq!(flat["driverAtFault"], true);
        assert_eq!(flat["region"], "north");
        assert!(!flat.contains_key("nested"));
    }
}
