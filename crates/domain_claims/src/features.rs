//! Survey-to-tabular-model feature mapping
//!
//! The claim wizard submits camelCase nested sections; the tabular model
//! expects a flat snake_case feature map with the damaged-parts array
//! encoded as 0/1 flags.

use serde_json::Value;

use crate::survey::{SectionMap, SurveyFacts};

const KEY_MAP: [(&str, &str); 8] = [
    ("carAge", "car_age"),
    ("driverAge", "driver_age"),
    ("accidentTime", "accident_time"),
    ("locationType", "location_type"),
    ("accidentType", "accident_type"),
    ("previousClaims", "previous_claims"),
    ("policeReport", "police_report"),
    ("driverAtFault", "driver_at_fault"),
];

const DAMAGE_FLAGS: [(&str, &str); 4] = [
    ("Damage Front", "damage_front"),
    ("Damage Rear", "damage_rear"),
    ("Damage Left", "damage_left_side"),
    ("Damage Right", "damage_right_side"),
];

/// Remaps known survey fields into the tabular collaborator's input shape.
pub fn tabular_features(survey: &SurveyFacts) -> SectionMap {
    let flat = survey.flattened();
    let mut features = SectionMap::new();

    for (source, target) in KEY_MAP {
        if let Some(value) = flat.get(source) {
            features.insert(target.to_string(), value.clone());
        }
    }

    let damage_parts: Vec<&str> = flat
        .get("damageParts")
        .and_then(Value::as_array)
        .map(|parts| parts.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    for (part, flag) in DAMAGE_FLAGS {
        let present = damage_parts.iter().any(|p| *p == part);
        features.insert(flag.to_string(), Value::from(if present { 1 } else { 0 }));
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_renames_known_keys() {
        let survey = SurveyFacts::from_value(json!({
            "vehicleDetails": {"carAge": 7},
            "incidentDetails": {"accidentTime": "22:30", "locationType": "highway"},
            "accidentSpecifics": {"driverAtFault": false}
        }));
        let features = tabular_features(&survey);
        assert_eq!(features["car_age"], 7);
        assert_eq!(features["accident_time"], "22:30");
        assert_eq!(features["location_type"], "highway");
        assert_eq!(features["driver_at_fault"], false);
    }

    #[test]
    fn test_damage_parts_encode_to_flags() {
        let survey = SurveyFacts::from_value(json!({
            "accidentSpecifics": {"damageParts": ["Damage Front", "Damage Left"]}
        }));
        let features = tabular_features(&survey);
        assert_eq!(features["damage_front"], 1);
        assert_eq!(features["damage_rear"], 0);
        assert_eq!(features["damage_left_side"], 1);
        assert_eq!(features["damage_right_side"], 0);
    }

    #[test]
    fn test_empty_survey_still_yields_flags() {
        let features = tabular_features(&SurveyFacts::default());
        assert_eq!(features.len(), DAMAGE_FLAGS.len());
        assert_eq!(features["damage_front"], 0);
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let survey = SurveyFacts::from_value(json!({
            "vehicleDetails": {"paintColor": "red", "carAge": 2}
        }));
        let features = tabular_features(&survey);
        assert!(!features.contains_key("paintColor"));
        assert!(!features.contains_key("paint_color"));
        assert_eq!(features["car_age"], 2);
    }
}
