//! LLM-backed keyword extraction from claim descriptions

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::{DomainPort, PortError};
use domain_claims::{KeywordExtraction, KeywordExtractor};

use crate::ollama::OllamaClient;

const SYSTEM_PROMPT: &str = r#"You are an insurance domain information extractor.

Your task:
- Extract structured information from an accident description.
- Do NOT explain.
- Do NOT make decisions.
- Output ONLY valid JSON.

JSON schema:
{
  "incident_type": string,
  "damage_severity": "minor" | "moderate" | "major",
  "keywords": [string]
}

Rules:
- keywords must be concrete vehicle parts or damage indicators
- incident_type must be one word
- damage_severity must be inferred conservatively"#;

fn keyword_prompt(description: &str) -> String {
    format!(
        "SYSTEM:\n{SYSTEM_PROMPT}\n\nUSER:\nAccident description:\n\"\"\"{description}\"\"\"\n\nReturn JSON only.\n"
    )
}

/// Parses the LLM output, degrading to the default extraction when the
/// model returned something other than the requested JSON.
fn parse_extraction(raw: &str) -> KeywordExtraction {
    match serde_json::from_str(raw.trim()) {
        Ok(extraction) => extraction,
        Err(err) => {
            tracing::debug!(error = %err, "keyword extraction output was not valid JSON");
            KeywordExtraction::default()
        }
    }
}

/// Keyword extractor over the local LLM.
///
/// Transport failures are returned as errors and degraded by the pipeline;
/// unparseable model output degrades here to the default extraction.
pub struct OllamaKeywordExtractor {
    client: Arc<OllamaClient>,
}

impl OllamaKeywordExtractor {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

impl DomainPort for OllamaKeywordExtractor {}

#[async_trait]
impl KeywordExtractor for OllamaKeywordExtractor {
    async fn extract(&self, description: &str) -> Result<KeywordExtraction, PortError> {
        let raw = self.client.generate(&keyword_prompt(description)).await?;
        Ok(parse_extraction(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_output() {
        let extraction = parse_extraction(
            r#"{"incident_type": "collision", "damage_severity": "major", "keywords": ["bumper", "headlight"]}"#,
        );
        assert_eq!(extraction.incident_type, "collision");
        assert_eq!(extraction.keywords, vec!["bumper", "headlight"]);
    }

    #[test]
    fn test_parse_partial_output_fills_defaults() {
        let extraction = parse_extraction(r#"{"keywords": ["windshield"]}"#);
        assert_eq!(extraction.incident_type, "unknown");
        assert_eq!(extraction.keywords, vec!["windshield"]);
    }

    #[test]
    fn test_parse_garbage_degrades_to_default() {
        let extraction = parse_extraction("Sure! Here is the JSON you asked for: ...");
        assert_eq!(extraction, KeywordExtraction::default());
        assert!(extraction.keywords.is_empty());
    }

    #[test]
    fn test_prompt_embeds_description() {
        let prompt = keyword_prompt("hit a tree near the gate");
        assert!(prompt.contains("hit a tree near the gate"));
        assert!(prompt.contains("Return JSON only."));
    }
}
