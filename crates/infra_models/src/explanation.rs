//! LLM-backed explanation generation

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::{DomainPort, PortError};
use domain_claims::{ExplanationGenerator, ExplanationRequest, FALLBACK_EXPLANATION};

use crate::ollama::OllamaClient;

/// Clause texts included in the prompt, at most
const PROMPT_CLAUSES: usize = 5;

/// Builds the fixed-template assessment prompt.
///
/// The visual evidence block is emitted only when image findings are
/// present.
pub fn build_prompt(request: &ExplanationRequest<'_>) -> String {
    let clause_text = request
        .clauses
        .iter()
        .take(PROMPT_CLAUSES)
        .map(|clause| format!("- {}", clause.text))
        .collect::<Vec<_>>()
        .join("\n");

    let mut visual_context = String::new();
    if let Some(findings) = request.image_findings {
        let mut details = vec![format!("Severity: {:?}", findings.severity)];
        if findings.damage_detected {
            details.push("Damage Detected: YES".to_string());
        }
        if let Some(claimability) = findings.claimability {
            details.push(format!("Claimability Status: {claimability:?}"));
        }
        if !findings.reasoning.is_empty() {
            details.push(format!(
                "Visual Observations: {}",
                findings.reasoning.join(", ")
            ));
        }
        visual_context = format!("\nVisual Evidence Analysis:\n{}", details.join("\n"));
    }

    format!(
        r#"You are an expert insurance claim analyst.

Claim Context:
Company: {company}
Policy: {policy}
Decision Factors: {reasons:?}
{visual_context}

Relevant Policy Clauses:
{clause_text}

Task:
Generate a professional claim assessment.
1. Synthesize the decision factors and visual evidence into a clear explanation.
2. If visuals are provided, explicitly mention what the image analysis found.
3. Cite the specific policy clauses that justify the decision.

Output Format (STRICTLY follow these headers):

## Explanation
<A detailed 3-4 sentence paragraph explaining the decision, citing policy and visual evidence.>

## Visual Analysis
<A specific note on what the image analysis found.>

## Evidence Used
- <Bullet points of the exact policy clauses or rules applied>
"#,
        company = request.insurer,
        policy = request.policy_category,
        reasons = request.reasons,
    )
}

/// Explanation generator over the local LLM.
///
/// Returns the fixed fallback text on any collaborator failure - timeout,
/// malformed response, or transport error - and never raises.
pub struct OllamaExplanationGenerator {
    client: Arc<OllamaClient>,
}

impl OllamaExplanationGenerator {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

impl DomainPort for OllamaExplanationGenerator {}

#[async_trait]
impl ExplanationGenerator for OllamaExplanationGenerator {
    async fn explain(&self, request: ExplanationRequest<'_>) -> Result<String, PortError> {
        let prompt = build_prompt(&request);
        match self.client.generate(&prompt).await {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(error = %err, "explanation generation failed, using fallback");
                Ok(FALLBACK_EXPLANATION.to_string())
            }
        }
    }
}
