//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_claims::{ClaimFilter, ClaimInput, SurveyFacts};

use crate::dto::claims::{
    ClaimDecisionResponse, ClaimSummaryResponse, ListClaimsQuery, SubmitClaimRequest,
};
use crate::{error::ApiError, AppState};

/// Submits a claim and runs the full adjudication pipeline
pub async fn submit_claim(
    State(state): State<AppState>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<Json<ClaimDecisionResponse>, ApiError> {
    if request.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description is required".to_string()));
    }

    let input = ClaimInput {
        user_id: request.user_id,
        insurer: request.insurer,
        policy_category: request.policy_category,
        description: request.description,
        survey: SurveyFacts::from_value(request.survey),
        image_refs: request.image_refs,
    };

    let outcome = state.processor.process(input).await?;
    Ok(Json(ClaimDecisionResponse::from(outcome)))
}

/// Gets a claim with its latest explanation
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimSummaryResponse>, ApiError> {
    let claim_id = ClaimId::from_uuid(id);
    let claim = state.store.get(claim_id).await?;
    let explanation = state.store.latest_explanation(claim_id).await?;
    Ok(Json(ClaimSummaryResponse::from_parts(claim, explanation)))
}

/// Lists recent claims, optionally filtered by insurer or user
pub async fn list_claims(
    State(state): State<AppState>,
    Query(params): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimSummaryResponse>>, ApiError> {
    let filter = ClaimFilter {
        insurer: params.insurer,
        user_id: params.user_id,
        limit: params.limit,
    };
    let claims = state.store.list(&filter).await?;
    Ok(Json(
        claims
            .into_iter()
            .map(|claim| ClaimSummaryResponse::from_parts(claim, None))
            .collect(),
    ))
}
