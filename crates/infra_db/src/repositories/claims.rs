//! Claims repository
//!
//! Implements the domain's `ClaimStore` port on PostgreSQL. Claim rows are
//! created in `PROCESSING` state as the pipeline's durable checkpoint;
//! `finalize` writes the decision plus all survey/image/explanation records
//! in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ClaimId, DomainPort, PortError, UserId};
use domain_claims::{
    Claim, ClaimArtifacts, ClaimFilter, ClaimState, ClaimStore, ExplanationRecord, RiskLevel,
    SurveyFacts, SurveyRecord,
};
use domain_retrieval::ClauseRecord;

use crate::error::DatabaseError;

/// Default page size for claim listings
const DEFAULT_LIST_LIMIT: i64 = 100;

/// Repository for the claim aggregate and its owned records
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct ClaimRow {
    claim_id: Uuid,
    user_id: Option<Uuid>,
    insurer: String,
    policy_category: String,
    description: String,
    status: String,
    risk_level: Option<String>,
    created_at: DateTime<Utc>,
}

impl ClaimRow {
    fn into_domain(self) -> Result<Claim, DatabaseError> {
        let state: ClaimState = self
            .status
            .parse()
            .map_err(DatabaseError::SerializationError)?;
        let risk_level = self
            .risk_level
            .map(|raw| raw.parse::<RiskLevel>())
            .transpose()
            .map_err(DatabaseError::SerializationError)?;
        Ok(Claim {
            id: ClaimId::from_uuid(self.claim_id),
            user_id: self.user_id.map(UserId::from_uuid),
            insurer: self.insurer,
            policy_category: self.policy_category,
            description: self.description,
            state,
            risk_level,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SurveyRow {
    payload: Option<serde_json::Value>,
    prediction: Option<String>,
    probability: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct ExplanationRow {
    extracted_keywords: Option<serde_json::Value>,
    clauses_used: Option<serde_json::Value>,
    explanation_text: Option<String>,
}

const CLAIM_COLUMNS: &str = "claim_id, user_id, insurer, policy_category, description, status, \
                             risk_level, created_at";

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for ClaimsRepository {}

#[async_trait]
impl ClaimStore for ClaimsRepository {
    async fn create_processing(&self, claim: &Claim) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO claims (claim_id, user_id, insurer, policy_category, description, \
             status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(claim.id.as_uuid())
        .bind(claim.user_id.map(Uuid::from))
        .bind(&claim.insurer)
        .bind(&claim.policy_category)
        .bind(&claim.description)
        .bind(ClaimState::Processing.as_str())
        .bind(claim.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;
        Ok(())
    }

    async fn finalize(
        &self,
        claim_id: ClaimId,
        artifacts: &ClaimArtifacts,
    ) -> Result<(), PortError> {
        let payload = serde_json::to_value(&artifacts.survey.payload)
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;
        let keywords = serde_json::to_value(&artifacts.explanation.extracted_keywords)
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;
        let clauses = serde_json::to_value(&artifacts.explanation.clauses_used)
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| storage_error(DatabaseError::TransactionFailed(err.to_string())))?;

        let state = ClaimState::from(artifacts.decision.final_decision);
        let updated = sqlx::query("UPDATE claims SET status = $2, risk_level = $3 WHERE claim_id = $1")
            .bind(claim_id.as_uuid())
            .bind(state.as_str())
            .bind(artifacts.decision.risk_level.as_str())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;
        if updated.rows_affected() == 0 {
            return Err(PortError::not_found("Claim", claim_id));
        }

        sqlx::query(
            "INSERT INTO claim_surveys (survey_id, claim_id, payload, prediction, probability) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(claim_id.as_uuid())
        .bind(payload)
        .bind(&artifacts.survey.prediction)
        .bind(artifacts.survey.probability)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;

        for image in &artifacts.images {
            let findings = serde_json::to_value(&image.findings)
                .map_err(DatabaseError::from)
                .map_err(storage_error)?;
            sqlx::query(
                "INSERT INTO claim_images (image_id, claim_id, filename, findings) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::now_v7())
            .bind(claim_id.as_uuid())
            .bind(&image.filename)
            .bind(findings)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;
        }

        sqlx::query(
            "INSERT INTO claim_explanations (explanation_id, claim_id, extracted_keywords, \
             clauses_used, explanation_text) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(claim_id.as_uuid())
        .bind(keywords)
        .bind(clauses)
        .bind(&artifacts.explanation.explanation_text)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;

        tx.commit()
            .await
            .map_err(|err| storage_error(DatabaseError::TransactionFailed(err.to_string())))?;
        Ok(())
    }

    async fn mark_error(&self, claim_id: ClaimId) -> Result<(), PortError> {
        sqlx::query("UPDATE claims SET status = $2 WHERE claim_id = $1")
            .bind(claim_id.as_uuid())
            .bind(ClaimState::Error.as_str())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from)
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get(&self, claim_id: ClaimId) -> Result<Claim, PortError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1"
        ))
        .bind(claim_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?
        .ok_or_else(|| PortError::not_found("Claim", claim_id))?;

        row.into_domain().map_err(storage_error)
    }

    async fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError> {
        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
               AND ($2::text IS NULL OR insurer = $2) \
             ORDER BY created_at DESC \
             LIMIT $3"
        ))
        .bind(filter.user_id.map(Uuid::from))
        .bind(&filter.insurer)
        .bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(storage_error))
            .collect()
    }

    async fn latest_survey(&self, claim_id: ClaimId) -> Result<Option<SurveyRecord>, PortError> {
        let row = sqlx::query_as::<_, SurveyRow>(
            "SELECT payload, prediction, probability FROM claim_surveys \
             WHERE claim_id = $1 ORDER BY created_at DESC, survey_id DESC LIMIT 1",
        )
        .bind(claim_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;

        Ok(row.map(|row| SurveyRecord {
            payload: row
                .payload
                .map(SurveyFacts::from_value)
                .unwrap_or_default(),
            prediction: row.prediction,
            probability: row.probability,
        }))
    }

    async fn latest_explanation(
        &self,
        claim_id: ClaimId,
    ) -> Result<Option<ExplanationRecord>, PortError> {
        let row = sqlx::query_as::<_, ExplanationRow>(
            "SELECT extracted_keywords, clauses_used, explanation_text FROM claim_explanations \
             WHERE claim_id = $1 ORDER BY created_at DESC, explanation_id DESC LIMIT 1",
        )
        .bind(claim_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)
        .map_err(storage_error)?;

        row.map(|row| -> Result<ExplanationRecord, PortError> {
            let extracted_keywords = row
                .extracted_keywords
                .map(serde_json::from_value)
                .transpose()
                .map_err(DatabaseError::from)
                .map_err(storage_error)?
                .unwrap_or_default();
            let clauses_used: Vec<ClauseRecord> = row
                .clauses_used
                .map(serde_json::from_value)
                .transpose()
                .map_err(DatabaseError::from)
                .map_err(storage_error)?
                .unwrap_or_default();
            Ok(ExplanationRecord {
                extracted_keywords,
                clauses_used,
                explanation_text: row.explanation_text.unwrap_or_default(),
            })
        })
        .transpose()
    }
}

/// Wraps database failures in the port error taxonomy
fn storage_error(err: DatabaseError) -> PortError {
    if err.is_connection_error() {
        PortError::Connection {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    } else {
        PortError::Internal {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
