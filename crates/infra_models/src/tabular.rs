//! Tabular risk-model client

use async_trait::async_trait;
use serde::Deserialize;

use core_kernel::{DomainPort, PortError};
use domain_claims::{PredictionOutcome, SectionMap, TabularPredictor};

use crate::http::{build_client, request_error, status_error};

/// Wire shape of the model server's response: either a scored verdict or a
/// structured report of missing required fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictResponse {
    Scored {
        prediction: String,
        probability: f64,
    },
    Missing {
        error: String,
        required_fields: Vec<String>,
        #[serde(default)]
        missing_fields: Vec<String>,
    },
}

/// Client for the claim-approval model server.
pub struct HttpTabularPredictor {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpTabularPredictor {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, PortError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.into(),
            timeout_secs,
        })
    }
}

impl DomainPort for HttpTabularPredictor {}

#[async_trait]
impl TabularPredictor for HttpTabularPredictor {
    async fn predict(&self, features: &SectionMap) -> Result<PredictionOutcome, PortError> {
        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(features)
            .send()
            .await
            .map_err(|err| request_error("tabular prediction", self.timeout_secs, err))?;

        if !response.status().is_success() {
            return Err(status_error("tabular model", response.status()));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|err| PortError::transformation(format!("tabular prediction: {err}")))?;

        Ok(match body {
            PredictResponse::Scored {
                prediction,
                probability,
            } => PredictionOutcome::Scored {
                prediction,
                probability,
            },
            PredictResponse::Missing {
                error,
                required_fields,
                missing_fields,
            } => {
                tracing::debug!(error, "tabular model rejected the feature set");
                PredictionOutcome::MissingFields {
                    required: required_fields,
                    missing: missing_fields,
                }
            }
        })
    }
}
