//! Image damage-model client

use async_trait::async_trait;
use serde::Serialize;

use core_kernel::{DomainPort, PortError};
use domain_claims::{ImageAnalyzer, ImageFindings};

use crate::http::{build_client, request_error, status_error};

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    images: &'a [String],
}

/// Client for the damage detection/classification model server.
///
/// The model itself is a black box: it accepts image references and returns
/// the structured findings shape consumed by the decision engine.
pub struct HttpImageAnalyzer {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpImageAnalyzer {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, PortError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.into(),
            timeout_secs,
        })
    }
}

impl DomainPort for HttpImageAnalyzer {}

#[async_trait]
impl ImageAnalyzer for HttpImageAnalyzer {
    async fn analyze(&self, image_refs: &[String]) -> Result<ImageFindings, PortError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { images: image_refs })
            .send()
            .await
            .map_err(|err| request_error("image analysis", self.timeout_secs, err))?;

        if !response.status().is_success() {
            return Err(status_error("image model", response.status()));
        }

        response
            .json()
            .await
            .map_err(|err| PortError::transformation(format!("image analysis: {err}")))
    }
}
