use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    backend::SymptomBackend,
    diagnosis::{Diagnosis, Severity, SeverityLevel, Verdict},
    error::{FlowError, Result},
    protocol::{
        FollowupRequest, FollowupResponse, PredictionRequest, PredictionResponse, ResponseStatus,
        SymptomLookupRequest, SymptomLookupResponse,
    },
};

/// Remote backend calling a symptom service over HTTP.
///
/// Every failure to reach the service or decode its reply is a
/// [`FlowError::Transport`]; callers keep their previous session and may retry.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FlowError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Calling symptom service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "Request failed");
                FlowError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "Symptom service returned an error status");
            return Err(FlowError::Transport(format!("{url} returned {status}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| FlowError::Transport(format!("invalid response from {url}: {e}")))
    }
}

#[async_trait]
impl SymptomBackend for HttpBackend {
    async fn lookup(&self, query: &str) -> Result<Vec<String>> {
        let request = SymptomLookupRequest {
            symptom: query.to_string(),
        };
        let response: SymptomLookupResponse = self.post("/get_symptoms", &request).await?;
        Ok(response.matches)
    }

    async fn followups(&self, symptom: &str) -> Result<Vec<String>> {
        let request = FollowupRequest {
            symptom: symptom.to_string(),
        };
        let response: FollowupResponse = self.post("/get_followup_questions", &request).await?;
        Ok(response.into_symptoms())
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<Diagnosis> {
        let response: PredictionResponse = self.post("/predict", request).await?;
        if response.status == ResponseStatus::Error {
            return Err(FlowError::Backend(
                response
                    .message
                    .unwrap_or_else(|| "prediction failed".to_string()),
            ));
        }
        into_diagnosis(response)
    }
}

fn into_diagnosis(response: PredictionResponse) -> Result<Diagnosis> {
    let missing = |field: &str| FlowError::Transport(format!("prediction without {field}"));

    let disease = response.prediction.ok_or_else(|| missing("prediction"))?;
    let summary = response.severity.ok_or_else(|| missing("severity"))?;
    let verdict = match summary.level {
        SeverityLevel::Low => Verdict::TakePrecautions,
        SeverityLevel::Medium | SeverityLevel::High => Verdict::ConsultDoctor,
    };

    Ok(Diagnosis {
        disease,
        description: response.description.unwrap_or_default(),
        precautions: response.precautions,
        severity: Severity {
            score: summary.score,
            level: summary.level,
            verdict,
            advice: verdict.advice().to_string(),
        },
    })
}
