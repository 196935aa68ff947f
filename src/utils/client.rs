use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    CreateGradeRequest, Envelope, GradeListResponse, GradeRecord, GradeResponse, HealthStatus,
    UpdateGradeRequest,
};

/// Talks to the grades backend (`/grades`, `/grades/{id}`, `/health` under the configured base).
#[derive(Debug, Clone)]
pub struct GradesClient {
    client: Client,
    base: Url,
}

impl GradesClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn with_client(client: Client, mut base: Url) -> Self {
        // `Url::join` replaces the last segment unless the path ends with a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { client, base }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // Retrieves every grade the backend knows about.
    pub async fn fetch_all(&self) -> Result<Vec<GradeRecord>, ApiError> {
        let url = self.endpoint("grades")?;
        let envelope: GradeListResponse = self.send(self.client.get(url)).await?;
        let records = envelope.into_result()?;
        info!("Fetched {} grades", records.len());
        Ok(records)
    }

    // Retrieves a single grade by id.
    pub async fn fetch_one(&self, id: i64) -> Result<GradeRecord, ApiError> {
        let url = self.endpoint(&format!("grades/{id}"))?;
        let envelope: GradeResponse = self.send(self.client.get(url)).await?;
        envelope.into_result()
    }

    // Stores a new grade and returns it as the backend saved it.
    pub async fn create(&self, request: &CreateGradeRequest) -> Result<GradeRecord, ApiError> {
        let url = self.endpoint("grades")?;
        let envelope: GradeResponse = self.send(self.client.post(url).json(request)).await?;
        let record = envelope.into_result()?;
        info!("Created grade #{} for {}", record.id, record.student_name);
        Ok(record)
    }

    // Changes the fields present in `request`; the backend keeps the rest.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateGradeRequest,
    ) -> Result<GradeRecord, ApiError> {
        let url = self.endpoint(&format!("grades/{id}"))?;
        let envelope: GradeResponse = self.send(self.client.put(url).json(request)).await?;
        let record = envelope.into_result()?;
        info!("Updated grade #{}", record.id);
        Ok(record)
    }

    /// The health endpoint answers with a bare `{status, database}` object, not an envelope.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = self.endpoint("health")?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<HealthStatus>(&body) {
            Ok(health) => Ok(health),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(ApiError::Decode(e)),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    // Error statuses still carry an envelope (404 and 500 both answer `{success: false, error}`),
    // so the body is decoded before the status is looked at.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!("Grades backend unreachable: {}", e);
            ApiError::Transport(e)
        })?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        let body = response.text().await?;
        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                warn!("Backend answered {} without an envelope", status);
                Err(ApiError::Status {
                    status: status.as_u16(),
                })
            }
            Err(e) => Err(ApiError::Decode(e)),
        }
    }
}
