//! Remote collaborators: the sensor gateway and the prediction service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{multipart::Form, Client, Response};
use serde::de::DeserializeOwned;
use shared::protocol::{GatewayResponse, PortListResponse, SerialPortInfo, ServiceStatus};
use tracing::{debug, info};

use crate::{error::PipelineError, inputs::CropInputs};

#[async_trait]
pub trait SensorGateway: Send + Sync {
    async fn read_sensor(&self) -> Result<GatewayResponse, PipelineError>;
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Returns the raw JSON reply; shape checks belong to the caller.
    async fn predict_crop(&self, inputs: &CropInputs)
        -> Result<serde_json::Value, PipelineError>;
}

/// Both collaborators over HTTP, sharing one base URL and timeout.
pub struct HttpCollaborators {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCollaborators {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/` liveness probe.
    pub async fn service_status(&self) -> Result<ServiceStatus, PipelineError> {
        let response = self.get("/").await?;
        decode_json(response, "service status").await
    }

    /// `GET {base}/list_ports`: serial ports visible to the gateway host.
    pub async fn list_ports(&self) -> Result<Vec<SerialPortInfo>, PipelineError> {
        let response = self.get("/list_ports").await?;
        let body: PortListResponse = decode_json(response, "port list").await?;
        if !body.success {
            return Err(PipelineError::Upstream(
                body.error
                    .unwrap_or_else(|| "gateway could not list serial ports".to_string()),
            ));
        }
        Ok(body.ports)
    }

    async fn get(&self, path: &str) -> Result<Response, PipelineError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "http: GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        reject_error_status(response).await
    }

    fn transport_error(&self, err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            return PipelineError::network(format!(
                "request timed out after {}s: {err}",
                self.timeout.as_secs_f64()
            ));
        }
        PipelineError::network(err.to_string())
    }
}

#[async_trait]
impl SensorGateway for HttpCollaborators {
    async fn read_sensor(&self) -> Result<GatewayResponse, PipelineError> {
        let response = self.get("/test_sensor").await?;
        decode_json(response, "sensor gateway").await
    }
}

#[async_trait]
impl PredictionService for HttpCollaborators {
    async fn predict_crop(
        &self,
        inputs: &CropInputs,
    ) -> Result<serde_json::Value, PipelineError> {
        let url = format!("{}/predict", self.base_url);
        let form = inputs
            .fields()
            .fold(Form::new().percent_encode_noop(), |form, (key, value)| {
                form.text(key.to_string(), value.to_string())
            });
        info!(%url, fields = inputs.len(), "http: POST prediction form");
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let response = reject_error_status(response).await?;
        decode_json(response, "prediction service").await
    }
}

/// Turns a non-2xx reply into a network error that keeps status and body.
async fn reject_error_status(response: Response) -> Result<Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = if text.is_empty() {
        None
    } else {
        Some(
            serde_json::from_str(&text).unwrap_or_else(|_| serde_json::Value::String(text)),
        )
    };
    Err(PipelineError::Network {
        message: format!("Request failed with status code {}", status.as_u16()),
        status: Some(status.as_u16()),
        body,
    })
}

async fn decode_json<T: DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T, PipelineError> {
    let text = response
        .text()
        .await
        .map_err(|err| PipelineError::network(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| {
        PipelineError::MalformedResponse(format!("{what} returned an unreadable payload: {err}"))
    })
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
