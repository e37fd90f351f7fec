//! HTTP Client
//!
//! Thin client for the prediction service. Each call is a single request
//! with no retry; the JSON body of a 200 response is returned as-is.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::inference::{CropQuery, FertilizerQuery, WelcomeMessage};
use crate::server::routes::health::HealthResponse;
use crate::server::routes::soil::FILE_FIELD;

/// Default service URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Soil types offered by the fertilizer form
pub const SOIL_TYPES: [&str; 5] = ["Loamy", "Sandy", "Clayey", "Black", "Red"];

/// Crop types offered by the fertilizer form
pub const CROP_TYPES: [&str; 11] = [
    "Sugarcane",
    "Cotton",
    "Millets",
    "Pulses",
    "Paddy",
    "Wheat",
    "Barley",
    "Oil seeds",
    "Tobacco",
    "Ground Nuts",
    "Maize",
];

/// Client-side failure
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// The service answered with a non-200 status
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Status code of a non-200 answer
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Prediction API client
#[derive(Debug, Clone)]
pub struct AgriClient {
    base_url: String,
    client: reqwest::Client,
}

impl AgriClient {
    /// Create a new client for `url`
    pub fn new(url: &str) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Get the base URL
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Check if the server is healthy
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(format!("{}/health", self.base_url)).send().await?;
        let body = Self::ok_json(response).await?;
        serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Fetch the welcome message
    pub async fn welcome(&self) -> Result<WelcomeMessage, ClientError> {
        let response = self.client.get(format!("{}/", self.base_url)).send().await?;
        let body = Self::ok_json(response).await?;
        serde_json::from_value(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// POST /prediction
    pub async fn predict_crop(&self, query: &CropQuery) -> Result<Value, ClientError> {
        self.post_json("prediction", query).await
    }

    /// POST /fertilizerReccommendation
    pub async fn recommend_fertilizer(&self, query: &FertilizerQuery) -> Result<Value, ClientError> {
        self.post_json("fertilizerReccommendation", query).await
    }

    /// POST /soil_classification with the image in the `file` field
    pub async fn classify_soil(&self, image: Vec<u8>, file_name: &str) -> Result<Value, ClientError> {
        let form = Form::new().part(FILE_FIELD, Part::bytes(image).file_name(file_name.to_string()));

        let response = self
            .client
            .post(format!("{}/soil_classification", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::ok_json(response).await
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::ok_json(response).await
    }

    async fn ok_json(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
