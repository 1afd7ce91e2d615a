//! Google Distance Matrix client.

use async_trait::async_trait;
use serde::Deserialize;

use super::{DistanceError, DistanceProvider, RouteDistance};
use crate::utils::{retry_transient, RetryOutcome, RetryPolicy};

pub const DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Driving distances from the Distance Matrix API (metric units, `pt-BR`).
pub struct GoogleDistanceMatrix {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
    retry: RetryPolicy,
}

impl GoogleDistanceMatrix {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, retry: RetryPolicy) -> Self {
        Self { client, api_key: api_key.into(), base_url: DISTANCE_MATRIX_URL.to_string(), language: "pt-BR".to_string(), retry }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self { self.base_url = base_url.into(); self }

    async fn request(&self, origin: &str, destination: &str) -> Result<RouteDistance, DistanceError> {
        let response = self.client
            .get(&self.base_url)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("units", "metric"),
                ("mode", "driving"),
                ("language", self.language.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DistanceError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DistanceError::Transport(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(DistanceError::InvalidResponse(format!("HTTP {}", status)));
        }

        let matrix: DistanceMatrixResponse = response.json().await
            .map_err(|e| DistanceError::InvalidResponse(e.without_url().to_string()))?;
        interpret(matrix)
    }
}

#[async_trait]
impl DistanceProvider for GoogleDistanceMatrix {
    async fn distance(&self, origin: &str, destination: &str) -> Result<RouteDistance, DistanceError> {
        tracing::info!(origin, destination, "Requesting driving distance");
        match retry_transient(&self.retry, "distance_matrix", |_| self.request(origin, destination)).await {
            RetryOutcome::Success(route) => {
                tracing::info!(distance_m = route.distance_meters, duration_s = route.duration_seconds, "Driving distance resolved");
                Ok(route)
            }
            RetryOutcome::Exhausted(e) | RetryOutcome::Permanent(e) => {
                tracing::error!(error = %e, "Distance Matrix lookup failed");
                Err(e)
            }
            RetryOutcome::TimedOut => Err(DistanceError::Interrupted),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    pub distance: Option<MatrixValue>,
    pub duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
pub struct MatrixValue {
    pub value: u64,
}

/// Maps a Distance Matrix payload onto the first origin/destination pair.
pub fn interpret(matrix: DistanceMatrixResponse) -> Result<RouteDistance, DistanceError> {
    match matrix.status.as_str() {
        "OK" => {}
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => return Err(DistanceError::Transport(matrix.status)),
        other => {
            let detail = matrix.error_message.unwrap_or_default();
            return Err(DistanceError::InvalidResponse(format!("{} {}", other, detail).trim_end().to_string()));
        }
    }

    let element = matrix.rows.into_iter().next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| DistanceError::InvalidResponse("empty distance matrix".to_string()))?;

    match element.status.as_str() {
        "OK" => {}
        "NOT_FOUND" => return Err(DistanceError::AddressNotFound("origin or destination could not be geocoded".to_string())),
        "ZERO_RESULTS" => return Err(DistanceError::NoRoute),
        other => return Err(DistanceError::InvalidResponse(format!("element status {}", other))),
    }

    let (Some(distance), Some(duration)) = (element.distance, element.duration) else {
        return Err(DistanceError::InvalidResponse("element without distance or duration".to_string()));
    };

    Ok(RouteDistance {
        distance_meters: distance.value,
        duration_seconds: duration.value,
        origin_address: matrix.origin_addresses.into_iter().next().unwrap_or_default(),
        destination_address: matrix.destination_addresses.into_iter().next().unwrap_or_default(),
    })
}
