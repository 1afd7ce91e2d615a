//! ViaCEP postal-code lookup.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::{AddressLookup, ResolvedAddress};
use crate::domain::value_objects::{FederativeUnit, PostalCode};
use crate::utils::{retry_transient, IsTransient, RetryOutcome, RetryPolicy};

pub const VIACEP_URL: &str = "https://viacep.com.br/ws";

pub struct ViaCep {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Error)]
enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("postal code not found")]
    NotFound,
    #[error("unusable response: {0}")]
    Invalid(String),
}

impl IsTransient for LookupError {
    fn is_transient(&self) -> bool { matches!(self, Self::Transport(_)) }
}

impl ViaCep {
    pub fn new(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, base_url: VIACEP_URL.to_string(), retry }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self { self.base_url = base_url.into(); self }

    async fn fetch(&self, postal_code: &PostalCode) -> Result<ResolvedAddress, LookupError> {
        let url = format!("{}/{}/json/", self.base_url.trim_end_matches('/'), postal_code.digits());
        let response = self.client.get(&url).send().await.map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() { return Err(LookupError::Transport(format!("HTTP {}", status))); }
        // ViaCEP answers 400 for malformed codes
        if !status.is_success() { return Err(LookupError::NotFound); }

        let payload: ViaCepPayload = response.json().await.map_err(|e| LookupError::Invalid(e.to_string()))?;
        payload.into_resolved()
    }
}

#[async_trait]
impl AddressLookup for ViaCep {
    async fn lookup(&self, postal_code: &PostalCode) -> Option<ResolvedAddress> {
        tracing::info!(postal_code = %postal_code, "Looking up postal code");
        match retry_transient(&self.retry, "viacep", |_| self.fetch(postal_code)).await {
            RetryOutcome::Success(address) => {
                tracing::info!(postal_code = %postal_code, street = %address.street, city = %address.city, state = %address.state, "Postal code resolved");
                Some(address)
            }
            RetryOutcome::Permanent(LookupError::NotFound) => {
                tracing::warn!(postal_code = %postal_code, "Postal code not found");
                None
            }
            RetryOutcome::Exhausted(e) | RetryOutcome::Permanent(e) => {
                tracing::error!(postal_code = %postal_code, error = %e, "Postal code lookup failed");
                None
            }
            RetryOutcome::TimedOut => {
                tracing::error!(postal_code = %postal_code, "Postal code lookup timed out");
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ViaCepPayload {
    cep: Option<String>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    ddd: Option<String>,
    // `true` or `"true"` depending on the endpoint version
    erro: Option<serde_json::Value>,
}

impl ViaCepPayload {
    fn is_error(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    fn into_resolved(self) -> Result<ResolvedAddress, LookupError> {
        if self.is_error() { return Err(LookupError::NotFound); }
        let postal_code = self.cep.as_deref().map(PostalCode::parse).transpose()
            .map_err(|e| LookupError::Invalid(e.to_string()))?
            .ok_or_else(|| LookupError::Invalid("missing cep".to_string()))?;
        let state: FederativeUnit = self.uf.as_deref().unwrap_or_default().parse()
            .map_err(|e: crate::domain::value_objects::ValueError| LookupError::Invalid(e.to_string()))?;
        let city = non_empty(self.localidade).ok_or_else(|| LookupError::Invalid("missing city".to_string()))?;
        Ok(ResolvedAddress {
            postal_code,
            street: self.logradouro.unwrap_or_default().trim().to_string(),
            neighborhood: self.bairro.unwrap_or_default().trim().to_string(),
            city,
            state,
            area_code: non_empty(self.ddd),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
