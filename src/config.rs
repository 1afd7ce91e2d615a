//! Environment-driven configuration.
//!
//! `.env` is honoured through `dotenvy` in `main`; every value has a default
//! so a bare environment starts a working service against the in-memory store.

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::domain::value_objects::{Address, CustomerRef, FederativeUnit, PostalCode, ValueError};
use crate::integrations::HttpTimeouts;
use crate::utils::RetryPolicy;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ORIGIN_POSTAL_CODE: &str = "13801-005";
const DEFAULT_ORIGIN_NUMBER: &str = "567";
const DEFAULT_ORIGIN_STREET: &str = "Rua Ariovaldo Silveira Franco";
const DEFAULT_ORIGIN_NEIGHBORHOOD: &str = "Jardim 31 de Março";
const DEFAULT_ORIGIN_CITY: &str = "Mogi Mirim";
const DEFAULT_ORIGIN_STATE: &str = "SP";
const DEFAULT_CUSTOMER_NAME: &str = "Jailson Mendes";
const DEFAULT_CUSTOMER_EMAIL: &str = "jailsonmmm@gmail.com";
const DEFAULT_CUSTOMER_PHONE: &str = "11976543211";
const DEFAULT_CUSTOMER_CPF: &str = "123.123.128-09";
const DEFAULT_TRACKING_CODE_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}: {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
    #[error("{key}: {source}")]
    Value { key: &'static str, #[source] source: ValueError },
}

/// Where parcels ship from. The postal code is resolved on every order; the
/// fallback address is used when that lookup fails.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginConfig {
    pub postal_code: PostalCode,
    pub number: Option<String>,
    pub fallback: Address,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSettings {
    pub origin: OriginConfig,
    /// Customer attached to orders that do not name one.
    pub default_customer: CustomerRef,
    /// Inserts attempted with a fresh tracking code before giving up on collisions.
    pub tracking_code_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub nats_url: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub viacep_url: Option<String>,
    pub http: HttpTimeouts,
    pub retry: RetryPolicy,
    pub orders: OrderSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let text = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let origin_postal_code = postal_code("ORIGIN_POSTAL_CODE", &text("ORIGIN_POSTAL_CODE", DEFAULT_ORIGIN_POSTAL_CODE))?;
        let origin_number = text("ORIGIN_NUMBER", DEFAULT_ORIGIN_NUMBER);
        let fallback_postal_code = match get("FALLBACK_ORIGIN_POSTAL_CODE") {
            Some(raw) => postal_code("FALLBACK_ORIGIN_POSTAL_CODE", &raw)?,
            None => origin_postal_code.clone(),
        };
        let fallback_state: FederativeUnit = parse("FALLBACK_ORIGIN_STATE", text("FALLBACK_ORIGIN_STATE", DEFAULT_ORIGIN_STATE))?;
        let fallback = Address::new(
            fallback_postal_code,
            text("FALLBACK_ORIGIN_STREET", DEFAULT_ORIGIN_STREET),
            Some(text("FALLBACK_ORIGIN_NUMBER", &origin_number)),
            text("FALLBACK_ORIGIN_NEIGHBORHOOD", DEFAULT_ORIGIN_NEIGHBORHOOD),
            text("FALLBACK_ORIGIN_CITY", DEFAULT_ORIGIN_CITY),
            fallback_state,
        );

        let default_customer = CustomerRef::new(
            text("DEFAULT_CUSTOMER_NAME", DEFAULT_CUSTOMER_NAME),
            text("DEFAULT_CUSTOMER_EMAIL", DEFAULT_CUSTOMER_EMAIL),
        ).map_err(|source| ConfigError::Value { key: "DEFAULT_CUSTOMER_NAME", source })?
        .with_contact(
            Some(text("DEFAULT_CUSTOMER_PHONE", DEFAULT_CUSTOMER_PHONE).as_str()),
            Some(text("DEFAULT_CUSTOMER_CPF", DEFAULT_CUSTOMER_CPF).as_str()),
        ).map_err(|source| {
            let key = if matches!(source, ValueError::Phone(_)) { "DEFAULT_CUSTOMER_PHONE" } else { "DEFAULT_CUSTOMER_CPF" };
            ConfigError::Value { key, source }
        })?;

        let defaults = RetryPolicy::default();
        let max_attempts: u32 = parse_or("INTEGRATION_MAX_ATTEMPTS", get("INTEGRATION_MAX_ATTEMPTS"), defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid { key: "INTEGRATION_MAX_ATTEMPTS", value: "0".into(), reason: "at least one attempt is required".into() });
        }
        let retry = RetryPolicy {
            max_attempts,
            window: seconds("INTEGRATION_RETRY_WINDOW_SECS", get("INTEGRATION_RETRY_WINDOW_SECS"), defaults.window)?,
            ..defaults
        };

        let timeouts = HttpTimeouts::default();
        let http = HttpTimeouts {
            connect: seconds("HTTP_CONNECT_TIMEOUT_SECS", get("HTTP_CONNECT_TIMEOUT_SECS"), timeouts.connect)?,
            read: seconds("HTTP_READ_TIMEOUT_SECS", get("HTTP_READ_TIMEOUT_SECS"), timeouts.read)?,
        };

        let tracking_code_attempts = parse_or("TRACKING_CODE_ATTEMPTS", get("TRACKING_CODE_ATTEMPTS"), DEFAULT_TRACKING_CODE_ATTEMPTS)?.max(1);

        Ok(Self {
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            database_url: get("DATABASE_URL"),
            nats_url: get("NATS_URL"),
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY"),
            viacep_url: get("VIACEP_URL"),
            http,
            retry,
            orders: OrderSettings {
                origin: OriginConfig { postal_code: origin_postal_code, number: Some(origin_number), fallback },
                default_customer,
                tracking_code_attempts,
            },
        })
    }
}

fn postal_code(key: &'static str, raw: &str) -> Result<PostalCode, ConfigError> {
    PostalCode::parse(raw).map_err(|source| ConfigError::Value { key, source })
}

fn parse<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid { key, value: raw.clone(), reason: e.to_string() })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|raw| parse(key, raw)).unwrap_or(Ok(default))
}

fn seconds(key: &'static str, raw: Option<String>, default: Duration) -> Result<Duration, ConfigError> {
    Ok(raw.map(|raw| parse::<u64>(key, raw)).transpose()?.map(Duration::from_secs).unwrap_or(default))
}
