//! Reborn doll catalogue
//!
//! A fixed list shipped with the binary. Each item carries the weight and
//! height an order for it is placed with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Height, Weight};
use crate::LogisticsError;

const EMBEDDED: &str = include_str!("../../resources/catalog.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub accessories: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub height_cm: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog { items: Vec<CatalogItem> }

impl Catalog {
    /// The catalogue compiled into the binary.
    pub fn embedded() -> Result<Self, LogisticsError> { Self::from_json(EMBEDDED) }

    /// Parses a catalogue, rejecting items whose measures an order would refuse.
    pub fn from_json(raw: &str) -> Result<Self, LogisticsError> {
        let items: Vec<CatalogItem> = serde_json::from_str(raw)
            .map_err(|e| LogisticsError::Internal(format!("catalogue is not valid JSON: {}", e)))?;
        for item in &items {
            Weight::new(item.weight_kg).map_err(|e| LogisticsError::Internal(format!("catalogue item {}: {}", item.id, e)))?;
            Height::new(item.height_cm).map_err(|e| LogisticsError::Internal(format!("catalogue item {}: {}", item.id, e)))?;
        }
        tracing::debug!(items = items.len(), "Catalogue loaded");
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CatalogItem] { &self.items }

    pub fn find(&self, id: &str) -> Result<&CatalogItem, LogisticsError> {
        let id = id.trim();
        self.items.iter().find(|item| item.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| LogisticsError::NotFound(format!("Catalogue item {} not found", id)))
    }
}
