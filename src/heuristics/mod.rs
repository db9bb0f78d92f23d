// src/heuristics/mod.rs

mod header;
mod items;

pub use header::HeaderRules;
pub use items::{ItemRules, parse_quantity};

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// Order metadata found on one page. Unmatched fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub order_number: String,
    pub client: String,
    pub city: String,
    pub state: String,
    pub inclusion_timestamp: String,
    pub billing_forecast_date: String,
    pub observation: String,
}

impl OrderHeader {
    /// How many fields were successfully extracted.
    pub fn coverage(&self) -> (usize, usize) {
        let total = 7;
        let filled = [
            &self.order_number,
            &self.client,
            &self.city,
            &self.state,
            &self.inclusion_timestamp,
            &self.billing_forecast_date,
            &self.observation,
        ]
        .iter()
        .filter(|v| !v.is_empty())
        .count();
        (filled, total)
    }
}

/// A single line of the order items section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub quantity: f64,
    pub unit: String,
    pub code: String,
    pub description: String,
}

/// The full rule set for one document: header rules plus the items rules.
#[derive(Debug)]
pub struct Heuristics {
    header: HeaderRules,
    items: ItemRules,
}

impl Heuristics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: HeaderRules::new()?,
            items: ItemRules::new()?,
        })
    }

    /// Extract the order header from (already masked) page text.
    pub fn extract_header(&self, text: &str) -> OrderHeader {
        self.header.extract(text)
    }

    /// Extract the order items from (already masked) page text.
    pub fn extract_items(&self, text: &str) -> Vec<OrderItem> {
        self.items.extract(text)
    }
}

fn compile(rule: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::Pattern { rule, source })
}
