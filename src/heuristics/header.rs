// src/heuristics/header.rs

use super::{OrderHeader, compile};
use crate::error::Result;
use regex::Regex;

const CLIENT_LABEL: &str = "Informações do Cliente";
/// How many lines after the client label may hold the client name.
const CLIENT_LOOKAHEAD: usize = 5;

/// Keyword-anchored patterns for the per-page order header.
#[derive(Debug)]
pub struct HeaderRules {
    order_number: Regex,
    city_state: Regex,
    inclusion: Regex,
    billing_forecast: Regex,
    observation: Regex,
}

impl HeaderRules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            order_number: compile("order_number", r"(?i)Pedido de Venda N[º°]\s*(\d+)")?,
            // City class is letters, spaces and tabs only. A `\s` class would let
            // the address line above the city run into the capture.
            city_state: compile(
                "city_state",
                r"([A-Za-zÀ-ú\t ]+)\s*-\s*([A-Z]{2})\s*-\s*CEP",
            )?,
            inclusion: compile(
                "inclusion",
                r"(?i)inclu[ií]do em:\s*([0-9/]{10})\s*às\s*([0-9:]{8})",
            )?,
            billing_forecast: compile(
                "billing_forecast",
                r"(?i)Previs[aã]o de Faturamento:\s*([0-9/]{10})",
            )?,
            observation: compile("observation", r"(?i)\bOBS[:\s]+(.+)")?,
        })
    }

    pub fn extract(&self, text: &str) -> OrderHeader {
        let (city, state) = self.city_state(text);
        OrderHeader {
            order_number: self.order_number(text),
            client: client(text),
            city,
            state,
            inclusion_timestamp: self.inclusion_timestamp(text),
            billing_forecast_date: self.billing_forecast_date(text),
            observation: self.observation(text),
        }
    }

    fn order_number(&self, text: &str) -> String {
        first_group(&self.order_number, text)
    }

    fn city_state(&self, text: &str) -> (String, String) {
        match self.city_state.captures(text) {
            Some(c) => (c[1].trim().to_string(), c[2].trim().to_string()),
            None => (String::new(), String::new()),
        }
    }

    fn inclusion_timestamp(&self, text: &str) -> String {
        self.inclusion
            .captures(text)
            .map(|c| format!("{} {}", &c[1], &c[2]))
            .unwrap_or_default()
    }

    fn billing_forecast_date(&self, text: &str) -> String {
        first_group(&self.billing_forecast, text)
    }

    fn observation(&self, text: &str) -> String {
        self.observation
            .captures(text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default()
    }
}

/// The client name is the first non-blank line below the client label.
fn client(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let Some(pos) = lines.iter().position(|ln| ln.contains(CLIENT_LABEL)) else {
        return String::new();
    };
    lines
        .iter()
        .skip(pos + 1)
        .take(CLIENT_LOOKAHEAD)
        .map(|ln| ln.trim())
        .find(|ln| !ln.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn first_group(re: &Regex, text: &str) -> String {
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}
