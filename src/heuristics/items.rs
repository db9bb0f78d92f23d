// src/heuristics/items.rs

use super::{OrderItem, compile};
use crate::error::Result;
use regex::Regex;

/// Patterns for the "Itens do Pedido de Venda" section and its lines.
#[derive(Debug)]
pub struct ItemRules {
    section: Regex,
    line: Regex,
}

impl ItemRules {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Section runs until "Outras Informações" or the end of the page.
            section: compile(
                "items_section",
                r"(?is)Itens do Pedido de Venda(.*?)(?:Outras Informa[cç][oõ]es|$)",
            )?,
            // e.g. "200,00 UN CXT007 CAIXA 100 DOCES/SALGADOS"
            line: compile(
                "item_line",
                r"^([\d.,]+)\s+([A-Za-z]+)\s+([A-Z0-9\-/]+)\s+(.+)$",
            )?,
        })
    }

    pub fn extract(&self, text: &str) -> Vec<OrderItem> {
        let Some(section) = self.section.captures(text).and_then(|c| c.get(1)) else {
            return Vec::new();
        };

        section
            .as_str()
            .lines()
            .map(str::trim)
            .filter(|ln| !ln.is_empty())
            .filter_map(|ln| self.parse_line(ln))
            .collect()
    }

    fn parse_line(&self, line: &str) -> Option<OrderItem> {
        let cap = self.line.captures(line)?;
        Some(OrderItem {
            quantity: parse_quantity(&cap[1])?,
            unit: cap[2].to_uppercase(),
            code: cap[3].trim().to_string(),
            description: cap[4].trim().to_string(),
        })
    }
}

/// Parse a pt-BR formatted number: `.` groups thousands, `,` marks decimals.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    raw.replace('.', "").replace(',', ".").parse::<f64>().ok()
}
