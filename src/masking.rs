// src/masking.rs

use crate::error::{Error, Result};
use regex::Regex;
use std::borrow::Cow;

pub const MASKED_TAX_ID: &str = "***.***.***-**";
pub const MASKED_PHONE: &str = "***-****";
pub const MASKED_EMAIL: &str = "[email oculto]";

/// One substitution: every match of `pattern` becomes `placeholder`.
#[derive(Debug)]
pub struct MaskRule {
    pub name: &'static str,
    pattern: Regex,
    placeholder: &'static str,
}

impl MaskRule {
    pub fn new(name: &'static str, pattern: &str, placeholder: &'static str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|source| Error::Pattern { rule: name, source })?;
        Ok(Self {
            name,
            pattern,
            placeholder,
        })
    }

    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, regex::NoExpand(self.placeholder))
    }
}

/// Ordered set of PII rules applied to raw page text before extraction.
#[derive(Debug)]
pub struct Masker {
    rules: Vec<MaskRule>,
}

impl Masker {
    /// The built-in rules: tax IDs (CNPJ / CPF), phone numbers, e-mail addresses.
    pub fn new() -> Result<Self> {
        Ok(Self {
            rules: vec![
                MaskRule::new(
                    "tax_id",
                    r"\b(?:\d{2,3}\.?\d{3}\.?\d{3}[/\-]?\d{4}-?\d{2}|\d{3}\.?\d{3}\.?\d{3}-?\d{2})\b",
                    MASKED_TAX_ID,
                )?,
                MaskRule::new("phone", r"\(?\+?\d{2}\)?\s?\d{4,5}-?\d{4}", MASKED_PHONE)?,
                MaskRule::new(
                    "email",
                    r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
                    MASKED_EMAIL,
                )?,
            ],
        })
    }

    pub fn rules(&self) -> &[MaskRule] {
        &self.rules
    }

    /// Apply every rule in order. Text with no matches comes back unchanged.
    pub fn mask(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc).into_owned())
    }
}
