// src/table.rs

use crate::error::{Error, Result};
use crate::heuristics::{OrderHeader, OrderItem};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column names, in export order.
pub const COLUMNS: [&str; 11] = [
    "Pedido",
    "Cliente",
    "Cidade",
    "UF",
    "Data_inclusao",
    "Previsao_faturamento",
    "Obs_expedicao",
    "Quantidade",
    "Unid",
    "Codigo",
    "Descricao",
];

/// One item joined with the header of the page it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Pedido")]
    pub order_number: String,
    #[serde(rename = "Cliente")]
    pub client: String,
    #[serde(rename = "Cidade")]
    pub city: String,
    #[serde(rename = "UF")]
    pub state: String,
    #[serde(rename = "Data_inclusao")]
    pub inclusion_timestamp: String,
    #[serde(rename = "Previsao_faturamento")]
    pub billing_forecast_date: String,
    #[serde(rename = "Obs_expedicao")]
    pub observation: String,
    #[serde(rename = "Quantidade")]
    pub quantity: f64,
    #[serde(rename = "Unid")]
    pub unit: String,
    #[serde(rename = "Codigo")]
    pub code: String,
    #[serde(rename = "Descricao")]
    pub description: String,
}

impl ResultRow {
    pub fn new(header: &OrderHeader, item: OrderItem) -> Self {
        Self {
            order_number: header.order_number.clone(),
            client: header.client.clone(),
            city: header.city.clone(),
            state: header.state.clone(),
            inclusion_timestamp: header.inclusion_timestamp.clone(),
            billing_forecast_date: header.billing_forecast_date.clone(),
            observation: header.observation.clone(),
            quantity: item.quantity,
            unit: item.unit,
            code: item.code,
            description: item.description,
        }
    }

    /// The header half of the row.
    pub fn header(&self) -> OrderHeader {
        OrderHeader {
            order_number: self.order_number.clone(),
            client: self.client.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            inclusion_timestamp: self.inclusion_timestamp.clone(),
            billing_forecast_date: self.billing_forecast_date.clone(),
            observation: self.observation.clone(),
        }
    }
}

/// Ordered rows: page order, then line order within the page.
///
/// An empty table is the "nothing recognized" outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    /// Append one row per item, all sharing `header`.
    pub fn extend_page(&mut self, header: &OrderHeader, items: Vec<OrderItem>) {
        self.rows
            .extend(items.into_iter().map(|item| ResultRow::new(header, item)));
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&ResultRow> {
        self.rows.first()
    }

    /// CSV export: UTF-8 with BOM, header row included.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(UTF8_BOM.to_vec());
        if self.rows.is_empty() {
            wtr.write_record(COLUMNS)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    /// Inverse of [`ResultTable::to_csv`]. A leading BOM is optional.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let mut rdr = csv::Reader::from_reader(data);
        let rows = rdr
            .deserialize::<ResultRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_csv()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Io(e.into()))
    }
}

impl FromIterator<ResultRow> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        let header = OrderHeader {
            order_number: "555".into(),
            client: "ACME, \"DOCES\" LTDA".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            inclusion_timestamp: "05/03/2024 14:22:10".into(),
            billing_forecast_date: "08/03/2024".into(),
            observation: String::new(),
        };
        let mut table = ResultTable::new();
        table.extend_page(
            &header,
            vec![
                OrderItem {
                    quantity: 1234.5,
                    unit: "CX".into(),
                    code: "AB-12/3".into(),
                    description: "PAPEL MANTEIGA 30X40".into(),
                },
                OrderItem {
                    quantity: 10.0,
                    unit: "UN".into(),
                    code: "COD1".into(),
                    description: "CAIXA, TAMPA E FUNDO".into(),
                },
            ],
        );
        table.extend_page(
            &OrderHeader::default(),
            vec![OrderItem {
                quantity: 0.25,
                unit: "KG".into(),
                code: "X9".into(),
                description: "FITA".into(),
            }],
        );
        table
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let csv = sample().to_csv().unwrap();
        assert!(csv.starts_with(UTF8_BOM));
        let text = String::from_utf8(csv[3..].to_vec()).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, COLUMNS.join(","));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_csv_round_trip() {
        let table = sample();
        let back = ResultTable::from_csv(&table.to_csv().unwrap()).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back, table);
    }

    #[test]
    fn test_empty_table_csv_has_header_only() {
        let csv = ResultTable::new().to_csv().unwrap();
        let back = ResultTable::from_csv(&csv).unwrap();
        assert!(back.is_empty());
        assert_eq!(String::from_utf8_lossy(&csv[3..]).trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_from_csv_without_bom() {
        let data = format!("{}\n555,ACME,,,,,,2.5,UN,C1,DESC\n", COLUMNS.join(","));
        let table = ResultTable::from_csv(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].quantity, 2.5);
        assert_eq!(table.rows()[0].client, "ACME");
        assert_eq!(table.rows()[0].city, "");
    }

    #[test]
    fn test_row_header_split() {
        let table = sample();
        assert_eq!(table.rows()[0].header().order_number, "555");
        assert_eq!(table.rows()[2].header(), OrderHeader::default());
    }

    #[test]
    fn test_json_uses_column_names() {
        let json = sample().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["Pedido"], "555");
        assert_eq!(value[2]["Codigo"], "X9");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expedicao.csv");
        sample().write_csv(&path).unwrap();
        let back = ResultTable::from_csv(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(back.len(), 3);
    }
}
