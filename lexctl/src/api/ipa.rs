//! IPA reference table
//!
//! The server publishes its IPA table as a tab-separated text file; the
//! admin console shows it next to the symbol set editor. The glyph sits in
//! the second column, its description in the fifth.

use std::collections::HashMap;

use crate::error::{ClientError, Result};

use super::{error_for_status, AdminApi};

const IPA_TABLE_PATH: &str = "/ipa_table.txt";

/// One row of the IPA reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpaSymbol {
    pub glyph: String,
    pub description: String,
}

/// Parsed IPA reference table with glyph lookup.
#[derive(Debug, Clone, Default)]
pub struct IpaTable {
    symbols: Vec<IpaSymbol>,
    by_glyph: HashMap<String, usize>,
}

impl IpaTable {
    /// Parse the raw tab-separated table. Lines without enough columns are
    /// skipped; when a glyph appears twice, the later row wins the lookup
    /// slot while the listing keeps both.
    pub fn parse(raw: &str) -> IpaTable {
        let mut table = IpaTable::default();
        for line in raw.lines() {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                continue;
            }
            let glyph = fields[1].trim();
            if glyph.is_empty() {
                continue;
            }
            table.by_glyph.insert(glyph.to_string(), table.symbols.len());
            table.symbols.push(IpaSymbol {
                glyph: glyph.to_string(),
                description: fields[4].trim().to_string(),
            });
        }
        table
    }

    /// All rows in file order.
    pub fn symbols(&self) -> &[IpaSymbol] {
        &self.symbols
    }

    /// Description for a glyph, if the table has it.
    pub fn description(&self, glyph: &str) -> Option<&str> {
        self.by_glyph
            .get(glyph)
            .map(|&i| self.symbols[i].description.as_str())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl AdminApi {
    /// Fetch and parse the server's IPA reference table.
    pub async fn fetch_ipa_table(&self) -> Result<IpaTable> {
        let response = self
            .http()
            .get(self.url(IPA_TABLE_PATH))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let response = error_for_status(response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(IpaTable::parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\tp\tplosive\tpulmonic\tvoiceless bilabial plosive\n\
2\tb\tplosive\tpulmonic\tvoiced bilabial plosive\n\
malformed line without tabs\n\
3\t\tplosive\tpulmonic\tmissing glyph\n\
4\tp\tplosive\tpulmonic\toverriding description\n";

    #[test]
    fn test_parse_keeps_well_formed_rows() {
        let table = IpaTable::parse(SAMPLE);
        assert_eq!(table.len(), 3);
        assert_eq!(table.symbols()[0].glyph, "p");
        assert_eq!(table.symbols()[1].description, "voiced bilabial plosive");
    }

    #[test]
    fn test_parse_skips_malformed_and_empty_glyph_lines() {
        let table = IpaTable::parse(SAMPLE);
        assert!(table.symbols().iter().all(|s| !s.glyph.is_empty()));
        assert!(table.description("malformed").is_none());
    }

    #[test]
    fn test_duplicate_glyph_later_row_wins_lookup() {
        let table = IpaTable::parse(SAMPLE);
        assert_eq!(table.description("p"), Some("overriding description"));
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let table = IpaTable::parse("");
        assert!(table.is_empty());
        assert!(table.description("p").is_none());
    }
}
