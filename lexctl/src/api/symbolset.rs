//! Symbol set editing

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, Result};

use super::{error_for_status, AdminApi};

/// Symbol categories offered by the admin forms, grouped as
/// `(category, subcategories)`. The server is the authority; unknown
/// categories round-trip untouched.
pub const SYMBOL_CATEGORIES: &[(&str, &[&str])] = &[
    ("Phoneme", &["Syllabic", "NonSyllabic", "Stress"]),
    (
        "Delimiter",
        &[
            "PhonemeDelimiter",
            "SyllableDelimiter",
            "MorphemeDelimiter",
            "WordDelimiter",
        ],
    ),
];

/// One row of a lexicon's symbol set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Lexicon the symbol belongs to
    #[serde(rename = "lexiconId")]
    pub lexicon_id: i64,
    /// The symbol itself, in the lexicon's transcription alphabet
    pub symbol: String,
    /// Category string; see [`SYMBOL_CATEGORIES`]
    pub category: String,
    /// Free-text description
    pub description: String,
    /// IPA rendering of the symbol
    pub ipa: String,
}

/// Wire shape of the symbol set name listing.
#[derive(Debug, Deserialize)]
struct SymbolSetNames {
    #[serde(rename = "SymbolSetNames")]
    symbol_set_names: Vec<String>,
}

impl AdminApi {
    /// Names of all symbol sets the server can import against.
    pub async fn list_symbol_set_names(&self) -> Result<Vec<String>> {
        let names: SymbolSetNames = self.get_json("/symbolset/list", &[]).await?;
        Ok(names.symbol_set_names)
    }

    /// Symbol set rows for one lexicon.
    pub async fn list_symbol_set(&self, lexicon_id: i64) -> Result<Vec<Symbol>> {
        self.get_json(
            "/admin/listsymbolset",
            &[("lexiconId", lexicon_id.to_string())],
        )
        .await
    }

    /// Replace a lexicon's symbol set with `symbols`.
    pub async fn save_symbol_set(&self, symbols: &[Symbol]) -> Result<()> {
        let response = self
            .http()
            .post(self.url("/admin/savesymbolset"))
            .json(symbols)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        error_for_status(response).await?;
        info!("Saved symbol set ({} symbols)", symbols.len());
        Ok(())
    }
}
