//! Lexicon reference management

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

use super::AdminApi;

/// One lexicon reference as the server serializes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Server-assigned id; 0 for a lexicon not yet saved
    pub id: i64,
    /// Lexicon name
    pub name: String,
    /// Name of the symbol set the lexicon's transcriptions use
    #[serde(rename = "symbolSetName")]
    pub symbol_set_name: String,
}

impl Lexicon {
    /// A lexicon reference that does not exist on the server yet.
    pub fn new(name: &str, symbol_set_name: &str) -> Lexicon {
        Lexicon {
            id: 0,
            name: name.to_string(),
            symbol_set_name: symbol_set_name.to_string(),
        }
    }
}

impl AdminApi {
    /// Fetch all lexicon references known to the server.
    pub async fn list_lexicons(&self) -> Result<Vec<Lexicon>> {
        self.get_json("/lexicon/list", &[]).await
    }

    /// Create or update a lexicon reference. The server answers with the
    /// stored version, with a fresh id on create.
    pub async fn insert_or_update_lexicon(&self, lexicon: &Lexicon) -> Result<Lexicon> {
        let query = [
            ("id", lexicon.id.to_string()),
            ("name", lexicon.name.clone()),
            ("symbolsetname", lexicon.symbol_set_name.clone()),
        ];
        let stored: Lexicon = self.get_json("/admin/insertorupdatelexicon", &query).await?;
        info!("Saved lexicon '{}' (id {})", stored.name, stored.id);
        Ok(stored)
    }

    /// Delete a lexicon reference without touching its entries.
    pub async fn delete_lexicon(&self, id: i64) -> Result<()> {
        self.get_text("/admin/deletelexicon", &[("id", id.to_string())])
            .await?;
        info!("Deleted lexicon {}", id);
        Ok(())
    }
}
