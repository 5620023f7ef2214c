//! Session identity generation
//!
//! A session identifier correlates one client session with the push
//! notifications the server emits for jobs submitted under it. The server
//! treats the value as opaque; the textual form follows the RFC 4122 v4
//! layout so identifiers stay recognizable in server logs.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{Error, Result};

/// Template for the generated identifier. `x` and `y` positions are filled
/// from the entropy mix; everything else is copied through.
const PATTERN: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

/// Opaque per-session correlation token.
///
/// Generated once per session and immutable afterwards. Not persisted
/// anywhere; a new session gets a new identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh identifier.
    ///
    /// Folds the wall clock and a sub-millisecond sample into a decaying
    /// seed and mixes a random nibble into every output character, so two
    /// identifiers generated in the same process differ with overwhelming
    /// probability. Always succeeds; no side effects.
    pub fn generate() -> SessionId {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        // The wall clock alone repeats within a burst of calls; the
        // sub-millisecond bits keep consecutive seeds apart.
        let mut seed: i64 =
            now.timestamp_millis() + (now.timestamp_subsec_nanos() % 1_000_000) as i64;

        let mut out = String::with_capacity(PATTERN.len());
        for c in PATTERN.chars() {
            match c {
                'x' | 'y' => {
                    let r = ((seed + rng.gen_range(0..16)) % 16) as u8;
                    seed /= 16;
                    let nibble = if c == 'x' { r } else { (r & 0x3) | 0x8 };
                    out.push(char::from_digit(nibble as u32, 16).unwrap_or('0'));
                }
                literal => out.push(literal),
            }
        }
        SessionId(out)
    }

    /// Validate and wrap an identifier arriving from outside (config, CLI).
    pub fn parse(s: &str) -> Result<SessionId> {
        Uuid::parse_str(s)
            .map_err(|e| Error::InvalidInput(format!("bad session identifier '{}': {}", s, e)))?;
        Ok(SessionId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
