use std::str::FromStr;

use nostr_sdk::nostr::prelude::*;

use crate::error::{Error, Result};

/// Public key in both of its textual forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeys {
    pub hex: String,
    pub npub: String,
}

impl PublicKeys {
    /// Accepts either `npub1…` or hex.
    pub fn parse(hex_or_npub: &str) -> Result<PublicKeys> {
        let key = if hex_or_npub.starts_with("npub1") {
            XOnlyPublicKey::from_bech32(hex_or_npub)
                .map_err(|e| Error::InvalidKey(format!("{hex_or_npub}: {e}")))?
        } else {
            XOnlyPublicKey::from_str(hex_or_npub)
                .map_err(|e| Error::InvalidKey(format!("{hex_or_npub}: {e}")))?
        };

        Self::from_key(&key)
    }

    pub fn from_key(key: &XOnlyPublicKey) -> Result<PublicKeys> {
        Ok(PublicKeys {
            hex: key.to_string(),
            npub: key
                .to_bech32()
                .map_err(|e| Error::InvalidKey(e.to_string()))?,
        })
    }

    pub fn key(&self) -> Result<XOnlyPublicKey> {
        XOnlyPublicKey::from_str(&self.hex).map_err(|e| Error::InvalidKey(e.to_string()))
    }
}

/// Note ID in both of its textual forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteIds {
    pub hex: String,
    pub bech32: String,
}

impl NoteIds {
    /// Accepts either `note1…` or hex.
    pub fn parse(hex_or_note: &str) -> Result<NoteIds> {
        let id = if hex_or_note.starts_with("note1") {
            EventId::from_bech32(hex_or_note)
                .map_err(|e| Error::InvalidKey(format!("{hex_or_note}: {e}")))?
        } else {
            EventId::from_hex(hex_or_note)
                .map_err(|e| Error::InvalidKey(format!("{hex_or_note}: {e}")))?
        };

        Ok(NoteIds {
            hex: id.to_hex(),
            bech32: id.to_bech32().map_err(|e| Error::InvalidKey(e.to_string()))?,
        })
    }
}

/// Shortens a key to its first and last 12 characters.
pub fn abbreviate_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 24 {
        return key.to_string();
    }

    let head: String = chars[..12].iter().collect();
    let tail: String = chars[chars.len() - 12..].iter().collect();
    format!("{head}...{tail}")
}
