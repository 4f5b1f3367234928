//! Identifiers: occurrence protocols and CAPA ids
//!
//! Both are `PREFIX-ULID` strings. Protocols are assigned by the store the
//! first time an occurrence is persisted and never change afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Invalid ID format: expected {prefix}-<ULID>, got '{value}'")]
    InvalidFormat { prefix: &'static str, value: String },

    #[error("Invalid ULID in '{value}': {reason}")]
    InvalidUlid { value: String, reason: String },
}

fn parse_prefixed(prefix: &'static str, s: &str) -> Result<Ulid, IdParseError> {
    let rest = s
        .strip_prefix(prefix)
        .and_then(|r| r.strip_prefix('-'))
        .ok_or_else(|| IdParseError::InvalidFormat {
            prefix,
            value: s.to_string(),
        })?;

    Ulid::from_string(rest).map_err(|e| IdParseError::InvalidUlid {
        value: s.to_string(),
        reason: e.to_string(),
    })
}

/// Human-facing occurrence identifier (`OC-<ULID>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Protocolo(Ulid);

impl Protocolo {
    pub const PREFIX: &'static str = "OC";

    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// First 8 characters of the ULID, for compact listings
    pub fn short(&self) -> String {
        let s = self.0.to_string();
        format!("{}-{}", Self::PREFIX, &s[..8])
    }
}

impl Default for Protocolo {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Protocolo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::PREFIX, self.0)
    }
}

impl FromStr for Protocolo {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(Self::PREFIX, s.trim()).map(Self)
    }
}

impl TryFrom<String> for Protocolo {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Protocolo> for String {
    fn from(id: Protocolo) -> Self {
        id.to_string()
    }
}

/// Identifier of a corrective/preventive action (`CAPA-<ULID>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapaId(Ulid);

impl CapaId {
    pub const PREFIX: &'static str = "CAPA";

    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CapaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CapaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", Self::PREFIX, self.0)
    }
}

impl FromStr for CapaId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_prefixed(Self::PREFIX, s.trim()).map(Self)
    }
}

impl TryFrom<String> for CapaId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CapaId> for String {
    fn from(id: CapaId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocolo_format() {
        let p = Protocolo::new();
        let s = p.to_string();
        assert!(s.starts_with("OC-"));
        assert_eq!(s.len(), 3 + 26);
        assert_eq!(s.parse::<Protocolo>().unwrap(), p);
        assert_eq!(p.short().len(), 3 + 8);
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        let capa = CapaId::new().to_string();
        assert!(matches!(
            capa.parse::<Protocolo>(),
            Err(IdParseError::InvalidFormat { .. })
        ));
        assert!(matches!(
            "OC-notaulid".parse::<Protocolo>(),
            Err(IdParseError::InvalidUlid { .. })
        ));
    }

    #[test]
    fn test_capa_id_serde() {
        let id = CapaId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: CapaId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<CapaId>("\"CAPA-xyz\"").is_err());
    }
}
