//! Backend identifiers.

use serde::{Deserialize, Serialize};

/// One of the two databases a comparison runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Denormalized warehouse store
    Warehouse,
    /// Normalized relational store
    Normalized,
}

impl BackendId {
    /// Both backends, warehouse first.
    pub const ALL: [BackendId; 2] = [BackendId::Warehouse, BackendId::Normalized];

    /// Identifier as used in URLs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Warehouse => "warehouse",
            BackendId::Normalized => "normalized",
        }
    }

    /// Get a human-readable name for this backend.
    pub fn name(&self) -> &'static str {
        match self {
            BackendId::Warehouse => "Warehouse",
            BackendId::Normalized => "Normalized",
        }
    }
}

impl std::fmt::Display for BackendId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BackendId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warehouse" => Ok(BackendId::Warehouse),
            "normalized" => Ok(BackendId::Normalized),
            _ => Err(format!(
                "Unknown backend: {}. Must be 'warehouse' or 'normalized'",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Warehouse".parse::<BackendId>().unwrap(), BackendId::Warehouse);
        assert_eq!("NORMALIZED".parse::<BackendId>().unwrap(), BackendId::Normalized);
        assert!("spark".parse::<BackendId>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&BackendId::Normalized).unwrap();
        assert_eq!(json, "\"normalized\"");

        let parsed: BackendId = serde_json::from_str("\"warehouse\"").unwrap();
        assert_eq!(parsed, BackendId::Warehouse);
    }
}
