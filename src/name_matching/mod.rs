//! Person-name comparison
//!
//! Director validation asks whether a candidate's name and a registry
//! officer's name denote the same person. The answer is a graded
//! [`NameMatchType`]; [`DirectorMatchPolicy`] decides which grades count.

pub mod local;
pub mod nameapi;

pub use local::JaroWinklerMatcher;
pub use nameapi::NameApiMatcher;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Graded outcome of comparing two person names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NameMatchType {
    Equal,
    Matching,
    Similar,
    /// Probably related people, e.g. a shared surname
    Relation,
    Different,
}

impl NameMatchType {
    /// Parse the wire form; unknown grades are treated as `Different`
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Self::Equal,
            "MATCHING" => Self::Matching,
            "SIMILAR" => Self::Similar,
            "RELATION" => Self::Relation,
            _ => Self::Different,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Matching => "MATCHING",
            Self::Similar => "SIMILAR",
            Self::Relation => "RELATION",
            Self::Different => "DIFFERENT",
        }
    }
}

impl fmt::Display for NameMatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which match grades identify an officer as the candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectorMatchPolicy {
    /// Count `Relation` as a pass
    pub accept_relation: bool,
}

impl DirectorMatchPolicy {
    pub fn accepts(&self, match_type: NameMatchType) -> bool {
        match match_type {
            NameMatchType::Equal | NameMatchType::Matching | NameMatchType::Similar => true,
            NameMatchType::Relation => self.accept_relation,
            NameMatchType::Different => false,
        }
    }
}

/// Compares two free-form person names
#[async_trait]
pub trait NameMatcher: Send + Sync {
    async fn match_person_names(
        &self,
        first: &str,
        second: &str,
    ) -> Result<NameMatchType, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire() {
        assert_eq!(NameMatchType::from_wire("EQUAL"), NameMatchType::Equal);
        assert_eq!(NameMatchType::from_wire("matching"), NameMatchType::Matching);
        assert_eq!(NameMatchType::from_wire(" RELATION "), NameMatchType::Relation);
        assert_eq!(NameMatchType::from_wire("NO_MATCH"), NameMatchType::Different);
        assert_eq!(NameMatchType::Similar.to_string(), "SIMILAR");
    }

    #[test]
    fn test_policy() {
        let strict = DirectorMatchPolicy::default();
        assert!(strict.accepts(NameMatchType::Equal));
        assert!(strict.accepts(NameMatchType::Matching));
        assert!(strict.accepts(NameMatchType::Similar));
        assert!(!strict.accepts(NameMatchType::Relation));
        assert!(!strict.accepts(NameMatchType::Different));

        let lenient = DirectorMatchPolicy { accept_relation: true };
        assert!(lenient.accepts(NameMatchType::Relation));
        assert!(!lenient.accepts(NameMatchType::Different));
    }
}
