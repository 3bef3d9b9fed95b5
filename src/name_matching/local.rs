//! Offline name matcher
//!
//! Used when no NameAPI key is configured. Grades follow the remote
//! service's vocabulary closely enough for director validation.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{NameMatchType, NameMatcher};
use crate::error::RegistryError;

/// Jaro-Winkler score at or above which two names are `Similar`
pub const SIMILARITY_THRESHOLD: f64 = 0.92;

/// String-similarity matcher over normalized name tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinklerMatcher;

impl JaroWinklerMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous grade; the trait wraps this
    pub fn grade(&self, first: &str, second: &str) -> NameMatchType {
        let a = tokens(first);
        let b = tokens(second);
        if a.is_empty() || b.is_empty() {
            return NameMatchType::Different;
        }

        if a == b {
            return NameMatchType::Equal;
        }

        let set_a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
        let set_b: BTreeSet<&str> = b.iter().map(String::as_str).collect();
        if set_a == set_b {
            return NameMatchType::Matching;
        }

        let score = strsim::jaro_winkler(&a.join(" "), &b.join(" "));
        if score >= SIMILARITY_THRESHOLD {
            return NameMatchType::Similar;
        }

        // Surname is the last token on both sides
        if a.last() == b.last() {
            return NameMatchType::Relation;
        }

        NameMatchType::Different
    }
}

/// Lower-cased alphabetic tokens
fn tokens(name: &str) -> Vec<String> {
    name.split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .map(|t| {
            t.chars()
                .filter(|c| c.is_alphabetic() || *c == '-' || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

#[async_trait]
impl NameMatcher for JaroWinklerMatcher {
    async fn match_person_names(
        &self,
        first: &str,
        second: &str,
    ) -> Result<NameMatchType, RegistryError> {
        Ok(self.grade(first, second))
    }
}
