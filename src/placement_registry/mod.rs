//! Placement registry (candidate CRM)
//!
//! Source of truth for candidates, placements, client companies, contacts,
//! requirements and agency users. Payloads are passed through as raw JSON
//! and folded into canonical records by [`ingest`].

pub mod client;
pub mod ingest;

pub use client::PlacementRegistryClient;
pub use ingest::ExperienceEntry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RegistryError;

/// Read access to the placement registry
///
/// Not-found is `Ok(None)` or an empty vector.
#[async_trait]
pub trait PlacementRegistry: Send + Sync {
    /// Candidate ids whose stored surname contains `surname`
    async fn search_candidates(&self, surname: &str) -> Result<Vec<Value>, RegistryError>;

    async fn get_candidate(&self, candidate_id: u64) -> Result<Option<Value>, RegistryError>;

    /// Experience rows in registry order
    async fn get_experience(&self, candidate_id: u64) -> Result<Vec<Value>, RegistryError>;

    async fn get_contact(&self, contact_id: u64) -> Result<Option<Value>, RegistryError>;

    async fn get_company(&self, company_id: u64) -> Result<Option<Value>, RegistryError>;

    /// Company ids matching a name
    async fn search_companies(&self, name: &str) -> Result<Vec<Value>, RegistryError>;

    async fn search_contacts_by_company(&self, company_name: &str)
        -> Result<Vec<Value>, RegistryError>;

    async fn search_requirements(
        &self,
        company_name: &str,
        contact_name: &str,
    ) -> Result<Vec<Value>, RegistryError>;

    async fn requirement_candidates(&self, requirement_id: u64)
        -> Result<Vec<Value>, RegistryError>;

    async fn list_users(&self) -> Result<Vec<Value>, RegistryError>;
}
