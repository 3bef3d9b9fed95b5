//! Companies registry (UK Companies House)
//!
//! The authoritative source for registered address, jurisdiction, status and
//! officers. The contract core talks to it only through [`CompanyRegistry`]
//! so resolution and validation run against fakes in tests.

pub mod client;
pub mod types;

pub use client::{normalize_company_number, CompaniesHouseClient};
pub use types::{
    ChAddress, ChCompanyProfile, ChOfficer, ChOfficerList, ChSearchItem, ChSearchResult,
};

use async_trait::async_trait;

use crate::error::RegistryError;

/// Read access to the companies registry
///
/// Not-found is `Ok(None)` or an empty vector; `Err` is reserved for
/// transport and protocol failures.
#[async_trait]
pub trait CompanyRegistry: Send + Sync {
    /// Free-text company search; results in registry order
    async fn search_companies(&self, query: &str) -> Result<Vec<ChSearchItem>, RegistryError>;

    /// Full company record by registration number
    async fn fetch_company(&self, number: &str) -> Result<Option<ChCompanyProfile>, RegistryError>;

    /// Currently appointed officers; resigned appointments are excluded
    async fn fetch_active_officers(&self, number: &str) -> Result<Vec<ChOfficer>, RegistryError>;
}
