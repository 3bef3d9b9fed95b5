//! Company resolution against the companies registry
//!
//! Turns a claimed company name (and optionally a registration number) into
//! an authoritative registered address and jurisdiction. An unresolvable
//! company is a normal outcome: the result is an empty [`RegisteredCompany`]
//! and callers fall back to placement-registry data.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::QueryCache;
use crate::companies_house::{normalize_company_number, ChSearchItem, CompanyRegistry};
use crate::error::RegistryError;
use crate::models::RegisteredCompany;
use crate::normalize::normalize_address;

const ENGLAND_WALES_CODE: &str = "england-wales";
pub const ENGLAND_WALES_DISPLAY: &str = "England and Wales";

/// Render a registry jurisdiction code for documents
pub fn display_jurisdiction(code: &str) -> String {
    if code == ENGLAND_WALES_CODE {
        ENGLAND_WALES_DISPLAY.to_string()
    } else {
        code.to_string()
    }
}

/// First search hit whose title equals `name` (case-insensitive) and, when a
/// number is given, whose normalized number matches too
pub fn find_exact_match<'a>(
    items: &'a [ChSearchItem],
    name: &str,
    number: Option<&str>,
) -> Option<&'a ChSearchItem> {
    let wanted_title = name.trim().to_uppercase();
    let wanted_number = number
        .map(normalize_company_number)
        .filter(|n| !n.is_empty());

    items.iter().find(|item| {
        item.title.trim().to_uppercase() == wanted_title
            && wanted_number
                .as_deref()
                .map_or(true, |n| normalize_company_number(&item.company_number) == n)
    })
}

/// Resolves companies through a [`CompanyRegistry`]
#[derive(Clone)]
pub struct CompanyResolver {
    registry: Arc<dyn CompanyRegistry>,
    search_cache: Option<Arc<QueryCache<Vec<ChSearchItem>>>>,
}

impl CompanyResolver {
    pub fn new(registry: Arc<dyn CompanyRegistry>) -> Self {
        Self {
            registry,
            search_cache: None,
        }
    }

    /// Share a search cache; repeated name lookups within its TTL skip the registry
    pub fn with_search_cache(mut self, cache: Arc<QueryCache<Vec<ChSearchItem>>>) -> Self {
        self.search_cache = Some(cache);
        self
    }

    pub fn registry(&self) -> &Arc<dyn CompanyRegistry> {
        &self.registry
    }

    /// Registry name search, served from the cache when fresh
    pub async fn search(&self, name: &str) -> Result<Vec<ChSearchItem>, RegistryError> {
        let query = name.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(cache) = &self.search_cache {
            if let Some(items) = cache.get(query).await {
                debug!(query, "company search cache hit");
                return Ok(items);
            }
        }

        let items = self.registry.search_companies(query).await?;
        if let Some(cache) = &self.search_cache {
            cache.insert(query, items.clone()).await;
        }
        Ok(items)
    }

    /// Strict title (+ number) match from a fresh or cached search
    pub async fn find_exact_match(
        &self,
        name: &str,
        number: Option<&str>,
    ) -> Result<Option<ChSearchItem>, RegistryError> {
        let items = self.search(name).await?;
        Ok(find_exact_match(&items, name, number).cloned())
    }

    /// Registration number of the first exact-title match
    pub async fn discover_registration_number(
        &self,
        name: &str,
    ) -> Result<Option<String>, RegistryError> {
        let found = self
            .find_exact_match(name, None)
            .await?
            .map(|item| item.company_number)
            .filter(|number| !number.is_empty());

        if let Some(number) = &found {
            info!(company = name, number = %number, "discovered registration number");
        }
        Ok(found)
    }

    /// Authoritative address, jurisdiction and status for a company
    pub async fn resolve_company(
        &self,
        name: &str,
        number: Option<&str>,
    ) -> Result<RegisteredCompany, RegistryError> {
        let number = number.map(str::trim).filter(|n| !n.is_empty());

        let Some(item) = self.find_exact_match(name, number).await? else {
            debug!(company = name, ?number, "company not resolvable");
            return Ok(RegisteredCompany::default());
        };

        let mut resolved = RegisteredCompany {
            company_number: item.company_number.clone(),
            title: item.title.clone(),
            address: normalize_address([item.address_snippet.as_deref()]),
            jurisdiction: String::new(),
            company_status: item.company_status.clone().unwrap_or_default(),
        };

        if let Some(profile) = self.registry.fetch_company(&item.company_number).await? {
            resolved.jurisdiction = display_jurisdiction(&profile.jurisdiction);
            if !profile.company_status.is_empty() {
                resolved.company_status = profile.company_status;
            }
            if resolved.address.is_empty() {
                if let Some(address) = profile.registered_office_address {
                    resolved.address = normalize_address([
                        address.premises,
                        address.address_line_1,
                        address.address_line_2,
                        address.locality,
                        address.region,
                        address.postal_code,
                    ]);
                }
            }
        }

        Ok(resolved)
    }
}
