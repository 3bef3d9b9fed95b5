//! In-memory registries and matchers for integration tests
//!
//! Each fake answers from fixed data and counts the calls that tests assert
//! caching behaviour on.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use placement_contracts::companies_house::{
    normalize_company_number, ChCompanyProfile, ChOfficer, ChSearchItem, CompanyRegistry,
};
use placement_contracts::name_matching::{NameMatchType, NameMatcher};
use placement_contracts::placement_registry::PlacementRegistry;
use placement_contracts::RegistryError;

pub fn unavailable(service: &'static str) -> RegistryError {
    RegistryError::Status {
        service,
        status: 503,
        body: "service unavailable".to_string(),
    }
}

// ============================================================================
// Companies registry
// ============================================================================

#[derive(Default)]
pub struct FakeCompanyRegistry {
    searches: HashMap<String, Vec<ChSearchItem>>,
    profiles: HashMap<String, ChCompanyProfile>,
    officers: HashMap<String, Vec<ChOfficer>>,
    failing: bool,
    pub search_calls: AtomicUsize,
}

impl FakeCompanyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with HTTP 503
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, query: &str, items: Vec<ChSearchItem>) -> Self {
        self.searches.insert(query.to_uppercase(), items);
        self
    }

    pub fn with_profile(mut self, profile: ChCompanyProfile) -> Self {
        self.profiles
            .insert(normalize_company_number(&profile.company_number), profile);
        self
    }

    pub fn with_officers(mut self, number: &str, officers: Vec<ChOfficer>) -> Self {
        self.officers
            .insert(normalize_company_number(number), officers);
        self
    }

    pub fn searches(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanyRegistry for FakeCompanyRegistry {
    async fn search_companies(&self, query: &str) -> Result<Vec<ChSearchItem>, RegistryError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(unavailable("companies-house"));
        }
        Ok(self
            .searches
            .get(&query.trim().to_uppercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_company(&self, number: &str) -> Result<Option<ChCompanyProfile>, RegistryError> {
        if self.failing {
            return Err(unavailable("companies-house"));
        }
        Ok(self.profiles.get(&normalize_company_number(number)).cloned())
    }

    async fn fetch_active_officers(&self, number: &str) -> Result<Vec<ChOfficer>, RegistryError> {
        if self.failing {
            return Err(unavailable("companies-house"));
        }
        Ok(self
            .officers
            .get(&normalize_company_number(number))
            .cloned()
            .unwrap_or_default())
    }
}

pub fn search_item(title: &str, number: &str, address: &str, status: &str) -> ChSearchItem {
    ChSearchItem {
        title: title.to_string(),
        company_number: number.to_string(),
        address_snippet: Some(address.to_string()).filter(|a| !a.is_empty()),
        company_status: Some(status.to_string()),
        ..Default::default()
    }
}

pub fn profile(name: &str, number: &str, status: &str, jurisdiction: &str) -> ChCompanyProfile {
    ChCompanyProfile {
        company_name: name.to_string(),
        company_number: number.to_string(),
        company_status: status.to_string(),
        jurisdiction: jurisdiction.to_string(),
        registered_office_address: None,
    }
}

pub fn officer(name: &str, role: &str, resigned_on: Option<&str>) -> ChOfficer {
    ChOfficer {
        name: name.to_string(),
        officer_role: role.to_string(),
        appointed_on: Some("2019-04-01".to_string()),
        resigned_on: resigned_on.map(str::to_string),
    }
}

// ============================================================================
// Placement registry
// ============================================================================

#[derive(Default)]
pub struct FakePlacementRegistry {
    candidate_searches: HashMap<String, Vec<Value>>,
    candidates: HashMap<u64, Value>,
    experience: HashMap<u64, Vec<Value>>,
    contacts: HashMap<u64, Value>,
    companies: HashMap<u64, Value>,
    company_searches: HashMap<String, Vec<Value>>,
    company_contacts: HashMap<String, Vec<Value>>,
    requirements: HashMap<(String, String), Vec<Value>>,
    requirement_candidates: HashMap<u64, Vec<Value>>,
    users: Vec<Value>,
    failing: bool,
    pub candidate_search_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
}

fn key(value: &str) -> String {
    value.trim().to_lowercase()
}

impl FakePlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_candidate_search(mut self, surname: &str, results: Vec<Value>) -> Self {
        self.candidate_searches.insert(key(surname), results);
        self
    }

    pub fn with_candidate(mut self, id: u64, value: Value) -> Self {
        self.candidates.insert(id, value);
        self
    }

    pub fn with_experience(mut self, candidate_id: u64, rows: Vec<Value>) -> Self {
        self.experience.insert(candidate_id, rows);
        self
    }

    pub fn with_contact(mut self, id: u64, value: Value) -> Self {
        self.contacts.insert(id, value);
        self
    }

    pub fn with_company(mut self, id: u64, value: Value) -> Self {
        self.companies.insert(id, value);
        self
    }

    pub fn with_company_search(mut self, name: &str, results: Vec<Value>) -> Self {
        self.company_searches.insert(key(name), results);
        self
    }

    pub fn with_company_contacts(mut self, company: &str, rows: Vec<Value>) -> Self {
        self.company_contacts.insert(key(company), rows);
        self
    }

    pub fn with_requirements(mut self, company: &str, contact: &str, rows: Vec<Value>) -> Self {
        self.requirements.insert((key(company), key(contact)), rows);
        self
    }

    pub fn with_requirement_candidates(mut self, requirement_id: u64, rows: Vec<Value>) -> Self {
        self.requirement_candidates.insert(requirement_id, rows);
        self
    }

    pub fn with_users(mut self, users: Vec<Value>) -> Self {
        self.users = users;
        self
    }

    pub fn candidate_searches(&self) -> usize {
        self.candidate_search_calls.load(Ordering::SeqCst)
    }

    pub fn user_listings(&self) -> usize {
        self.user_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RegistryError> {
        if self.failing {
            Err(unavailable("placement-registry"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlacementRegistry for FakePlacementRegistry {
    async fn search_candidates(&self, surname: &str) -> Result<Vec<Value>, RegistryError> {
        self.candidate_search_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        // Prefix search, like the real registry
        let term = key(surname);
        Ok(self
            .candidate_searches
            .iter()
            .filter(|(stored, _)| stored.starts_with(&term))
            .flat_map(|(_, results)| results.clone())
            .collect())
    }

    async fn get_candidate(&self, candidate_id: u64) -> Result<Option<Value>, RegistryError> {
        self.check()?;
        Ok(self.candidates.get(&candidate_id).cloned())
    }

    async fn get_experience(&self, candidate_id: u64) -> Result<Vec<Value>, RegistryError> {
        self.check()?;
        Ok(self.experience.get(&candidate_id).cloned().unwrap_or_default())
    }

    async fn get_contact(&self, contact_id: u64) -> Result<Option<Value>, RegistryError> {
        self.check()?;
        Ok(self.contacts.get(&contact_id).cloned())
    }

    async fn get_company(&self, company_id: u64) -> Result<Option<Value>, RegistryError> {
        self.check()?;
        Ok(self.companies.get(&company_id).cloned())
    }

    async fn search_companies(&self, name: &str) -> Result<Vec<Value>, RegistryError> {
        self.check()?;
        Ok(self.company_searches.get(&key(name)).cloned().unwrap_or_default())
    }

    async fn search_contacts_by_company(
        &self,
        company_name: &str,
    ) -> Result<Vec<Value>, RegistryError> {
        self.check()?;
        Ok(self
            .company_contacts
            .get(&key(company_name))
            .cloned()
            .unwrap_or_default())
    }

    async fn search_requirements(
        &self,
        company_name: &str,
        contact_name: &str,
    ) -> Result<Vec<Value>, RegistryError> {
        self.check()?;
        Ok(self
            .requirements
            .get(&(key(company_name), key(contact_name)))
            .cloned()
            .unwrap_or_default())
    }

    async fn requirement_candidates(
        &self,
        requirement_id: u64,
    ) -> Result<Vec<Value>, RegistryError> {
        self.check()?;
        Ok(self
            .requirement_candidates
            .get(&requirement_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_users(&self) -> Result<Vec<Value>, RegistryError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.users.clone())
    }
}

// ============================================================================
// Name matcher
// ============================================================================

/// Grades by officer name; anything unlisted is `Different`
#[derive(Default)]
pub struct FixedMatcher {
    grades: HashMap<String, NameMatchType>,
    pub calls: AtomicUsize,
}

impl FixedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grade(mut self, officer_name: &str, grade: NameMatchType) -> Self {
        self.grades.insert(officer_name.to_uppercase(), grade);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameMatcher for FixedMatcher {
    async fn match_person_names(
        &self,
        _first: &str,
        second: &str,
    ) -> Result<NameMatchType, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .grades
            .get(&second.to_uppercase())
            .copied()
            .unwrap_or(NameMatchType::Different))
    }
}
