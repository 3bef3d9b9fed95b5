//! Contract aggregation
//!
//! Assembles one [`ContractRecord`] for a candidate's current or upcoming
//! placement by chaining lookups across the placement registry and the
//! companies registry. Lookups run sequentially. Missing optional parts
//! (contact, company, requirement, placing user) leave empty fields; only
//! transport failures and malformed end dates are errors.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::QueryCache;
use crate::duration::{compute_duration, format_display_date, parse_registry_date};
use crate::error::{ContractError, DataFormatError, RegistryError};
use crate::models::{
    CandidateRecord, CandidateSuggestion, CompanyRecord, ContactRecord, ContractRecord,
    NoticePeriod, PlacedByUser, PlacementRecord, RequirementSummary, DEFAULT_CURRENCY,
    DEFAULT_NOTICE_PERIOD_UNIT,
};
use crate::placement_registry::ingest::{
    candidate_ids, company_ids, ingest_candidate, ingest_company, ingest_contact,
    ingest_experience, ingest_requirement, ingest_suggestion, ingest_user, ExperienceEntry,
};
use crate::placement_registry::PlacementRegistry;
use crate::resolution::{CompanyResolver, ENGLAND_WALES_DISPLAY};

/// Most candidate records fetched to build one suggestion list
pub const SUGGESTION_LIMIT: usize = 20;

const USER_DIRECTORY_KEY: &str = "users";

/// How a caller names the candidate whose contract is wanted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractIdentifier {
    /// Registry candidate id
    CandidateId(u64),
    /// `"SURNAME:TAG"`: surname search narrowed to one service identifier
    TaggedSurname { surname: String, tag: String },
    /// Partial or full surname
    Surname(String),
}

impl ContractIdentifier {
    /// `None` for a blank identifier
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = raw.parse() {
                return Some(Self::CandidateId(id));
            }
        }

        if let Some((surname, tag)) = raw.split_once(':') {
            let (surname, tag) = (surname.trim(), tag.trim());
            if !surname.is_empty() && !tag.is_empty() {
                return Some(Self::TaggedSurname {
                    surname: surname.to_string(),
                    tag: tag.to_string(),
                });
            }
            if !surname.is_empty() {
                return Some(Self::Surname(surname.to_string()));
            }
        }

        Some(Self::Surname(raw.to_string()))
    }

    fn accepts(&self, candidate: &CandidateRecord) -> bool {
        match self {
            Self::CandidateId(_) => true,
            // Matches the stored surname field, service tag included, so a
            // fragment of the tag also selects the candidate
            Self::Surname(term) => contains_ignore_case(&candidate.raw_surname, term),
            Self::TaggedSurname { surname, tag } => {
                contains_ignore_case(&candidate.surname, surname)
                    && candidate
                        .service_id
                        .as_deref()
                        .is_some_and(|id| id.eq_ignore_ascii_case(tag))
            }
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Pick the first placement starting on or after `today`, in registry order
///
/// Placement id 0 is a registry placeholder and is skipped, as is any row
/// whose start date cannot be read. The end date of the chosen row must
/// parse when present.
pub fn select_placement(
    entries: Vec<ExperienceEntry>,
    today: NaiveDate,
) -> Result<Option<PlacementRecord>, DataFormatError> {
    for entry in entries {
        let ExperienceEntry {
            mut placement,
            start_date_raw,
            end_date_raw,
        } = entry;

        if placement.placement_id == 0 {
            continue;
        }

        let start = match parse_registry_date("placementStartDate", &start_date_raw) {
            Ok(start) => start,
            Err(e) => {
                warn!(placement_id = placement.placement_id, error = %e, "skipping placement");
                continue;
            }
        };
        if start < today {
            continue;
        }

        placement.start_date = Some(start);
        placement.end_date = if end_date_raw.trim().is_empty() {
            None
        } else {
            Some(parse_registry_date("placementEndDate", &end_date_raw)?)
        };
        return Ok(Some(placement));
    }

    Ok(None)
}

/// Builds contract records from the two registries
pub struct ContractAggregator {
    placements: Arc<dyn PlacementRegistry>,
    resolver: CompanyResolver,
    suggestions: Arc<QueryCache<Vec<CandidateSuggestion>>>,
    users: Arc<QueryCache<Vec<PlacedByUser>>>,
    reference_date: Option<NaiveDate>,
}

impl ContractAggregator {
    pub fn new(placements: Arc<dyn PlacementRegistry>, resolver: CompanyResolver) -> Self {
        Self {
            placements,
            resolver,
            suggestions: Arc::new(QueryCache::default()),
            users: Arc::new(QueryCache::default()),
            reference_date: None,
        }
    }

    pub fn with_suggestion_cache(mut self, cache: Arc<QueryCache<Vec<CandidateSuggestion>>>) -> Self {
        self.suggestions = cache;
        self
    }

    pub fn with_user_cache(mut self, cache: Arc<QueryCache<Vec<PlacedByUser>>>) -> Self {
        self.users = cache;
        self
    }

    /// Fix "today" for placement selection
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn resolver(&self) -> &CompanyResolver {
        &self.resolver
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Aggregate the contract for a candidate id, `SURNAME:TAG` or surname
    ///
    /// `Ok(None)` when no candidate matches.
    pub async fn aggregate_contract(
        &self,
        identifier: &str,
    ) -> Result<Option<ContractRecord>, ContractError> {
        let Some(identifier) = ContractIdentifier::parse(identifier) else {
            return Ok(None);
        };

        let Some(mut candidate) = self.resolve_candidate(&identifier).await? else {
            info!(?identifier, "no candidate matched");
            return Ok(None);
        };
        info!(
            candidate_id = candidate.candidate_id,
            name = %candidate.display_name,
            "aggregating contract"
        );

        self.resolve_candidate_company(&mut candidate).await?;

        let entries: Vec<ExperienceEntry> = self
            .placements
            .get_experience(candidate.candidate_id)
            .await?
            .iter()
            .map(ingest_experience)
            .collect();

        let mut record = ContractRecord {
            duration: compute_duration(None, None),
            fee_currency: DEFAULT_CURRENCY.to_string(),
            charge_currency: DEFAULT_CURRENCY.to_string(),
            ..Default::default()
        };

        let Some(placement) = select_placement(entries, self.today())? else {
            debug!(candidate_id = candidate.candidate_id, "no current or upcoming placement");
            record.candidate = candidate;
            return Ok(Some(record));
        };

        record.contact = self.fetch_contact(placement.contact_id).await?;
        record.company = self.fetch_company(&placement).await?;
        self.resolve_client_company(&mut record.company).await?;
        record.requirement_id = self
            .find_requirement_id(&record.company.name, &record.contact.name, &placement.job_title)
            .await?;
        record.placed_by = self.placed_by_user(&placement.placed_by).await?;

        record.start_date = format_display_date(placement.start_date);
        record.end_date = format_display_date(placement.end_date);
        record.duration = compute_duration(placement.start_date, placement.end_date);
        record.notice_period = notice_period(&placement);
        record.candidate = candidate;
        record.placement = Some(placement);

        Ok(Some(record))
    }

    async fn resolve_candidate(
        &self,
        identifier: &ContractIdentifier,
    ) -> Result<Option<CandidateRecord>, RegistryError> {
        let term = match identifier {
            ContractIdentifier::CandidateId(id) => {
                return Ok(self
                    .placements
                    .get_candidate(*id)
                    .await?
                    .map(|value| ingest_candidate(*id, &value)));
            }
            ContractIdentifier::Surname(term) => term,
            ContractIdentifier::TaggedSurname { surname, .. } => surname,
        };

        let ids = candidate_ids(&self.placements.search_candidates(term).await?);
        debug!(term = %term, hits = ids.len(), "candidate search");

        for id in ids {
            let Some(value) = self.placements.get_candidate(id).await? else {
                continue;
            };
            let candidate = ingest_candidate(id, &value);
            if identifier.accepts(&candidate) {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    /// Registered address and jurisdiction of the candidate's limited company
    async fn resolve_candidate_company(
        &self,
        candidate: &mut CandidateRecord,
    ) -> Result<(), RegistryError> {
        if candidate.ltd_company_name.is_empty() || candidate.ltd_registration_number.is_empty() {
            return Ok(());
        }

        let registered = self
            .resolver
            .resolve_company(
                &candidate.ltd_company_name,
                Some(&candidate.ltd_registration_number),
            )
            .await?;
        if registered.is_resolved() {
            candidate.registered_address = registered.address;
            candidate.jurisdiction = registered.jurisdiction;
        }
        Ok(())
    }

    async fn fetch_contact(&self, contact_id: Option<u64>) -> Result<ContactRecord, RegistryError> {
        let Some(contact_id) = contact_id else {
            return Ok(ContactRecord::default());
        };
        Ok(self
            .placements
            .get_contact(contact_id)
            .await?
            .map(|value| ingest_contact(&value))
            .unwrap_or_default())
    }

    /// Client company by id, falling back to a name search
    async fn fetch_company(&self, placement: &PlacementRecord) -> Result<CompanyRecord, RegistryError> {
        if let Some(company_id) = placement.company_id {
            if let Some(value) = self.placements.get_company(company_id).await? {
                return Ok(ingest_company(&value));
            }
            debug!(company_id, "company id not found, searching by name");
        }

        if !placement.company_name.is_empty() {
            let hits = self
                .placements
                .search_companies(&placement.company_name)
                .await?;
            if let Some(company_id) = company_ids(&hits).into_iter().next() {
                if let Some(value) = self.placements.get_company(company_id).await? {
                    return Ok(ingest_company(&value));
                }
            }
        }

        Ok(CompanyRecord {
            name: placement.company_name.clone(),
            ..Default::default()
        })
    }

    /// Fill registration number, address and jurisdiction from the companies registry
    async fn resolve_client_company(&self, company: &mut CompanyRecord) -> Result<(), RegistryError> {
        if company.name.is_empty() {
            return Ok(());
        }

        if company.registration_number.is_empty() {
            if let Some(number) = self.resolver.discover_registration_number(&company.name).await? {
                company.registration_number = number;
            }
        }

        if !company.registration_number.is_empty() {
            let registered = self
                .resolver
                .resolve_company(&company.name, Some(&company.registration_number))
                .await?;
            if registered.is_resolved() {
                if !registered.address.is_empty() {
                    company.address = registered.address;
                }
                company.jurisdiction = registered.jurisdiction;
                return Ok(());
            }
        }

        company.jurisdiction = ENGLAND_WALES_DISPLAY.to_string();
        Ok(())
    }

    async fn find_requirement_id(
        &self,
        company_name: &str,
        contact_name: &str,
        job_title: &str,
    ) -> Result<Option<u64>, RegistryError> {
        if company_name.is_empty() || contact_name.is_empty() || job_title.is_empty() {
            return Ok(None);
        }

        let requirements = self.company_requirements(company_name, contact_name).await?;
        Ok(requirements
            .into_iter()
            .find(|r| r.job_title.trim().eq_ignore_ascii_case(job_title.trim()))
            .map(|r| r.requirement_id))
    }

    /// Registry user who made the placement, via the cached user directory
    async fn placed_by_user(&self, placed_by: &str) -> Result<PlacedByUser, RegistryError> {
        let placed_by = placed_by.trim();
        if placed_by.is_empty() {
            return Ok(PlacedByUser::default());
        }

        let users = match self.users.get(USER_DIRECTORY_KEY).await {
            Some(users) => users,
            None => {
                let users: Vec<PlacedByUser> = self
                    .placements
                    .list_users()
                    .await?
                    .iter()
                    .map(ingest_user)
                    .collect();
                self.users.insert(USER_DIRECTORY_KEY, users.clone()).await;
                users
            }
        };

        Ok(users
            .into_iter()
            .find(|u| u.user_id == placed_by || u.name.eq_ignore_ascii_case(placed_by))
            .unwrap_or_default())
    }

    /// Candidates whose surname starts with `query`, for type-ahead
    pub async fn suggest_candidates(
        &self,
        query: &str,
    ) -> Result<Vec<CandidateSuggestion>, RegistryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.suggestions.get(query).await {
            debug!(query, "suggestion cache hit");
            return Ok(cached);
        }

        let results = self.placements.search_candidates(query).await?;
        let suggestions = self.suggestions_from(&results).await?;
        self.suggestions.insert(query, suggestions.clone()).await;
        Ok(suggestions)
    }

    /// Contacts at a client company
    pub async fn company_contacts(
        &self,
        company_name: &str,
    ) -> Result<Vec<ContactRecord>, RegistryError> {
        if company_name.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .placements
            .search_contacts_by_company(company_name)
            .await?
            .iter()
            .map(ingest_contact)
            .collect())
    }

    /// Requirements raised by a contact at a client company
    pub async fn company_requirements(
        &self,
        company_name: &str,
        contact_name: &str,
    ) -> Result<Vec<RequirementSummary>, RegistryError> {
        Ok(self
            .placements
            .search_requirements(company_name, contact_name)
            .await?
            .iter()
            .map(ingest_requirement)
            .collect())
    }

    /// Candidates shortlisted against a requirement
    pub async fn requirement_candidates(
        &self,
        requirement_id: u64,
    ) -> Result<Vec<CandidateSuggestion>, RegistryError> {
        let results = self.placements.requirement_candidates(requirement_id).await?;
        self.suggestions_from(&results).await
    }

    /// Suggestions from rows that carry a name, fetching the rest by id
    async fn suggestions_from(
        &self,
        results: &[Value],
    ) -> Result<Vec<CandidateSuggestion>, RegistryError> {
        let mut suggestions = Vec::new();
        let mut fetched = 0;

        for item in results {
            if let Some(suggestion) = ingest_suggestion(item) {
                suggestions.push(suggestion);
                continue;
            }

            let Some(id) = candidate_ids(std::slice::from_ref(item)).into_iter().next() else {
                continue;
            };
            if fetched == SUGGESTION_LIMIT {
                break;
            }
            fetched += 1;

            if let Some(value) = self.placements.get_candidate(id).await? {
                let candidate = ingest_candidate(id, &value);
                suggestions.push(CandidateSuggestion {
                    candidate_id: candidate.candidate_id,
                    name: format!("{}, {}", candidate.raw_surname, candidate.forename),
                });
            }
        }

        Ok(suggestions)
    }
}

fn notice_period(placement: &PlacementRecord) -> NoticePeriod {
    if placement.notice_period == 0 {
        return NoticePeriod::default();
    }
    let unit = placement.notice_period_unit.trim();
    NoticePeriod {
        length: placement.notice_period,
        unit: if unit.is_empty() {
            DEFAULT_NOTICE_PERIOD_UNIT.to_string()
        } else {
            unit.to_string()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: u64, start: &str, end: &str) -> ExperienceEntry {
        ExperienceEntry {
            placement: PlacementRecord {
                placement_id: id,
                ..Default::default()
            },
            start_date_raw: start.to_string(),
            end_date_raw: end.to_string(),
        }
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(ContractIdentifier::parse("9233"), Some(ContractIdentifier::CandidateId(9233)));
        assert_eq!(
            ContractIdentifier::parse("SMITH:SVC42"),
            Some(ContractIdentifier::TaggedSurname {
                surname: "SMITH".to_string(),
                tag: "SVC42".to_string()
            })
        );
        assert_eq!(
            ContractIdentifier::parse(" smi "),
            Some(ContractIdentifier::Surname("smi".to_string()))
        );
        assert_eq!(
            ContractIdentifier::parse("Smith:"),
            Some(ContractIdentifier::Surname("Smith".to_string()))
        );
        assert_eq!(ContractIdentifier::parse("   "), None);
    }

    #[test]
    fn test_identifier_accepts() {
        let candidate = CandidateRecord {
            raw_surname: "Smithson:SVC42".to_string(),
            surname: "Smithson".to_string(),
            service_id: Some("SVC42".to_string()),
            ..Default::default()
        };
        assert!(ContractIdentifier::Surname("smith".to_string()).accepts(&candidate));
        assert!(!ContractIdentifier::Surname("jones".to_string()).accepts(&candidate));
        assert!(ContractIdentifier::Surname("svc4".to_string()).accepts(&candidate));
        assert!(ContractIdentifier::parse("SMITH:svc42").unwrap().accepts(&candidate));
        assert!(!ContractIdentifier::parse("SMITH:SVC7").unwrap().accepts(&candidate));
    }

    #[test]
    fn test_select_first_upcoming_in_registry_order() {
        let today = date(2026, 6, 1);
        let entries = vec![
            entry(0, "2027-01-01", ""),
            entry(1, "2025-01-01", "2025-12-31"),
            entry(2, "not a date", ""),
            entry(3, "2026-09-01T00:00:00", "2027-02-28T00:00:00"),
            entry(4, "2026-06-01", ""),
        ];
        let placement = select_placement(entries, today).unwrap().unwrap();

        assert_eq!(placement.placement_id, 3);
        assert_eq!(placement.start_date, Some(date(2026, 9, 1)));
        assert_eq!(placement.end_date, Some(date(2027, 2, 28)));
    }

    #[test]
    fn test_select_starting_today() {
        let placement = select_placement(vec![entry(4, "2026-06-01", "")], date(2026, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(placement.end_date, None);
    }

    #[test]
    fn test_select_none_when_all_past() {
        let entries = vec![entry(1, "2020-01-01", "2020-06-01")];
        assert_eq!(select_placement(entries, date(2026, 6, 1)).unwrap(), None);
    }

    #[test]
    fn test_select_bad_end_date_is_error() {
        let entries = vec![entry(7, "2027-01-01", "31/12/2027")];
        let err = select_placement(entries, date(2026, 6, 1)).unwrap_err();
        assert_eq!(err.field, "placementEndDate");
        assert_eq!(err.value, "31/12/2027");
    }

    #[test]
    fn test_notice_period_override() {
        let mut placement = PlacementRecord::default();
        assert_eq!(notice_period(&placement), NoticePeriod::default());

        placement.notice_period = 1;
        placement.notice_period_unit = "months".to_string();
        assert_eq!(
            notice_period(&placement),
            NoticePeriod {
                length: 1,
                unit: "months".to_string()
            }
        );

        placement.notice_period_unit.clear();
        assert_eq!(notice_period(&placement).unit, "weeks");
    }
}
