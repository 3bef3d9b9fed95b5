//! Company and director validation
//!
//! Confirms that a limited company exists under the claimed name and number,
//! is active, and optionally that a named person is one of its current
//! directors. A failed check is a normal result carrying a narrative for the
//! user; `Err` means an upstream service could not be reached.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::RegistryError;
use crate::models::DirectorValidationResult;
use crate::name_matching::{DirectorMatchPolicy, NameMatcher};
use crate::normalize::{format_display_name, format_officer_name, normalize_address};
use crate::resolution::{display_jurisdiction, CompanyResolver};

const ACTIVE_STATUS: &str = "active";

pub struct DirectorValidator {
    resolver: CompanyResolver,
    matcher: Arc<dyn NameMatcher>,
    policy: DirectorMatchPolicy,
}

impl DirectorValidator {
    pub fn new(
        resolver: CompanyResolver,
        matcher: Arc<dyn NameMatcher>,
        policy: DirectorMatchPolicy,
    ) -> Self {
        Self {
            resolver,
            matcher,
            policy,
        }
    }

    pub async fn validate_company_and_director(
        &self,
        reg_number: &str,
        company_name: &str,
        director: Option<&str>,
    ) -> Result<DirectorValidationResult, RegistryError> {
        let director = director.map(str::trim).filter(|d| !d.is_empty());
        let mut result = DirectorValidationResult {
            director: director.map(str::to_string),
            ..Default::default()
        };

        // A blank number never matches; the title alone is not enough
        let item = if reg_number.trim().is_empty() {
            None
        } else {
            self.resolver
                .find_exact_match(company_name, Some(reg_number))
                .await?
        };
        let Some(item) = item else {
            result.narrative = format!(
                "Company {} not found with registered number {}. Check number. \
                 Check spelling of name; is the company filed as LTD or LIMITED?",
                company_name, reg_number
            );
            return Ok(result);
        };

        result.company_number = item.company_number.clone();
        result.address = normalize_address([item.address_snippet.as_deref()]);
        result.status = item.company_status.clone().unwrap_or_default();

        let registry = self.resolver.registry();
        if let Some(profile) = registry.fetch_company(&item.company_number).await? {
            result.jurisdiction = display_jurisdiction(&profile.jurisdiction);
            if !profile.company_status.is_empty() {
                result.status = profile.company_status;
            }
        }

        if result.status != ACTIVE_STATUS {
            result.narrative = format!("{} is not Active", company_name);
            return Ok(result);
        }

        let Some(director) = director.map(format_display_name) else {
            result.valid = true;
            return Ok(result);
        };

        let officers = registry.fetch_active_officers(&item.company_number).await?;
        for officer in officers.iter().filter(|o| o.is_active() && o.is_director()) {
            let Some(officer_name) = format_officer_name(&officer.name) else {
                debug!(officer = %officer.name, "skipping unparseable officer name");
                continue;
            };

            let grade = self
                .matcher
                .match_person_names(&director, &officer_name)
                .await?;
            debug!(director = %director, officer = %officer_name, %grade, "director match");

            if self.policy.accepts(grade) {
                info!(company = company_name, director = %director, "director confirmed");
                result.valid = true;
                result.is_director = true;
                return Ok(result);
            }
        }

        result.narrative = format!("{} not listed as a director of {}", director, company_name);
        Ok(result)
    }
}
