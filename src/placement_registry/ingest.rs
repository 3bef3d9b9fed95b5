//! Ingestion of placement-registry payloads
//!
//! The registry API has been through several generations: the same logical
//! field shows up as `Surname`, `surname`, `CUSTOM_Company Registration Number`
//! or as an entry in a `CustomFields` name/value array. Every alias is mapped
//! here, once, onto the canonical records in [`crate::models`].
//!
//! Keys are compared after stripping a `CUSTOM_` column prefix, lower-casing
//! and dropping anything that is not a letter or digit.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{
    CandidateRecord, CandidateSuggestion, CompanyRecord, ContactRecord, PlacedByUser,
    PlacementRecord, RequirementSummary,
};
use crate::normalize::{normalize_address, split_person_name};

fn canonical_key(key: &str) -> String {
    let key = match key.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("custom_") => &key[7..],
        _ => key,
    };
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Alias-tolerant view over one loosely-typed registry object
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    value: &'a Value,
}

impl<'a> Fields<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// First non-null value under any alias, searching top-level keys and
    /// then the `CustomFields` name/value array
    pub fn get(&self, aliases: &[&str]) -> Option<&'a Value> {
        let object = self.value.as_object()?;
        let wanted: Vec<String> = aliases.iter().map(|a| canonical_key(a)).collect();

        for alias in &wanted {
            let hit = object
                .iter()
                .find(|(key, value)| !value.is_null() && canonical_key(key) == *alias);
            if let Some((_, value)) = hit {
                return Some(value);
            }
        }

        let custom = object
            .iter()
            .find(|(key, _)| canonical_key(key) == "customfields")
            .and_then(|(_, value)| value.as_array())?;

        for alias in &wanted {
            for entry in custom {
                let entry = Fields::new(entry);
                let name = entry.text(&["Name", "FieldName"]);
                if canonical_key(&name) == *alias {
                    if let Some(value) = entry.get(&["Value", "FieldValue"]) {
                        return Some(value);
                    }
                }
            }
        }

        None
    }

    /// Trimmed text; numbers and booleans rendered, missing or null as empty
    pub fn text(&self, aliases: &[&str]) -> String {
        match self.get(aliases) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    pub fn opt_text(&self, aliases: &[&str]) -> Option<String> {
        Some(self.text(aliases)).filter(|s| !s.is_empty())
    }

    /// Non-negative integer id from a number or a numeric string
    pub fn id(&self, aliases: &[&str]) -> Option<u64> {
        value_as_id(self.get(aliases)?)
    }

    pub fn decimal(&self, aliases: &[&str]) -> Decimal {
        match self.get(aliases) {
            Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .unwrap_or_default(),
            Some(Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or_default(),
            _ => Decimal::ZERO,
        }
    }

    /// Address assembled from the usual line/city/county/postcode fields
    pub fn address(&self) -> String {
        normalize_address([
            self.opt_text(&["AddressLine1"]),
            self.opt_text(&["AddressLine2"]),
            self.opt_text(&["AddressLine3"]),
            self.opt_text(&["City", "Town"]),
            self.opt_text(&["County"]),
            self.opt_text(&["Postcode", "PostCode"]),
        ])
    }
}

fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ids from a search response that is either a bare id list or a list of
/// objects carrying the id under one of `aliases`
pub fn ids_from_search(results: &[Value], aliases: &[&str]) -> Vec<u64> {
    results
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => Fields::new(item).id(aliases),
            other => value_as_id(other),
        })
        .collect()
}

pub fn candidate_ids(results: &[Value]) -> Vec<u64> {
    ids_from_search(results, &["candidateId", "Id"])
}

pub fn company_ids(results: &[Value]) -> Vec<u64> {
    ids_from_search(results, &["companyId", "Id"])
}

/// Candidate identity from a `Candidate/Get` payload
///
/// Registered address and jurisdiction are left empty; they come from the
/// companies registry.
pub fn ingest_candidate(fallback_id: u64, value: &Value) -> CandidateRecord {
    let fields = Fields::new(value);

    let raw_surname = fields.text(&["Surname", "LastName"]);
    let mut forename = fields.text(&["Forenames", "Forename", "FirstName"]);

    let name = if raw_surname.is_empty() {
        // Older shapes only carry a combined "Surname[:Tag], Forename" name
        let combined = split_person_name(&fields.text(&["Name", "FullName"]));
        if forename.is_empty() {
            forename = combined.forename.clone();
        }
        combined
    } else {
        split_person_name(&raw_surname)
    };
    let raw_surname = if raw_surname.is_empty() {
        match &name.service_tag {
            Some(tag) => format!("{}:{}", name.surname, tag),
            None => name.surname.clone(),
        }
    } else {
        raw_surname
    };

    CandidateRecord {
        candidate_id: fields.id(&["candidateId", "Id"]).unwrap_or(fallback_id),
        display_name: format!("{} {}", forename, name.surname).trim().to_string(),
        raw_surname,
        surname: name.surname,
        forename,
        service_id: name.service_tag,
        phone: fields.text(&["MobileNumber", "TelephoneNumber", "Phone"]),
        email: fields.text(&["EmailAddress", "Email"]),
        address: fields.address(),
        ltd_company_name: fields.text(&["NameOfLimitedCompany", "LimitedCompanyName"]),
        ltd_registration_number: fields.text(&[
            "CompanyRegistrationNumber",
            "Company Registration Number",
        ]),
        jurisdiction: String::new(),
        registered_address: String::new(),
        msa_signed: fields.text(&["MSA Signed", "MsaSigned"]),
    }
}

/// One experience row, dates still as sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceEntry {
    /// Dates are left unset; the aggregator parses them on selection
    pub placement: PlacementRecord,
    pub start_date_raw: String,
    pub end_date_raw: String,
}

/// Experience row from `Candidate/GetExperience`
pub fn ingest_experience(value: &Value) -> ExperienceEntry {
    let fields = Fields::new(value);

    let placement = PlacementRecord {
        placement_id: fields.id(&["placementId"]).unwrap_or(0),
        job_title: fields.text(&["placementJobTitle"]),
        description: fields.text(&["jobTitle", "description"]),
        company_id: fields.id(&["placementCompanyId", "companyId"]).filter(|id| *id != 0),
        company_name: fields.text(&["placementCompanyName", "companyName"]),
        contact_id: fields.id(&["contactId", "placementContactId"]).filter(|id| *id != 0),
        start_date: None,
        end_date: None,
        notice_period: fields
            .id(&["noticePeriod"])
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        notice_period_unit: fields.text(&["noticePeriodUOM", "noticePeriodUnit"]),
        pay_rate: fields.decimal(&["placementPayRate", "payRate"]),
        charge_rate: fields.decimal(&["placementChargeRate", "chargeRate"]),
        placed_by: fields.text(&["placementPlacedBy", "placedBy"]),
    };

    ExperienceEntry {
        placement,
        start_date_raw: fields.text(&["placementStartDate", "startDate"]),
        end_date_raw: fields.text(&["placementEndDate", "endDate"]),
    }
}

/// Contact from `Contact/Get` or a `Contact/AdvancedSearch` row
pub fn ingest_contact(value: &Value) -> ContactRecord {
    let fields = Fields::new(value);

    let name = fields.opt_text(&["FullName", "ContactName"]).unwrap_or_else(|| {
        format!(
            "{} {}",
            fields.text(&["Forenames", "Forename"]),
            fields.text(&["Surname"])
        )
        .trim()
        .to_string()
    });

    let address = match fields.opt_text(&["Address", "ContactAddress"]) {
        Some(address) => normalize_address([Some(address)]),
        None => fields.address(),
    };

    ContactRecord {
        contact_id: fields.id(&["ContactId", "Id"]).unwrap_or(0),
        company_name: fields.text(&["CompanyName"]),
        name,
        address,
        email: fields.text(&["EmailAddress", "Email"]),
        phone: fields.text(&["ContactNumber", "TelephoneNumber", "MobileNumber"]),
        job_title: fields.text(&["JobTitle"]),
    }
}

/// Company from a `Company/AdvancedSearch` row
///
/// The address is the registry's own, used only when the companies registry
/// cannot be consulted.
pub fn ingest_company(value: &Value) -> CompanyRecord {
    let fields = Fields::new(value);

    CompanyRecord {
        company_id: fields.id(&["CompanyId", "Id"]).unwrap_or(0),
        name: fields.text(&["CompanyName", "Name"]),
        address: fields
            .opt_text(&["CompanyAddress"])
            .map(|a| normalize_address([Some(a)]))
            .unwrap_or_else(|| fields.address()),
        email: fields.text(&["CompanyEmail", "EmailAddress"]),
        phone: fields.text(&["TelephoneNumber", "CompanyPhone"]),
        registration_number: fields.text(&[
            "Company Registration Number",
            "CompanyNumber",
        ]),
        jurisdiction: String::new(),
        msa_signed: fields.text(&["MSA Signed", "MsaSigned"]),
    }
}

/// Registry user from `User/Get`
pub fn ingest_user(value: &Value) -> PlacedByUser {
    let fields = Fields::new(value);

    PlacedByUser {
        user_id: fields.text(&["UserId", "Id"]),
        name: fields.text(&["Username", "FullName"]),
        job_title: fields.text(&["JobTitle"]),
        email: fields.text(&["EmailAddress", "Email"]),
        phone: fields.text(&["TelephoneNumber", "MobileNumber", "Phone"]),
    }
}

/// Requirement from `Requirement/Search`
pub fn ingest_requirement(value: &Value) -> RequirementSummary {
    let fields = Fields::new(value);
    let requirement_id = fields.id(&["requirementId", "Id"]).unwrap_or(0);
    let description = fields.text(&["entityDescription", "description"]);

    RequirementSummary {
        requirement_id,
        company_name: fields.text(&["companyName"]),
        contact_name: fields.text(&["contactName"]),
        description: format!("{} - {}", requirement_id, description),
        job_title: fields.text(&["jobTitle"]),
    }
}

/// Candidate row from `Requirement/GetRequirementCandidates` or a search
///
/// `None` when the row has no id, or carries neither `Name` nor `Surname`;
/// such rows have to be fetched by id.
pub fn ingest_suggestion(value: &Value) -> Option<CandidateSuggestion> {
    let fields = Fields::new(value);
    let candidate_id = fields.id(&["candidateId", "Id"])?;

    let name = match fields.opt_text(&["Name"]) {
        Some(name) => name,
        None => {
            let surname = fields.opt_text(&["Surname"])?;
            format!("{}, {}", surname, fields.text(&["Forenames"]))
        }
    };

    Some(CandidateSuggestion { candidate_id, name })
}
