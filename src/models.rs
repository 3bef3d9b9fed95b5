//! Canonical in-memory records
//!
//! Everything the placement registry and the companies registry return is
//! folded into these types by [`crate::placement_registry::ingest`] and
//! [`crate::resolution`]. Aggregation logic only ever sees these.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency applied to fees and charges when the registry carries none
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Notice period applied when the placement does not specify one
pub const DEFAULT_NOTICE_PERIOD: u32 = 4;
pub const DEFAULT_NOTICE_PERIOD_UNIT: &str = "weeks";

/// A person name split from the registry's `"Surname[:Tag], Forename"` form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub forename: String,
    pub surname: String,
    /// Service identifier embedded after a colon in the surname field
    pub service_tag: Option<String>,
}

/// Candidate identity resolved from the placement registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: u64,
    /// `"Forename Surname"`, tag removed
    pub display_name: String,
    /// Surname exactly as stored, possibly `"SURNAME:SERVICEID"`
    pub raw_surname: String,
    pub surname: String,
    pub forename: String,
    pub service_id: Option<String>,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub ltd_company_name: String,
    pub ltd_registration_number: String,
    pub jurisdiction: String,
    pub registered_address: String,
    pub msa_signed: String,
}

/// One assignment of a candidate to a client company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub placement_id: u64,
    pub job_title: String,
    pub description: String,
    pub company_id: Option<u64>,
    pub company_name: String,
    pub contact_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notice_period: u32,
    pub notice_period_unit: String,
    pub pay_rate: Decimal,
    pub charge_rate: Decimal,
    pub placed_by: String,
}

/// Client company, merged from both registries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_id: u64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub registration_number: String,
    pub jurisdiction: String,
    pub msa_signed: String,
}

/// A named individual at a client company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub contact_id: u64,
    pub company_name: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
}

/// Registry user who made the placement (the decision maker on documents)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacedByUser {
    pub user_id: String,
    pub name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
}

/// Open requirement at a client, as listed for selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSummary {
    pub requirement_id: u64,
    pub company_name: String,
    pub contact_name: String,
    /// `"<id> - <description>"`
    pub description: String,
    pub job_title: String,
}

/// A candidate offered while a user types a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSuggestion {
    pub candidate_id: u64,
    /// Registry name in `"Surname, Forename"` form
    pub name: String,
}

/// Authoritative registered-company details; empty when unresolvable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCompany {
    pub company_number: String,
    pub title: String,
    pub address: String,
    pub jurisdiction: String,
    pub company_status: String,
}

impl RegisteredCompany {
    pub fn is_resolved(&self) -> bool {
        !self.company_number.is_empty()
    }
}

/// Notice period as it appears on the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePeriod {
    pub length: u32,
    pub unit: String,
}

impl Default for NoticePeriod {
    fn default() -> Self {
        Self {
            length: DEFAULT_NOTICE_PERIOD,
            unit: DEFAULT_NOTICE_PERIOD_UNIT.to_string(),
        }
    }
}

/// The canonical aggregate handed to persistence and document rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub candidate: CandidateRecord,
    /// `None` when the candidate has no current or upcoming placement
    pub placement: Option<PlacementRecord>,
    pub company: CompanyRecord,
    pub contact: ContactRecord,
    pub placed_by: PlacedByUser,
    pub requirement_id: Option<u64>,
    /// `DD/MM/YYYY`, empty when absent
    pub start_date: String,
    /// `DD/MM/YYYY`, empty when absent
    pub end_date: String,
    pub duration: String,
    pub notice_period: NoticePeriod,
    pub fee_currency: String,
    pub charge_currency: String,
}

impl ContractRecord {
    pub fn job_title(&self) -> &str {
        self.placement.as_ref().map_or("", |p| p.job_title.as_str())
    }

    /// Flat key/value view keyed by the document merge-field names
    pub fn merge_fields(&self) -> BTreeMap<&'static str, String> {
        let c = &self.candidate;
        let co = &self.company;
        let ct = &self.contact;
        let dm = &self.placed_by;
        let p = self.placement.clone().unwrap_or_default();

        let mut fields = BTreeMap::new();
        fields.insert("candidateId", c.candidate_id.to_string());
        fields.insert("candidateName", c.display_name.clone());
        fields.insert("candidatesurname", c.surname.clone());
        fields.insert("candidateaddress", c.address.clone());
        fields.insert("candidatephone", c.phone.clone());
        fields.insert("candidateemail", c.email.clone());
        fields.insert("candidateltdname", c.ltd_company_name.clone());
        fields.insert("candidateltdregno", c.ltd_registration_number.clone());
        fields.insert("candidatejurisdiction", c.jurisdiction.clone());
        fields.insert("candidateregaddress", c.registered_address.clone());
        fields.insert("sid", c.service_id.clone().unwrap_or_default());
        fields.insert("servicename", p.job_title.clone());

        fields.insert("companyid", co.company_id.to_string());
        fields.insert("companyname", co.name.clone());
        fields.insert("companyaddress", co.address.clone());
        fields.insert("companyemail", co.email.clone());
        fields.insert("companyphone", co.phone.clone());
        fields.insert("companyregistrationnumber", co.registration_number.clone());
        fields.insert("companyjurisdiction", co.jurisdiction.clone());
        fields.insert("companymsasigned", co.msa_signed.clone());

        fields.insert("contactid", ct.contact_id.to_string());
        fields.insert("contactname", ct.name.clone());
        fields.insert("contactaddress", ct.address.clone());
        fields.insert("contactemail", ct.email.clone());
        fields.insert("contactphone", ct.phone.clone());
        fields.insert("contacttitle", ct.job_title.clone());

        fields.insert("placementid", p.placement_id.to_string());
        fields.insert(
            "requirementid",
            self.requirement_id.map(|id| id.to_string()).unwrap_or_default(),
        );
        fields.insert("jobtitle", p.job_title.clone());
        fields.insert("description", p.description.clone());
        fields.insert("startdate", self.start_date.clone());
        fields.insert("enddate", self.end_date.clone());
        fields.insert("duration", self.duration.clone());
        fields.insert("noticeperiod", self.notice_period.length.to_string());
        fields.insert("noticeperiod_unit", self.notice_period.unit.clone());
        fields.insert("fees", p.pay_rate.to_string());
        fields.insert("feecurrency", self.fee_currency.clone());
        fields.insert("charges", p.charge_rate.to_string());
        fields.insert("chargecurrency", self.charge_currency.clone());

        fields.insert("dmname", dm.name.clone());
        fields.insert("dmtitle", dm.job_title.clone());
        fields.insert("dmemail", dm.email.clone());
        fields.insert("dmphone", dm.phone.clone());

        fields
    }
}

/// Outcome of checking a company and, optionally, one of its directors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorValidationResult {
    pub valid: bool,
    /// Reason shown to the user when `valid` is false
    pub narrative: String,
    pub company_number: String,
    pub address: String,
    pub is_director: bool,
    /// Director name as supplied by the caller
    pub director: Option<String>,
    pub jurisdiction: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_notice_period() {
        let notice = NoticePeriod::default();
        assert_eq!(notice.length, 4);
        assert_eq!(notice.unit, "weeks");
    }

    #[test]
    fn test_merge_fields_without_placement() {
        let record = ContractRecord {
            candidate: CandidateRecord {
                candidate_id: 9233,
                display_name: "Jane Smith".to_string(),
                service_id: Some("SVC42".to_string()),
                ..Default::default()
            },
            duration: "0 days".to_string(),
            fee_currency: DEFAULT_CURRENCY.to_string(),
            charge_currency: DEFAULT_CURRENCY.to_string(),
            ..Default::default()
        };

        let fields = record.merge_fields();
        assert_eq!(fields["candidateName"], "Jane Smith");
        assert_eq!(fields["sid"], "SVC42");
        assert_eq!(fields["jobtitle"], "");
        assert_eq!(fields["requirementid"], "");
        assert_eq!(fields["duration"], "0 days");
        assert_eq!(fields["noticeperiod"], "4");
        assert_eq!(fields["feecurrency"], "GBP");
        assert_eq!(record.job_title(), "");
    }

    #[test]
    fn test_registered_company_resolution_flag() {
        assert!(!RegisteredCompany::default().is_resolved());
        let resolved = RegisteredCompany {
            company_number: "03075427".to_string(),
            ..Default::default()
        };
        assert!(resolved.is_resolved());
    }
}
