//! Companies House API response types
//!
//! Only the fields the contract core reads are mapped; everything is
//! defaulted so sparse records still decode.

use serde::{Deserialize, Serialize};

/// `GET /search/companies`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChSearchResult {
    #[serde(default)]
    pub items: Vec<ChSearchItem>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// One search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChSearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_number: String,
    #[serde(default)]
    pub address_snippet: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub date_of_creation: Option<String>,
}

impl ChSearchItem {
    pub fn is_active(&self) -> bool {
        self.company_status.as_deref() == Some("active")
    }
}

/// `GET /company/{number}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChCompanyProfile {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_number: String,
    #[serde(default)]
    pub company_status: String,
    /// Machine code, e.g. `england-wales`, `scotland`
    #[serde(default)]
    pub jurisdiction: String,
    #[serde(default)]
    pub registered_office_address: Option<ChAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChAddress {
    pub premises: Option<String>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// `GET /company/{number}/officers`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChOfficerList {
    #[serde(default)]
    pub items: Vec<ChOfficer>,
    #[serde(default)]
    pub active_count: Option<u64>,
    #[serde(default)]
    pub resigned_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChOfficer {
    /// `"SURNAME, Forenames"`
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub officer_role: String,
    #[serde(default)]
    pub appointed_on: Option<String>,
    #[serde(default)]
    pub resigned_on: Option<String>,
}

impl ChOfficer {
    pub fn is_active(&self) -> bool {
        self.resigned_on.is_none()
    }

    pub fn is_director(&self) -> bool {
        self.officer_role == "director"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_search_decodes() {
        let json = r#"{"items":[{"title":"ACME LIMITED","company_number":"01234567"},{"title":"ACME HOLDINGS LTD"}]}"#;
        let result: ChSearchResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].company_number, "01234567");
        assert_eq!(result.items[1].company_number, "");
        assert!(!result.items[0].is_active());
    }

    #[test]
    fn test_officer_flags() {
        let json = r#"{"items":[
            {"name":"HORN, Michael","officer_role":"director"},
            {"name":"SMITH, Ann","officer_role":"secretary","resigned_on":"2020-01-01"}
        ]}"#;
        let list: ChOfficerList = serde_json::from_str(json).unwrap();

        assert!(list.items[0].is_active());
        assert!(list.items[0].is_director());
        assert!(!list.items[1].is_active());
        assert!(!list.items[1].is_director());
    }

    #[test]
    fn test_profile_decodes() {
        let json = r#"{"company_name":"AMBETH CONSULTING LIMITED","company_number":"SC855314",
            "company_status":"active","jurisdiction":"scotland"}"#;
        let profile: ChCompanyProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.jurisdiction, "scotland");
        assert!(profile.registered_office_address.is_none());
    }
}
