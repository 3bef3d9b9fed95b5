//! Placement registry HTTP client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::time::Duration;
use tracing::debug;
use url::Url;

use super::PlacementRegistry;
use crate::config::PlacementRegistryConfig;
use crate::error::RegistryError;

const SERVICE: &str = "placement-registry";

const COMPANY_COLUMNS: [&str; 13] = [
    "CompanyId",
    "CompanyName",
    "CompanyEmail",
    "TelephoneNumber",
    "AddressLine1",
    "AddressLine2",
    "AddressLine3",
    "City",
    "County",
    "Postcode",
    "CUSTOM_MSA Signed",
    "CUSTOM_Company Registration Number",
    "CompanyType",
];

const CONTACT_COLUMNS: [&str; 12] = [
    "ContactId",
    "Forenames",
    "Surname",
    "CompanyName",
    "JobTitle",
    "EmailAddress",
    "ContactNumber",
    "AddressLine1",
    "AddressLine2",
    "City",
    "County",
    "Postcode",
];

/// Client for the placement registry REST API
pub struct PlacementRegistryClient {
    http: Client,
    base_url: Url,
    api_key: String,
    user_id: String,
}

impl PlacementRegistryClient {
    pub fn new(config: &PlacementRegistryConfig, timeout: Duration) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Client {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let base_url = Url::parse(&config.base_url).map_err(|e| RegistryError::Client {
            service: SERVICE,
            message: format!("invalid base url '{}': {}", config.base_url, e),
        })?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, RegistryError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path.trim_start_matches('/'))).map_err(|e| {
            RegistryError::Client {
                service: SERVICE,
                message: format!("invalid path '{}': {}", path, e),
            }
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Cache-Control", "no-cache")
            .query(&[("UserId", self.user_id.as_str())])
    }

    /// Send and decode; `Ok(None)` on 404 or an empty body
    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Option<Value>, RegistryError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| RegistryError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RegistryError::Transport {
                service: SERVICE,
                source,
            })?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Value>(&body)
            .map(|value| Some(value).filter(|v| !v.is_null()))
            .map_err(|e| RegistryError::Decode {
                service: SERVICE,
                message: format!("{}: {}", path, e),
            })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Option<Value>, RegistryError> {
        let url = self.url(path)?;
        debug!(%url, "placement registry GET");
        self.send(path, self.http.get(url).query(query)).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, RegistryError> {
        let url = self.url(path)?;
        debug!(%url, "placement registry POST");
        self.send(path, self.http.post(url).json(body)).await
    }

    /// Advanced search body: one equality parameter, selected columns
    fn advanced_search(&self, columns: &[&str], field: &str, value: String) -> Value {
        json!({
            "userId": self.user_id,
            "allColumns": false,
            "columns": columns,
            "includeArchived": true,
            "parameters": [{ "fieldName": field, "fieldValue": value }],
        })
    }
}

/// A list response; a single object is treated as a one-element list
fn into_list(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    }
}

#[async_trait]
impl PlacementRegistry for PlacementRegistryClient {
    async fn search_candidates(&self, surname: &str) -> Result<Vec<Value>, RegistryError> {
        let result = self
            .get("Candidate/Search", &[("Surname", surname.trim().to_string())])
            .await?;
        Ok(into_list(result))
    }

    async fn get_candidate(&self, candidate_id: u64) -> Result<Option<Value>, RegistryError> {
        self.get("Candidate/Get", &[("candidateId", candidate_id.to_string())])
            .await
    }

    async fn get_experience(&self, candidate_id: u64) -> Result<Vec<Value>, RegistryError> {
        let result = self
            .get(
                "Candidate/GetExperience",
                &[("candidateId", candidate_id.to_string())],
            )
            .await?;
        Ok(into_list(result))
    }

    async fn get_contact(&self, contact_id: u64) -> Result<Option<Value>, RegistryError> {
        self.get("Contact/Get", &[("ContactId", contact_id.to_string())])
            .await
    }

    async fn get_company(&self, company_id: u64) -> Result<Option<Value>, RegistryError> {
        let body = self.advanced_search(&COMPANY_COLUMNS, "CompanyId", company_id.to_string());
        let result = self.post("Company/AdvancedSearch", &body).await?;
        Ok(into_list(result).into_iter().next())
    }

    async fn search_companies(&self, name: &str) -> Result<Vec<Value>, RegistryError> {
        let result = self
            .get("Company/Search", &[("CompanyName", name.trim().to_string())])
            .await?;
        Ok(into_list(result))
    }

    async fn search_contacts_by_company(
        &self,
        company_name: &str,
    ) -> Result<Vec<Value>, RegistryError> {
        let body = self.advanced_search(
            &CONTACT_COLUMNS,
            "CompanyName",
            company_name.trim().to_string(),
        );
        let result = self.post("Contact/AdvancedSearch", &body).await?;
        Ok(into_list(result))
    }

    async fn search_requirements(
        &self,
        company_name: &str,
        contact_name: &str,
    ) -> Result<Vec<Value>, RegistryError> {
        let result = self
            .get(
                "Requirement/Search",
                &[
                    ("CompanyName", company_name.trim().to_string()),
                    ("ContactName", contact_name.trim().to_string()),
                ],
            )
            .await?;
        Ok(into_list(result))
    }

    async fn requirement_candidates(
        &self,
        requirement_id: u64,
    ) -> Result<Vec<Value>, RegistryError> {
        let result = self
            .get(
                "Requirement/GetRequirementCandidates",
                &[("RequirementId", requirement_id.to_string())],
            )
            .await?;
        Ok(into_list(result))
    }

    async fn list_users(&self) -> Result<Vec<Value>, RegistryError> {
        Ok(into_list(self.get("User/Get", &[]).await?))
    }
}
