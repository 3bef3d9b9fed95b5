//! Companies House API client
//!
//! Rate-limited HTTP client for the UK companies registry.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;
use url::Url;

use super::types::{ChCompanyProfile, ChOfficer, ChOfficerList, ChSearchItem, ChSearchResult};
use super::CompanyRegistry;
use crate::config::CompaniesHouseConfig;
use crate::error::RegistryError;

const SERVICE: &str = "companies-house";
const SEARCH_PAGE_SIZE: &str = "50";

/// Registration number prefixes that are kept as-is (Scotland, NI, LLPs, ...)
const PREFIXES: [&str; 28] = [
    "SC", "NI", "NC", "NF", "OC", "SO", "LP", "SL", "FC", "SF", "NL", "GE", "IP", "SP", "IC", "SI",
    "NP", "NO", "RC", "SR", "AC", "SA", "NA", "NZ", "CE", "CS", "PC", "RS",
];

/// Companies House API client
pub struct CompaniesHouseClient {
    http: Client,
    base_url: Url,
    api_key: String,
    rate_limit: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl CompaniesHouseClient {
    pub fn new(config: &CompaniesHouseConfig, timeout: Duration) -> Result<Self, RegistryError> {
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
            rate_limit: config.rate_limit,
            last_request: Mutex::new(None),
        })
    }

    /// Enforce spacing between requests
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.rate_limit {
                sleep(self.rate_limit - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn url(&self, path: &str) -> Result<Url, RegistryError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))
            .map_err(|e| RegistryError::Client {
                service: SERVICE,
                message: format!("invalid path '{}': {}", path, e),
            })
    }

    /// Authenticated GET; `Ok(None)` on 404
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, RegistryError> {
        self.throttle().await;
        let url = self.url(path)?;
        debug!(%url, "companies registry request");

        let response = self
            .http
            .get(url)
            .query(query)
            .basic_auth(&self.api_key, Option::<&str>::None)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| RegistryError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
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

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| RegistryError::Decode {
                service: SERVICE,
                message: format!("{}: {}", path, e),
            })
    }
}

#[async_trait]
impl CompanyRegistry for CompaniesHouseClient {
    async fn search_companies(&self, query: &str) -> Result<Vec<ChSearchItem>, RegistryError> {
        let result: Option<ChSearchResult> = self
            .get(
                "/search/companies",
                &[("q", query.trim()), ("items_per_page", SEARCH_PAGE_SIZE)],
            )
            .await?;
        Ok(result.map(|r| r.items).unwrap_or_default())
    }

    async fn fetch_company(&self, number: &str) -> Result<Option<ChCompanyProfile>, RegistryError> {
        let number = normalize_company_number(number);
        if number.is_empty() {
            return Ok(None);
        }
        self.get(&format!("/company/{}", number), &[]).await
    }

    async fn fetch_active_officers(&self, number: &str) -> Result<Vec<ChOfficer>, RegistryError> {
        let number = normalize_company_number(number);
        if number.is_empty() {
            return Ok(Vec::new());
        }
        let list: Option<ChOfficerList> = self
            .get(&format!("/company/{}/officers", number), &[("filter", "active")])
            .await?;

        Ok(list
            .map(|l| l.items.into_iter().filter(ChOfficer::is_active).collect())
            .unwrap_or_default())
    }
}

/// Normalize a registration number to 8 characters with leading zeros
///
/// Pure numbers are zero-padded (`1234567` → `01234567`); numbers with a known
/// two-letter prefix keep it and pad the digits (`SC12345` → `SC012345`).
/// Anything else is returned upper-cased and trimmed.
pub fn normalize_company_number(number: &str) -> String {
    let number = number.trim().to_uppercase();

    if number.len() >= 2 && number.is_char_boundary(2) {
        let (prefix, digits) = number.split_at(2);
        if PREFIXES.contains(&prefix) && digits.chars().all(|c| c.is_ascii_digit()) {
            return format!("{}{:0>6}", prefix, digits);
        }
    }

    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        return format!("{:0>8}", number);
    }

    number
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_company_number() {
        // Pure numeric
        assert_eq!(normalize_company_number("12345678"), "12345678");
        assert_eq!(normalize_company_number("3075427"), "03075427");
        assert_eq!(normalize_company_number(" 123456 "), "00123456");

        // Scottish companies
        assert_eq!(normalize_company_number("SC855314"), "SC855314");
        assert_eq!(normalize_company_number("sc12345"), "SC012345");

        // Northern Irish and LLPs
        assert_eq!(normalize_company_number("NI1234"), "NI001234");
        assert_eq!(normalize_company_number("OC123456"), "OC123456");

        // Left alone
        assert_eq!(normalize_company_number(""), "");
        assert_eq!(normalize_company_number("XX123"), "XX123");
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let config = CompaniesHouseConfig {
            base_url: "not a url".to_string(),
            api_key: "key".to_string(),
            rate_limit: Duration::from_millis(0),
        };
        let result = CompaniesHouseClient::new(&config, Duration::from_secs(1));
        assert!(matches!(result, Err(RegistryError::Client { .. })));
    }

    #[test]
    fn test_url_join() {
        let config = CompaniesHouseConfig {
            base_url: "https://api.company-information.service.gov.uk".to_string(),
            api_key: "key".to_string(),
            rate_limit: Duration::from_millis(0),
        };
        let client = CompaniesHouseClient::new(&config, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("/company/03075427").unwrap().as_str(),
            "https://api.company-information.service.gov.uk/company/03075427"
        );
    }
}
