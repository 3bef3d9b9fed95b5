//! Client configuration
//!
//! Credentials and endpoints are carried in an explicit [`ContractConfig`]
//! passed to client constructors. `from_env` reads the process environment
//! (the binary loads `.env` first); `from_lookup` takes any key lookup so
//! tests never touch global state.

use std::time::Duration;

use crate::cache::DEFAULT_QUERY_TTL;
use crate::error::ConfigError;
use crate::name_matching::DirectorMatchPolicy;

pub const DEFAULT_PLACEMENT_REGISTRY_URL: &str = "https://coll7openapi.azure-api.net/api";
pub const DEFAULT_COMPANIES_HOUSE_URL: &str = "https://api.company-information.service.gov.uk";
pub const DEFAULT_NAME_API_URL: &str = "https://api.nameapi.org/rest/v5.3";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const COMPANIES_HOUSE_RATE_LIMIT_MS: u64 = 500; // ~2 req/sec, well under 600 per 5 minutes

/// Placement registry (candidate CRM) endpoint and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRegistryConfig {
    pub base_url: String,
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    pub api_key: String,
    /// Registry user the API acts as; sent as `UserId` on every call
    pub user_id: String,
}

/// Companies registry endpoint and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompaniesHouseConfig {
    pub base_url: String,
    pub api_key: String,
    /// Minimum spacing between requests
    pub rate_limit: Duration,
}

/// Person-name matching service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatcherConfig {
    pub base_url: String,
    /// `None` selects the local Jaro-Winkler matcher
    pub api_key: Option<String>,
}

/// Everything needed to build the registry clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    pub placement_registry: PlacementRegistryConfig,
    pub companies_house: CompaniesHouseConfig,
    pub name_matcher: NameMatcherConfig,
    pub request_timeout: Duration,
    pub search_cache_ttl: Duration,
    pub director_match: DirectorMatchPolicy,
}

impl ContractConfig {
    /// Build from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        let name_api_key = get("NAMEAPI_KEY").or_else(|| {
            match (get("NAMEAPI_KEYPREFIX"), get("NAMEAPI_KEYSUFFIX")) {
                (Some(prefix), Some(suffix)) => Some(format!("{}-{}", prefix, suffix)),
                _ => None,
            }
        });

        let request_timeout = Duration::from_secs(parse_u64(
            "HTTP_TIMEOUT_SECS",
            get("HTTP_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT_SECS,
        )?);
        let search_cache_ttl = Duration::from_secs(parse_u64(
            "SEARCH_CACHE_TTL_SECS",
            get("SEARCH_CACHE_TTL_SECS"),
            DEFAULT_QUERY_TTL.as_secs(),
        )?);
        let accept_relation = parse_bool(
            "DIRECTOR_MATCH_ACCEPT_RELATION",
            get("DIRECTOR_MATCH_ACCEPT_RELATION"),
        )?;

        Ok(Self {
            placement_registry: PlacementRegistryConfig {
                base_url: get("C7_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PLACEMENT_REGISTRY_URL.to_string()),
                api_key: require("C7_KEY")?,
                user_id: require("C7_USERID")?,
            },
            companies_house: CompaniesHouseConfig {
                base_url: get("CH_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_COMPANIES_HOUSE_URL.to_string()),
                api_key: require("CH_KEY")?,
                rate_limit: Duration::from_millis(COMPANIES_HOUSE_RATE_LIMIT_MS),
            },
            name_matcher: NameMatcherConfig {
                base_url: get("NAMEAPI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_NAME_API_URL.to_string()),
                api_key: name_api_key,
            },
            request_timeout,
            search_cache_ttl,
            director_match: DirectorMatchPolicy { accept_relation },
        })
    }
}

fn parse_u64(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value: v }),
    }
}

fn parse_bool(var: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no") => Ok(false),
        Some(_) => Err(ConfigError::InvalidVar {
            var,
            value: value.unwrap_or_default(),
        }),
    }
}
